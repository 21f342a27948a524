pub mod account;
pub mod admin;
pub mod catalog;
pub mod payments;

// Internal "interpreter" for `Action`; the match lives in `run`.
mod run;

mod output;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Account(GlobalArgs, account::Args),
    Catalog(GlobalArgs, catalog::Args),
    Payments(GlobalArgs, payments::Args),
    Admin(GlobalArgs, admin::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
