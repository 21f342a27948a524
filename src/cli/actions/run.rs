use crate::cli::actions::{account, admin, catalog, payments, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Account(globals, args) => account::execute(&globals, args).await,
        Action::Catalog(globals, args) => catalog::execute(&globals, args).await,
        Action::Payments(globals, args) => payments::execute(&globals, args).await,
        Action::Admin(globals, args) => admin::execute(&globals, args).await,
    }
}
