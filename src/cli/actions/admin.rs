use crate::{
    cli::{actions::output, globals::GlobalArgs},
    routes::Route,
};
use anyhow::{bail, Result};

#[derive(Debug)]
pub enum Args {
    Users { search: Option<String> },
    Promote { email: String },
    Demote { email: String },
    DeleteUser { user_id: String, confirmed: bool },
}

/// # Errors
/// Returns access denials and backend errors.
pub async fn execute(globals: &GlobalArgs, args: Args) -> Result<()> {
    if matches!(args, Args::DeleteUser { confirmed: false, .. }) {
        bail!("Deleting a user cannot be undone. Re-run with --yes to confirm.");
    }

    let app = globals.app()?;
    output::require(&app, &Route::PromoteUser).await?;

    match args {
        Args::Users { search } => {
            app.users.fetch_users().await?;
            let directory = app.users.snapshot();
            let matches = directory.search(search.as_deref().unwrap_or_default());
            if matches.is_empty() {
                println!("No users found.");
            }
            for user in matches {
                println!("{:<7} {:<32} {}", user.role.as_str(), user.email, user.name);
            }
        }
        Args::Promote { email } => {
            let message = app.users.promote(&email).await?;
            output::message(message, "User promoted to admin.");
        }
        Args::Demote { email } => {
            let message = app.users.demote(&email).await?;
            output::message(message, "Admin role removed.");
        }
        Args::DeleteUser { user_id, .. } => {
            let message = app.users.delete_user(&user_id).await?;
            output::message(message, "User deleted successfully!");
            println!("{} user(s) remaining.", app.users.snapshot().users.len());
        }
    }

    Ok(())
}
