use crate::{
    cli::{actions::output, globals::GlobalArgs},
    client::Upload,
    features::auth::validation,
    routes::Route,
};
use anyhow::{bail, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;

#[derive(Debug)]
pub enum Args {
    WhoAmI,
    Login {
        email: String,
        password: SecretString,
    },
    Register {
        name: String,
        email: String,
        password: SecretString,
        picture: Option<PathBuf>,
    },
    Verify {
        otp: String,
    },
    ResendOtp,
    Logout,
    Password {
        current: SecretString,
        new: SecretString,
        confirm: SecretString,
    },
    Profile {
        name: Option<String>,
        email: Option<String>,
        picture: Option<PathBuf>,
    },
    DeleteAccount {
        confirmed: bool,
    },
}

/// # Errors
/// Returns local validation failures and backend errors.
pub async fn execute(globals: &GlobalArgs, args: Args) -> Result<()> {
    let app = globals.app()?;

    match args {
        Args::WhoAmI => {
            app.session.fetch_current_user().await;
            match app.session.current_user() {
                Some(user) => output::user(&user),
                None => println!("Not logged in."),
            }
        }
        Args::Login { email, password } => {
            validation::check_login(&email, password.expose_secret())?;
            let outcome = app.session.login(email.trim(), password.expose_secret()).await?;
            output::message(outcome.message, "Logged in.");
            output::user(&outcome.user);
            output::next(&outcome.route);
        }
        Args::Register {
            name,
            email,
            password,
            picture,
        } => {
            validation::check_registration(&name, &email, password.expose_secret())?;
            let picture = picture
                .as_deref()
                .map(|path| Upload::from_path(path, None))
                .transpose()?;
            let outcome = app
                .session
                .register(name.trim(), email.trim(), password.expose_secret(), picture)
                .await?;
            output::message(outcome.message, "Check your email for the verification code.");
            output::next(&outcome.route);
        }
        Args::Verify { otp } => {
            validation::check_otp(&otp)?;
            let response = app.session.verify_otp(&otp).await?;
            output::message(response.message, "Account verified. You can now log in.");
            output::next(&Route::Login);
        }
        Args::ResendOtp => {
            let message = app.session.resend_otp().await?;
            output::message(message, "A new code is on its way.");
        }
        Args::Logout => {
            app.session.logout(|route| {
                println!("Logged out.");
                output::next(&route);
            });
        }
        Args::Password {
            current,
            new,
            confirm,
        } => {
            output::require(&app, &Route::Account).await?;
            validation::check_password_change(
                current.expose_secret(),
                new.expose_secret(),
                confirm.expose_secret(),
            )?;
            let message = app
                .session
                .update_password(current.expose_secret(), new.expose_secret())
                .await?;
            output::message(message, "Password updated.");
        }
        Args::Profile {
            name,
            email,
            picture,
        } => {
            output::require(&app, &Route::Account).await?;
            if name.is_none() && email.is_none() && picture.is_none() {
                bail!("Nothing to update: pass --name, --email or --picture.");
            }
            if let Some(email) = &email {
                if !validation::valid_email(email) {
                    bail!("Please enter a valid email address.");
                }
            }
            let picture = picture
                .as_deref()
                .map(|path| Upload::from_path(path, None))
                .transpose()?;
            let message = app
                .session
                .update_profile(name.as_deref(), email.as_deref(), picture)
                .await?;
            output::message(message, "Profile updated.");
            if let Some(user) = app.session.current_user() {
                output::user(&user);
            }
        }
        Args::DeleteAccount { confirmed } => {
            if !confirmed {
                bail!("This permanently deletes your account. Re-run with --yes to confirm.");
            }
            output::require(&app, &Route::Account).await?;
            let (message, route) = app.session.delete_account().await?;
            output::message(message, "Account deleted.");
            output::next(&route);
        }
    }

    Ok(())
}
