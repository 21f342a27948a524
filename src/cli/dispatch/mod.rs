use crate::{
    cli::{
        actions::{account, admin, catalog, payments, Action},
        commands::{
            ARG_API_URL, ARG_AUTH_HEADER, ARG_ORIGIN, ARG_SESSION_FILE, ARG_STATE_FILE,
            ARG_STRIPE_KEY,
        },
        globals::{default_session_file, default_state_file, GlobalArgs},
    },
    client::AuthHeader,
    features::payments::PaymentMethod,
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;

    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    let action = match name {
        "whoami" => Action::Account(globals, account::Args::WhoAmI),
        "login" => Action::Account(
            globals,
            account::Args::Login {
                email: string(sub, "email")?,
                password: secret(sub, "password")?,
            },
        ),
        "register" => Action::Account(
            globals,
            account::Args::Register {
                name: string(sub, "name")?,
                email: string(sub, "email")?,
                password: secret(sub, "password")?,
                picture: sub.get_one::<PathBuf>("picture").cloned(),
            },
        ),
        "verify" => Action::Account(
            globals,
            account::Args::Verify {
                otp: string(sub, "otp")?,
            },
        ),
        "resend-otp" => Action::Account(globals, account::Args::ResendOtp),
        "logout" => Action::Account(globals, account::Args::Logout),
        "password" => Action::Account(
            globals,
            account::Args::Password {
                current: secret(sub, "current")?,
                new: secret(sub, "new")?,
                confirm: secret(sub, "confirm")?,
            },
        ),
        "profile" => Action::Account(
            globals,
            account::Args::Profile {
                name: sub.get_one::<String>("name").cloned(),
                email: sub.get_one::<String>("email").cloned(),
                picture: sub.get_one::<PathBuf>("picture").cloned(),
            },
        ),
        "delete-account" => Action::Account(
            globals,
            account::Args::DeleteAccount {
                confirmed: sub.get_flag("yes"),
            },
        ),
        "courses" => Action::Catalog(globals, catalog::Args::Courses),
        "my-courses" => Action::Catalog(globals, catalog::Args::MyCourses),
        "enroll" => Action::Catalog(
            globals,
            catalog::Args::Enroll {
                course_id: string(sub, "course")?,
            },
        ),
        "lectures" => Action::Catalog(
            globals,
            catalog::Args::Lectures {
                course_id: string(sub, "course")?,
            },
        ),
        "add-lecture" => Action::Catalog(
            globals,
            catalog::Args::AddLecture {
                course_id: string(sub, "course")?,
                title: string(sub, "title")?,
                description: sub
                    .get_one::<String>("description")
                    .cloned()
                    .unwrap_or_default(),
                video: sub
                    .get_one::<PathBuf>("video")
                    .cloned()
                    .context("missing required argument: --video")?,
                mime: sub.get_one::<String>("mime").cloned(),
            },
        ),
        "delete-lecture" => Action::Catalog(
            globals,
            catalog::Args::DeleteLecture {
                lecture_id: string(sub, "lecture")?,
                course_id: string(sub, "course")?,
                confirmed: sub.get_flag("yes"),
            },
        ),
        "create-course" => Action::Catalog(
            globals,
            catalog::Args::CreateCourse {
                title: string(sub, "title")?,
                category: string(sub, "category")?,
                description: string(sub, "description")?,
                price: string(sub, "price")?,
                instructor: string(sub, "instructor")?,
                image: sub.get_one::<PathBuf>("image").cloned(),
                mime: sub.get_one::<String>("mime").cloned(),
            },
        ),
        "delete-course" => Action::Catalog(
            globals,
            catalog::Args::DeleteCourse {
                course_id: string(sub, "course")?,
                confirmed: sub.get_flag("yes"),
            },
        ),
        "checkout" => Action::Payments(
            globals,
            payments::Args::Checkout {
                course_id: string(sub, "course")?,
                payment_method: PaymentMethod::new(string(sub, "payment-method")?),
            },
        ),
        "payment-return" => Action::Payments(
            globals,
            payments::Args::Return {
                url: string(sub, "url")?,
            },
        ),
        "users" => Action::Admin(
            globals,
            admin::Args::Users {
                search: sub.get_one::<String>("search").cloned(),
            },
        ),
        "promote" => Action::Admin(
            globals,
            admin::Args::Promote {
                email: string(sub, "email")?,
            },
        ),
        "demote" => Action::Admin(
            globals,
            admin::Args::Demote {
                email: string(sub, "email")?,
            },
        ),
        "delete-user" => Action::Admin(
            globals,
            admin::Args::DeleteUser {
                user_id: string(sub, "user")?,
                confirmed: sub.get_flag("yes"),
            },
        ),
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}

fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let state_file = matches
        .get_one::<PathBuf>(ARG_STATE_FILE)
        .cloned()
        .unwrap_or_else(default_state_file);
    let session_file = matches
        .get_one::<PathBuf>(ARG_SESSION_FILE)
        .cloned()
        .unwrap_or_else(default_session_file);

    let mut globals = GlobalArgs::new(state_file, session_file);
    globals.api_url = matches.get_one::<String>(ARG_API_URL).cloned();
    globals.origin = matches.get_one::<String>(ARG_ORIGIN).cloned();
    globals.auth_header = matches
        .get_one::<String>(ARG_AUTH_HEADER)
        .map(|value| value.parse::<AuthHeader>())
        .transpose()
        .map_err(|err| anyhow!(err))?;
    if let Some(key) = matches.get_one::<String>(ARG_STRIPE_KEY) {
        globals.stripe_key = SecretString::from(key.clone());
    }

    Ok(globals)
}

fn string(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: {id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Result<SecretString> {
    string(matches, id).map(SecretString::from)
}
