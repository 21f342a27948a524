use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

pub fn with_args(command: Command) -> Command {
    command
        .subcommand(Command::new("whoami").about("Show the logged-in account"))
        .subcommand(
            Command::new("login")
                .about("Log in and remember the session")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Account email")
                        .required(true),
                )
                .arg(password_arg("password", "Account password").required(true)),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account; a one-time code is emailed for verification")
                .arg(Arg::new("name").long("name").help("Display name").required(true))
                .arg(Arg::new("email").long("email").help("Account email").required(true))
                .arg(password_arg("password", "Account password").required(true))
                .arg(picture_arg()),
        )
        .subcommand(
            Command::new("verify")
                .about("Confirm a pending registration with the emailed code")
                .arg(Arg::new("otp").help("Four-digit code").required(true)),
        )
        .subcommand(Command::new("resend-otp").about("Email a fresh verification code"))
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(
            Command::new("password")
                .about("Change the account password")
                .arg(password_arg("current", "Current password").required(true))
                .arg(password_arg("new", "New password").required(true))
                .arg(password_arg("confirm", "New password again").required(true)),
        )
        .subcommand(
            Command::new("profile")
                .about("Update the account's name, email or picture")
                .arg(Arg::new("name").long("name").help("New display name"))
                .arg(Arg::new("email").long("email").help("New email"))
                .arg(picture_arg()),
        )
        .subcommand(
            Command::new("delete-account")
                .about("Delete the account and log out")
                .arg(confirm_arg()),
        )
}

fn password_arg(id: &'static str, help: &'static str) -> Arg {
    let arg = Arg::new(id).long(id).help(help).hide_env_values(true);
    if id == "password" {
        arg.env("COURSEHUB_PASSWORD")
    } else {
        arg
    }
}

fn picture_arg() -> Arg {
    Arg::new("picture")
        .long("picture")
        .help("Profile picture file")
        .value_parser(clap::value_parser!(PathBuf))
}

pub(super) fn confirm_arg() -> Arg {
    Arg::new("yes")
        .long("yes")
        .short('y')
        .help("Do not ask for confirmation")
        .action(ArgAction::SetTrue)
}

#[cfg(test)]
mod tests {
    use crate::cli::commands::new;

    #[test]
    fn test_login_args() {
        temp_env::with_vars([("COURSEHUB_PASSWORD", Some("secret1"))], || {
            let matches = new().get_matches_from(["coursehub", "login", "-e", "a@b.com"]);
            let (name, sub) = matches.subcommand().unwrap_or(("", &matches));
            assert_eq!(name, "login");
            assert_eq!(
                sub.get_one::<String>("email").map(String::as_str),
                Some("a@b.com")
            );
            assert_eq!(
                sub.get_one::<String>("password").map(String::as_str),
                Some("secret1")
            );
        });
    }

    #[test]
    fn test_password_change_requires_confirmation() {
        let result = new().try_get_matches_from([
            "coursehub",
            "password",
            "--current",
            "old123",
            "--new",
            "new123",
        ]);
        assert_eq!(
            result.map_err(|e| e.kind()).err(),
            Some(clap::error::ErrorKind::MissingRequiredArgument)
        );
    }
}
