pub mod logging;

mod account;
mod admin;
mod catalog;
mod payments;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};
use std::path::PathBuf;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_ORIGIN: &str = "origin";
pub const ARG_STATE_FILE: &str = "state-file";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_STRIPE_KEY: &str = "stripe-key";
pub const ARG_AUTH_HEADER: &str = "auth-header";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("coursehub")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Course backend base URL")
                .env("COURSEHUB_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_ORIGIN)
                .long("origin")
                .help("Front-end origin used to build payment return URLs")
                .env("COURSEHUB_ORIGIN")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_FILE)
                .long("state-file")
                .help("File holding the login and activation tokens")
                .long_help(
                    "File holding the login and activation tokens. Defaults to ~/.coursehub/state.json.",
                )
                .env("COURSEHUB_STATE_FILE")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long("session-file")
                .help("Short-lived file bridging checkout and the payment return")
                .env("COURSEHUB_SESSION_FILE")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_STRIPE_KEY)
                .long("stripe-key")
                .help("Stripe publishable key used to confirm payments")
                .env("COURSEHUB_STRIPE_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_AUTH_HEADER)
                .long("auth-header")
                .help("How the login token is sent: `token` header or `bearer` authorization")
                .env("COURSEHUB_AUTH_HEADER")
                .global(true)
                .value_parser(["token", "bearer"]),
        );

    let command = account::with_args(command);
    let command = catalog::with_args(command);
    let command = payments::with_args(command);
    let command = admin::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "coursehub");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_subcommand_required() {
        let result = new().try_get_matches_from(vec!["coursehub"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let matches = new().get_matches_from(vec![
            "coursehub",
            "courses",
            "--api-url",
            "http://backend:2000",
            "--auth-header",
            "bearer",
        ]);

        assert_eq!(
            matches.get_one::<String>(ARG_API_URL).cloned(),
            Some("http://backend:2000".to_string())
        );
        assert_eq!(
            matches.get_one::<String>(ARG_AUTH_HEADER).cloned(),
            Some("bearer".to_string())
        );
        assert_eq!(matches.subcommand_name(), Some("courses"));
    }

    #[test]
    fn test_rejects_unknown_auth_header() {
        let result = new().try_get_matches_from(vec![
            "coursehub",
            "whoami",
            "--auth-header",
            "cookie",
        ]);
        assert_eq!(
            result.map_err(|e| e.kind()).err(),
            Some(clap::error::ErrorKind::InvalidValue)
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("COURSEHUB_API_URL", Some("http://api.local:2000")),
                ("COURSEHUB_ORIGIN", Some("http://app.local")),
                ("COURSEHUB_STATE_FILE", Some("/tmp/coursehub/state.json")),
                ("COURSEHUB_STRIPE_KEY", Some("pk_test_123")),
                ("COURSEHUB_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["coursehub", "whoami"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).cloned(),
                    Some("http://api.local:2000".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_ORIGIN).cloned(),
                    Some("http://app.local".to_string())
                );
                assert_eq!(
                    matches.get_one::<PathBuf>(ARG_STATE_FILE).cloned(),
                    Some(PathBuf::from("/tmp/coursehub/state.json"))
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_STRIPE_KEY).cloned(),
                    Some("pk_test_123".to_string())
                );
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("COURSEHUB_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["coursehub".to_string(), "courses".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
