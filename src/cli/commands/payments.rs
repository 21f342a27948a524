use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    command
        .subcommand(
            Command::new("checkout")
                .about("Pay for a course")
                .arg(Arg::new("course").help("Course id").required(true))
                .arg(
                    Arg::new("payment-method")
                        .long("payment-method")
                        .help("Processor payment method id, e.g. pm_card_visa")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("payment-return")
                .about("Finish a checkout after the processor redirected back")
                .arg(
                    Arg::new("url")
                        .help("Return URL, or just its query string")
                        .required(true),
                ),
        )
}

#[cfg(test)]
mod tests {
    use crate::cli::commands::new;

    #[test]
    fn test_checkout_requires_payment_method() {
        let result = new().try_get_matches_from(["coursehub", "checkout", "c1"]);
        assert!(result.is_err());

        let matches = new().get_matches_from([
            "coursehub",
            "checkout",
            "c1",
            "--payment-method",
            "pm_card_visa",
        ]);
        let Some(("checkout", sub)) = matches.subcommand() else {
            panic!("expected checkout");
        };
        assert_eq!(
            sub.get_one::<String>("payment-method").map(String::as_str),
            Some("pm_card_visa")
        );
    }
}
