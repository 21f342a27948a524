use super::account::confirm_arg;
use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    command
        .subcommand(
            Command::new("users")
                .about("List users (admin)")
                .arg(
                    Arg::new("search")
                        .long("search")
                        .short('s')
                        .help("Filter by name or email"),
                ),
        )
        .subcommand(
            Command::new("promote")
                .about("Grant the admin role (admin)")
                .arg(Arg::new("email").help("User email").required(true)),
        )
        .subcommand(
            Command::new("demote")
                .about("Revoke the admin role (admin)")
                .arg(Arg::new("email").help("User email").required(true)),
        )
        .subcommand(
            Command::new("delete-user")
                .about("Delete a user account (admin)")
                .arg(Arg::new("user").help("User id").required(true))
                .arg(confirm_arg()),
        )
}
