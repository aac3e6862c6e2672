use crate::cli::{Commands, EmployeeCommand, TransactionCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Dash { json, .. }
        | Commands::Compare { json, .. }
        | Commands::Fee { json, .. }
        | Commands::Import { json, .. } => *json,
        Commands::Transaction { command } => match command {
            TransactionCommand::Add { json, .. }
            | TransactionCommand::List { json, .. }
            | TransactionCommand::Update { json, .. }
            | TransactionCommand::Delete { json, .. } => *json,
        },
        Commands::Employee { command } => match command {
            EmployeeCommand::Add { json, .. }
            | EmployeeCommand::List { json }
            | EmployeeCommand::Update { json, .. }
            | EmployeeCommand::Delete { json, .. } => *json,
        },
    };
    OutputMode::from_flag(json)
}

#[cfg(test)]
mod tests {
    use super::{OutputMode, mode_for_command};
    use crate::cli::parse_from;

    #[test]
    fn json_flag_selects_json_for_every_command_family() {
        let cases: [&[&str]; 5] = [
            &["motopecas", "dash", "--json"],
            &["motopecas", "fee", "100", "--rate", "2", "--json"],
            &["motopecas", "transaction", "list", "--json"],
            &["motopecas", "employee", "delete", "emp_1", "--json"],
            &["motopecas", "import", "--dry-run", "rows.csv", "--json"],
        ];

        for args in cases {
            let parsed = parse_from(args);
            assert!(parsed.is_ok(), "failed to parse: {args:?}");
            if let Ok(cli) = parsed {
                assert_eq!(mode_for_command(&cli.command), OutputMode::Json);
            }
        }
    }

    #[test]
    fn mode_defaults_to_text() {
        let compare = parse_from(["motopecas", "compare"]);
        assert!(compare.is_ok());
        if let Ok(cli) = compare {
            assert_eq!(mode_for_command(&cli.command), OutputMode::Text);
        }

        let update = parse_from(["motopecas", "transaction", "update", "txn_1", "--amount", "5"]);
        assert!(update.is_ok());
        if let Ok(cli) = update {
            assert_eq!(mode_for_command(&cli.command), OutputMode::Text);
        }
    }
}
