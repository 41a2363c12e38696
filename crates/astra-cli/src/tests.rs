use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["astra"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_partition_command() {
    let cli = Cli::try_parse_from(["astra", "partition"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Partition)));
}

#[test]
fn parses_month_argument() {
    let cli = Cli::try_parse_from(["astra", "map", "2024-03"]).expect("expected valid cli args");
    let expected: Month = "2024-03".parse().unwrap();
    assert!(matches!(cli.command, Some(Commands::Map { month }) if month == expected));
}

#[test]
fn parses_kebab_case_verify_commands() {
    let cli = Cli::try_parse_from(["astra", "verify-translation", "2024-11"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::VerifyTranslation { .. })
    ));

    let cli = Cli::try_parse_from(["astra", "verify-final", "2024-11"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::VerifyFinal { .. })));

    let cli = Cli::try_parse_from(["astra", "red-flags", "2024-11"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::RedFlags { .. })));
}

#[test]
fn rejects_malformed_month() {
    assert!(Cli::try_parse_from(["astra", "aggregate", "2024-3"]).is_err());
    assert!(Cli::try_parse_from(["astra", "aggregate", "2024-13"]).is_err());
    assert!(Cli::try_parse_from(["astra", "aggregate"]).is_err());
}

#[test]
fn run_defaults_to_no_reports() {
    let cli = Cli::try_parse_from(["astra", "run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Run {
            generate_reports: false
        })
    ));
}

#[test]
fn run_with_reports_flag() {
    let cli = Cli::try_parse_from(["astra", "run", "--generate-reports"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Run {
            generate_reports: true
        })
    ));
}
