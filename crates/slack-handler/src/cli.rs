//! Command-line interface.
//!
//! The handler's own flags come from [`OPTIONS`]; only process-level switches
//! are declared with the derive API.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, Parser};

use crate::config::{ConfigOption, FlagValues, OptionKind, OPTIONS};

/// Sensu handler that posts check results to a Slack channel.
#[derive(Debug, Parser)]
#[command(name = "sensu-slack-handler")]
#[command(about = "The Sensu Go Slack handler for notifying a channel")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parsed command line.
#[derive(Debug)]
pub struct Invocation {
    pub cli: Cli,
    pub flags: FlagValues,
}

/// Full command, with one flag per configuration option.
pub fn command() -> Command {
    Cli::command().args(OPTIONS.iter().map(option_arg))
}

/// Parse `args` (including the binary name).
pub fn parse_from<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    invocation(&matches)
}

/// Parse the process arguments, exiting with usage on error.
pub fn parse() -> Invocation {
    let matches = command().get_matches();
    invocation(&matches).unwrap_or_else(|e| e.exit())
}

impl Cli {
    /// Tracing filter directives. A non-empty `RUST_LOG` wins over `--verbose`.
    #[must_use]
    pub fn log_directives(&self, rust_log: Option<String>) -> String {
        match rust_log {
            Some(directives) if !directives.trim().is_empty() => directives,
            _ if self.verbose => "slack_handler=debug,info".to_string(),
            _ => "slack_handler=info,warn".to_string(),
        }
    }
}

fn invocation(matches: &ArgMatches) -> Result<Invocation, clap::Error> {
    let cli = Cli::from_arg_matches(matches)?;
    Ok(Invocation {
        cli,
        flags: explicit_flags(matches),
    })
}

/// Values typed on the command line. Defaults are left to the resolver so
/// that environment variables and annotations can still apply.
fn explicit_flags(matches: &ArgMatches) -> FlagValues {
    let mut flags = FlagValues::new();
    for opt in OPTIONS {
        if matches.value_source(opt.path) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(value) = matches.get_one::<String>(opt.path) {
            flags.insert(opt.path, value.clone());
        }
    }
    flags
}

fn option_arg(opt: &'static ConfigOption) -> Arg {
    let help = format!("{} [env: {}]", opt.usage, opt.env);
    let arg = Arg::new(opt.path)
        .long(opt.path)
        .short(opt.short)
        .help(help)
        .action(ArgAction::Set);

    match opt.kind {
        OptionKind::Bool => arg
            .value_name("BOOL")
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true"),
        OptionKind::Seconds => arg.value_name("SECONDS"),
        OptionKind::Text => arg.value_name("VALUE"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CHANNEL, INCLUDE_ENTITY_LABELS, REDACT, TIMEOUT, WEBHOOK_URL};

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn test_only_explicit_flags_are_collected() {
        let inv = parse_from(["sensu-slack-handler", "--channel", "#ops", "-w", "http://hook"])
            .unwrap();
        assert_eq!(inv.flags.get(CHANNEL), Some("#ops"));
        assert_eq!(inv.flags.get(WEBHOOK_URL), Some("http://hook"));
        assert_eq!(inv.flags.get(TIMEOUT), None);
        assert!(!inv.cli.verbose);
    }

    #[test]
    fn test_bool_flags_bare_or_with_value() {
        let inv = parse_from([
            "sensu-slack-handler",
            "--redact",
            "--include-entity-labels=false",
            "-v",
        ])
        .unwrap();
        assert_eq!(inv.flags.get(REDACT), Some("true"));
        assert_eq!(inv.flags.get(INCLUDE_ENTITY_LABELS), Some("false"));
        assert!(inv.cli.verbose);
    }

    #[test]
    fn test_rust_log_wins_over_verbose() {
        let quiet = Cli { verbose: false };
        let verbose = Cli { verbose: true };

        assert_eq!(quiet.log_directives(None), "slack_handler=info,warn");
        assert_eq!(verbose.log_directives(None), "slack_handler=debug,info");
        assert_eq!(verbose.log_directives(Some(String::new())), "slack_handler=debug,info");
        assert_eq!(verbose.log_directives(Some("warn".to_string())), "warn");
        assert_eq!(
            quiet.log_directives(Some("slack_handler=trace".to_string())),
            "slack_handler=trace"
        );
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(parse_from(["sensu-slack-handler", "--nope"]).is_err());
    }
}
