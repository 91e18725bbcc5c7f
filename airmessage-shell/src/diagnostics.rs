//! Command Line and Logging
//!
//! Command-line interface, logging setup and the diagnostic subcommands of
//! the AirMessage shell.

use airmessage_core::{hash_string, AppContext};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// AirMessage shell command-line interface
#[derive(Parser, Debug)]
#[command(name = "airmessage-shell")]
#[command(about = "Host shell for the AirMessage client core", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short, long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable JSON structured logging
    #[arg(long)]
    pub json_logs: bool,

    /// Show timestamps in logs (`--timestamps false` to hide them)
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub timestamps: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Diagnostic subcommand
    #[command(subcommand)]
    pub command: Option<DiagnosticCommand>,
}

/// Diagnostic commands for troubleshooting
#[derive(Subcommand, Debug)]
pub enum DiagnosticCommand {
    /// Show version information
    Version,

    /// Show current configuration
    DumpConfig,

    /// Show the device details attached to feedback e-mails
    EmailDetails,

    /// Look up a contact by address or name
    FindContact {
        /// Address or part of a name
        query: String,
    },

    /// Print the hash code of a string
    Hash {
        /// Input string
        input: String,
    },
}

/// Initialize logging based on CLI configuration
///
/// Logs go to stderr so diagnostic output on stdout stays machine-readable.
pub fn init_logging(cli: &Cli) -> Result<()> {
    let subscriber = build_subscriber(cli, std::io::stderr)?;
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    info!(
        "Logging initialized: level={}, json={}, timestamps={}",
        cli.log_level, cli.json_logs, cli.timestamps
    );

    Ok(())
}

/// Build the log subscriber selected by the CLI flags, writing to `writer`
pub fn build_subscriber<W>(cli: &Cli, writer: W) -> Result<Box<dyn Subscriber + Send + Sync>>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let log_level = cli.log_level.parse::<Level>().with_context(|| {
        format!(
            "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
            cli.log_level
        )
    })?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.as_str()))
        .context("Failed to create log filter")?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(writer);

    Ok(match (cli.json_logs, cli.timestamps) {
        (true, true) => Box::new(builder.json().finish()),
        (true, false) => Box::new(builder.without_time().json().finish()),
        (false, true) => Box::new(builder.finish()),
        (false, false) => Box::new(builder.without_time().finish()),
    })
}

/// Run a diagnostic command against the loaded configuration
pub async fn handle_diagnostic_command(command: &DiagnosticCommand, config: &Config) -> Result<()> {
    match command {
        DiagnosticCommand::Version => {
            println!("airmessage-shell {}", env!("CARGO_PKG_VERSION"));
        }
        DiagnosticCommand::DumpConfig => {
            let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{}", contents);
        }
        DiagnosticCommand::EmailDetails => {
            let context = AppContext::init(&config.context_config());
            let details = context.platform().extra_email_details().await;
            if details.is_empty() {
                println!(
                    "No extra details on the {} platform",
                    context.platform().kind()
                );
            }
            for (key, value) in &details {
                println!("{}: {}", key, value);
            }
            context.shutdown();
        }
        DiagnosticCommand::FindContact { query } => {
            let context = AppContext::init(&config.context_config());
            match context.contacts().find_contact(query).await {
                Some(contact) => {
                    let json = serde_json::to_string_pretty(&contact)
                        .context("Failed to serialize contact")?;
                    println!("{}", json);
                }
                None => println!("No contact matches '{}'", query),
            }
            context.shutdown();
        }
        DiagnosticCommand::Hash { input } => {
            println!("{}", hash_string(input));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airmessage_core::ContactsConfig;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["airmessage-shell"]);
        assert_eq!(cli.log_level, "info");
        assert!(!cli.json_logs);
        assert!(cli.timestamps);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_timestamps_can_be_disabled() {
        let cli = Cli::try_parse_from(["airmessage-shell", "--timestamps=false"]).unwrap();
        assert!(!cli.timestamps);

        let cli = Cli::try_parse_from(["airmessage-shell", "--timestamps", "true"]).unwrap();
        assert!(cli.timestamps);
    }

    #[tokio::test]
    async fn test_find_contact_logs_unreadable_source() {
        let cli = Cli::parse_from([
            "airmessage-shell",
            "--log-level",
            "warn",
            "--timestamps=false",
        ]);
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = build_subscriber(&cli, move || sink.clone()).unwrap();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = Config {
            contacts: ContactsConfig {
                source: Some(PathBuf::from("/nonexistent/contacts.json")),
            },
            ..Config::default()
        };
        let command = DiagnosticCommand::FindContact {
            query: "ada".to_string(),
        };
        handle_diagnostic_command(&command, &config).await.unwrap();

        assert!(logs.contents().contains("Failed to load contacts"));
    }

    #[test]
    fn test_parse_subcommand() {
        let cli = Cli::parse_from(["airmessage-shell", "--json-logs", "find-contact", "ada"]);
        assert!(cli.json_logs);
        assert!(matches!(
            cli.command,
            Some(DiagnosticCommand::FindContact { ref query }) if query == "ada"
        ));
    }
}
