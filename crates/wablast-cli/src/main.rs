//! wablast CLI - bulk WhatsApp messaging through a persistent browser session
//!
//! Usage:
//!   wablast send --contacts contacts.csv --message "Hi {name}"
//!   wablast send --contacts contacts.csv --template promo --media offer.jpg
//!   wablast contacts validate contacts.csv
//!   wablast templates list
//!   wablast init

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use clap::{Parser, Subcommand};
use futures::{pin_mut, StreamExt};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wablast_core::config::AppConfig;
use wablast_core::templates::TemplateStore;
use wablast_core::{contacts, export};
use wablast_pipeline::{BulkDriver, RunRequest, WhatsAppProvider};

#[derive(Parser)]
#[command(name = "wablast")]
#[command(author, version, about = "Bulk WhatsApp messaging through a persistent browser session")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ~/.wablast/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to every contact in a file
    Send {
        /// Contact file: .csv with name,phone headers, or .txt with
        /// "name - phone" lines
        #[arg(short, long, value_name = "FILE")]
        contacts: PathBuf,

        /// Message body; {name} is replaced with each contact's name
        #[arg(short, long, conflicts_with = "template")]
        message: Option<String>,

        /// Use a named template from the template store instead
        #[arg(short, long)]
        template: Option<String>,

        /// Media file to attach; the message becomes its caption
        #[arg(long, value_name = "FILE")]
        media: Option<PathBuf>,

        /// Defer the run until this local time (YYYY-MM-DD HH:MM)
        #[arg(long, value_name = "WHEN")]
        schedule: Option<String>,

        /// Run with a visible browser window (needed on first run to scan
        /// the QR code)
        #[arg(long)]
        headed: bool,

        /// Write contacts that failed to a CSV in the failed-contacts dir
        #[arg(long)]
        export_failed: bool,
    },

    /// Contact file operations
    Contacts {
        #[command(subcommand)]
        action: ContactCommands,
    },

    /// Template store operations
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },

    /// Write a default config file
    Init,
}

#[derive(Subcommand)]
enum ContactCommands {
    /// Parse a contact file and show what a run would deliver to
    Validate {
        /// Contact file to check
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List stored template names
    List,

    /// Print a template body
    Show { name: String },

    /// Create or overwrite a template
    Save {
        name: String,

        /// Template body; {name} is the per-contact placeholder
        #[arg(long)]
        body: String,
    },

    /// Remove a template
    Delete { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    let _guard = init_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Send {
            contacts,
            message,
            template,
            media,
            schedule,
            headed,
            export_failed,
        } => {
            cmd_send(
                config,
                contacts,
                message,
                template,
                media,
                schedule,
                headed,
                export_failed,
            )
            .await
        }
        Commands::Contacts { action } => match action {
            ContactCommands::Validate { file } => cmd_validate(&file),
        },
        Commands::Templates { action } => cmd_templates(&config, action),
        Commands::Init => cmd_init(cli.config.as_deref()),
    }
}

/// Console output plus a daily log file under the configured logs dir
fn init_logging(
    config: &AppConfig,
    verbose: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(&config.logs_dir)
        .with_context(|| format!("cannot create log dir {}", config.logs_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&config.logs_dir, "send.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let console = tracing_subscriber::fmt::layer().with_target(false);
    let file = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}

#[allow(clippy::too_many_arguments)]
async fn cmd_send(
    config: AppConfig,
    contact_file: PathBuf,
    message: Option<String>,
    template: Option<String>,
    media: Option<PathBuf>,
    schedule: Option<String>,
    headed: bool,
    export_failed: bool,
) -> Result<()> {
    let body = match (message, template) {
        (Some(body), _) => body,
        (None, Some(name)) => TemplateStore::new(&config.templates_dir).load(&name)?,
        (None, None) => bail!("provide --message or --template"),
    };

    if let Some(path) = &media {
        if !path.exists() {
            bail!("media file not found: {}", path.display());
        }
    }

    let scheduled_at = schedule.as_deref().map(parse_schedule).transpose()?;

    let contacts = contacts::load_contacts(&contact_file)?;
    info!(
        "Loaded {} valid contacts from {}",
        contacts.len(),
        contact_file.display()
    );
    let had_contacts = !contacts.is_empty();

    let driver = BulkDriver::new(WhatsAppProvider::new(config.clone()), config.clone());

    // Ctrl-C finishes the in-flight contact, then closes the session.
    let cancel = driver.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received; finishing the current contact then stopping");
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let stream = driver.run(RunRequest {
        contacts,
        template: body,
        media,
        scheduled_at,
        headless: !headed,
    });
    pin_mut!(stream);

    let mut seen_failures = 0usize;
    let mut last = None;
    while let Some(snapshot) = stream.next().await {
        if snapshot.failed.len() > seen_failures {
            seen_failures = snapshot.failed.len();
            if let Some(contact) = snapshot.failed.last() {
                println!("Failed: {}", contact);
            }
        }
        println!(
            "Progress: {}/{} delivered, {} failed",
            snapshot.success_count,
            snapshot.total_count,
            snapshot.failed.len()
        );
        last = Some(snapshot);
    }

    let Some(final_snapshot) = last else {
        println!("Run cancelled before the first contact.");
        return Ok(());
    };

    // The abort sentinel is the only snapshot with neither a success nor a
    // failure on record.
    if final_snapshot.success_count == 0 && final_snapshot.failed.is_empty() {
        if had_contacts {
            bail!("session could not be established; see the log for details");
        }
        bail!("contact file contained no valid contacts");
    }

    println!(
        "Done: {}/{} delivered, {} failed.",
        final_snapshot.success_count,
        final_snapshot.total_count,
        final_snapshot.failed.len()
    );

    if export_failed && !final_snapshot.failed.is_empty() {
        let path = export::export_failed(&final_snapshot.failed, &config.failed_dir, None)?;
        println!("Failed contacts written to {}", path.display());
    }

    Ok(())
}

fn cmd_validate(file: &std::path::Path) -> Result<()> {
    let contacts = contacts::load_contacts(file)?;
    println!("{} valid contacts:", contacts.len());
    for contact in &contacts {
        println!("  {}", contact);
    }
    Ok(())
}

fn cmd_templates(config: &AppConfig, action: TemplateCommands) -> Result<()> {
    let store = TemplateStore::new(&config.templates_dir);
    match action {
        TemplateCommands::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No templates stored in {}", config.templates_dir.display());
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }
        TemplateCommands::Show { name } => {
            println!("{}", store.load(&name)?);
        }
        TemplateCommands::Save { name, body } => {
            let path = store.save(&name, &body)?;
            println!("Saved template '{}' to {}", name, path.display());
        }
        TemplateCommands::Delete { name } => {
            store.delete(&name)?;
            println!("Deleted template '{}'", name);
        }
    }
    Ok(())
}

fn cmd_init(path: Option<&std::path::Path>) -> Result<()> {
    let written = AppConfig::write_default(path)?;
    println!("Wrote default config to {}", written.display());
    Ok(())
}

/// Parse a "YYYY-MM-DD HH:MM" schedule string as local time
fn parse_schedule(raw: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .context("schedule must be YYYY-MM-DD HH:MM")?;
    Local
        .from_local_datetime(&naive)
        .single()
        .context("schedule falls in an ambiguous local time")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_parses_the_documented_format() {
        let at = parse_schedule("2026-08-05 14:30").unwrap();
        assert_eq!(at.format("%Y-%m-%d %H:%M").to_string(), "2026-08-05 14:30");
    }

    #[test]
    fn malformed_schedule_is_rejected() {
        assert!(parse_schedule("tomorrow").is_err());
        assert!(parse_schedule("2026-08-05").is_err());
        assert!(parse_schedule("14:30 2026-08-05").is_err());
    }

    #[test]
    fn cli_parses_a_send_invocation() {
        let cli = Cli::try_parse_from([
            "wablast",
            "send",
            "--contacts",
            "contacts.csv",
            "--message",
            "Hi {name}",
            "--schedule",
            "2026-08-05 14:30",
        ])
        .unwrap();

        match cli.command {
            Commands::Send {
                contacts,
                message,
                schedule,
                headed,
                ..
            } => {
                assert_eq!(contacts, PathBuf::from("contacts.csv"));
                assert_eq!(message.as_deref(), Some("Hi {name}"));
                assert_eq!(schedule.as_deref(), Some("2026-08-05 14:30"));
                assert!(!headed);
            }
            _ => panic!("expected send command"),
        }
    }

    #[test]
    fn message_and_template_conflict() {
        assert!(Cli::try_parse_from([
            "wablast", "send", "--contacts", "c.csv", "--message", "hi", "--template", "promo",
        ])
        .is_err());
    }
}
