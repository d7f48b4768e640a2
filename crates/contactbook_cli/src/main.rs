//! Terminal front end for the contact book.
//!
//! # Responsibility
//! - Drive the list controller and edit sessions from one-shot commands.
//! - Stand in for the list/detail pages: dialogs go to stdin/stderr.

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use contactbook_core::{
    init_logging, Alert, AppConfig, CommitOutcome, ConfirmRequest, ContactListController,
    ContactRecord, DeleteOutcome, EditSession, Prompter, SqliteContactStore,
};
use log::warn;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "contactbook", version, about = "Manage a local contact book")]
struct Cli {
    /// SQLite database file (overrides CONTACTBOOK_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for rotating log files (overrides CONTACTBOOK_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides CONTACTBOOK_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every contact.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create a contact.
    Add {
        #[arg(long, default_value = "")]
        first: String,
        #[arg(long, default_value = "")]
        last: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        blocked: bool,
    },
    /// Change fields of an existing contact.
    Edit {
        id: i64,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        blocked: Option<bool>,
    },
    /// Delete a contact after confirmation.
    Delete {
        id: i64,
        /// Answer the confirmation with yes.
        #[arg(long)]
        yes: bool,
    },
}

/// Field values supplied on the command line; `None` keeps the current value.
#[derive(Debug, Default)]
struct FieldEdits {
    first: Option<String>,
    last: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    blocked: Option<bool>,
}

struct TerminalPrompter {
    assume_yes: bool,
}

#[async_trait(?Send)]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!(
            "{}: {} [{}/{}] ",
            request.title, request.message, request.affirmative, request.negative
        );
        let _ = std::io::stderr().flush();
        match tokio::task::spawn_blocking(read_answer).await {
            Ok(Some(answer)) => is_affirmative(&answer, request),
            Ok(None) => false,
            Err(err) => {
                warn!("event=cli_confirm module=cli status=error error={err}");
                false
            }
        }
    }

    async fn alert(&self, alert: &Alert) {
        eprintln!("{}: {} ({})", alert.title, alert.message, alert.dismiss);
    }
}

fn read_answer() -> Option<String> {
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer).ok()?;
    Some(answer)
}

fn is_affirmative(answer: &str, request: &ConfirmRequest) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case(&request.affirmative) || answer.eq_ignore_ascii_case("y")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, String> {
    let config = resolve_config(&cli);
    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let store = SqliteContactStore::open(&config.db_path)
        .map_err(|err| format!("cannot open `{}`: {err}", config.db_path.display()))?;
    let assume_yes = matches!(cli.command, Command::Delete { yes: true, .. });
    let mut list = ContactListController::new(
        Arc::new(store),
        Rc::new(TerminalPrompter { assume_yes }),
    );
    list.activate()
        .await
        .map_err(|err| format!("load failed: {err}"))?;

    match cli.command {
        Command::List { json } => print_list(&list, json),
        Command::Add {
            first,
            last,
            phone,
            email,
            blocked,
        } => {
            let session = list.begin_add();
            let edits = FieldEdits {
                first: Some(first),
                last: Some(last),
                phone,
                email,
                blocked: Some(blocked),
            };
            commit_edits(session, edits).await
        }
        Command::Edit {
            id,
            first,
            last,
            phone,
            email,
            blocked,
        } => {
            let row = list
                .find_by_id(id)
                .ok_or_else(|| format!("contact {id} not found"))?;
            let session = list
                .select(Some(&row))
                .ok_or_else(|| format!("contact {id} could not be opened"))?;
            let edits = FieldEdits {
                first,
                last,
                phone,
                email,
                blocked,
            };
            commit_edits(session, edits).await
        }
        Command::Delete { id, .. } => {
            let row = list
                .find_by_id(id)
                .ok_or_else(|| format!("contact {id} not found"))?;
            match list
                .on_delete_requested(&row)
                .await
                .map_err(|err| format!("delete failed: {err}"))?
            {
                DeleteOutcome::Declined => {
                    println!("Kept contact {id}.");
                }
                DeleteOutcome::Deleted { .. } => {
                    println!("Deleted contact {id}.");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config
}

async fn commit_edits(mut session: EditSession, edits: FieldEdits) -> Result<ExitCode, String> {
    {
        let working = session.edit().map_err(|err| err.to_string())?;
        if let Some(first) = edits.first {
            working.set_first_name(first);
        }
        if let Some(last) = edits.last {
            working.set_last_name(last);
        }
        if let Some(phone) = edits.phone {
            working.set_phone(phone);
        }
        if let Some(email) = edits.email {
            working.set_email(email);
        }
        if let Some(blocked) = edits.blocked {
            working.set_blocked(blocked);
        }
    }

    match session
        .commit()
        .await
        .map_err(|err| format!("save failed: {err}"))?
    {
        CommitOutcome::Committed { id, mode } => {
            println!("Saved contact {id} ({}).", mode.as_str());
            Ok(ExitCode::SUCCESS)
        }
        CommitOutcome::NeedsCorrection(reason) => {
            warn!(
                "event=cli_commit module=cli status=rejected reason={}",
                reason.code()
            );
            session.cancel();
            Ok(ExitCode::from(2))
        }
    }
}

fn print_list(list: &ContactListController, json: bool) -> Result<ExitCode, String> {
    let records = list
        .contacts()
        .iter()
        .map(|row| row.borrow().to_record())
        .collect::<Vec<ContactRecord>>();

    if json {
        let rendered = serde_json::to_string_pretty(&records).map_err(|err| err.to_string())?;
        println!("{rendered}");
        return Ok(ExitCode::SUCCESS);
    }

    if records.is_empty() {
        println!("No contacts.");
    }
    for record in &records {
        let blocked = if record.is_blocked { "  [blocked]" } else { "" };
        println!(
            "{:>4}  {} {}  {}  {}{}",
            record.id, record.first_name, record.last_name, record.phone, record.email, blocked
        );
    }
    Ok(ExitCode::SUCCESS)
}
