//! `esdraft` command-line host.
//!
//! # Responsibility
//! - Resolve configuration, start logging, open the drafts database.
//! - Act as the presentation surface: read raw text and action triggers,
//!   ask for delete confirmation, print the rendered list.

mod commands;
mod prompt;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use esdraft_core::db::open_db;
use esdraft_core::{
    init_logging, AppConfig, ConfigOverrides, DraftId, DraftService, DraftStore, QuestionAnswer,
    SqliteSlotRepository,
};
use log::info;
use prompt::{stdin_is_attended, ScriptedPrompt, TerminalPrompt};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "esdraft", version, about = "Draft, edit and keep motivation letters")]
struct Cli {
    /// SQLite database file (env: ESDRAFT_DB_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Directory for rolling log files (env: ESDRAFT_LOG_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (env: ESDRAFT_LOG_LEVEL).
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show every saved draft, newest first.
    List,
    /// Save a new draft.
    Create(CreateArgs),
    /// Change an existing draft.
    Edit(EditArgs),
    /// Delete a draft after confirmation.
    Delete(DeleteArgs),
    /// Interactive editing session.
    Session,
}

#[derive(Debug, clap::Args)]
pub(crate) struct CreateArgs {
    #[arg(long)]
    pub company: String,
    #[arg(long)]
    pub text: String,
    /// Supplementary question and answer as `QUESTION::ANSWER`; repeatable.
    #[arg(long = "qa", value_name = "QUESTION::ANSWER", value_parser = parse_question_answer)]
    pub questions: Vec<QuestionAnswer>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct EditArgs {
    pub id: DraftId,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub text: Option<String>,
    /// Drop existing question sections before appending `--qa` values.
    #[arg(long)]
    pub clear_questions: bool,
    /// Question section to append as `QUESTION::ANSWER`; repeatable.
    #[arg(long = "qa", value_name = "QUESTION::ANSWER", value_parser = parse_question_answer)]
    pub questions: Vec<QuestionAnswer>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct DeleteArgs {
    pub id: DraftId,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            db_path: self.db.clone(),
            log_dir: self.log_dir.clone(),
            log_level: self.log_level.clone(),
            storage_key: None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::resolve(cli.overrides()).context("invalid configuration")?;
    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("cannot open drafts database `{}`", config.db_path.display()))?;
    let store = DraftStore::with_key(
        SqliteSlotRepository::new(&mut conn),
        config.storage_key.as_str(),
    );
    let mut service = DraftService::new(store);
    info!(
        "event=cli_start module=cli status=ok command={}",
        command_label(&cli.command)
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::List => commands::list(&service, &mut out),
        Command::Create(args) => commands::create(&mut service, args, &mut out),
        Command::Edit(args) => commands::edit(&mut service, args, &mut out),
        Command::Delete(args) if stdin_is_attended() => {
            commands::delete(&mut service, args, &mut TerminalPrompt::new(), &mut out)
        }
        Command::Delete(args) => {
            let mut prompt = ScriptedPrompt::new(io::stdin().lock());
            commands::delete(&mut service, args, &mut prompt, &mut out)
        }
        Command::Session if stdin_is_attended() => {
            session::run_session(&mut service, &mut TerminalPrompt::new(), &mut out)
        }
        Command::Session => {
            let mut prompt = ScriptedPrompt::new(io::stdin().lock());
            session::run_session(&mut service, &mut prompt, &mut out)
        }
    }
}

fn command_label(command: &Command) -> &'static str {
    match command {
        Command::List => "list",
        Command::Create(_) => "create",
        Command::Edit(_) => "edit",
        Command::Delete(_) => "delete",
        Command::Session => "session",
    }
}

/// Parses `QUESTION::ANSWER`; the answer may itself contain `::`.
fn parse_question_answer(raw: &str) -> Result<QuestionAnswer, String> {
    match raw.split_once("::") {
        Some((question, answer)) => Ok(QuestionAnswer::new(question, answer)),
        None => Err(format!("expected QUESTION::ANSWER, got `{raw}`")),
    }
}
