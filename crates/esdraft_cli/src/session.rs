//! Interactive session: the host that owns one `FormState`.
//!
//! Positions typed by the user are 1-based; they are translated to 0-based
//! section indices here and nowhere else.

use crate::commands::{delete_question, print_snapshot, report_delete, submit_form};
use crate::prompt::Prompt;
use anyhow::Result;
use esdraft_core::{
    logging_status, render_drafts, DraftEntryView, DraftId, DraftRecord, DraftService,
    DraftServiceError, EditingSession, EntryTrigger, FormState, RepoError, SlotRepository,
    TriggerOutcome,
};
use std::io::Write;

const HELP: &str = "\
Commands:
  new                 discard the form and start a new draft
  company <name>      set the company name
  text                enter the motivation text (end with a line containing only '.')
  add-q               append an empty question section
  rm-q <n>            remove question section n
  q <n> <text>        set the question of section n
  a <n> [text]        set the answer of section n (multi-line when text is omitted)
  edit <id>           load a saved draft into the form
  save                validate and save the form
  delete <id>         delete a saved draft (asks first)
  list                show saved drafts
  status              show the form and the logging state
  help                show this help
  quit                leave the session
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    New,
    Company(String),
    Text,
    AddQuestion,
    RemoveQuestion(usize),
    Question(usize, String),
    Answer(usize, Option<String>),
    Edit(DraftId),
    Save,
    Delete(DraftId),
    List,
    Status,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "new" => SessionCommand::New,
        "company" => SessionCommand::Company(rest.to_string()),
        "text" => SessionCommand::Text,
        "add-q" => SessionCommand::AddQuestion,
        "rm-q" => SessionCommand::RemoveQuestion(parse_position(rest)?),
        "q" => {
            let (position, text) = split_position(rest)?;
            SessionCommand::Question(position, text.unwrap_or_default())
        }
        "a" => {
            let (position, text) = split_position(rest)?;
            SessionCommand::Answer(position, text)
        }
        "edit" => SessionCommand::Edit(parse_id(rest)?),
        "save" => SessionCommand::Save,
        "delete" => SessionCommand::Delete(parse_id(rest)?),
        "list" => SessionCommand::List,
        "status" => SessionCommand::Status,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

/// Runs until `quit` or end of input. Failed actions are reported and the
/// session continues.
pub fn run_session<S: SlotRepository, P: Prompt, W: Write>(
    service: &mut DraftService<S>,
    prompt: &mut P,
    out: &mut W,
) -> Result<()> {
    let mut form = FormState::new();
    writeln!(out, "esdraft session. Type `help` for commands.")?;
    print_snapshot(&service.list()?, out)?;

    loop {
        let Some(line) = prompt.line(out, &format!("{}>", mode_label(&form)))? else {
            writeln!(out)?;
            return Ok(());
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };
        if command == SessionCommand::Quit {
            return Ok(());
        }
        if let Err(err) = apply(service, &mut form, command, prompt, out) {
            if let Some(service_err) = err.downcast_ref::<DraftServiceError>() {
                writeln!(out, "{}", describe(service_err))?;
            } else if let Some(repo_err) = err.downcast_ref::<RepoError>() {
                writeln!(out, "storage error: {repo_err}")?;
            } else {
                return Err(err);
            }
        }
    }
}

fn apply<S: SlotRepository, P: Prompt, W: Write>(
    service: &mut DraftService<S>,
    form: &mut FormState,
    command: SessionCommand,
    prompt: &mut P,
    out: &mut W,
) -> Result<()> {
    match command {
        SessionCommand::New => {
            service.start_create(form);
            writeln!(out, "Form cleared.")?;
        }
        SessionCommand::Company(name) => {
            let count = form.set_company_name(name);
            writeln!(out, "company {count}")?;
        }
        SessionCommand::Text => {
            writeln!(out, "Enter the motivation text; finish with '.' on its own line.")?;
            let count = form.set_motivation_text(prompt.block(out)?);
            writeln!(out, "motivation text {count}")?;
        }
        SessionCommand::AddQuestion => {
            let index = form.add_question_section();
            writeln!(out, "Added question section {}.", index + 1)?;
        }
        SessionCommand::RemoveQuestion(position) => {
            form.remove_question_section(position - 1)
                .map_err(DraftServiceError::from)?;
            writeln!(out, "Removed question section {position}.")?;
        }
        SessionCommand::Question(position, text) => {
            form.set_question(position - 1, text)
                .map_err(DraftServiceError::from)?;
        }
        SessionCommand::Answer(position, text) => {
            let text = match text {
                Some(text) => text,
                None => {
                    writeln!(out, "Enter the answer; finish with '.' on its own line.")?;
                    prompt.block(out)?
                }
            };
            let count = form
                .set_answer(position - 1, text)
                .map_err(DraftServiceError::from)?;
            writeln!(out, "answer {position} {count}")?;
        }
        SessionCommand::Edit(id) => {
            let trigger = entry_trigger(service, id, DraftEntryView::select_trigger)?
                .ok_or(DraftServiceError::NotFound(id))?;
            let mut never_asked = |_: &DraftRecord| false;
            service.handle_trigger(form, trigger, &mut never_asked)?;
            writeln!(out, "Editing draft {id}.")?;
            print_status(form, out)?;
        }
        SessionCommand::Save => {
            submit_form(service, form, out)?;
            print_snapshot(&service.list()?, out)?;
        }
        SessionCommand::Delete(id) => {
            let mut confirm =
                |record: &DraftRecord| prompt.confirm(out, &delete_question(record));
            let outcome = match entry_trigger(service, id, DraftEntryView::delete_trigger)? {
                Some(trigger) => service.handle_trigger(form, trigger, &mut confirm)?,
                // Not listed: the service reports it and releases the form if bound.
                None => TriggerOutcome::Delete(service.delete_record(form, id, &mut confirm)?),
            };
            if let TriggerOutcome::Delete(outcome) = outcome {
                report_delete(&outcome, out)?;
            }
            print_snapshot(&service.list()?, out)?;
        }
        SessionCommand::List => print_snapshot(&service.list()?, out)?,
        SessionCommand::Status => {
            print_status(form, out)?;
            match logging_status() {
                Some((level, dir)) => writeln!(out, "logging: {level} in {}", dir.display())?,
                None => writeln!(out, "logging: off")?,
            }
        }
        SessionCommand::Help => write!(out, "{HELP}")?,
        SessionCommand::Quit => {}
    }
    Ok(())
}

/// Looks the id up in the rendered list, the way a click on an entry would.
fn entry_trigger<S: SlotRepository>(
    service: &DraftService<S>,
    id: DraftId,
    pick: fn(&DraftEntryView) -> EntryTrigger,
) -> Result<Option<EntryTrigger>> {
    let view = render_drafts(&service.list()?.records);
    Ok(view.entries().iter().find(|entry| entry.id == id).map(pick))
}

fn print_status<W: Write>(form: &FormState, out: &mut W) -> Result<()> {
    writeln!(out, "mode: {}", mode_label(form))?;
    writeln!(out, "company: {}", form.company_name)?;
    writeln!(out, "motivation text: {}", form.motivation_count())?;
    for (index, section) in form.questions().iter().enumerate() {
        writeln!(
            out,
            "  Q{}. {} (answer {})",
            index + 1,
            section.question,
            section.answer_count()
        )?;
    }
    Ok(())
}

fn mode_label(form: &FormState) -> String {
    match form.session() {
        EditingSession::None => "new".to_string(),
        EditingSession::Editing(id) => format!("edit {id}"),
    }
}

fn describe(err: &DraftServiceError) -> String {
    match err {
        DraftServiceError::Validation(inner) => {
            format!("Not saved: {inner}. Fill in both the company name and the motivation text.")
        }
        DraftServiceError::NotFound(id) => {
            format!("Draft {id} does not exist.")
        }
        other => other.to_string(),
    }
}

fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position),
        _ => Err(format!("expected a section number starting at 1, got `{raw}`")),
    }
}

fn split_position(raw: &str) -> Result<(usize, Option<String>), String> {
    let (position, text) = match raw.split_once(char::is_whitespace) {
        Some((position, text)) => (position, Some(text.trim_start().to_string())),
        None => (raw, None),
    };
    Ok((parse_position(position)?, text))
}

fn parse_id(raw: &str) -> Result<DraftId, String> {
    raw.parse::<DraftId>()
        .map_err(|_| format!("expected a draft id, got `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::{parse_command, run_session, SessionCommand};
    use crate::prompt::ScriptedPrompt;
    use esdraft_core::db::open_db_in_memory;
    use esdraft_core::{DraftService, DraftStore, QuestionAnswer, SqliteSlotRepository};
    use std::io::Cursor;

    #[test]
    fn parse_command_reads_positions_and_text() {
        assert_eq!(
            parse_command("q 2 Why  us?").unwrap(),
            Some(SessionCommand::Question(2, "Why  us?".to_string()))
        );
        assert_eq!(
            parse_command("a 1").unwrap(),
            Some(SessionCommand::Answer(1, None))
        );
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("rm-q 0").is_err());
        assert!(parse_command("edit abc").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn session_creates_edits_and_deletes_drafts() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = DraftService::new(DraftStore::new(SqliteSlotRepository::new(&mut conn)));
        let script = "\
save
company Acme
text
Hello
World
.
add-q
add-q
q 1 Q1
a 1 A1
q 2 Q2
a 2
A2
.
save
";
        let mut out = Vec::new();
        run_session(&mut service, &mut ScriptedPrompt::new(Cursor::new(script)), &mut out).unwrap();

        let records = service.list().unwrap().records;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company_name, "Acme");
        assert_eq!(records[0].motivation_text, "Hello\nWorld");
        assert_eq!(
            records[0].additional_questions,
            vec![QuestionAnswer::new("Q1", "A1"), QuestionAnswer::new("Q2", "A2")]
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Not saved: companyName must not be empty"));

        let id = records[0].id;
        let script = format!("edit {id}\nrm-q 1\nsave\ndelete {id}\nyes\nstatus\nquit\n");
        let mut out = Vec::new();
        run_session(&mut service, &mut ScriptedPrompt::new(Cursor::new(script)), &mut out).unwrap();

        assert!(service.list().unwrap().records.is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("Editing draft {id}.")));
        assert!(text.contains("Updated draft for \"Acme\""));
        assert!(text.contains("Deleted draft for \"Acme\""));
        assert!(text.contains("mode: new"));
        assert!(text.contains("logging: off"));
    }

    #[test]
    fn session_reports_unknown_ids_and_bad_sections() {
        let mut conn = open_db_in_memory().unwrap();
        let mut service = DraftService::new(DraftStore::new(SqliteSlotRepository::new(&mut conn)));
        let mut out = Vec::new();
        run_session(
            &mut service,
            &mut ScriptedPrompt::new(Cursor::new("edit 5\nrm-q 3\ndelete 5\n")),
            &mut out,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Draft 5 does not exist."));
        assert!(text.contains("question section 3 does not exist (form has 0)"));
    }
}
