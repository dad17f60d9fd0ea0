//! One-shot subcommands.

use crate::prompt::Prompt;
use crate::{CreateArgs, DeleteArgs, EditArgs};
use anyhow::Result;
use esdraft_core::{
    render_drafts, CharCount, DeleteOutcome, DraftRecord, DraftService, DraftSnapshot,
    FormState, QuestionAnswer, SlotRepository, SubmitOutcome,
};
use std::io::Write;

pub fn list<S: SlotRepository, W: Write>(service: &DraftService<S>, out: &mut W) -> Result<()> {
    let snapshot = service.list()?;
    print_snapshot(&snapshot, out)
}

pub fn create<S: SlotRepository, W: Write>(
    service: &mut DraftService<S>,
    args: CreateArgs,
    out: &mut W,
) -> Result<()> {
    let mut form = FormState::new();
    form.set_company_name(args.company);
    form.set_motivation_text(args.text);
    append_questions(&mut form, args.questions)?;
    submit_form(service, &mut form, out)
}

pub fn edit<S: SlotRepository, W: Write>(
    service: &mut DraftService<S>,
    args: EditArgs,
    out: &mut W,
) -> Result<()> {
    let mut form = FormState::new();
    service.start_edit(&mut form, args.id)?;
    if let Some(company) = args.company {
        form.set_company_name(company);
    }
    if let Some(text) = args.text {
        form.set_motivation_text(text);
    }
    if args.clear_questions {
        while !form.questions().is_empty() {
            form.remove_question_section(0)?;
        }
    }
    append_questions(&mut form, args.questions)?;
    submit_form(service, &mut form, out)
}

pub fn delete<S: SlotRepository, P: Prompt, W: Write>(
    service: &mut DraftService<S>,
    args: DeleteArgs,
    prompt: &mut P,
    out: &mut W,
) -> Result<()> {
    let mut form = FormState::new();
    let skip_prompt = args.yes;
    let outcome = service.delete_record(&mut form, args.id, &mut |record: &DraftRecord| {
        skip_prompt || prompt.confirm(out, &delete_question(record))
    })?;
    report_delete(&outcome, out)
}

pub(crate) fn print_snapshot<W: Write>(snapshot: &DraftSnapshot, out: &mut W) -> Result<()> {
    if let Some(warning) = &snapshot.warning {
        writeln!(
            out,
            "warning: stored drafts could not be read ({}); the raw data was kept in slot `{}`",
            warning.reason, warning.backup_key
        )?;
    }
    write!(out, "{}", render_drafts(&snapshot.records))?;
    Ok(())
}

pub(crate) fn submit_form<S: SlotRepository, W: Write>(
    service: &mut DraftService<S>,
    form: &mut FormState,
    out: &mut W,
) -> Result<()> {
    let counts = advisory_counts(form);
    let outcome = service.submit(form)?;
    for (label, count) in counts {
        writeln!(out, "note: {label} {count}")?;
    }
    let (verb, record) = match &outcome {
        SubmitOutcome::Created(record) => ("Saved", record),
        SubmitOutcome::Updated(record) => ("Updated", record),
    };
    writeln!(
        out,
        "{verb} draft for \"{}\" (id {}).",
        record.company_name, record.id
    )?;
    Ok(())
}

pub(crate) fn report_delete<W: Write>(outcome: &DeleteOutcome, out: &mut W) -> Result<()> {
    match outcome {
        DeleteOutcome::Deleted(record) => writeln!(
            out,
            "Deleted draft for \"{}\" (id {}).",
            record.company_name, record.id
        )?,
        DeleteOutcome::Declined => writeln!(out, "Delete cancelled.")?,
    }
    Ok(())
}

pub(crate) fn delete_question(record: &DraftRecord) -> String {
    format!(
        "Delete the draft for \"{}\" (id {})?",
        record.company_name, record.id
    )
}

fn append_questions(form: &mut FormState, questions: Vec<QuestionAnswer>) -> Result<()> {
    for pair in questions {
        let index = form.add_question_section();
        form.set_question(index, pair.question)?;
        form.set_answer(index, pair.answer)?;
    }
    Ok(())
}

/// Over-limit fields worth mentioning; never blocks the save.
fn advisory_counts(form: &FormState) -> Vec<(String, CharCount)> {
    let mut counts = vec![("motivation text".to_string(), form.motivation_count())];
    counts.extend(
        form.questions()
            .iter()
            .enumerate()
            .map(|(index, section)| (format!("answer {}", index + 1), section.answer_count())),
    );
    counts.retain(|(_, count)| count.over_limit);
    counts
}
