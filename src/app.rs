use std::fs;

use crate::cli::{
    Cli, Commands, NoteCommands, NoteInput, ScoreCommands, ScoreInput, SessionCommands,
    TaskCommands,
};
use crate::error::{AppError, LedgerError};
use crate::ledger::{
    LedgerStore, SkillScores, default_scores, find_session, latest_score_for_session,
    list_sessions, next_objective, notes_for_session, parse_score, resolve_session_id,
    resolve_task_id, scores_for_session, tasks_for_session,
};
use crate::output::{
    SessionSnapshot, TableOptions, output_note_json, output_score_json, output_session_json,
    output_snapshot_json, output_task_json, print_note_table, print_score_table,
    print_session_snapshot, print_session_table, print_task_table,
};
use crate::utils::{Timezone, filter_json};

/// Print JSON output, optionally filtering through jq
fn print_json(json: &str, jq_filter: Option<&str>) -> Result<(), AppError> {
    match jq_filter {
        Some(filter) => print!("{}", filter_json(json, filter)?),
        None => println!("{json}"),
    }
    Ok(())
}

pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) table: TableOptions,
}

impl CommandContext<'_> {
    fn json(&self) -> bool {
        self.cli.wants_json()
    }

    fn emit(&self, json: String) -> Result<(), AppError> {
        print_json(&json, self.cli.jq.as_deref())
    }
}

/// Run one parsed command against the ledger it names.
pub(crate) fn run(cli: &Cli) -> Result<(), AppError> {
    let timezone = Timezone::parse(cli.timezone.as_deref())?;
    let ctx = CommandContext {
        cli,
        table: TableOptions {
            use_color: cli.use_color(),
            compact: cli.compact,
            timezone,
        },
    };
    let path = cli.ledger_path();
    let mut store = match cli.command {
        // Whole-ledger replacement must work even when the current file is damaged
        Commands::Import { .. } | Commands::Reset { .. } => LedgerStore::open_for_replace(path)?,
        _ => LedgerStore::open(path)?,
    };

    match &cli.command {
        Commands::Session { command } => handle_session(&mut store, command, &ctx),
        Commands::Task { command } => handle_task(&mut store, command, &ctx),
        Commands::Score { command } => handle_score(&mut store, command, &ctx),
        Commands::Note { command } => handle_note(&mut store, command, &ctx),
        Commands::Week1(input) => handle_week1(&mut store, input, &ctx),
        Commands::Export { output } => {
            let document = store.export_document()?;
            match output {
                Some(path) => {
                    fs::write(path, &document).map_err(|source| AppError::WriteOutput {
                        path: path.clone(),
                        source,
                    })?;
                    eprintln!("Ledger exported to {}", path.display());
                }
                // Byte-for-byte copy of the ledger file, which has no trailing newline
                None => print!("{document}"),
            }
            Ok(())
        }
        Commands::Import { path } => {
            let raw = fs::read_to_string(path).map_err(|source| AppError::ReadInput {
                path: path.clone(),
                source,
            })?;
            store.import_document(&raw)?;
            eprintln!("Ledger imported and saved to {}", store.path().display());
            Ok(())
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err(AppError::ResetNotConfirmed);
            }
            store.reset()?;
            eprintln!("Ledger reset: {}", store.path().display());
            Ok(())
        }
    }
}

fn handle_session(
    store: &mut LedgerStore,
    command: &SessionCommands,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    match command {
        SessionCommands::New {
            topic,
            module,
            level,
        } => {
            let session = store.create_session(topic, module, *level)?;
            if ctx.json() {
                ctx.emit(serde_json::to_string_pretty(&session)?)
            } else {
                println!("Session created: {}", session.session_id);
                Ok(())
            }
        }
        SessionCommands::List => {
            let sessions = list_sessions(store.ledger());
            if ctx.json() {
                return ctx.emit(output_session_json(&sessions)?);
            }
            if sessions.is_empty() {
                println!("No sessions yet. Create your first session with `wbam session new`.");
                return Ok(());
            }
            print_session_table(&sessions, ctx.table);
            Ok(())
        }
        SessionCommands::Show { session } => {
            let ledger = store.ledger();
            let session_id = resolve_session_id(ledger, session)?;
            let session =
                find_session(ledger, session_id).ok_or_else(|| LedgerError::NotFound {
                    kind: "Session",
                    id: session_id.to_string(),
                })?;
            let tasks = tasks_for_session(ledger, session_id);
            let snapshot = SessionSnapshot::new(
                session,
                next_objective(tasks.iter().copied()).to_string(),
                tasks.len(),
                latest_score_for_session(ledger, session_id),
            );
            if ctx.json() {
                ctx.emit(output_snapshot_json(&snapshot)?)
            } else {
                print_session_snapshot(&snapshot, ctx.table);
                Ok(())
            }
        }
    }
}

fn handle_task(
    store: &mut LedgerStore,
    command: &TaskCommands,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    match command {
        TaskCommands::Add {
            session,
            title,
            difficulty,
            status,
        } => {
            let session_id = resolve_session_id(store.ledger(), session)?.to_string();
            let task = store.add_task(&session_id, title, *difficulty, *status)?;
            if ctx.json() {
                ctx.emit(serde_json::to_string_pretty(&task)?)
            } else {
                println!("Task added: {}", task.task_id);
                Ok(())
            }
        }
        TaskCommands::List { session } => {
            let ledger = store.ledger();
            let session_id = resolve_session_id(ledger, session)?;
            let tasks = tasks_for_session(ledger, session_id);
            if ctx.json() {
                return ctx.emit(output_task_json(&tasks)?);
            }
            if tasks.is_empty() {
                println!("No tasks yet.");
                return Ok(());
            }
            let objective = next_objective(tasks.iter().copied());
            print_task_table(&tasks, &objective, ctx.table);
            Ok(())
        }
        TaskCommands::Status { task, status } => {
            let task_id = resolve_task_id(store.ledger(), task)?.to_string();
            let task = store.update_task_status(&task_id, *status)?;
            if ctx.json() {
                ctx.emit(serde_json::to_string_pretty(&task)?)
            } else {
                println!("Status updated: {} -> {}", task.title, task.status);
                Ok(())
            }
        }
    }
}

/// Fill omitted skills from `defaults`, parsing the rest leniently.
fn collect_scores(input: &ScoreInput, defaults: SkillScores) -> SkillScores {
    let pick = |raw: &Option<String>, default: f64| raw.as_deref().map_or(default, parse_score);
    SkillScores {
        python: pick(&input.python, defaults.python),
        sql: pick(&input.sql, defaults.sql),
        bi: pick(&input.bi, defaults.bi),
        banking: pick(&input.banking, defaults.banking),
        analytical: pick(&input.analytical, defaults.analytical),
        business: pick(&input.business, defaults.business),
        portfolio: pick(&input.portfolio, defaults.portfolio),
    }
}

fn handle_score(
    store: &mut LedgerStore,
    command: &ScoreCommands,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    match command {
        ScoreCommands::Add(input) => {
            let session_id = resolve_session_id(store.ledger(), &input.session)?.to_string();
            let scores = collect_scores(input, default_scores(store.ledger(), &session_id));
            let snapshot = store.add_score_snapshot(&session_id, scores)?;
            if ctx.json() {
                ctx.emit(serde_json::to_string_pretty(&snapshot)?)
            } else {
                println!("Snapshot saved: {}", snapshot.score_id);
                Ok(())
            }
        }
        ScoreCommands::List { session } => {
            let ledger = store.ledger();
            let session_id = resolve_session_id(ledger, session)?;
            let rows = scores_for_session(ledger, session_id);
            if ctx.json() {
                return ctx.emit(output_score_json(&rows)?);
            }
            if rows.is_empty() {
                println!("No score snapshot yet for this session.");
                return Ok(());
            }
            print_score_table(&rows, ctx.table);
            Ok(())
        }
    }
}

fn handle_note(
    store: &mut LedgerStore,
    command: &NoteCommands,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    match command {
        NoteCommands::Add(input) => {
            let session_id = resolve_session_id(store.ledger(), &input.session)?.to_string();
            let note = store.add_note(&session_id, &input.action, &input.notes)?;
            if ctx.json() {
                ctx.emit(serde_json::to_string_pretty(&note)?)
            } else {
                println!("Note saved: {}", note.note_id);
                Ok(())
            }
        }
        NoteCommands::List { session } => {
            let ledger = store.ledger();
            let session_id = resolve_session_id(ledger, session)?;
            let notes = notes_for_session(ledger, session_id);
            if ctx.json() {
                return ctx.emit(output_note_json(&notes)?);
            }
            if notes.is_empty() {
                println!("No notes yet.");
                return Ok(());
            }
            print_note_table(&notes, ctx.table);
            Ok(())
        }
    }
}

fn handle_week1(
    store: &mut LedgerStore,
    input: &NoteInput,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    let session_id = resolve_session_id(store.ledger(), &input.session)?.to_string();
    let (note, task) = store.add_week1_note(&session_id, &input.action, &input.notes)?;
    if ctx.json() {
        return ctx.emit(serde_json::to_string_pretty(&serde_json::json!({
            "note": note,
            "task_created": task,
        }))?);
    }
    match task {
        Some(task) => println!("Saved notes and created Week 1 task: {}", task.task_id),
        None => println!("Saved notes; Week 1 task already exists."),
    }
    Ok(())
}
