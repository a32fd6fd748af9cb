//! CLI subcommand definitions
//!
//! One subcommand group per ledger collection, plus whole-ledger operations.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::consts::DEFAULT_MODULE;
use crate::ledger::TaskStatus;

/// Main CLI commands
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Create, list and inspect study sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Add, list and update tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Record and browse skill score snapshots (0-10)
    Score {
        #[command(subcommand)]
        command: ScoreCommands,
    },
    /// Record and browse session notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Save Week 1 (Data Grain Discipline) notes and ensure its task exists
    Week1(NoteInput),
    /// Write the whole ledger as JSON to stdout or a file
    Export {
        /// Destination file (e.g. wbam_ledger.json); stdout when omitted
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Replace the ledger with a previously exported file
    Import {
        /// Ledger JSON file to restore
        path: PathBuf,
    },
    /// Discard every session, task, score and note
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum SessionCommands {
    /// Start a new study session
    New {
        /// What the session is about (e.g. "SQL joins")
        #[arg(short, long, default_value = "")]
        topic: String,
        /// Curriculum module
        #[arg(short, long, default_value = DEFAULT_MODULE)]
        module: String,
        /// Session level (1-3)
        #[arg(short, long, default_value_t = 1)]
        level: u8,
    },
    /// List sessions, newest first
    List,
    /// Show a session snapshot: next objective and latest readiness
    Show {
        /// Session id or unique prefix
        session: String,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum TaskCommands {
    /// Add a task to a session
    Add {
        /// Session id or unique prefix
        session: String,
        /// Task title (required)
        #[arg(short, long)]
        title: String,
        /// Difficulty (1-3)
        #[arg(short, long, default_value_t = 1)]
        difficulty: u8,
        /// Initial status: todo, doing or done
        #[arg(short, long, default_value = "todo")]
        status: TaskStatus,
    },
    /// List a session's tasks, newest first
    List {
        /// Session id or unique prefix
        session: String,
    },
    /// Change a task's status
    Status {
        /// Task id or unique prefix
        task: String,
        /// New status: todo, doing or done
        status: TaskStatus,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum ScoreCommands {
    /// Append a score snapshot. Omitted skills keep the latest values.
    Add(ScoreInput),
    /// List a session's snapshots, latest first
    List {
        /// Session id or unique prefix
        session: String,
    },
}

/// Raw score values. Non-numeric input is stored as 0; everything is clamped to 0-10.
#[derive(Debug, Args)]
pub(crate) struct ScoreInput {
    /// Session id or unique prefix
    pub(crate) session: String,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) python: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) sql: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) bi: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) banking: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) analytical: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) business: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) portfolio: Option<String>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum NoteCommands {
    /// Append a note to a session
    Add(NoteInput),
    /// List a session's notes, latest first
    List {
        /// Session id or unique prefix
        session: String,
    },
}

#[derive(Debug, Args)]
pub(crate) struct NoteInput {
    /// Session id or unique prefix
    pub(crate) session: String,
    /// Answer to the session's action block
    #[arg(short, long, default_value = "")]
    pub(crate) action: String,
    /// Validation logic, grain alignment, reconciliation ideas
    #[arg(short, long, default_value = "")]
    pub(crate) notes: String,
}
