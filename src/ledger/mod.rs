//! Training ledger
//!
//! The persisted document, its store, pure derived views and the mutation
//! operations that keep the document's invariants.

pub(crate) mod derive;
pub(crate) mod ops;
pub(crate) mod store;
pub(crate) mod types;

pub(crate) use derive::{
    Objective, default_scores, find_session, latest_score_for_session, list_sessions,
    next_objective, notes_for_session, readiness_percent, resolve_session_id, resolve_task_id,
    scores_for_session, tasks_for_session,
};
pub(crate) use store::LedgerStore;
pub(crate) use types::{Note, ScoreSnapshot, Session, SkillScores, Task, TaskStatus, parse_score};
