//! Mutation operations
//!
//! Each operation validates its input, appends or patches one record and
//! persists the whole document. A rejected operation changes nothing.

use tracing::info;

use super::store::LedgerStore;
use super::types::{
    Ledger, Note, ScoreSnapshot, Session, SkillScores, Task, TaskStatus, new_id,
};
use crate::consts::DEFAULT_MODULE;
use crate::error::LedgerError;
use crate::utils::date::now_utc;

/// Titles of the Week 1 exercise task start with this
pub(crate) const WEEK1_TASK_PREFIX: &str = "Week 1: Data Grain Discipline";

/// Title given to the Week 1 exercise task when it is created automatically
pub(crate) const WEEK1_TASK_TITLE: &str =
    "Week 1: Data Grain Discipline — write correct merge/aggregation procedure";

fn check_level(field: &'static str, value: u8) -> Result<u8, LedgerError> {
    if (1..=3).contains(&value) {
        Ok(value)
    } else {
        Err(LedgerError::InvalidValue {
            field,
            value: value.to_string(),
            expected: "1, 2 or 3",
        })
    }
}

fn require_session(ledger: &Ledger, session_id: &str) -> Result<(), LedgerError> {
    if ledger.has_session(session_id) {
        Ok(())
    } else {
        Err(LedgerError::NotFound {
            kind: "Session",
            id: session_id.to_string(),
        })
    }
}

fn push_note(
    ledger: &mut Ledger,
    session_id: &str,
    action_answer: &str,
    technical_notes: &str,
) -> Note {
    let note = Note {
        note_id: new_id(),
        session_id: session_id.to_string(),
        created_at: now_utc(),
        action_answer: action_answer.to_string(),
        technical_notes: technical_notes.to_string(),
    };
    ledger.notes.push(note.clone());
    note
}

/// Create the Week 1 exercise task for a session unless one already exists.
fn ensure_week1_task(ledger: &mut Ledger, session_id: &str) -> Option<Task> {
    let exists = ledger
        .tasks
        .iter()
        .any(|t| t.session_id == session_id && t.title.starts_with(WEEK1_TASK_PREFIX));
    if exists {
        return None;
    }
    let task = Task {
        task_id: new_id(),
        session_id: session_id.to_string(),
        title: WEEK1_TASK_TITLE.to_string(),
        status: TaskStatus::Doing,
        difficulty: 1,
        created_at: now_utc(),
        completed_at: None,
    };
    ledger.tasks.push(task.clone());
    Some(task)
}

impl LedgerStore {
    pub(crate) fn create_session(
        &mut self,
        topic: &str,
        module: &str,
        level: u8,
    ) -> Result<Session, LedgerError> {
        let level = check_level("level", level)?;
        let module = match module.trim() {
            "" => DEFAULT_MODULE,
            m => m,
        };
        let session = Session {
            session_id: new_id(),
            started_at: now_utc(),
            topic: topic.trim().to_string(),
            module: module.to_string(),
            level,
        };
        self.commit(|ledger| {
            ledger.sessions.push(session.clone());
            Ok(())
        })?;
        info!(session_id = %session.session_id, "session created");
        Ok(session)
    }

    pub(crate) fn add_task(
        &mut self,
        session_id: &str,
        title: &str,
        difficulty: u8,
        status: TaskStatus,
    ) -> Result<Task, LedgerError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LedgerError::MissingField { field: "title" });
        }
        let difficulty = check_level("difficulty", difficulty)?;
        require_session(self.ledger(), session_id)?;

        let now = now_utc();
        let task = Task {
            task_id: new_id(),
            session_id: session_id.to_string(),
            title: title.to_string(),
            status,
            difficulty,
            created_at: now,
            completed_at: (status == TaskStatus::Done).then_some(now),
        };
        self.commit(|ledger| {
            ledger.tasks.push(task.clone());
            Ok(())
        })?;
        info!(task_id = %task.task_id, %session_id, %status, "task added");
        Ok(task)
    }

    pub(crate) fn update_task_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<Task, LedgerError> {
        let task = self.commit(|ledger| {
            let task = ledger
                .tasks
                .iter_mut()
                .find(|t| t.task_id == task_id)
                .ok_or_else(|| LedgerError::NotFound {
                    kind: "Task",
                    id: task_id.to_string(),
                })?;
            task.set_status(status, now_utc());
            Ok(task.clone())
        })?;
        info!(%task_id, %status, "task status updated");
        Ok(task)
    }

    /// Append a snapshot. Every score is clamped into `[0, 10]` first.
    pub(crate) fn add_score_snapshot(
        &mut self,
        session_id: &str,
        scores: SkillScores,
    ) -> Result<ScoreSnapshot, LedgerError> {
        require_session(self.ledger(), session_id)?;
        let snapshot = ScoreSnapshot {
            score_id: new_id(),
            session_id: session_id.to_string(),
            created_at: now_utc(),
            scores: scores.clamped(),
        };
        self.commit(|ledger| {
            ledger.scores.push(snapshot.clone());
            Ok(())
        })?;
        info!(score_id = %snapshot.score_id, %session_id, "score snapshot added");
        Ok(snapshot)
    }

    pub(crate) fn add_note(
        &mut self,
        session_id: &str,
        action_answer: &str,
        technical_notes: &str,
    ) -> Result<Note, LedgerError> {
        let note = self.commit(|ledger| {
            require_session(ledger, session_id)?;
            Ok(push_note(ledger, session_id, action_answer, technical_notes))
        })?;
        info!(note_id = %note.note_id, %session_id, "note added");
        Ok(note)
    }

    /// Append a Week 1 note and make sure the session has the exercise task.
    ///
    /// Returns the task when this call created it.
    pub(crate) fn add_week1_note(
        &mut self,
        session_id: &str,
        action_answer: &str,
        technical_notes: &str,
    ) -> Result<(Note, Option<Task>), LedgerError> {
        let (note, task) = self.commit(|ledger| {
            require_session(ledger, session_id)?;
            let note = push_note(ledger, session_id, action_answer, technical_notes);
            Ok((note, ensure_week1_task(ledger, session_id)))
        })?;
        info!(
            note_id = %note.note_id,
            %session_id,
            task_created = task.is_some(),
            "week 1 note added"
        );
        Ok((note, task))
    }
}
