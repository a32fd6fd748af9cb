//! Ledger data model
//!
//! The on-disk JSON document and every record kind it holds. Field names
//! match the persisted schema exactly.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{APP_NAME, LEDGER_VERSION};
use crate::error::LedgerError;
use crate::utils::date::{now_utc, option_timestamp, timestamp};

pub(crate) type Timestamp = DateTime<Utc>;

/// Top-level keys every ledger document must carry
pub(crate) const REQUIRED_KEYS: [&str; 5] = ["meta", "sessions", "tasks", "scores", "notes"];

/// Every key a score snapshot row may carry
pub(crate) const SCORE_KEYS: [&str; 10] = [
    "score_id",
    "session_id",
    "created_at",
    "python",
    "sql",
    "bi",
    "banking",
    "analytical",
    "business",
    "portfolio",
];

/// Lowest and highest value a skill score can hold
pub(crate) const SCORE_MIN: f64 = 0.0;
pub(crate) const SCORE_MAX: f64 = 10.0;

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Clamp a score into `[0, 10]`. NaN maps to the lower bound.
pub(crate) fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        SCORE_MIN
    } else {
        value.clamp(SCORE_MIN, SCORE_MAX)
    }
}

/// Parse free-form score input. Anything non-numeric maps to the lower bound.
pub(crate) fn parse_score(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .map(clamp_score)
        .unwrap_or(SCORE_MIN)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Meta {
    pub(crate) app: String,
    pub(crate) version: String,
    #[serde(with = "timestamp")]
    pub(crate) created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Session {
    pub(crate) session_id: String,
    #[serde(with = "timestamp")]
    pub(crate) started_at: Timestamp,
    pub(crate) topic: String,
    pub(crate) module: String,
    pub(crate) level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TaskStatus {
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "done" => Ok(TaskStatus::Done),
            _ => Err(LedgerError::InvalidValue {
                field: "status",
                value: s.to_string(),
                expected: "todo, doing or done",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Task {
    pub(crate) task_id: String,
    pub(crate) session_id: String,
    pub(crate) title: String,
    pub(crate) status: TaskStatus,
    pub(crate) difficulty: u8,
    #[serde(with = "timestamp")]
    pub(crate) created_at: Timestamp,
    #[serde(with = "option_timestamp")]
    pub(crate) completed_at: Option<Timestamp>,
}

impl Task {
    /// Move to `status`, keeping `completed_at` set exactly when done.
    pub(crate) fn set_status(&mut self, status: TaskStatus, now: Timestamp) {
        self.status = status;
        self.completed_at = (status == TaskStatus::Done).then_some(now);
    }
}

/// The seven skill dimensions tracked by a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct SkillScores {
    pub(crate) python: f64,
    pub(crate) sql: f64,
    pub(crate) bi: f64,
    pub(crate) banking: f64,
    pub(crate) analytical: f64,
    pub(crate) business: f64,
    pub(crate) portfolio: f64,
}

impl SkillScores {
    /// Starting point offered before a session has any snapshot
    pub(crate) const BASELINE: SkillScores = SkillScores {
        python: 5.0,
        sql: 3.0,
        bi: 4.0,
        banking: 3.0,
        analytical: 5.0,
        business: 4.0,
        portfolio: 0.0,
    };

    /// Display labels in schema order
    pub(crate) const LABELS: [&'static str; 7] = [
        "Python",
        "SQL",
        "BI",
        "Banking",
        "Analytical",
        "Business",
        "Portfolio",
    ];

    pub(crate) fn clamped(self) -> Self {
        SkillScores {
            python: clamp_score(self.python),
            sql: clamp_score(self.sql),
            bi: clamp_score(self.bi),
            banking: clamp_score(self.banking),
            analytical: clamp_score(self.analytical),
            business: clamp_score(self.business),
            portfolio: clamp_score(self.portfolio),
        }
    }

    /// Display label and value for each skill, in schema order.
    pub(crate) fn labeled(&self) -> [(&'static str, f64); 7] {
        let values = [
            self.python,
            self.sql,
            self.bi,
            self.banking,
            self.analytical,
            self.business,
            self.portfolio,
        ];
        std::array::from_fn(|i| (Self::LABELS[i], values[i]))
    }

    fn in_range(&self) -> bool {
        self.labeled()
            .iter()
            .all(|(_, v)| (SCORE_MIN..=SCORE_MAX).contains(v))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScoreSnapshot {
    pub(crate) score_id: String,
    pub(crate) session_id: String,
    #[serde(with = "timestamp")]
    pub(crate) created_at: Timestamp,
    #[serde(flatten)]
    pub(crate) scores: SkillScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Note {
    pub(crate) note_id: String,
    pub(crate) session_id: String,
    #[serde(with = "timestamp")]
    pub(crate) created_at: Timestamp,
    pub(crate) action_answer: String,
    pub(crate) technical_notes: String,
}

/// The whole persisted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Ledger {
    pub(crate) meta: Meta,
    pub(crate) sessions: Vec<Session>,
    pub(crate) tasks: Vec<Task>,
    pub(crate) scores: Vec<ScoreSnapshot>,
    pub(crate) notes: Vec<Note>,
}

impl Ledger {
    pub(crate) fn empty() -> Self {
        Ledger {
            meta: Meta {
                app: APP_NAME.to_string(),
                version: LEDGER_VERSION.to_string(),
                created_at: now_utc(),
            },
            sessions: Vec::new(),
            tasks: Vec::new(),
            scores: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub(crate) fn has_session(&self, session_id: &str) -> bool {
        self.sessions.iter().any(|s| s.session_id == session_id)
    }

    /// Check the invariants a parsed document must satisfy.
    ///
    /// Returns a description of the first violation found.
    pub(crate) fn validate(&self) -> Result<(), String> {
        unique_ids("session", self.sessions.iter().map(|s| s.session_id.as_str()))?;
        unique_ids("task", self.tasks.iter().map(|t| t.task_id.as_str()))?;
        unique_ids("score", self.scores.iter().map(|s| s.score_id.as_str()))?;
        unique_ids("note", self.notes.iter().map(|n| n.note_id.as_str()))?;

        let session_ids: HashSet<&str> =
            self.sessions.iter().map(|s| s.session_id.as_str()).collect();
        let known = |kind: &str, id: &str, session_id: &str| {
            if session_ids.contains(session_id) {
                Ok(())
            } else {
                Err(format!("{kind} {id} references unknown session {session_id}"))
            }
        };

        for session in &self.sessions {
            if !(1..=3).contains(&session.level) {
                return Err(format!(
                    "session {} has level {} outside 1..=3",
                    session.session_id, session.level
                ));
            }
        }
        for task in &self.tasks {
            known("task", &task.task_id, &task.session_id)?;
            if !(1..=3).contains(&task.difficulty) {
                return Err(format!(
                    "task {} has difficulty {} outside 1..=3",
                    task.task_id, task.difficulty
                ));
            }
            if (task.status == TaskStatus::Done) != task.completed_at.is_some() {
                return Err(format!(
                    "task {} has status {} but completed_at is {}",
                    task.task_id,
                    task.status,
                    if task.completed_at.is_some() { "set" } else { "null" }
                ));
            }
        }
        for score in &self.scores {
            known("score", &score.score_id, &score.session_id)?;
            if !score.scores.in_range() {
                return Err(format!("score {} has a value outside 0..=10", score.score_id));
            }
        }
        for note in &self.notes {
            known("note", &note.note_id, &note.session_id)?;
        }
        Ok(())
    }
}

fn unique_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), String> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(format!("duplicate {kind} id {id}"));
        }
    }
    Ok(())
}
