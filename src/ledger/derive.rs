//! Read-only views over a ledger
//!
//! Nothing here mutates or persists. All listings are newest first; ties keep
//! their order of insertion.

use std::fmt;

use super::types::{
    Ledger, Note, ScoreSnapshot, Session, SkillScores, Task, TaskStatus, clamp_score,
};
use crate::error::LedgerError;

pub(crate) const NO_PENDING_TASKS: &str = "No pending tasks. Create the next technical task.";

/// Suggested next step derived from a session's tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Objective {
    Continue(String),
    Start(String),
    NoPending,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Continue(title) => write!(f, "Continue: {title}"),
            Objective::Start(title) => write!(f, "Start: {title}"),
            Objective::NoPending => f.write_str(NO_PENDING_TASKS),
        }
    }
}

pub(crate) fn list_sessions(ledger: &Ledger) -> Vec<&Session> {
    let mut sessions: Vec<_> = ledger.sessions.iter().collect();
    sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    sessions
}

pub(crate) fn find_session<'a>(ledger: &'a Ledger, session_id: &str) -> Option<&'a Session> {
    ledger.sessions.iter().find(|s| s.session_id == session_id)
}

pub(crate) fn tasks_for_session<'a>(ledger: &'a Ledger, session_id: &str) -> Vec<&'a Task> {
    let mut tasks: Vec<_> = ledger
        .tasks
        .iter()
        .filter(|t| t.session_id == session_id)
        .collect();
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tasks
}

pub(crate) fn scores_for_session<'a>(
    ledger: &'a Ledger,
    session_id: &str,
) -> Vec<&'a ScoreSnapshot> {
    let mut rows: Vec<_> = ledger
        .scores
        .iter()
        .filter(|r| r.session_id == session_id)
        .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    rows
}

pub(crate) fn latest_score_for_session<'a>(
    ledger: &'a Ledger,
    session_id: &str,
) -> Option<&'a ScoreSnapshot> {
    scores_for_session(ledger, session_id).into_iter().next()
}

pub(crate) fn notes_for_session<'a>(ledger: &'a Ledger, session_id: &str) -> Vec<&'a Note> {
    let mut notes: Vec<_> = ledger
        .notes
        .iter()
        .filter(|n| n.session_id == session_id)
        .collect();
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notes
}

/// Values a new snapshot starts from: the latest snapshot, or the baseline.
pub(crate) fn default_scores(ledger: &Ledger, session_id: &str) -> SkillScores {
    latest_score_for_session(ledger, session_id)
        .map(|row| row.scores)
        .unwrap_or(SkillScores::BASELINE)
}

/// Priority is doing, then todo, then nothing. Within a status the first task
/// in `tasks` wins, so callers pass the newest-first listing.
pub(crate) fn next_objective<'a, I>(tasks: I) -> Objective
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut first_todo = None;
    for task in tasks {
        match task.status {
            TaskStatus::Doing => return Objective::Continue(task.title.clone()),
            TaskStatus::Todo if first_todo.is_none() => first_todo = Some(task.title.clone()),
            _ => {}
        }
    }
    first_todo.map_or(Objective::NoPending, Objective::Start)
}

pub(crate) fn readiness_percent(score: f64) -> u8 {
    (clamp_score(score) / 10.0 * 100.0).round() as u8
}

/// Resolve a full id or a unique prefix to a session id.
pub(crate) fn resolve_session_id<'a>(
    ledger: &'a Ledger,
    prefix: &str,
) -> Result<&'a str, LedgerError> {
    resolve_id(
        "Session",
        prefix,
        ledger.sessions.iter().map(|s| s.session_id.as_str()),
    )
}

/// Resolve a full id or a unique prefix to a task id.
pub(crate) fn resolve_task_id<'a>(
    ledger: &'a Ledger,
    prefix: &str,
) -> Result<&'a str, LedgerError> {
    resolve_id("Task", prefix, ledger.tasks.iter().map(|t| t.task_id.as_str()))
}

fn resolve_id<'a>(
    kind: &'static str,
    prefix: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<&'a str, LedgerError> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(LedgerError::MissingField { field: "id" });
    }
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(prefix)).collect();
    if let Some(exact) = matches.iter().find(|id| **id == prefix) {
        return Ok(*exact);
    }
    match matches.as_slice() {
        [] => Err(LedgerError::NotFound {
            kind,
            id: prefix.to_string(),
        }),
        [only] => Ok(*only),
        _ => Err(LedgerError::AmbiguousId {
            kind,
            prefix: prefix.to_string(),
            matches: matches.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::Timestamp;
    use chrono::{Duration, TimeZone, Utc};

    fn at(minutes: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn session(id: &str, minutes: i64) -> Session {
        Session {
            session_id: id.to_string(),
            started_at: at(minutes),
            topic: format!("topic {id}"),
            module: "M0".to_string(),
            level: 1,
        }
    }

    fn task(id: &str, session_id: &str, title: &str, status: TaskStatus, minutes: i64) -> Task {
        Task {
            task_id: id.to_string(),
            session_id: session_id.to_string(),
            title: title.to_string(),
            status,
            difficulty: 1,
            created_at: at(minutes),
            completed_at: (status == TaskStatus::Done).then(|| at(minutes)),
        }
    }

    fn snapshot(id: &str, session_id: &str, minutes: i64, python: f64) -> ScoreSnapshot {
        ScoreSnapshot {
            score_id: id.to_string(),
            session_id: session_id.to_string(),
            created_at: at(minutes),
            scores: SkillScores {
                python,
                ..SkillScores::BASELINE
            },
        }
    }

    #[test]
    fn sessions_newest_first_with_ties() {
        let mut ledger = Ledger::empty();
        ledger.sessions = vec![
            session("a", 0),
            session("b", 10),
            session("c", 10),
            session("d", 5),
        ];
        let ids: Vec<_> = list_sessions(&ledger)
            .iter()
            .map(|s| s.session_id.as_str())
            .collect();
        assert_eq!(ids, ["b", "c", "d", "a"]);
        let listed = list_sessions(&ledger);
        assert!(listed.windows(2).all(|w| w[0].started_at >= w[1].started_at));
    }

    #[test]
    fn tasks_filtered_and_ordered() {
        let mut ledger = Ledger::empty();
        ledger.sessions = vec![session("s1", 0), session("s2", 0)];
        ledger.tasks = vec![
            task("t1", "s1", "first", TaskStatus::Todo, 1),
            task("t2", "s2", "other", TaskStatus::Todo, 2),
            task("t3", "s1", "third", TaskStatus::Done, 3),
        ];
        let ids: Vec<_> = tasks_for_session(&ledger, "s1")
            .iter()
            .map(|t| t.task_id.as_str())
            .collect();
        assert_eq!(ids, ["t3", "t1"]);
        assert!(tasks_for_session(&ledger, "nope").is_empty());
    }

    #[test]
    fn latest_score_picks_max_created_at() {
        let mut ledger = Ledger::empty();
        ledger.sessions = vec![session("s1", 0)];
        ledger.scores = vec![
            snapshot("sc1", "s1", 5, 1.0),
            snapshot("sc2", "s1", 30, 2.0),
            snapshot("sc3", "s1", 15, 3.0),
        ];
        let latest = latest_score_for_session(&ledger, "s1").unwrap();
        assert_eq!(latest.score_id, "sc2");
        assert!(latest_score_for_session(&ledger, "s2").is_none());
    }

    #[test]
    fn default_scores_falls_back_to_baseline() {
        let mut ledger = Ledger::empty();
        ledger.sessions = vec![session("s1", 0)];
        assert_eq!(default_scores(&ledger, "s1"), SkillScores::BASELINE);
        ledger.scores.push(snapshot("sc1", "s1", 1, 8.0));
        assert_eq!(default_scores(&ledger, "s1").python, 8.0);
    }

    #[test]
    fn objective_prefers_doing() {
        let tasks = [
            task("t1", "s1", "A", TaskStatus::Todo, 0),
            task("t2", "s1", "B", TaskStatus::Doing, 1),
        ];
        let objective = next_objective(&tasks);
        assert_eq!(objective, Objective::Continue("B".to_string()));
        assert_eq!(objective.to_string(), "Continue: B");
    }

    #[test]
    fn objective_starts_first_todo() {
        let tasks = [
            task("t1", "s1", "done one", TaskStatus::Done, 0),
            task("t2", "s1", "A", TaskStatus::Todo, 1),
            task("t3", "s1", "C", TaskStatus::Todo, 2),
        ];
        assert_eq!(next_objective(&tasks).to_string(), "Start: A");
    }

    #[test]
    fn objective_sentinel_when_nothing_pending() {
        let done = [task("t1", "s1", "A", TaskStatus::Done, 0)];
        assert_eq!(next_objective(&done).to_string(), NO_PENDING_TASKS);
        assert_eq!(next_objective(&[] as &[Task]), Objective::NoPending);
    }

    #[test]
    fn readiness_percent_rounds_and_clamps() {
        assert_eq!(readiness_percent(5.0), 50);
        assert_eq!(readiness_percent(3.33), 33);
        assert_eq!(readiness_percent(6.66), 67);
        assert_eq!(readiness_percent(-2.0), 0);
        assert_eq!(readiness_percent(12.0), 100);
        assert_eq!(readiness_percent(f64::NAN), 0);
    }

    #[test]
    fn resolve_by_prefix() {
        let mut ledger = Ledger::empty();
        ledger.sessions = vec![session("abc123", 0), session("abd456", 1)];
        assert_eq!(resolve_session_id(&ledger, "abc").unwrap(), "abc123");
        assert!(matches!(
            resolve_session_id(&ledger, "ab"),
            Err(LedgerError::AmbiguousId { matches: 2, .. })
        ));
        assert!(matches!(
            resolve_session_id(&ledger, "zzz"),
            Err(LedgerError::NotFound { kind: "Session", .. })
        ));
        assert!(matches!(
            resolve_session_id(&ledger, "  "),
            Err(LedgerError::MissingField { .. })
        ));
    }

    #[test]
    fn resolve_exact_id_wins_over_longer_matches() {
        let mut ledger = Ledger::empty();
        ledger.sessions = vec![session("ab", 0), session("abc", 1)];
        assert_eq!(resolve_session_id(&ledger, "ab").unwrap(), "ab");
    }
}
