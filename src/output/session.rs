use std::collections::BTreeMap;

use comfy_table::{Cell, Color};
use serde::Serialize;

use crate::ledger::{ScoreSnapshot, Session, readiness_percent};
use crate::output::format::{
    TableOptions, create_styled_table, format_score, header_cell, print_titled, readiness_bar,
    right_cell, short_id, styled_cell,
};

/// Everything `session show` reports about one session
#[derive(Debug, Serialize)]
pub(crate) struct SessionSnapshot<'a> {
    pub(crate) session: &'a Session,
    pub(crate) next_objective: String,
    pub(crate) task_count: usize,
    pub(crate) latest_score: Option<&'a ScoreSnapshot>,
    /// Lowercased skill name to readiness percent, from the latest snapshot
    pub(crate) readiness: Option<BTreeMap<String, u8>>,
}

impl<'a> SessionSnapshot<'a> {
    pub(crate) fn new(
        session: &'a Session,
        next_objective: String,
        task_count: usize,
        latest_score: Option<&'a ScoreSnapshot>,
    ) -> Self {
        let readiness = latest_score.map(|row| {
            row.scores
                .labeled()
                .iter()
                .map(|(label, value)| (label.to_lowercase(), readiness_percent(*value)))
                .collect()
        });
        Self {
            session,
            next_objective,
            task_count,
            latest_score,
            readiness,
        }
    }
}

pub(crate) fn print_session_table(sessions: &[&Session], opts: TableOptions) {
    let c = opts.use_color;
    let mut table = create_styled_table();
    if opts.compact {
        table.set_header(vec![
            header_cell("Session", c),
            header_cell("Started", c),
            header_cell("Topic", c),
        ]);
    } else {
        table.set_header(vec![
            header_cell("Session", c),
            header_cell("Started", c),
            header_cell("Module", c),
            header_cell("Level", c),
            header_cell("Topic", c),
        ]);
    }

    for session in sessions {
        let id = short_id(&session.session_id, opts.compact);
        let started = opts.timezone.display(session.started_at);
        if opts.compact {
            table.add_row(vec![Cell::new(&id), Cell::new(&started), Cell::new(&session.topic)]);
        } else {
            table.add_row(vec![
                Cell::new(&id),
                Cell::new(&started),
                Cell::new(&session.module),
                right_cell(&format!("L{}", session.level), None, false),
                Cell::new(&session.topic),
            ]);
        }
    }

    print_titled(
        "Study Sessions",
        &table,
        &format!("{} sessions", sessions.len()),
    );
}

pub(crate) fn print_session_snapshot(snapshot: &SessionSnapshot<'_>, opts: TableOptions) {
    let session = snapshot.session;
    let accent = if opts.use_color { Some(Color::Green) } else { None };

    println!("\n  Session {}\n", session.session_id);
    println!("  Started:         {}", opts.timezone.display(session.started_at));
    println!("  Topic:           {}", session.topic);
    println!("  Module/Level:    {} / L{}", session.module, session.level);
    println!("  Tasks:           {}", snapshot.task_count);
    println!("  Next objective:  {}", snapshot.next_objective);

    let Some(latest) = snapshot.latest_score else {
        println!("\n  No score snapshot yet for this session.\n");
        return;
    };

    let c = opts.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Skill", c),
        header_cell("Score", c),
        header_cell("Readiness", c),
    ]);
    for (label, value) in latest.scores.labeled() {
        table.add_row(vec![
            Cell::new(label),
            right_cell(&format_score(value), None, false),
            styled_cell(&readiness_bar(value), accent, false),
        ]);
    }
    print_titled(
        "Readiness (latest snapshot)",
        &table,
        &format!(
            "snapshot {} at {}",
            short_id(&latest.score_id, opts.compact),
            opts.timezone.display(latest.created_at)
        ),
    );
}

pub(crate) fn output_session_json(sessions: &[&Session]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(sessions)
}

pub(crate) fn output_snapshot_json(
    snapshot: &SessionSnapshot<'_>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}
