use comfy_table::{Cell, Color};

use crate::ledger::{ScoreSnapshot, SkillScores};
use crate::output::format::{
    TableOptions, create_styled_table, format_score, header_cell, print_titled, right_cell,
    short_id,
};

pub(crate) fn print_score_table(rows: &[&ScoreSnapshot], opts: TableOptions) {
    let c = opts.use_color;
    let mut table = create_styled_table();
    let mut header = Vec::with_capacity(9);
    if !opts.compact {
        header.push(header_cell("Snapshot", c));
    }
    header.push(header_cell("Created", c));
    header.extend(SkillScores::LABELS.iter().map(|label| header_cell(label, c)));
    table.set_header(header);

    let highlight = if c { Some(Color::Green) } else { None };
    for (i, row) in rows.iter().enumerate() {
        let mut cells = Vec::with_capacity(9);
        if !opts.compact {
            cells.push(Cell::new(short_id(&row.score_id, false)));
        }
        cells.push(Cell::new(opts.timezone.display(row.created_at)));
        // First row is the latest snapshot
        let color = if i == 0 { highlight } else { None };
        for (_, value) in row.scores.labeled() {
            cells.push(right_cell(&format_score(value), color, false));
        }
        table.add_row(cells);
    }

    print_titled(
        "Skill Score Snapshots (latest first)",
        &table,
        &format!("{} snapshots", rows.len()),
    );
}

pub(crate) fn output_score_json(rows: &[&ScoreSnapshot]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rows)
}
