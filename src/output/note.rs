use comfy_table::Cell;

use crate::ledger::Note;
use crate::output::format::{
    TableOptions, create_styled_table, header_cell, print_titled, short_id,
};

/// Longest note excerpt shown in compact mode
const COMPACT_EXCERPT_CHARS: usize = 60;

fn excerpt(text: &str, compact: bool) -> String {
    if !compact || text.chars().count() <= COMPACT_EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(COMPACT_EXCERPT_CHARS - 3).collect();
    format!("{cut}...")
}

pub(crate) fn print_note_table(notes: &[&Note], opts: TableOptions) {
    let c = opts.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Note", c),
        header_cell("Created", c),
        header_cell("Action Answer", c),
        header_cell("Technical Notes", c),
    ]);

    for note in notes {
        table.add_row(vec![
            Cell::new(short_id(&note.note_id, opts.compact)),
            Cell::new(opts.timezone.display(note.created_at)),
            Cell::new(excerpt(&note.action_answer, opts.compact)),
            Cell::new(excerpt(&note.technical_notes, opts.compact)),
        ]);
    }

    print_titled(
        "Notes History (latest first)",
        &table,
        &format!("{} notes", notes.len()),
    );
}

pub(crate) fn output_note_json(notes: &[&Note]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(notes)
}
