use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, TableComponent,
    modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL,
};

use crate::ledger::readiness_percent;
use crate::utils::Timezone;

/// Width of the readiness bar, in characters
const BAR_WIDTH: usize = 20;

/// Shared knobs for every table renderer
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableOptions {
    pub(crate) use_color: bool,
    pub(crate) compact: bool,
    pub(crate) timezone: Timezone,
}

/// Shorten a UUID for display. Compact tables use the first block only.
pub(super) fn short_id(id: &str, compact: bool) -> String {
    let max_len = if compact { 8 } else { 13 };
    id.chars().take(max_len).collect()
}

pub(super) fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}

/// Text progress bar for a 0-10 score: "██████████░░░░░░░░░░  50%"
pub(super) fn readiness_bar(score: f64) -> String {
    let pct = readiness_percent(score);
    let filled = (usize::from(pct) * BAR_WIDTH + 50) / 100;
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        pct
    )
}

pub(super) fn styled_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    let mut cell = Cell::new(text);
    if let Some(c) = color {
        cell = cell.fg(c);
    }
    if bold {
        cell = cell.add_attribute(Attribute::Bold);
    }
    cell
}

pub(super) fn header_cell(text: &str, use_color: bool) -> Cell {
    let mut cell = Cell::new(text).add_attribute(Attribute::Bold);
    if use_color {
        cell = cell.fg(Color::Cyan);
    }
    cell
}

pub(super) fn right_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    styled_cell(text, color, bold).set_alignment(CellAlignment::Right)
}

/// Replace the double-line header separator (╞═╪═╡) with single-line (├─┼─┤)
fn normalize_header_separator(table: &mut Table) {
    table.set_style(TableComponent::HeaderLines, '─');
    table.set_style(TableComponent::LeftHeaderIntersection, '├');
    table.set_style(TableComponent::MiddleHeaderIntersections, '┼');
    table.set_style(TableComponent::RightHeaderIntersection, '┤');
}

/// Create a table with the standard preset, inner borders, and normalized header separator.
pub(super) fn create_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    normalize_header_separator(&mut table);
    table
}

pub(super) fn print_titled(title: &str, table: &Table, footer: &str) {
    println!("\n  {title}\n");
    println!("{table}");
    println!("\n  {footer}\n");
}
