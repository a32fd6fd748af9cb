use comfy_table::{Cell, Color};

use crate::ledger::{Objective, Task, TaskStatus};
use crate::output::format::{
    TableOptions, create_styled_table, header_cell, print_titled, right_cell, short_id,
    styled_cell,
};

fn status_color(status: TaskStatus, use_color: bool) -> Option<Color> {
    if !use_color {
        return None;
    }
    Some(match status {
        TaskStatus::Todo => Color::Yellow,
        TaskStatus::Doing => Color::Cyan,
        TaskStatus::Done => Color::Green,
    })
}

pub(crate) fn print_task_table(tasks: &[&Task], objective: &Objective, opts: TableOptions) {
    let c = opts.use_color;
    let mut table = create_styled_table();
    let mut header = vec![
        header_cell("Task", c),
        header_cell("Created", c),
        header_cell("Status", c),
        header_cell("D", c),
        header_cell("Title", c),
    ];
    if !opts.compact {
        header.push(header_cell("Completed", c));
    }
    table.set_header(header);

    for task in tasks {
        let mut row = vec![
            Cell::new(short_id(&task.task_id, opts.compact)),
            Cell::new(opts.timezone.display(task.created_at)),
            styled_cell(
                &task.status.as_str().to_uppercase(),
                status_color(task.status, c),
                task.status == TaskStatus::Doing,
            ),
            right_cell(&task.difficulty.to_string(), None, false),
            Cell::new(&task.title),
        ];
        if !opts.compact {
            let completed = task
                .completed_at
                .map(|ts| opts.timezone.display(ts))
                .unwrap_or_default();
            row.push(Cell::new(completed));
        }
        table.add_row(row);
    }

    let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    print_titled(
        "Tasks Ledger",
        &table,
        &format!("{done}/{} done | Next objective: {objective}", tasks.len()),
    );
}

pub(crate) fn output_task_json(tasks: &[&Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tasks)
}
