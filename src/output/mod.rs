mod format;
mod note;
mod score;
mod session;
mod task;

pub(crate) use format::TableOptions;
pub(crate) use note::{output_note_json, print_note_table};
pub(crate) use score::{output_score_json, print_score_table};
pub(crate) use session::{
    SessionSnapshot, output_session_json, output_snapshot_json, print_session_snapshot,
    print_session_table,
};
pub(crate) use task::{output_task_json, print_task_table};
