//! CLI command handlers, one file per command.

mod categories;
mod completions;
mod download;
mod list;
mod man;
mod status;

pub use categories::run_categories;
pub use completions::run_completions;
pub use download::run_download;
pub use list::run_list;
pub use man::run_man;
pub use status::run_status;

use aerials_core::transfer::LocalState;

/// Short state column shared by `list` and `status`.
pub(crate) fn describe_local(state: &std::io::Result<LocalState>) -> String {
    match state {
        Ok(LocalState::Complete { size }) => format!("complete ({} bytes)", size),
        Ok(LocalState::Partial { size }) => format!("partial ({} bytes staged)", size),
        Ok(LocalState::Missing) => "missing".to_string(),
        Err(e) => format!("unreadable: {}", e),
    }
}
