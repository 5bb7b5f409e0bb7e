// ── Navigation collaborators ──
//
// Route table, edit-route resolver and the unsaved-changes guard shared
// by the CLI and TUI shells.

mod guard;
mod resolver;
mod route;

pub use guard::{Confirm, UNSAVED_CHANGES_MESSAGE, UnsavedChangesGuard};
pub use resolver::resolve_deviation;
pub use route::Route;
