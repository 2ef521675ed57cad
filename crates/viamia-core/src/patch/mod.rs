pub mod backup;
mod constants;
pub mod content;
mod error;
pub mod layout;
pub mod pipeline;
pub mod targets;

// Re-export public items
pub use backup::backup_archive;
pub use constants::{ARCHIVE_NAME, BACKUP_NAME, WORKING_DIR_NAME};
pub use content::{patch_file, replace_keyboards_url};
pub use error::PatchError;
pub use layout::ArchiveLayout;
pub use pipeline::{PatchSummary, ProgressEvent, run_pipeline};
pub use targets::{PatchTarget, TargetKind, resolve_targets};
