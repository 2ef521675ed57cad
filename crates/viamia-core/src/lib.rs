//! Core of the VIA patcher: install lookup, archive handling and the patch pipeline.

pub mod archive;
pub mod config;
pub mod install;
pub mod patch;
pub mod utils;

pub use config::Config;
pub use install::{Platform, resolve_install_root};
pub use patch::{PatchError, ProgressEvent, run_pipeline};
