use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use tracing::debug;
use viamia_core::install::detect_install_guess;
use viamia_core::patch::PatchSummary;
use viamia_core::{Config, PatchError, Platform, ProgressEvent, resolve_install_root, run_pipeline};

/// Everything went through, or the operator declined
pub const EXIT_SUCCESS: i32 = 0;
/// Install, archive or target file not found; nothing was modified
pub const EXIT_NOT_FOUND: i32 = 1;
/// I/O, backup or archive failure
pub const EXIT_FAILURE: i32 = 2;

/// How an interactive run ended without error
#[derive(Debug)]
pub enum Outcome {
    Patched(PatchSummary),
    Declined,
}

pub fn exit_code(error: &PatchError) -> i32 {
    if error.is_precondition() {
        EXIT_NOT_FOUND
    } else {
        EXIT_FAILURE
    }
}

fn print_banner() {
    println!("ViaMia - v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "If you encounter any issues with VIA after running this tool, do not contact the VIA team. Contact ViaMia."
    );
    println!(" ");
    println!("Important: close VIA before continuing.");
    println!(" ");
}

fn prompt_error(e: dialoguer::Error) -> PatchError {
    PatchError::PromptFailed {
        reason: e.to_string(),
    }
}

fn ask_install_path() -> io::Result<String> {
    println!("Autodetection of the VIA install directory failed.");
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Please enter the path manually")
        .interact_text()
        .map_err(|e| io::Error::other(e.to_string()))
}

/// Console line for a pipeline event, if it warrants one.
fn format_event(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::BackedUp { .. } => {
            Some("Created a backup of the original VIA resources.".to_string())
        }
        ProgressEvent::Unpacking { .. } => {
            Some("Unpacking resources from ASAR (this may take a while).".to_string())
        }
        ProgressEvent::Unpacked { .. } => Some("ASAR unpacked.".to_string()),
        ProgressEvent::Patching { file } => Some(format!("Reading file: {}", file.display())),
        ProgressEvent::Patched { file, replacements } => Some(format!(
            "Modded file: {} ({} replaced)",
            file.display(),
            replacements
        )),
        ProgressEvent::Repacking { .. } => {
            Some("All target files modified.\nRepacking ASAR. Almost done.".to_string())
        }
        ProgressEvent::Repacked { .. } => Some("ASAR repacked. Cleaning up.".to_string()),
        ProgressEvent::CleaningUp { .. } => None,
        ProgressEvent::Done { .. } => Some("Mod done, ViaMia out.".to_string()),
    }
}

/// Closing lines after a successful run.
pub fn format_summary(summary: &PatchSummary) -> String {
    format!(
        "Replaced {} keyboard URL(s) in {} file(s).\nOriginal resources kept at {}",
        summary.replacements,
        summary.files_patched,
        summary.backup.display()
    )
}

/// Interactive run: confirm, locate VIA, then patch it.
pub fn run(config: &Config) -> Result<Outcome, PatchError> {
    print_banner();

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("I understand what I'm doing")
        .default(true)
        .interact()
        .map_err(prompt_error)?;
    if !confirmed {
        return Ok(Outcome::Declined);
    }

    let platform = Platform::current();
    debug!(%platform, url = %config.replacement_url, "starting");

    let install_root = resolve_install_root(detect_install_guess(), ask_install_path)?;
    println!("VIA install found in: {}", install_root.display());

    let summary = run_pipeline(&install_root, platform, config, |event| {
        if let Some(line) = format_event(&event) {
            println!("{}", line);
        }
    })?;

    Ok(Outcome::Patched(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_files_exit_with_not_found() {
        let err = PatchError::TargetNotFound {
            path: PathBuf::from("app/main.prod.js"),
            version: None,
            incompatible: false,
        };
        assert_eq!(exit_code(&err), EXIT_NOT_FOUND);
        assert_eq!(
            exit_code(&PatchError::InstallNotFound {
                path: PathBuf::from("/nope")
            }),
            EXIT_NOT_FOUND
        );
    }

    #[test]
    fn io_trouble_exits_with_failure() {
        let err = PatchError::RepackFailed {
            reason: "disk full".to_string(),
        };
        assert_eq!(exit_code(&err), EXIT_FAILURE);
        assert_ne!(exit_code(&err), EXIT_SUCCESS);
    }

    #[test]
    fn patched_event_names_file_and_count() {
        let line = format_event(&ProgressEvent::Patched {
            file: PathBuf::from("app/main.prod.js"),
            replacements: 2,
        })
        .unwrap();
        assert!(line.contains("main.prod.js"));
        assert!(line.contains('2'));
    }

    #[test]
    fn cleanup_is_silent() {
        let event = ProgressEvent::CleaningUp {
            working_dir: PathBuf::from("resources/app_unpacked"),
        };
        assert_eq!(format_event(&event), None);
    }

    #[test]
    fn summary_reports_replacements_and_backup() {
        let summary = PatchSummary {
            backup: PathBuf::from("resources/app.asar.bac"),
            files_patched: 2,
            replacements: 3,
        };

        let text = format_summary(&summary);

        assert!(text.starts_with("Replaced 3 keyboard URL(s) in 2 file(s)."));
        assert!(text.ends_with("resources/app.asar.bac"));
    }

    #[test]
    fn done_event_closes_run() {
        assert_eq!(
            format_event(&ProgressEvent::Done { files_patched: 2 }).as_deref(),
            Some("Mod done, ViaMia out.")
        );
    }
}
