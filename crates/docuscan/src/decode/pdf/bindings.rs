use super::error::PdfError;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Mutex;

/// Environment variable naming a directory that contains the pdfium shared library.
pub const PDFIUM_DIR_ENV: &str = "DOCUSCAN_PDFIUM_DIR";

/// Cached outcome of the first Pdfium binding attempt.
enum InitializationState {
    Uninitialized,
    /// Binding succeeded; fresh bindings are created from the same location.
    Initialized { lib_dir: Option<PathBuf> },
    /// Binding failed; the error is replayed without retrying.
    Failed(String),
}

/// Pdfium is bound on first use and the location is reused for the life of the process.
///
/// The state, not the bindings, is cached: `Box<dyn PdfiumLibraryBindings>` is not `Clone`,
/// and creating bindings from a known location is cheap.
static PDFIUM_STATE: Lazy<Mutex<InitializationState>> = Lazy::new(|| Mutex::new(InitializationState::Uninitialized));

fn configured_lib_dir() -> Option<PathBuf> {
    std::env::var_os(PDFIUM_DIR_ENV)
        .map(PathBuf::from)
        .filter(|dir| !dir.as_os_str().is_empty())
}

fn bind_at(lib_dir: Option<&PathBuf>) -> Result<Box<dyn PdfiumLibraryBindings>, String> {
    match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            .map_err(|e| format!("Failed to bind Pdfium in '{}': {}", dir.display(), e)),
        None => Pdfium::bind_to_system_library().map_err(|e| format!("Failed to bind system Pdfium: {}", e)),
    }
}

/// Get Pdfium bindings, initializing on the first call.
///
/// `context` is included in error messages to tell callers apart.
pub(crate) fn bind_pdfium(context: &'static str) -> Result<Box<dyn PdfiumLibraryBindings>, PdfError> {
    let mut state = PDFIUM_STATE
        .lock()
        .map_err(|e| PdfError::BindingFailed(format!("Pdfium state lock poisoned ({}): {}", context, e)))?;

    match &*state {
        InitializationState::Uninitialized => {
            let lib_dir = configured_lib_dir();
            match bind_at(lib_dir.as_ref()) {
                Ok(bindings) => {
                    tracing::debug!(lib_dir = ?lib_dir, "Pdfium bound");
                    *state = InitializationState::Initialized { lib_dir };
                    Ok(bindings)
                }
                Err(err) => {
                    tracing::warn!("Pdfium initialization failed ({}): {}", context, err);
                    *state = InitializationState::Failed(err.clone());
                    Err(PdfError::BindingFailed(format!("{} ({})", err, context)))
                }
            }
        }
        InitializationState::Initialized { lib_dir } => {
            bind_at(lib_dir.as_ref()).map_err(|err| PdfError::BindingFailed(format!("{} ({})", err, context)))
        }
        InitializationState::Failed(err) => Err(PdfError::BindingFailed(format!(
            "initialization previously failed ({}): {}",
            context, err
        ))),
    }
}

/// Whether Pdfium can be bound in this process.
pub fn pdfium_available() -> bool {
    bind_pdfium("availability probe").is_ok()
}
