//! Top-level error reporting.

use tracing::error;

use crate::error::BuildError;
use crate::render::RenderError;

/// Context label used for failures of the startup build.
pub const FULL_BUILD: &str = "Full build";

fn has_location(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<BuildError>()
        .and_then(BuildError::location)
        .or_else(|| error.downcast_ref::<RenderError>().and_then(RenderError::location))
        .is_some()
}

/// Render `error` the way it is logged: errors that point at a source
/// position are already self-explanatory, everything else gets its cause
/// chain.
pub fn format_error(error: &anyhow::Error) -> String {
    if has_location(error) {
        error.to_string()
    } else {
        format!("{error:?}")
    }
}

/// Log `error` under `context` (the operation or watch event that failed).
pub fn report_error(context: &str, error: impl Into<anyhow::Error>) {
    let error = error.into();
    error!(context = %context, "{}: {}", context, format_error(&error));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SourceLocation;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_located_errors_show_message_only() {
        let error: anyhow::Error = BuildError::from(RenderError::Syntax {
            path: PathBuf::from("spec/a-v1.md"),
            location: SourceLocation { line: 4, column: 2 },
            message: "invalid UTF-8".to_string(),
        })
        .into();

        assert_eq!(format_error(&error), "spec/a-v1.md:4:2: invalid UTF-8");
    }

    #[test]
    fn test_other_errors_show_cause_chain() {
        let error: anyhow::Error = BuildError::Write {
            path: PathBuf::from("build/a-v1.html"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only file system"),
        }
        .into();

        let formatted = format_error(&error);
        assert!(formatted.starts_with("failed to write build/a-v1.html"));
        assert!(formatted.contains("Caused by"));
        assert!(formatted.contains("read-only file system"));
    }

    #[test]
    fn test_report_error_accepts_build_errors() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            report_error(
                FULL_BUILD,
                BuildError::ListDir {
                    path: PathBuf::from("spec"),
                    source: io::Error::new(io::ErrorKind::NotFound, "missing"),
                },
            );
        });
    }
}
