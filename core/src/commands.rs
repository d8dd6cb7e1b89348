use std::path::Path;

use tracing::warn;

use crate::diagnostics;
use crate::error::{Alert, CoreError};

/// Runs a fallible action and converts any failure into an [`Alert`].
///
/// Failures are written to the diagnostics log under `<action>_error` when a
/// log directory is configured.
pub fn guarded<T, F>(log_dir: Option<&Path>, action: &str, f: F) -> Result<T, Alert>
where
    F: FnOnce() -> Result<T, CoreError>,
{
    f().map_err(|err| {
        warn!(action, error = %err, "action failed");
        if let Some(dir) = log_dir {
            let kind = format!("{}_error", action);
            let _ = diagnostics::log_event(dir, &kind, &format!("{} failed: {}", action, err));
        }
        Alert::from(&err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn success_passes_through() {
        let value = guarded(None, "noop", || Ok::<_, CoreError>(7)).expect("ok");
        assert_eq!(value, 7);
    }

    #[test]
    fn failures_become_alerts_and_are_logged() {
        let dir = tempdir().expect("temp");
        let alert = guarded(Some(dir.path()), "sign_in", || {
            Err::<(), _>(CoreError::External("INVALID_PASSWORD".to_string()))
        })
        .unwrap_err();
        assert_eq!(alert, Alert::new("Error", "INVALID_PASSWORD"));
        let log = fs::read_to_string(dir.path().join("diagnostics.log")).expect("log");
        assert!(log.contains("sign_in_error"));
        assert!(log.contains("INVALID_PASSWORD"));
    }
}
