use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

const MARKER_FILE: &str = "boot_marker.json";

/// Two boots starting within this window count as a double reset.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize, Deserialize)]
struct BootMarker {
    boot_unix_ms: u64,
}

/// Detects the operator's double-power-cycle signal.
///
/// Each boot arms a timestamped marker file; a boot that finds a marker
/// still inside the detection window reports intent and disarms. Detection
/// is best-effort: any storage or clock failure reads as "no intent" so a
/// broken marker can never block boot.
pub struct DoubleResetDetector {
    marker_path: PathBuf,
    window: Duration,
}

impl DoubleResetDetector {
    pub fn new(root: impl Into<PathBuf>, window: Duration) -> Self {
        Self {
            marker_path: root.into().join(MARKER_FILE),
            window,
        }
    }

    /// Reports whether the operator requested a configuration wipe.
    ///
    /// Mutates the marker state, so call it exactly once per boot and keep
    /// the result rather than calling again.
    pub fn detect(&self) -> bool {
        let now_ms = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_millis() as u64,
            Err(e) => {
                log::warn!("clock unavailable for reset detection: {}", e);
                return false;
            }
        };

        if let Some(armed_ms) = self.read_marker() {
            if now_ms.saturating_sub(armed_ms) <= self.window.as_millis() as u64 {
                log::info!("double reset detected");
                self.disarm();
                return true;
            }
        }

        self.arm(now_ms);
        false
    }

    fn read_marker(&self) -> Option<u64> {
        let raw = match fs::read_to_string(&self.marker_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("failed to read boot marker: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<BootMarker>(&raw) {
            Ok(marker) => Some(marker.boot_unix_ms),
            Err(e) => {
                log::warn!("malformed boot marker ({}), ignoring", e);
                None
            }
        }
    }

    fn arm(&self, now_ms: u64) {
        if let Some(parent) = self.marker_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("cannot create marker dir: {}", e);
                return;
            }
        }
        let marker = BootMarker { boot_unix_ms: now_ms };
        match serde_json::to_vec(&marker) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.marker_path, json) {
                    log::warn!("failed to arm reset detection: {}", e);
                }
            }
            Err(e) => log::warn!("failed to encode boot marker: {}", e),
        }
    }

    fn disarm(&self) {
        if let Err(e) = fs::remove_file(&self.marker_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("failed to disarm reset detection: {}", e);
            }
        }
    }
}
