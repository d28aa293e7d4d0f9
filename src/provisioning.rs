//! Boot-time provisioning sequence.
//!
//! One run per boot: consult the double-reset detector, seed field values
//! from the store (or wipe it), hand control to the provisioning portal,
//! and commit the outcome. The portal itself (silent reconnect, temporary
//! access point, captive form) is an external dependency behind the
//! [`ProvisioningPortal`] trait.

use std::time::Duration;

use crate::config::{ConfigRecord, Field, FIELD_CAPACITY, PORT_CAPACITY};
use crate::reset_intent::DoubleResetDetector;
use crate::store::{ConfigStore, LoadedConfig};
use crate::system::reset::Restart;

/// Network identity of the temporary access point.
pub const AP_NAME: &str = "HeatMon-Setup";

/// Pause before the restart that follows a portal timeout, so a dead
/// portal cannot spin the device in a tight reset loop.
pub const RESTART_BACKOFF: Duration = Duration::from_secs(3);

/// One form field handed to the portal: identifier, operator-facing label,
/// capacity, and the seed value shown in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalField {
    pub id: &'static str,
    pub label: &'static str,
    pub max_len: usize,
    pub value: String,
}

/// Everything the portal needs for one collection cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSession {
    pub ap_name: &'static str,
    pub fields: Vec<PortalField>,
}

impl PortalSession {
    /// Builds the session from the current (possibly blank) record.
    pub fn seeded(record: &ConfigRecord) -> Self {
        let field = |id, label, max_len, value: &str| PortalField {
            id,
            label,
            max_len,
            value: value.to_string(),
        };
        Self {
            ap_name: AP_NAME,
            fields: vec![
                field("wifi_hostname", "wifi hostname", FIELD_CAPACITY, record.wifi_hostname.as_str()),
                field("ota_password", "ota password", FIELD_CAPACITY, record.ota_password.as_str()),
                field("remote_host", "remote host", FIELD_CAPACITY, record.remote_host.as_str()),
                field("remote_port", "remote port", PORT_CAPACITY, record.remote_port.as_str()),
                field("remote_username", "remote username", FIELD_CAPACITY, record.remote_username.as_str()),
                field("remote_password", "remote password", FIELD_CAPACITY, record.remote_password.as_str()),
            ],
        }
    }
}

/// Raw operator-submitted values as the portal hands them back. Lengths
/// are untrusted here; [`PortalSubmission::into_record`] clamps them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalSubmission {
    pub wifi_hostname: String,
    pub ota_password: String,
    pub remote_host: String,
    pub remote_port: String,
    pub remote_username: String,
    pub remote_password: String,
}

impl PortalSubmission {
    pub fn into_record(self) -> ConfigRecord {
        ConfigRecord {
            wifi_hostname: Field::new(&self.wifi_hostname),
            ota_password: Field::new(&self.ota_password),
            remote_host: Field::new(&self.remote_host),
            remote_port: Field::new(&self.remote_port),
            remote_username: Field::new(&self.remote_username),
            remote_password: Field::new(&self.remote_password),
        }
    }
}

/// Result of one portal collection cycle.
///
/// The save signal travels in the outcome value, so it is consumed with
/// the outcome and cannot leak into a later cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalOutcome {
    /// The network is up. `save_requested` is true only when the operator
    /// actually submitted the form, not on silent reconnection.
    Connected {
        submission: PortalSubmission,
        save_requested: bool,
    },
    /// No usable cached credentials and no operator action before the
    /// portal's window closed.
    TimedOut,
}

/// The external captive-portal / reconnect dependency.
pub trait ProvisioningPortal {
    /// Attempts silent reconnection with cached credentials, falling back
    /// to a temporary access point named `session.ap_name` that blocks
    /// until submission or timeout.
    fn run(&mut self, session: PortalSession) -> PortalOutcome;

    /// Drops any network credentials the portal layer caches on its own,
    /// so a wipe clears both the record and the radio's stored state.
    fn clear_cached_credentials(&mut self);
}

/// What the boot sequence resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// Connected; these field values are authoritative for this boot
    /// whether or not they were persisted.
    Ready(ConfigRecord),
    /// Portal timed out; a hard reset is scheduled and the next boot
    /// starts the sequence over.
    RestartScheduled,
}

/// Drives one boot through the provisioning sequence.
pub struct Orchestrator<'a, P: ProvisioningPortal, R: Restart> {
    store: &'a ConfigStore,
    detector: &'a DoubleResetDetector,
    portal: &'a mut P,
    restart: &'a R,
}

impl<'a, P: ProvisioningPortal, R: Restart> Orchestrator<'a, P, R> {
    pub fn new(
        store: &'a ConfigStore,
        detector: &'a DoubleResetDetector,
        portal: &'a mut P,
        restart: &'a R,
    ) -> Self {
        Self {
            store,
            detector,
            portal,
            restart,
        }
    }

    pub fn run(self) -> BootOutcome {
        let seeds = if self.detector.detect() {
            log::warn!("double reset detected, clearing configuration");
            if let Err(e) = self.store.wipe() {
                log::warn!("wipe failed, proceeding unprovisioned anyway: {:#}", e);
            }
            self.portal.clear_cached_credentials();
            log::info!("configuration cleared; connect to '{}' to reconfigure", AP_NAME);
            ConfigRecord::default()
        } else {
            match self.store.load() {
                LoadedConfig::Present(record) => record,
                LoadedConfig::Absent => ConfigRecord::default(),
            }
        };

        log::info!("starting provisioning portal '{}'", AP_NAME);
        match self.portal.run(PortalSession::seeded(&seeds)) {
            PortalOutcome::TimedOut => {
                log::error!("portal timed out with no usable configuration");
                self.restart.restart(RESTART_BACKOFF);
                BootOutcome::RestartScheduled
            }
            PortalOutcome::Connected {
                submission,
                save_requested,
            } => {
                log::info!("network connected");
                let record = submission.into_record();
                if save_requested {
                    if let Err(e) = self.store.save(&record) {
                        // Run on the in-memory values; the operator can
                        // re-submit on a later boot.
                        log::error!("failed to persist configuration: {:#}", e);
                    }
                } else {
                    log::debug!("no save requested, stored record left untouched");
                }
                BootOutcome::Ready(record)
            }
        }
    }
}
