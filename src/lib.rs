//! Provisioning and bootstrap core for a network-connected heat pump
//! monitor.
//!
//! On every boot the [`provisioning::Orchestrator`] decides whether to
//! reuse the stored configuration, collect a new one through a temporary
//! access point, or wipe everything on a double-reset signal, then commits
//! the result back to the [`store::ConfigStore`]. The WiFi radio, captive
//! portal, and HTTP transport are external collaborators behind the
//! [`provisioning::ProvisioningPortal`], [`network::NetworkControl`], and
//! [`system::Restart`] seams, which keeps this whole crate testable on the
//! host.

pub mod config;
pub mod network;
pub mod provisioning;
pub mod reset_intent;
pub mod store;
pub mod system;
pub mod templates;

pub use config::{ConfigRecord, Field, FIELD_CAPACITY, PORT_CAPACITY};
pub use provisioning::{BootOutcome, Orchestrator, PortalOutcome, ProvisioningPortal};
pub use reset_intent::DoubleResetDetector;
pub use store::{ConfigStore, LoadedConfig};
