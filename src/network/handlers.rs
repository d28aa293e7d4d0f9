//! Operational web handlers: status, reboot, factory reset.
//!
//! Transport-agnostic: the HTTP server (an external layer) maps routes onto
//! these functions and writes the returned [`HtmlResponse`] out. Reboot and
//! factory reset schedule the hard reset through [`Restart`], so the
//! transport still gets to flush the acknowledgement page.

use std::time::Duration;

use crate::store::ConfigStore;
use crate::system::reset::Restart;
use crate::templates;

/// Grace period between answering the request and the hard reset.
pub const RESET_ACK_DELAY: Duration = Duration::from_secs(1);

/// A rendered response for the external HTTP layer to write out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HtmlResponse {
    fn ok(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }
}

/// Seam to the external WiFi stack for the one operation the handlers
/// need: dropping the connection along with its stored credentials.
pub trait NetworkControl {
    fn disconnect(&self);
}

/// `GET /` — renders the telemetry snapshot supplied by the caller.
pub fn handle_status(telemetry: &serde_json::Value) -> HtmlResponse {
    HtmlResponse::ok(templates::render_status_page(telemetry))
}

/// `GET /reboot` — acknowledge, then schedule the hard reset.
pub fn handle_reboot(restart: &dyn Restart) -> HtmlResponse {
    log::info!("reboot requested from web interface");
    restart.restart(RESET_ACK_DELAY);
    HtmlResponse::ok(templates::render_reboot_page())
}

/// `GET /factoryreset` — wipe the stored configuration, drop the network
/// with its cached credentials, then schedule the hard reset. A wipe
/// failure is logged and the reset proceeds; the double-reset path remains
/// as the recovery of last resort.
pub fn handle_factory_reset(
    store: &ConfigStore,
    network: &dyn NetworkControl,
    restart: &dyn Restart,
) -> HtmlResponse {
    log::warn!("factory reset requested from web interface");
    if let Err(e) = store.wipe() {
        log::error!("failed to wipe configuration: {:#}", e);
    }
    network.disconnect();
    restart.restart(RESET_ACK_DELAY);
    HtmlResponse::ok(templates::render_factory_reset_page())
}
