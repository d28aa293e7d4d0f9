// HTML templates for the operational web pages
// Separated from the handlers for better maintainability

use std::fmt::Write as _;

/// Topic prefix shown next to each telemetry key on the status page.
pub const TOPIC_PREFIX: &str = "heatpump/sdc";

const PAGE_HEAD: &str = "<!DOCTYPE html>\n<html>\
<title>Heat pump monitor</title>\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<link rel=\"stylesheet\" href=\"https://www.w3schools.com/w3css/4/w3.css\">\
<style>.w3-btn {margin-bottom:10px;}</style>\
<body>\
<header class=\"w3-container w3-card w3-theme\">\
<h1>Heat pump monitor configuration</h1>\
</header>";

const PAGE_FOOT: &str = "</body></html>";

fn action_form(action: &str, caption: &str) -> String {
    format!(
        "<form action=\"{action}\" method=\"get\">\
<button class=\"w3-btn w3-white w3-border w3-round-large\" type=\"submit\">{caption}</button>\
</form>"
    )
}

/// Status page: operator actions plus the current telemetry table.
pub fn render_status_page(telemetry: &serde_json::Value) -> String {
    let mut html = String::from(PAGE_HEAD);
    html.push_str("<div class=\"w3-container w3-center\">");
    html.push_str("<p>Use this page to control your heat pump monitor</p>");
    html.push_str(&action_form("/reboot", "Reboot monitor"));
    html.push_str(&action_form("/factoryreset", "Factory reset"));
    html.push_str("</div>");

    html.push_str("<div class=\"w3-container w3-center\">");
    html.push_str("<h2>Current heat pump values</h2>");
    html.push_str(
        "<table class=\"w3-table-all\"><thead>\
<tr class=\"w3-theme\"><th>Topic</th><th>Value</th></tr></thead>",
    );
    if let Some(map) = telemetry.as_object() {
        for (key, value) in map {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let _ = write!(
                html,
                "<tr><td>{TOPIC_PREFIX}/{key}</td><td>{rendered}</td></tr>"
            );
        }
    }
    html.push_str("</table></div>");
    html.push_str(PAGE_FOOT);
    html
}

/// Acknowledgement shown while a plain reboot is pending. Refreshes back
/// to the status page once the device is up again.
pub fn render_reboot_page() -> String {
    let mut html = String::from(PAGE_HEAD);
    html.push_str("<meta http-equiv=\"refresh\" content=\"5; url=/\" />");
    html.push_str("<div class=\"w3-container w3-center\"><p>Rebooting</p></div>");
    html.push_str(PAGE_FOOT);
    html
}

/// Acknowledgement shown while a factory reset is pending.
pub fn render_factory_reset_page() -> String {
    let mut html = String::from(PAGE_HEAD);
    html.push_str(
        "<div class=\"w3-container w3-center\">\
<p>Removing configuration. To reconfigure please connect to the setup hotspot after reset.</p>\
</div>",
    );
    html.push_str(PAGE_FOOT);
    html
}
