//! Status coloring for terminal output.

use comfy_table::Color;
use console::{Style, StyledObject};

/// Style for an ECS task status string.
///
/// Color scheme:
/// - Green:  RUNNING
/// - Yellow: PROVISIONING, PENDING, ACTIVATING
/// - Cyan:   DEACTIVATING, STOPPING, DEPROVISIONING
/// - Dim:    STOPPED, DELETED
/// - Plain:  anything else
pub fn status_style(status: &str) -> Style {
    match status.to_uppercase().as_str() {
        "RUNNING" => Style::new().green(),
        "PROVISIONING" | "PENDING" | "ACTIVATING" => Style::new().yellow(),
        "DEACTIVATING" | "STOPPING" | "DEPROVISIONING" => Style::new().cyan(),
        "STOPPED" | "DELETED" => Style::new().dim(),
        _ => Style::new(),
    }
}

/// Apply [`status_style`] unless colors are off
pub fn colorize_status(status: &str, use_colors: bool) -> StyledObject<&str> {
    status_style(status).force_styling(use_colors).apply_to(status)
}

/// comfy-table foreground for a pending count
pub fn pending_color(pending: i64) -> Option<Color> {
    (pending > 0).then_some(Color::Yellow)
}
