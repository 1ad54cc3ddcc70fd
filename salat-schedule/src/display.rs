//! Names and ordering used by compact consumers (the widget view in
//! particular). Pure data; formatting is left to the caller.

/// Events shown by the compact view, in display order.
pub const WIDGET_PRAYERS: [&str; 5] = ["Dawn", "Sunrise", "Noon", "Sunset", "Maghrib"];

/// Conventional name for a source label (`Dawn` is shown as `Fajr`, `Noon`
/// as `Zuhr`); unknown labels come back unchanged.
pub fn display_name(label: &str) -> &str {
    match label {
        "Dawn" => "Fajr",
        "Noon" => "Zuhr",
        other => other,
    }
}
