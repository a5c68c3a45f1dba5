//! Human-readable track figures

/// Format a second count as `HH:MM:SS`
pub fn format_duration(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Format meters as kilometers with two decimals, e.g. `1.25 km`
pub fn format_distance_km(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}
