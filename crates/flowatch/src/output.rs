//! Shared terminal formatting helpers.

/// Format an interface speed in Mbps as a human-readable string.
pub fn format_speed(mbps: u64) -> String {
    match mbps {
        0 => String::new(),
        m if m >= 1_000_000 => format!("{} Tbps", m / 1_000_000),
        m if m >= 1_000 => format!("{} Gbps", m / 1_000),
        m => format!("{m} Mbps"),
    }
}

/// Format a bit rate as a human-readable string.
pub fn format_bps(bps: f64) -> String {
    match bps {
        b if b >= 1e9 => format!("{:.2} Gbps", b / 1e9),
        b if b >= 1e6 => format!("{:.2} Mbps", b / 1e6),
        b if b >= 1e3 => format!("{:.2} Kbps", b / 1e3),
        b => format!("{b:.0} bps"),
    }
}

/// Shorten a string to `max` characters, appending "..." when truncated.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let head: String = s.chars().take(max - 3).collect();
    format!("{head}...")
}
