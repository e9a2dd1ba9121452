//! Display strings for durations and counts

/// `m:ss`, or `h:mm:ss` from one hour up
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Duration label; `bracket` wraps it as ` (m:ss)` for header use
pub fn display_time(value: Option<f64>, bracket: bool) -> String {
    let value = match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => return String::new(),
    };
    if bracket && value < 1e-12 {
        return String::new();
    }
    let formatted = format_seconds(value.floor() as u64);
    if bracket {
        format!(" ({})", formatted)
    } else {
        formatted
    }
}

/// `"1 Track"`, `"N Tracks"`, empty for zero
pub fn display_count(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => "1 Track".to_string(),
        n => format!("{} Tracks", n),
    }
}
