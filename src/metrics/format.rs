//! Number formatting for cards and tables.

/// Compact human-readable count: `950`, `12.5K`, `3.4M`, `1.2B`.
#[must_use]
pub fn compact_number(value: f64) -> String {
    const UNITS: &[&str] = &["K", "M", "B", "T"];

    let sign = if value < 0.0 { "-" } else { "" };
    let mut size = value.abs();
    if size < 999.5 {
        return format!("{sign}{size:.0}");
    }

    for unit in UNITS {
        size /= 1000.0;
        // 999.96K would print as "1000.0K"; promote to the next unit.
        if size < 999.95 {
            return format!("{sign}{size:.1}{unit}");
        }
    }
    format!("{sign}{size:.1}T")
}

/// Signed percent change: `+12.3%`, `-4.0%`, `0.0%`.
#[must_use]
pub fn percent_change(pct: f64) -> String {
    let rounded = (pct * 10.0).round() / 10.0;
    if rounded > 0.0 {
        format!("+{rounded:.1}%")
    } else if rounded < 0.0 {
        format!("{rounded:.1}%")
    } else {
        "0.0%".to_string()
    }
}

/// Plain percentage with one decimal: `4.2%`.
#[must_use]
pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}
