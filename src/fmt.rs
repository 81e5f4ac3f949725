//! Humanized number formatting for counts and durations.

/// Scale a nanosecond duration into the largest unit that keeps the value
/// above 1. Zero has no meaningful unit and yields `None`.
pub fn format_duration(duration_ns: u64) -> Option<(f64, &'static str)> {
    const SCALES: [f64; 4] = [1.0, 1e3, 1e6, 1e9];
    const UNITS: [&str; 4] = ["ns", "µs", "ms", "s"];

    if duration_ns == 0 {
        return None;
    }

    let magnitude = (duration_ns as f64).log10() / 3.0;
    let scale = (magnitude.floor() as usize).min(SCALES.len() - 1);
    Some((duration_ns as f64 / SCALES[scale], UNITS[scale]))
}

/// Format a scaled duration value with at most one fraction digit.
pub fn format_scaled(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        group_thousands(rounded as u64)
    } else {
        format!("{}.{}", group_thousands(rounded.trunc() as u64), (rounded.fract() * 10.0).round() as u64)
    }
}

/// Comma-group an integer: 1234567 -> "1,234,567".
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
