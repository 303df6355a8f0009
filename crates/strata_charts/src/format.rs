//! Number formatting for axis labels.

const SUFFIXES: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Fixed-point rendering; non-finite values print as `NaN`, `Inf` or `-Inf`.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let s = if value > 0.0 { "Inf" } else { "-Inf" };
        return s.to_string();
    }
    format!("{value:.decimals$}")
}

/// Short label such as `12.4K`, `2M` or `0.5`.
pub fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return format_fixed(value, 0);
    }
    let abs = value.abs();
    match SUFFIXES.iter().find(|(scale, _)| abs >= *scale) {
        Some(&(scale, suffix)) => format!("{}{suffix}", trimmed(value / scale, 2)),
        None => trimmed(value, 3),
    }
}

// Fixed-point without trailing zeroes; "-0" collapses to "0".
fn trimmed(value: f64, decimals: usize) -> String {
    let raw = format_fixed(value + 0.0, decimals);
    let s = if raw.contains('.') {
        raw.trim_end_matches('0').trim_end_matches('.')
    } else {
        raw.as_str()
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
