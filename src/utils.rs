/// Formats a number for labels: whole numbers without decimals, others with two.
/// Non-finite values render as "—".
pub fn fmt_number(v: f64) -> String {
    if !v.is_finite() {
        "—".to_owned()
    } else if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}
