//! Number formats used in chart labels and tooltips.

/// Group the integer part of `value` with `,` every three digits.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let raw = format!("{:.0}", rounded.abs());
    let mut grouped_reversed = String::with_capacity(raw.len() + raw.len() / 3 + 1);
    for (idx, ch) in raw.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped_reversed.push(',');
        }
        grouped_reversed.push(ch);
    }
    let grouped: String = grouped_reversed.chars().rev().collect();
    if negative { format!("-{grouped}") } else { grouped }
}

/// Dollar amount with thousands separators, e.g. `$61,000`.
pub fn format_currency(value: f64) -> String {
    format!("${}", format_thousands(value))
}

/// Whole-number percentage, e.g. `42%`. Halves round up.
pub fn format_percent(value: f64) -> String {
    format!("{:.0}%", round_half_up(value))
}

/// Percentage-point difference with an explicit `+` for gains, e.g. `+5%`.
pub fn format_signed_percent(value: f64) -> String {
    let rounded = round_half_up(value);
    if rounded > 0.0 {
        format!("+{rounded:.0}%")
    } else {
        format!("{rounded:.0}%")
    }
}

fn round_half_up(value: f64) -> f64 {
    // Adding zero turns -0.0 into 0.0 so it never prints as "-0".
    (value + 0.5).floor() + 0.0
}

/// Fixed number of decimals, e.g. `5.25`.
pub fn format_decimals(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}
