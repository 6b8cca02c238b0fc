//! Credit and progress formatting shared by every consumer of the projections.
//!
//! Profit totals are shown in three magnitudes (Cr, MCr, BCr). All helpers
//! accept a `european` flag that swaps `.` and `,` so `1,234,567.50` renders
//! as `1.234.567,50`.

/// Swap `.` and `,` in an already formatted number.
fn europeanize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '.' => ',',
            ',' => '.',
            other => other,
        })
        .collect()
}

#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Insert `,` thousands separators into a string of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a credit amount with thousands separators.
///
/// # Examples
/// ```
/// use edlt_types::formatting::format_credits;
/// assert_eq!(format_credits(0, false), "0");
/// assert_eq!(format_credits(15_000, false), "15,000");
/// assert_eq!(format_credits(1_234_567, true), "1.234.567");
/// assert_eq!(format_credits(-2_500, false), "-2,500");
/// ```
pub fn format_credits(amount: i64, european: bool) -> String {
    let grouped = group_thousands(&amount.unsigned_abs().to_string());
    let s = if amount < 0 { format!("-{grouped}") } else { grouped };
    maybe_eu(s, european)
}

/// Format a scaled credit amount with two decimals and grouped integer part.
fn format_scaled(amount: i64, divisor: f64, european: bool) -> String {
    let scaled = format!("{:.2}", amount as f64 / divisor);
    let (sign, body) = match scaled.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", scaled.as_str()),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, "00"));
    maybe_eu(
        format!("{sign}{}.{frac_part}", group_thousands(int_part)),
        european,
    )
}

/// Format an amount in millions of credits (MCr).
///
/// # Examples
/// ```
/// use edlt_types::formatting::format_mega_credits;
/// assert_eq!(format_mega_credits(15_000_000, false), "15.00");
/// assert_eq!(format_mega_credits(2_500_000, true), "2,50");
/// ```
pub fn format_mega_credits(amount: i64, european: bool) -> String {
    format_scaled(amount, 1_000_000.0, european)
}

/// Format an amount in billions of credits (BCr).
///
/// # Examples
/// ```
/// use edlt_types::formatting::format_billion_credits;
/// assert_eq!(format_billion_credits(1_500_000_000, false), "1.50");
/// ```
pub fn format_billion_credits(amount: i64, european: bool) -> String {
    format_scaled(amount, 1_000_000_000.0, european)
}

/// Format a 0.0-1.0 progress fraction as a whole percentage.
///
/// # Examples
/// ```
/// use edlt_types::formatting::format_progress;
/// assert_eq!(format_progress(0.0), "0%");
/// assert_eq!(format_progress(0.455), "45%");
/// assert_eq!(format_progress(1.0), "100%");
/// ```
pub fn format_progress(fraction: f64) -> String {
    let pct = (fraction.clamp(0.0, 1.0) * 100.0).floor() as i64;
    format!("{pct}%")
}
