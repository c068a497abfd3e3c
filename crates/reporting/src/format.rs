//! Display formatting in Brazilian Portuguese conventions: `.` groups
//! thousands, `,` separates decimals, currency is prefixed with `R$`.
//!
//! Percentages and compact numbers keep the dashboard's fixed-point style
//! (`12.50%`, `1.5M`).

use crate::finalize::MICROS_PER_UNIT;

const ZERO_BRL: &str = "R$ 0,00";

/// Format a currency amount, rounding half away from zero to centavos.
pub fn format_currency(units: f64) -> String {
    if !units.is_finite() {
        return ZERO_BRL.to_string();
    }
    let cents = (units.abs() * 100.0).round() as u128;
    let sign = if units < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {},{:02}", group_thousands(cents / 100), cents % 100)
}

/// Micros to BRL, two decimals.
pub fn format_cost(cost_micros: u64) -> String {
    format_micros(cost_micros as f64)
}

fn format_micros(micros: f64) -> String {
    format_currency(micros / MICROS_PER_UNIT)
}

/// Integer with `.` grouping, e.g. `1.234.567`.
pub fn format_impressions(n: u64) -> String {
    group_thousands(n as u128)
}

/// Clicks over impressions as a two-decimal percentage.
pub fn calculate_ctr(clicks: u64, impressions: u64) -> String {
    if impressions == 0 {
        return "0%".to_string();
    }
    format_percentage(clicks as f64 / impressions as f64)
}

/// Cost per click in BRL.
pub fn calculate_avg_cpc(cost_micros: u64, clicks: u64) -> String {
    if clicks == 0 {
        return ZERO_BRL.to_string();
    }
    format_micros(cost_micros as f64 / clicks as f64)
}

/// Cost per (possibly fractional) conversion in BRL.
pub fn calculate_cost_per_conversion(cost_micros: u64, conversions: f64) -> String {
    if conversions <= 0.0 || !conversions.is_finite() {
        return ZERO_BRL.to_string();
    }
    format_micros(cost_micros as f64 / conversions)
}

/// Ratio as a percentage with two decimals, e.g. `0.125` -> `12.50%`.
pub fn format_percentage(ratio: f64) -> String {
    if !ratio.is_finite() {
        return "0%".to_string();
    }
    format!("{}%", to_fixed(ratio * 100.0, 2))
}

/// Compact form with `B`/`M`/`K` suffix and one decimal, or the plain
/// number below a thousand.
pub fn format_large_number(n: u64) -> String {
    let value = n as f64;
    if n >= 1_000_000_000 {
        format!("{}B", to_fixed(value / 1e9, 1))
    } else if n >= 1_000_000 {
        format!("{}M", to_fixed(value / 1e6, 1))
    } else if n >= 1_000 {
        format!("{}K", to_fixed(value / 1e3, 1))
    } else {
        n.to_string()
    }
}

/// Fixed-point rendering of the exact binary value with ties rounded away
/// from zero, e.g. `1.25` -> `1.3` but `1.005` -> `1.00`. Non-finite input
/// renders as zero.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let precision = exact_fraction_digits(value).max(digits);
    let exact = format!("{:.*}", precision, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(digits))
        .collect();
    if frac_part.as_bytes().get(digits).is_some_and(|d| *d >= b'5') {
        round_up(&mut kept);
    }

    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(kept[..split].iter().map(|d| *d as char));
    if digits > 0 {
        out.push('.');
        out.extend(kept[split..].iter().map(|d| *d as char));
    }
    out
}

/// Number of fractional decimal digits needed to print `value` exactly.
fn exact_fraction_digits(value: f64) -> usize {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    if mantissa == 0 {
        return 0;
    }
    let lowest_bit = exponent + mantissa.trailing_zeros() as i32;
    if lowest_bit < 0 {
        lowest_bit.unsigned_abs() as usize
    } else {
        0
    }
}

/// Add one unit in the last place of an ASCII digit string.
fn round_up(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
