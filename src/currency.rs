//! Indonesian Rupiah formatting.
//!
//! Amounts are grouped the way the `id-ID` locale does it: a dot between
//! thousands, a comma before the fraction, and at most three fraction digits
//! with trailing zeros dropped, e.g. `Rp 1.234.567,5`.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

const MAX_FRACTION_DIGITS: u32 = 3;

/// numfmt switches to scientific notation from this magnitude on.
const NUMFMT_LIMIT: f64 = 1e12;

/// Format `number` as Rupiah, e.g. `Rp 12.500` or `Rp -1.000`.
///
/// Non-finite numbers are formatted as zero.
pub fn format_rupiah(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("Rp ")
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("Rp -")
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    let number = if number.is_finite() { number } else { 0.0 };
    let magnitude = number.abs();
    let scale = 10f64.powi(MAX_FRACTION_DIGITS as i32);

    let mut whole = magnitude.trunc();
    let mut fraction = ((magnitude - whole) * scale).round();
    if fraction >= scale {
        whole += 1.0;
        fraction = 0.0;
    }

    if whole == 0.0 && fraction == 0.0 {
        return "Rp 0".to_owned();
    }

    let sign = if number < 0.0 { "-" } else { "" };

    let mut formatted_string = if whole == 0.0 {
        // Zero is hardcoded as "0" without the prefix, so we must build it ourselves
        format!("Rp {sign}0")
    } else if whole >= NUMFMT_LIMIT {
        format!("Rp {sign}{}", group_thousands(&format!("{whole:.0}")))
    } else {
        let fmt = if number < 0.0 { negative_fmt } else { positive_fmt };
        // numfmt only groups with commas, the id-ID locale groups with dots.
        fmt.fmt_string(whole).replace(',', ".")
    };

    if fraction > 0.0 {
        let digits = format!(
            "{:0width$}",
            fraction as u32,
            width = MAX_FRACTION_DIGITS as usize
        );
        formatted_string.push(',');
        formatted_string.push_str(digits.trim_end_matches('0'));
    }

    formatted_string
}

/// Insert a dot every three digits from the right of `digits`.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    grouped
}
