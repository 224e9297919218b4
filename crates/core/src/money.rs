//! Display formatting for money, counts, and percentages.

/// Format a float as a dollar amount with thousands separators.
/// Trailing fractional zeros are trimmed: `3420.84` -> `"$3,420.84"`,
/// `1500.0` -> `"$1,500"`, `0.0` -> `"$0.00"`.
pub fn usd(f: f64) -> String {
    if f == 0.0 {
        return "$0.00".to_string();
    }
    format!("${}", decimal(&format!("{:.6}", f)))
}

/// Same as [`usd`] for a decimal string as delivered by the platform.
pub fn usd_str(s: &str) -> String {
    if s.is_empty() {
        return "$0.00".to_string();
    }
    format!("${}", decimal(s))
}

/// Thousands-group an integer count string; empty input renders as `"0"`.
pub fn int_str(s: &str) -> String {
    if s.is_empty() {
        return "0".to_string();
    }
    decimal(s)
}

/// Format a float as a percentage with the given number of decimals.
pub fn percent(f: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, f)
}

/// Same as [`percent`] for a decimal string; unparseable input renders as zero.
pub fn percent_str(s: &str, decimals: usize) -> String {
    percent(s.parse().unwrap_or(0.0), decimals)
}

/// Thousands-group the integral part of a decimal string and trim trailing
/// fractional zeros.
fn decimal(s: &str) -> String {
    let (left, right) = match s.split_once('.') {
        Some((l, r)) => (l, r),
        None => (s, ""),
    };

    let (sign, digits) = match left.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", left),
    };

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let right = right.trim_end_matches('0');
    if right.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{right}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_keeps_small_fractions() {
        assert_eq!(usd(0.100246), "$0.100246");
    }

    #[test]
    fn usd_groups_thousands() {
        assert_eq!(usd(3420.84), "$3,420.84");
        assert_eq!(usd(1_250_000.0), "$1,250,000");
    }

    #[test]
    fn usd_zero() {
        assert_eq!(usd(0.0), "$0.00");
    }

    #[test]
    fn negative_amounts() {
        assert_eq!(usd(-1234.5), "$-1,234.5");
    }

    #[test]
    fn counts_and_percents() {
        assert_eq!(int_str("1250000"), "1,250,000");
        assert_eq!(int_str(""), "0");
        assert_eq!(percent(3.47, 2), "3.47%");
        assert_eq!(percent(200.0, 0), "200%");
        assert_eq!(percent_str("", 2), "0.00%");
    }
}
