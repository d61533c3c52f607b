use super::aggregators::round_to_precision;
use serde::{Deserialize, Serialize};

/// Placeholder shown for missing or non-finite values.
pub const MISSING_VALUE: &str = "-";

/// How a metric value is rendered for people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    Number,
    Count,
    /// Ratio in `[0, 1]` rendered as a percentage.
    Percent,
    /// US dollars.
    Currency,
    /// Seconds rendered as hours, minutes and seconds.
    Duration,
}

impl ValueFormat {
    /// Never fails: `None`, NaN and infinities render as [`MISSING_VALUE`].
    pub fn format(&self, value: Option<f64>, precision: usize) -> String {
        let value = match value {
            Some(value) if value.is_finite() => value,
            _ => return MISSING_VALUE.to_string(),
        };
        match self {
            ValueFormat::Number => format_grouped(value, precision),
            ValueFormat::Count => format_grouped(value, 0),
            ValueFormat::Percent => format!("{}%", format_grouped(value * 100.0, precision)),
            ValueFormat::Currency => {
                let amount = format_grouped(value.abs(), 2);
                if value < 0.0 && amount.chars().any(|c| c.is_ascii_digit() && c != '0') {
                    format!("-${}", amount)
                } else {
                    format!("${}", amount)
                }
            }
            ValueFormat::Duration => format_duration(value),
        }
    }
}

/// Fixed-point rendering with comma thousands separators.
fn format_grouped(value: f64, precision: usize) -> String {
    let fixed = format!("{:.*}", precision, round_to_precision(value, precision));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

fn format_duration(seconds: f64) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let total = seconds.abs().round() as u64;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}{}h {}m", sign, hours, minutes)
    } else if minutes > 0 {
        format!("{}{}m {}s", sign, minutes, seconds)
    } else {
        format!("{}{}s", sign, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values() {
        for format in [
            ValueFormat::Number,
            ValueFormat::Count,
            ValueFormat::Percent,
            ValueFormat::Currency,
            ValueFormat::Duration,
        ] {
            assert_eq!(format.format(None, 2), MISSING_VALUE);
            assert_eq!(format.format(Some(f64::NAN), 2), MISSING_VALUE);
            assert_eq!(format.format(Some(f64::INFINITY), 2), MISSING_VALUE);
        }
    }

    #[test]
    fn test_number() {
        assert_eq!(ValueFormat::Number.format(Some(1234567.891), 2), "1,234,567.89");
        assert_eq!(ValueFormat::Number.format(Some(-999.5), 1), "-999.5");
        assert_eq!(ValueFormat::Number.format(Some(12.0), 0), "12");
    }

    #[test]
    fn test_count() {
        assert_eq!(ValueFormat::Count.format(Some(1000.0), 2), "1,000");
        assert_eq!(ValueFormat::Count.format(Some(0.0), 2), "0");
    }

    #[test]
    fn test_percent() {
        assert_eq!(ValueFormat::Percent.format(Some(0.4521), 1), "45.2%");
        assert_eq!(ValueFormat::Percent.format(Some(1.0), 0), "100%");
    }

    #[test]
    fn test_currency() {
        assert_eq!(ValueFormat::Currency.format(Some(1234.5), 0), "$1,234.50");
        assert_eq!(ValueFormat::Currency.format(Some(-3.0), 2), "-$3.00");
        assert_eq!(ValueFormat::Currency.format(Some(-0.001), 2), "$0.00");
    }

    #[test]
    fn test_duration() {
        assert_eq!(ValueFormat::Duration.format(Some(45.0), 0), "45s");
        assert_eq!(ValueFormat::Duration.format(Some(200.0), 0), "3m 20s");
        assert_eq!(ValueFormat::Duration.format(Some(3900.0), 0), "1h 5m");
    }
}
