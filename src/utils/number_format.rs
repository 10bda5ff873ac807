use serde_json::Value;

pub const CURRENCY_SYMBOL: &str = "₹";

/// Grouped decimal formatting in the en-US style: comma thousands
/// separators, at most three fraction digits, trailing zeros dropped.
pub struct NumberFormat;

impl NumberFormat {
    pub fn grouped(value: f64) -> String {
        // Scaling overflows near f64::MAX; those values have no fraction to round.
        let scaled = (value * 1000.0).round() / 1000.0;
        let rounded = if scaled.is_finite() { scaled } else { value };
        let text = format!("{:.3}", rounded.abs());
        let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let fraction = fraction.trim_end_matches('0');

        let mut out = String::with_capacity(text.len() + integer.len() / 3 + 1);
        if rounded < 0.0 {
            out.push('-');
        }
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(digit);
        }
        if !fraction.is_empty() {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }

    pub fn currency(value: f64) -> String {
        format!("{}{}", CURRENCY_SYMBOL, Self::grouped(value))
    }

    /// Reads a JSON number or numeric string. Non-finite values do not count.
    pub fn parse_decimal(value: &Value) -> Option<f64> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number.filter(|n| n.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn groups_thousands() {
        assert_eq!(NumberFormat::grouped(1234.5), "1,234.5");
        assert_eq!(NumberFormat::grouped(1234567.0), "1,234,567");
        assert_eq!(NumberFormat::grouped(999.0), "999");
        assert_eq!(NumberFormat::grouped(100000.0), "100,000");
    }

    #[test]
    fn keeps_at_most_three_fraction_digits() {
        assert_eq!(NumberFormat::grouped(10.0), "10");
        assert_eq!(NumberFormat::grouped(0.12345), "0.123");
        assert_eq!(NumberFormat::grouped(999.9999), "1,000");
        assert_eq!(NumberFormat::grouped(2.50), "2.5");
    }

    #[test]
    fn negative_values() {
        assert_eq!(NumberFormat::grouped(-1234.5), "-1,234.5");
        assert_eq!(NumberFormat::grouped(-0.0001), "0");
    }

    #[test]
    fn huge_values_stay_numeric() {
        let max = NumberFormat::currency(f64::MAX);
        assert!(max.starts_with("₹179,769,313,486"));
        assert!(!max.contains("inf"));

        let negative = NumberFormat::grouped(-1e306);
        assert!(negative.starts_with("-1,"));
        assert!(!negative.contains('.'));
    }

    #[test]
    fn currency_prefix() {
        assert_eq!(NumberFormat::currency(1234.5), "₹1,234.5");
        assert_eq!(NumberFormat::currency(10.0), "₹10");
    }

    #[test]
    fn parses_numbers_and_numeric_strings() {
        assert_eq!(NumberFormat::parse_decimal(&json!(1234.5)), Some(1234.5));
        assert_eq!(NumberFormat::parse_decimal(&json!("10.00")), Some(10.0));
        assert_eq!(NumberFormat::parse_decimal(&json!(" 42 ")), Some(42.0));
        assert_eq!(NumberFormat::parse_decimal(&json!("N/A")), None);
        assert_eq!(NumberFormat::parse_decimal(&json!("inf")), None);
        assert_eq!(NumberFormat::parse_decimal(&json!(null)), None);
        assert_eq!(NumberFormat::parse_decimal(&json!(true)), None);
    }
}
