// Human-readable number formatting for metric tiles

/// Formats `value` with two decimals and a magnitude suffix, dividing by
/// 1,000 per step: no suffix below a thousand, then "thousand", then "million".
pub fn format_number(value: f64, prefix: Option<&str>) -> String {
    let mut value = value;
    for unit in ["", "thousand"] {
        if value < 1000.0 {
            return compose(prefix, value, unit);
        }
        value /= 1000.0;
    }
    compose(prefix, value, "million")
}

fn compose(prefix: Option<&str>, value: f64, unit: &str) -> String {
    let amount = format!("{:.2}", value);
    [prefix.unwrap_or(""), amount.as_str(), unit]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitudes() {
        assert_eq!(format_number(500.0, None), "500.00");
        assert_eq!(format_number(1_500.0, None), "1.50 thousand");
        assert_eq!(format_number(2_500_000.0, None), "2.50 million");
        assert_eq!(format_number(3_200_000_000.0, None), "3200.00 million");
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(format_number(999.0, None), "999.00");
        assert_eq!(format_number(1_000.0, None), "1.00 thousand");
        assert_eq!(format_number(1_000_000.0, None), "1.00 million");
        assert_eq!(format_number(0.0, None), "0.00");
    }

    #[test]
    fn test_currency_prefix() {
        assert_eq!(format_number(1_500.0, Some("R$")), "R$ 1.50 thousand");
        assert_eq!(format_number(42.5, Some("R$")), "R$ 42.50");
        assert_eq!(format_number(42.5, Some("")), "42.50");
    }
}
