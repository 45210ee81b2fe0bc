use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const MILLION: Decimal = dec!(1000000);
const THOUSAND: Decimal = dec!(1000);

/// Formats a money value for display, compacting large magnitudes:
/// `$45.2M`, `$45.2K`, `$45.20`.
pub fn format_currency(value: Decimal) -> String {
    let abs = value.abs();
    if abs >= MILLION {
        format!("${:.1}M", abs / MILLION)
    } else if abs >= THOUSAND {
        format!("${:.1}K", abs / THOUSAND)
    } else {
        format!("${abs:.2}")
    }
}

/// Like [`format_currency`] but with an explicit sign, e.g. `+$812K`.
pub fn format_signed_currency(value: Decimal) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        "+"
    };
    format!("{sign}{}", format_currency(value))
}

/// Formats a percent value with an explicit sign, e.g. `+1.8%`.
pub fn format_percent(value: Decimal) -> String {
    let sign = if value.is_sign_negative() { "" } else { "+" };
    format!("{sign}{value:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compacts_large_magnitudes() {
        assert_eq!(format_currency(dec!(45200000)), "$45.2M");
        assert_eq!(format_currency(dec!(45200)), "$45.2K");
        assert_eq!(format_currency(dec!(45.2)), "$45.20");
    }

    #[test]
    fn signed_values_carry_direction() {
        assert_eq!(format_signed_currency(dec!(812000)), "+$812.0K");
        assert_eq!(format_signed_currency(dec!(-3.5)), "-$3.50");
        assert_eq!(format_percent(dec!(1.8)), "+1.8%");
        assert_eq!(format_percent(dec!(-2.3)), "-2.3%");
    }
}
