use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Rounds a monetary amount to cents, with midpoints rounded away from zero.
///
/// `Decimal::round_dp` uses banker's rounding, which would turn 0.125 into
/// 0.12; every stored or reported amount goes through this function instead.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a numeric literal such as `"1000"`, `" 12.5"` or `"1e3"`.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn midpoints_round_away_from_zero() {
        assert_eq!(round_currency(dec!(0.125)), dec!(0.13));
        assert_eq!(round_currency(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round_currency(dec!(266.6666)), dec!(266.67));
        assert_eq!(round_currency(dec!(84)), dec!(84));
    }

    #[test]
    fn parses_plain_and_scientific_literals() {
        assert_eq!(parse_decimal("1000"), Some(dec!(1000)));
        assert_eq!(parse_decimal(" 0.055131 "), Some(dec!(0.055131)));
        assert_eq!(parse_decimal("1e3"), Some(dec!(1000)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }
}
