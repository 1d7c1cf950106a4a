//! Currency and quantity formatting.
//!
//! Amounts are printed the Latin-American way: `.` groups thousands and `,`
//! separates decimals, e.g. `$ 1.234,56`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Explicit separator-driven currency format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: &'static str,
    pub group_separator: char,
    pub decimal_separator: char,
    pub decimals: u32,
}

impl CurrencyFormat {
    /// `$ 1.234,56`
    pub const LATAM: CurrencyFormat = CurrencyFormat {
        symbol: "$",
        group_separator: '.',
        decimal_separator: ',',
        decimals: 2,
    };

    pub fn format(&self, amount: Decimal) -> String {
        let rounded =
            amount.round_dp_with_strategy(self.decimals, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();

        // Fixed-point text of the magnitude, always with `decimals` digits.
        let plain = format!("{:.*}", self.decimals as usize, rounded.abs());
        let (int_part, frac_part) = match plain.split_once('.') {
            Some((i, f)) => (i, f),
            None => (plain.as_str(), ""),
        };

        let mut out = String::with_capacity(plain.len() + plain.len() / 3 + 4);
        out.push_str(self.symbol);
        out.push(' ');
        if negative {
            out.push('-');
        }
        out.push_str(&group_digits(int_part, self.group_separator));
        if self.decimals > 0 {
            out.push(self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::LATAM
    }
}

/// Format an amount with [`CurrencyFormat::LATAM`].
pub fn format_currency(amount: Decimal) -> String {
    CurrencyFormat::LATAM.format(amount)
}

/// Quantities print without trailing zeros: `10`, `2.5`.
pub fn format_quantity(quantity: Decimal) -> String {
    quantity.normalize().to_string()
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn formats_with_latam_separators() {
        assert_eq!(format_currency(dec("1234.5")), "$ 1.234,50");
        assert_eq!(format_currency(Decimal::ZERO), "$ 0,00");
        assert_eq!(format_currency(dec("1000000")), "$ 1.000.000,00");
        assert_eq!(format_currency(dec("999")), "$ 999,00");
        assert_eq!(format_currency(dec("50000")), "$ 50.000,00");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_currency(dec("0.005")), "$ 0,01");
        assert_eq!(format_currency(dec("1234.564")), "$ 1.234,56");
        assert_eq!(format_currency(dec("99999.999")), "$ 100.000,00");
    }

    #[test]
    fn negative_sign_follows_symbol() {
        assert_eq!(format_currency(dec("-1500")), "$ -1.500,00");
        assert_eq!(format_currency(dec("-0.001")), "$ 0,00");
    }

    #[test]
    fn custom_separators() {
        let fmt = CurrencyFormat {
            symbol: "USD",
            group_separator: ',',
            decimal_separator: '.',
            decimals: 0,
        };
        assert_eq!(fmt.format(dec("1234567.4")), "USD 1,234,567");
    }

    #[test]
    fn quantity_drops_trailing_zeros() {
        assert_eq!(format_quantity(dec("10")), "10");
        assert_eq!(format_quantity(dec("10.00")), "10");
        assert_eq!(format_quantity(dec("2.50")), "2.5");
    }
}
