//! Prices and currencies

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Currencies a purchase can be recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Gbp,
    Usd,
    Eur,
    Jpy,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Gbp => "£",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Jpy => "¥",
        }
    }

    /// Digits after the decimal point in everyday use
    pub fn minor_digits(&self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "£" => Some(Currency::Gbp),
            "$" => Some(Currency::Usd),
            "€" => Some(Currency::Eur),
            "¥" => Some(Currency::Jpy),
            _ => None,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Gbp => write!(f, "GBP"),
            Currency::Usd => write!(f, "USD"),
            Currency::Eur => write!(f, "EUR"),
            Currency::Jpy => write!(f, "JPY"),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GBP" => Ok(Currency::Gbp),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "JPY" => Ok(Currency::Jpy),
            _ => Currency::from_symbol(s).ok_or_else(|| format!("Unknown currency: {}", s)),
        }
    }
}

/// An amount of money in a given currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
}

impl Price {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Parse user input such as `12.50`, `£12.50` or `USD 12.50`
    ///
    /// Input without a symbol or code is taken to be in `default_currency`.
    pub fn parse(input: &str, default_currency: Currency) -> Result<Self, String> {
        let input = input.trim();

        let symbol_len = input.chars().next().map_or(0, char::len_utf8);

        let (currency, amount) = if let Some((code, rest)) = input.split_once(' ') {
            (code.parse::<Currency>()?, rest.trim())
        } else if let Some(currency) = Currency::from_symbol(&input[..symbol_len]) {
            (currency, &input[symbol_len..])
        } else {
            (default_currency, input)
        };

        let amount = Decimal::from_str(amount).map_err(|_| format!("Invalid amount: {}", amount))?;
        if amount.is_sign_negative() {
            return Err(format!("Price cannot be negative: {}", amount));
        }
        Ok(Self { amount, currency })
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.currency.minor_digits();
        let rounded = self.amount.round_dp(digits);
        write!(
            f,
            "{}{:.*}",
            self.currency.symbol(),
            digits as usize,
            rounded
        )
    }
}
