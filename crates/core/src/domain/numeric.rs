//! Coercion of loosely typed numeric input.
//!
//! Clients may send `"price": 1000` or `"price": "1000"`. Prices must be numeric and are rejected
//! otherwise; stock and rating fall back to zero when the value is not a number.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomainError;

pub const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// A raw JSON value supplied for a numeric field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericInput(Value);

impl NumericInput {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// Numbers and numeric strings convert exactly; everything else yields `None`.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self.classify() {
            Parsed::Decimal(value) => Some(value),
            Parsed::OutOfRange | Parsed::NotNumeric => None,
        }
    }

    fn classify(&self) -> Parsed {
        match &self.0 {
            Value::Number(number) => parse_decimal(&number.to_string()),
            Value::String(text) => parse_decimal(text.trim()),
            _ => Parsed::NotNumeric,
        }
    }
}

/// Outcome of reading a numeric field. `OutOfRange` is a finite number that `Decimal` cannot
/// hold, such as `1e29`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Parsed {
    Decimal(Decimal),
    OutOfRange,
    NotNumeric,
}

impl From<i32> for NumericInput {
    fn from(value: i32) -> Self {
        Self(Value::from(value))
    }
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_owned()))
    }
}

fn parse_decimal(raw: &str) -> Parsed {
    if raw.is_empty() {
        return Parsed::NotNumeric;
    }
    match Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
        Ok(value) => Parsed::Decimal(value.normalize()),
        Err(_) if raw.parse::<f64>().is_ok_and(f64::is_finite) => Parsed::OutOfRange,
        Err(_) => Parsed::NotNumeric,
    }
}

pub fn coerce_price(input: &NumericInput) -> Result<Decimal, DomainError> {
    let price = match input.classify() {
        Parsed::Decimal(price) => price,
        Parsed::OutOfRange => {
            return Err(DomainError::Validation("Price is out of range".to_owned()));
        }
        Parsed::NotNumeric => {
            return Err(DomainError::Validation("Price must be a number".to_owned()));
        }
    };
    if price < Decimal::ZERO {
        return Err(DomainError::Validation("Price must not be negative".to_owned()));
    }
    Ok(price)
}

pub fn coerce_stock(input: Option<&NumericInput>) -> Result<u32, DomainError> {
    let stock = match input.map(NumericInput::classify) {
        Some(Parsed::Decimal(stock)) => stock,
        Some(Parsed::OutOfRange) => return Err(stock_range_error()),
        Some(Parsed::NotNumeric) | None => return Ok(0),
    };
    if !stock.fract().is_zero() {
        return Err(DomainError::Validation("Stock must be a whole number".to_owned()));
    }
    stock.to_u32().ok_or_else(stock_range_error)
}

fn stock_range_error() -> DomainError {
    DomainError::Validation("Stock must be between 0 and 4294967295".to_owned())
}

pub fn coerce_rating(input: Option<&NumericInput>) -> Result<Decimal, DomainError> {
    let rating = match input.map(NumericInput::classify) {
        Some(Parsed::Decimal(rating)) => rating,
        Some(Parsed::OutOfRange) => return Err(rating_range_error()),
        Some(Parsed::NotNumeric) | None => return Ok(Decimal::ZERO),
    };
    if rating < Decimal::ZERO || rating > MAX_RATING {
        return Err(rating_range_error());
    }
    Ok(rating)
}

fn rating_range_error() -> DomainError {
    DomainError::Validation("Rating must be between 0 and 5".to_owned())
}
