//! Value objects for the storefront domain

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object. Amounts are exact decimals in a single configured
/// currency; the payment gateway consumes amounts in minor units (e.g. paise).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self { amount, currency: currency.to_string() }
    }
    pub fn zero(currency: &str) -> Self {
        Self::new(Decimal::ZERO, currency)
    }
    pub fn amount(&self) -> Decimal {
        self.amount
    }
    pub fn currency(&self) -> &str {
        &self.currency
    }
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch);
        }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money {
        Money::new(self.amount * Decimal::from(qty), &self.currency)
    }
    /// Minor units of the currency (amount x 100, truncated), the convention
    /// the payment gateway's order API expects.
    pub fn to_minor_units(&self) -> i64 {
        (self.amount * Decimal::ONE_HUNDRED).trunc().to_i64().unwrap_or(i64::MAX)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[derive(Debug, Clone)]
pub enum MoneyError {
    CurrencyMismatch,
}
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency mismatch")
    }
}

/// Stock quantity value object. Never negative by construction; `subtract`
/// refuses to go below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self {
        Self(value)
    }
    pub fn value(&self) -> u32 {
        self.0
    }
    pub fn add(&self, other: u32) -> Self {
        Self(self.0.saturating_add(other))
    }
    pub fn subtract(&self, other: u32) -> Option<Self> {
        if other > self.0 {
            None
        } else {
            Some(Self(self.0 - other))
        }
    }
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(0)
    }
}
