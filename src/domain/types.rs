//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs carry these wrappers instead of raw primitives so that
//! identifiers, money amounts and textual values are validated at the
//! boundary.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be positive was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveNumber(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// VIN validation failed.
    #[error("VIN must be 17 characters over the VIN alphabet, got {0:?}")]
    InvalidVin(String),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        Self::new_for_field(value, "value")
    }

    /// Same as [`Self::new`] but with field-specific error context.
    pub fn new_for_field<S: Into<String>>(
        value: S,
        field: &'static str,
    ) -> Result<Self, TypeConstraintError> {
        trim_and_require_non_empty(value, field).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

macro_rules! define_id {
    ($name:ident, $field:literal) => {
        #[doc = concat!("Identifier newtype validated to be positive (`", $field, "`).")]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            pub fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(CategoryId, "category_id");
define_id!(PartId, "part_id");
define_id!(CarId, "car_id");
define_id!(TrimId, "trim_id");
define_id!(OrderId, "order_id");
define_id!(UserId, "user_id");
define_id!(AddressId, "address_id");
define_id!(PickupPointId, "pickup_point_id");

/// Monetary amount in integer minor units (kopecks/cents).
///
/// Monetary values never touch binary floating point; totals are computed in
/// checked integer arithmetic.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Constant constructor for amounts known non-negative at compile time.
    pub const fn from_cents(cents: i64) -> Self {
        assert!(cents >= 0, "monetary constants must be non-negative");
        Self(cents)
    }

    /// Construct from minor units, rejecting negative amounts.
    pub fn new(cents: i64) -> Result<Self, TypeConstraintError> {
        if cents >= 0 {
            Ok(Self(cents))
        } else {
            Err(TypeConstraintError::NegativeNumber("amount"))
        }
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtraction clamped at zero; discounts never drive a total negative.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    pub fn checked_mul(self, factor: i64) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Characters permitted in a vehicle identification number.
const VIN_ALPHABET: &str = "ABCDEFGHJKLMNPRSTUVWXYZ0123456789";
const VIN_LEN: usize = 17;

/// A 17-character vehicle identification number.
///
/// The VIN alphabet excludes `I`, `O` and `Q`; input is uppercased before
/// validation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Vin(String);

impl Vin {
    pub fn new<S: AsRef<str>>(value: S) -> Result<Self, TypeConstraintError> {
        let candidate = value.as_ref().trim().to_uppercase();
        if candidate.len() == VIN_LEN && candidate.chars().all(|c| VIN_ALPHABET.contains(c)) {
            Ok(Self(candidate))
        } else {
            Err(TypeConstraintError::InvalidVin(value.as_ref().to_string()))
        }
    }

    /// Extract a VIN from free text by discarding every character outside the
    /// VIN alphabet; succeeds only if exactly 17 characters remain.
    pub fn extract(query: &str) -> Option<Self> {
        let cleaned: String = query
            .to_uppercase()
            .chars()
            .filter(|c| VIN_ALPHABET.contains(*c))
            .collect();
        (cleaned.len() == VIN_LEN).then_some(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Vin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive item count used by cart and order lines.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Quantity(i32);

impl Quantity {
    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NonPositiveNumber("quantity"))
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative stock level.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct StockCount(i32);

impl StockCount {
    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if value >= 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("stock_count"))
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Display for StockCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
