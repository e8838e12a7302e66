use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, Money, NonEmptyString, PartId, StockCount};

/// An image attached to a part or a car, ordered by `sort_order`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
}

/// One `(name, value, unit)` specification row attached to a part.
///
/// Specifications are an open schema: names and values are data entered by
/// staff, not columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartSpecification {
    pub name: NonEmptyString,
    pub value: NonEmptyString,
    pub unit: Option<String>,
}

/// A spare part listed in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub name: NonEmptyString,
    /// Manufacturer article number, globally unique when present.
    pub article: Option<NonEmptyString>,
    pub description: String,
    pub price: Money,
    pub stock_count: StockCount,
    pub manufacturer: NonEmptyString,
    pub category_id: CategoryId,
    pub specifications: Vec<PartSpecification>,
    pub images: Vec<Image>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Information required to create a new [`Part`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPart {
    pub name: NonEmptyString,
    pub article: Option<NonEmptyString>,
    pub description: String,
    pub price: Money,
    pub stock_count: StockCount,
    pub manufacturer: NonEmptyString,
    /// Must reference a leaf category.
    pub category_id: CategoryId,
    pub specifications: Vec<PartSpecification>,
    pub images: Vec<Image>,
}

/// Partial update of a part; `None` fields are left untouched.
///
/// Specification and image lists replace the stored lists wholesale when
/// present.
#[derive(Debug, Clone, Default)]
pub struct PartUpdate {
    pub name: Option<NonEmptyString>,
    pub article: Option<Option<NonEmptyString>>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock_count: Option<StockCount>,
    pub manufacturer: Option<NonEmptyString>,
    pub category_id: Option<CategoryId>,
    pub specifications: Option<Vec<PartSpecification>>,
    pub images: Option<Vec<Image>>,
}
