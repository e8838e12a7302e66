use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::cart::CartLine;
use crate::domain::types::{PartId, Quantity, TypeConstraintError};

/// Diesel model representing the `cart_items` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::cart_items)]
pub struct CartItem {
    pub id: i32,
    pub user_id: i32,
    pub part_id: i32,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`CartItem`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::cart_items)]
pub struct NewCartItem {
    pub user_id: i32,
    pub part_id: i32,
    pub quantity: i32,
}

impl TryFrom<CartItem> for CartLine {
    type Error = TypeConstraintError;

    fn try_from(item: CartItem) -> Result<Self, Self::Error> {
        Ok(Self {
            part_id: PartId::new(item.part_id)?,
            quantity: Quantity::new(item.quantity)?,
        })
    }
}
