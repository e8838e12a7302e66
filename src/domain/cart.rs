use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::part::Part;
use crate::domain::types::{PartId, Quantity, UserId};

/// One part held in a user's cart, with the part loaded for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub user_id: UserId,
    pub part: Part,
    pub quantity: Quantity,
    pub created_at: NaiveDateTime,
}

/// The bare `(part, quantity)` pair of a cart row, used as the snapshot that
/// order placement consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub part_id: PartId,
    pub quantity: Quantity,
}
