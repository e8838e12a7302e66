use serde::{Deserialize, Serialize};

use crate::domain::types::{AddressId, PickupPointId, UserId};

/// A staffed pickup point. Managed outside the core; orders only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupPoint {
    pub id: PickupPointId,
    pub name: String,
    pub city: String,
    pub street: String,
    pub house: String,
    pub is_active: bool,
}

/// A customer shipping address. Managed outside the core; orders only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAddress {
    pub id: AddressId,
    pub user_id: UserId,
    pub city: String,
    pub street: String,
    pub house: String,
    pub apartment: Option<String>,
    pub is_active: bool,
}
