use diesel::prelude::*;

use crate::domain::pickup::{PickupPoint as DomainPickupPoint, UserAddress as DomainUserAddress};
use crate::domain::types::{AddressId, PickupPointId, TypeConstraintError, UserId};

/// Diesel model representing the `pickup_points` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::pickup_points)]
pub struct PickupPoint {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub street: String,
    pub house: String,
    pub is_active: bool,
}

/// Diesel model representing the `user_addresses` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::user_addresses)]
pub struct UserAddress {
    pub id: i32,
    pub user_id: i32,
    pub city: String,
    pub street: String,
    pub house: String,
    pub apartment: Option<String>,
    pub is_active: bool,
}

impl TryFrom<PickupPoint> for DomainPickupPoint {
    type Error = TypeConstraintError;

    fn try_from(point: PickupPoint) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PickupPointId::new(point.id)?,
            name: point.name,
            city: point.city,
            street: point.street,
            house: point.house,
            is_active: point.is_active,
        })
    }
}

impl TryFrom<UserAddress> for DomainUserAddress {
    type Error = TypeConstraintError;

    fn try_from(address: UserAddress) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AddressId::new(address.id)?,
            user_id: UserId::new(address.user_id)?,
            city: address.city,
            street: address.street,
            house: address.house,
            apartment: address.apartment,
            is_active: address.is_active,
        })
    }
}
