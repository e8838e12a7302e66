use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::order::{
    CarOrder as DomainCarOrder, DeliveryChoice, Order as DomainOrder,
    OrderItem as DomainOrderItem,
};
use crate::domain::types::{
    AddressId, CarId, Money, OrderId, PartId, PickupPointId, Quantity, TypeConstraintError, UserId,
};

/// Diesel model representing the `orders` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub shipping_address_id: Option<i32>,
    pub pickup_point_id: Option<i32>,
    pub payment_method: String,
    pub is_paid: bool,
    pub status: String,
    pub order_date: NaiveDateTime,
    pub status_updated: NaiveDateTime,
    pub service_fee_cents: i64,
    pub shipping_cost_cents: i64,
    pub discount_cents: i64,
    pub customer_notes: Option<String>,
    pub admin_notes: Option<String>,
}

/// Insertable form of [`Order`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder {
    pub user_id: i32,
    pub shipping_address_id: Option<i32>,
    pub pickup_point_id: Option<i32>,
    pub payment_method: String,
    pub is_paid: bool,
    pub status: String,
    pub service_fee_cents: i64,
    pub shipping_cost_cents: i64,
    pub discount_cents: i64,
    pub customer_notes: Option<String>,
}

/// Diesel model representing the `order_items` table.
#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub part_id: i32,
    pub quantity: i32,
}

/// Insertable form of [`OrderItem`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub part_id: i32,
    pub quantity: i32,
}

/// Diesel model representing the `car_orders` table.
#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(table_name = crate::schema::car_orders)]
#[diesel(belongs_to(Order))]
pub struct CarOrder {
    pub id: i32,
    pub order_id: i32,
    pub car_id: i32,
    pub price_cents: i64,
}

/// Insertable form of [`CarOrder`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::car_orders)]
pub struct NewCarOrder {
    pub order_id: i32,
    pub car_id: i32,
    pub price_cents: i64,
}

impl TryFrom<CarOrder> for DomainCarOrder {
    type Error = TypeConstraintError;

    fn try_from(car_order: CarOrder) -> Result<Self, Self::Error> {
        Ok(Self {
            car_id: CarId::new(car_order.car_id)?,
            price: Money::new(car_order.price_cents)?,
        })
    }
}

impl Order {
    /// Assemble the domain order from its row plus loaded lines. Part lines
    /// arrive joined with the part's name and current price.
    pub fn into_domain(
        self,
        items: Vec<(OrderItem, String, i64)>,
        car_orders: Vec<CarOrder>,
    ) -> Result<DomainOrder, TypeConstraintError> {
        let delivery = match (self.shipping_address_id, self.pickup_point_id) {
            (Some(address_id), None) => DeliveryChoice::Address(AddressId::new(address_id)?),
            (None, Some(pickup_id)) => DeliveryChoice::Pickup(PickupPointId::new(pickup_id)?),
            _ => {
                return Err(TypeConstraintError::InvalidValue(format!(
                    "order {} must reference exactly one of address or pickup point",
                    self.id
                )));
            }
        };

        Ok(DomainOrder {
            id: OrderId::new(self.id)?,
            user_id: UserId::new(self.user_id)?,
            delivery,
            payment_method: self.payment_method.parse()?,
            is_paid: self.is_paid,
            status: self.status.parse()?,
            order_date: self.order_date,
            status_updated: self.status_updated,
            service_fee: Money::new(self.service_fee_cents)?,
            shipping_cost: Money::new(self.shipping_cost_cents)?,
            discount: Money::new(self.discount_cents)?,
            customer_notes: self.customer_notes,
            admin_notes: self.admin_notes,
            items: items
                .into_iter()
                .map(|(item, part_name, price_cents)| {
                    Ok(DomainOrderItem {
                        part_id: PartId::new(item.part_id)?,
                        part_name,
                        quantity: Quantity::new(item.quantity)?,
                        unit_price: Money::new(price_cents)?,
                    })
                })
                .collect::<Result<Vec<_>, TypeConstraintError>>()?,
            car_orders: car_orders
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}
