use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AddressId, CarId, Money, OrderId, PartId, PickupPointId, Quantity, TypeConstraintError, UserId,
};

/// Order lifecycle states.
///
/// `Processing` is initial; `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// Shipping requires `Processing`, delivery requires `Shipped`, and
    /// cancellation is possible until the order is delivered. Terminal states
    /// permit nothing, including self-transitions.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Processing, Self::Cancelled)
                | (Self::Shipped, Self::Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Sort key for management views: orders needing action come first.
    pub fn priority(&self) -> i32 {
        match self {
            Self::Shipped => 0,
            Self::Processing => 1,
            Self::Delivered => 2,
            Self::Cancelled => 3,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = TypeConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid online at checkout.
    Card,
    CardOnDelivery,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::CardOnDelivery => "card_on_delivery",
            Self::Cash => "cash",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = TypeConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "card" => Ok(Self::Card),
            "card_on_delivery" => Ok(Self::CardOnDelivery),
            "cash" => Ok(Self::Cash),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

/// Where an order is fulfilled: a shipping address or a pickup point,
/// exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChoice {
    Address(AddressId),
    Pickup(PickupPointId),
}

/// A part line on an order. Kept for history even after cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub part_id: PartId,
    pub part_name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
}

/// A car line on an order, with the price captured at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarOrder {
    pub car_id: CarId,
    pub price: Money,
}

/// An order with its lines.
///
/// An order always carries at least one line: part items, a car order, or
/// both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub delivery: DeliveryChoice,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub status: OrderStatus,
    pub order_date: NaiveDateTime,
    pub status_updated: NaiveDateTime,
    pub service_fee: Money,
    pub shipping_cost: Money,
    pub discount: Money,
    pub customer_notes: Option<String>,
    pub admin_notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub car_orders: Vec<CarOrder>,
}

impl Order {
    /// Total in minor units: lines + fees + shipping − discount, floored at
    /// zero. `None` on arithmetic overflow.
    pub fn total_amount(&self) -> Option<Money> {
        let mut total = Money::ZERO;
        for item in &self.items {
            let line = item.unit_price.checked_mul(i64::from(item.quantity.get()))?;
            total = total.checked_add(line)?;
        }
        for car in &self.car_orders {
            total = total.checked_add(car.price)?;
        }
        total = total.checked_add(self.service_fee)?;
        total = total.checked_add(self.shipping_cost)?;
        Some(total.saturating_sub(self.discount))
    }
}

/// One part line requested at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub part_id: PartId,
    pub quantity: Quantity,
}

/// Input for placing a part order.
#[derive(Debug, Clone)]
pub struct NewPartOrder {
    pub user_id: UserId,
    pub delivery: DeliveryChoice,
    pub payment_method: PaymentMethod,
    pub customer_notes: Option<String>,
    pub lines: Vec<OrderLine>,
    pub service_fee: Money,
    pub shipping_cost: Money,
    pub discount: Money,
}

/// Input for placing a car order. Cars are pickup-only.
#[derive(Debug, Clone)]
pub struct NewCarOrder {
    pub user_id: UserId,
    pub car_id: CarId,
    pub pickup_point_id: PickupPointId,
    pub payment_method: PaymentMethod,
    pub customer_notes: Option<String>,
    pub service_fee: Money,
    pub shipping_cost: Money,
}
