use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::cart::CartLine;
use crate::domain::order::{DeliveryChoice, PaymentMethod};
use crate::domain::types::{
    AddressId, CarId, PartId, PickupPointId, Quantity, TypeConstraintError,
};

#[derive(Debug, Error)]
pub enum OrderFormError {
    #[error("order form validation failed: {0}")]
    Validation(String),
    #[error("order form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("{0}")]
    Delivery(String),
}

impl From<ValidationErrors> for OrderFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for OrderFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// Raw car order request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarOrderForm {
    #[validate(range(min = 1))]
    pub car_id: i32,
    #[validate(range(min = 1))]
    pub pickup_point_id: i32,
    pub payment_method: String,
    pub customer_notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCarOrderPayload {
    pub car_id: CarId,
    pub pickup_point_id: PickupPointId,
    pub payment_method: PaymentMethod,
    pub customer_notes: Option<String>,
}

impl TryFrom<CreateCarOrderForm> for CreateCarOrderPayload {
    type Error = OrderFormError;

    fn try_from(form: CreateCarOrderForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            car_id: CarId::new(form.car_id)?,
            pickup_point_id: PickupPointId::new(form.pickup_point_id)?,
            payment_method: form.payment_method.parse()?,
            customer_notes: form.customer_notes,
        })
    }
}

/// Raw part order request. Exactly one of the delivery targets must be set,
/// matching `delivery_method`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartOrderForm {
    /// `"home"` or `"pickup"`.
    pub delivery_method: String,
    pub shipping_address_id: Option<i32>,
    pub pickup_point_id: Option<i32>,
    pub payment_method: String,
    pub customer_notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePartOrderPayload {
    pub delivery: DeliveryChoice,
    pub payment_method: PaymentMethod,
    pub customer_notes: Option<String>,
}

impl TryFrom<CreatePartOrderForm> for CreatePartOrderPayload {
    type Error = OrderFormError;

    fn try_from(form: CreatePartOrderForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let delivery = match form.delivery_method.as_str() {
            "home" => {
                let address_id = form.shipping_address_id.ok_or_else(|| {
                    OrderFormError::Delivery(
                        "home delivery requires a shipping address".to_string(),
                    )
                })?;
                DeliveryChoice::Address(AddressId::new(address_id)?)
            }
            "pickup" => {
                let pickup_id = form.pickup_point_id.ok_or_else(|| {
                    OrderFormError::Delivery("pickup requires a pickup point".to_string())
                })?;
                DeliveryChoice::Pickup(PickupPointId::new(pickup_id)?)
            }
            other => {
                return Err(OrderFormError::Delivery(format!(
                    "unknown delivery method: {other}"
                )));
            }
        };

        Ok(Self {
            delivery,
            payment_method: form.payment_method.parse()?,
            customer_notes: form.customer_notes,
        })
    }
}

/// Client-side cart snapshot (`part id -> quantity`), as synced from local
/// storage after login.
#[derive(Debug, Deserialize)]
pub struct SyncCartForm {
    pub items: HashMap<String, i64>,
}

impl SyncCartForm {
    /// Convert to cart lines. Unparseable keys and non-positive quantities
    /// are dropped, like the sloppy client snapshots they come from.
    pub fn into_lines(self) -> Vec<CartLine> {
        let mut lines: Vec<CartLine> = self
            .items
            .into_iter()
            .filter_map(|(part_id, quantity)| {
                let part_id = part_id.parse::<i32>().ok()?;
                let quantity = i32::try_from(quantity).ok()?;
                Some(CartLine {
                    part_id: PartId::new(part_id).ok()?,
                    quantity: Quantity::new(quantity).ok()?,
                })
            })
            .collect();
        lines.sort_by_key(|line| line.part_id);
        lines
    }
}
