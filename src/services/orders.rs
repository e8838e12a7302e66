use crate::domain::order::{
    NewCarOrder, NewPartOrder, Order, OrderLine, OrderStatus,
};
use crate::domain::types::{Money, OrderId, UserId};
use crate::forms::orders::{CreateCarOrderPayload, CreatePartOrderPayload};
use crate::pagination::Page;
use crate::repository::{CartReader, OrderListQuery, OrderReader, OrderSort, OrderWriter};

use super::{ServiceError, ServiceResult};

/// Flat service fee charged on a car order.
const CAR_SERVICE_FEE: Money = Money::from_cents(500_000);
/// Flat service fee charged on a part order.
const PART_SERVICE_FEE: Money = Money::from_cents(50_000);
/// Courier delivery cost for part orders. Pickup is free.
const PART_DELIVERY_COST: Money = Money::from_cents(50_000);

fn user(user_id: i32) -> ServiceResult<UserId> {
    UserId::new(user_id).map_err(|_| ServiceError::NotFound)
}

fn order(order_id: i32) -> ServiceResult<OrderId> {
    OrderId::new(order_id).map_err(|_| ServiceError::NotFound)
}

/// Place an order for a single car.
///
/// Reservation happens at creation: the car is hidden in the same transaction
/// that writes the order. Payment stays orthogonal (`is_paid = false`).
pub fn place_car_order<R>(
    user_id: i32,
    payload: CreateCarOrderPayload,
    repo: &R,
) -> ServiceResult<Order>
where
    R: OrderWriter,
{
    let order = NewCarOrder {
        user_id: user(user_id)?,
        car_id: payload.car_id,
        pickup_point_id: payload.pickup_point_id,
        payment_method: payload.payment_method,
        customer_notes: payload.customer_notes,
        service_fee: CAR_SERVICE_FEE,
        shipping_cost: Money::ZERO,
    };

    Ok(repo.create_car_order(&order)?)
}

/// Place an order for the caller's cart contents.
///
/// The cart snapshot is read here; stock is validated and decremented inside
/// the placement transaction, which also clears the cart. A single short line
/// aborts the whole order.
pub fn place_part_order<R>(
    user_id: i32,
    payload: CreatePartOrderPayload,
    repo: &R,
) -> ServiceResult<Order>
where
    R: OrderWriter + CartReader,
{
    let user_id = user(user_id)?;

    let lines: Vec<OrderLine> = repo
        .cart_lines(user_id)?
        .into_iter()
        .map(|line| OrderLine {
            part_id: line.part_id,
            quantity: line.quantity,
        })
        .collect();
    if lines.is_empty() {
        return Err(ServiceError::InvalidOperation("cart is empty".to_string()));
    }

    let shipping_cost = match payload.delivery {
        crate::domain::order::DeliveryChoice::Address(_) => PART_DELIVERY_COST,
        crate::domain::order::DeliveryChoice::Pickup(_) => Money::ZERO,
    };

    let order = NewPartOrder {
        user_id,
        delivery: payload.delivery,
        payment_method: payload.payment_method,
        customer_notes: payload.customer_notes,
        lines,
        service_fee: PART_SERVICE_FEE,
        shipping_cost,
        discount: Money::ZERO,
    };

    Ok(repo.create_part_order(&order)?)
}

/// Staff-driven status change. The raw status string comes from the shell;
/// anything outside the lifecycle vocabulary is a validation error.
pub fn transition_order_status<R>(
    order_id: i32,
    new_status: &str,
    repo: &R,
) -> ServiceResult<Order>
where
    R: OrderWriter,
{
    let next: OrderStatus = new_status
        .parse()
        .map_err(|e: crate::domain::types::TypeConstraintError| {
            ServiceError::Validation(e.to_string())
        })?;

    Ok(repo.transition_status(order(order_id)?, next)?)
}

/// Customer-driven cancellation. Only the order's owner may cancel; the
/// inventory release rides on the `Cancelled` transition.
pub fn cancel_order<R>(order_id: i32, requesting_user_id: i32, repo: &R) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter,
{
    let order_id = order(order_id)?;
    let requesting_user = user(requesting_user_id)?;

    let existing = repo
        .get_order_by_id(order_id)?
        .ok_or(ServiceError::NotFound)?;
    if existing.user_id != requesting_user {
        return Err(ServiceError::Unauthorized);
    }

    Ok(repo.transition_status(order_id, OrderStatus::Cancelled)?)
}

/// Flip the payment flag. Paying an already-paid order is rejected.
pub fn set_paid<R>(order_id: i32, paid: bool, repo: &R) -> ServiceResult<Order>
where
    R: OrderWriter,
{
    Ok(repo.set_paid(order(order_id)?, paid)?)
}

/// Staff notes, orthogonal to the status machine.
pub fn update_admin_notes<R>(order_id: i32, notes: &str, repo: &R) -> ServiceResult<Order>
where
    R: OrderWriter,
{
    Ok(repo.set_admin_notes(order(order_id)?, notes)?)
}

/// Management listing: status priority first (shipped, processing, delivered,
/// cancelled), newest within each bucket.
pub fn list_orders<R>(offset: i64, limit: i64, repo: &R) -> ServiceResult<Page<Order>>
where
    R: OrderReader,
{
    Ok(repo.list_orders(
        OrderListQuery::default()
            .sort(OrderSort::StatusPriority)
            .paginate(offset, limit),
    )?)
}

/// A customer's own orders, newest first.
pub fn list_user_orders<R>(
    user_id: i32,
    offset: i64,
    limit: i64,
    repo: &R,
) -> ServiceResult<Page<Order>>
where
    R: OrderReader,
{
    Ok(repo.list_orders(
        OrderListQuery::default()
            .user(user(user_id)?)
            .sort(OrderSort::NewestFirst)
            .paginate(offset, limit),
    )?)
}

/// One order with its computed total. Customers see only their own orders;
/// staff callers pass `None`.
pub fn order_detail<R>(
    order_id: i32,
    requesting_user_id: Option<i32>,
    repo: &R,
) -> ServiceResult<(Order, Money)>
where
    R: OrderReader,
{
    let existing = repo
        .get_order_by_id(order(order_id)?)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(requesting_user_id) = requesting_user_id {
        if existing.user_id != user(requesting_user_id)? {
            return Err(ServiceError::Unauthorized);
        }
    }

    let total = existing.total_amount().ok_or_else(|| {
        log::error!("order {} total overflows", existing.id);
        ServiceError::Internal
    })?;

    Ok((existing, total))
}
