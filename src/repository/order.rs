use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::sqlite::Sqlite;

use crate::domain::order::{DeliveryChoice, NewCarOrder, NewPartOrder, Order, OrderStatus};
use crate::domain::types::OrderId;
use crate::models::order::{
    CarOrder as DbCarOrder, NewCarOrder as DbNewCarOrder, NewOrder, NewOrderItem,
    Order as DbOrder, OrderItem as DbOrderItem,
};
use crate::pagination::Page;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, OrderListQuery, OrderReader, OrderSort, OrderWriter,
};

/// SQL ordering key for management views: orders needing action first.
const STATUS_PRIORITY_SQL: &str = "CASE status \
     WHEN 'shipped' THEN 0 \
     WHEN 'processing' THEN 1 \
     WHEN 'delivered' THEN 2 \
     WHEN 'cancelled' THEN 3 \
     ELSE 4 END";

/// Load the lines for a set of orders and assemble domain orders, preserving
/// the row order of `rows`.
fn assemble_orders(
    conn: &mut SqliteConnection,
    rows: Vec<DbOrder>,
) -> RepositoryResult<Vec<Order>> {
    use crate::schema::{car_orders, order_items, parts};

    let ids: Vec<i32> = rows.iter().map(|o| o.id).collect();

    let mut items_by_order: HashMap<i32, Vec<(DbOrderItem, String, i64)>> = HashMap::new();
    let item_rows: Vec<(DbOrderItem, String, i64)> = order_items::table
        .inner_join(parts::table)
        .filter(order_items::order_id.eq_any(&ids))
        .select((
            order_items::all_columns,
            parts::name,
            parts::price_cents,
        ))
        .order(order_items::id.asc())
        .load(conn)?;
    for row in item_rows {
        items_by_order.entry(row.0.order_id).or_default().push(row);
    }

    let mut cars_by_order: HashMap<i32, Vec<DbCarOrder>> = HashMap::new();
    let car_rows = car_orders::table
        .filter(car_orders::order_id.eq_any(&ids))
        .load::<DbCarOrder>(conn)?;
    for row in car_rows {
        cars_by_order.entry(row.order_id).or_default().push(row);
    }

    rows.into_iter()
        .map(|row| {
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            let cars = cars_by_order.remove(&row.id).unwrap_or_default();
            row.into_domain(items, cars).map_err(Into::into)
        })
        .collect()
}

fn load_order(conn: &mut SqliteConnection, id: i32) -> RepositoryResult<Order> {
    use crate::schema::orders;

    let row = orders::table
        .filter(orders::id.eq(id))
        .first::<DbOrder>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

    assemble_orders(conn, vec![row])?
        .pop()
        .ok_or(RepositoryError::NotFound)
}

/// Decrement stock for one part line, re-reading the committed value inside
/// the surrounding transaction so racing orders cannot oversell.
fn reserve_part(
    conn: &mut SqliteConnection,
    part_id: i32,
    quantity: i32,
) -> RepositoryResult<()> {
    use crate::schema::parts;

    let available: i32 = parts::table
        .filter(parts::id.eq(part_id))
        .select(parts::stock_count)
        .first(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

    if available < quantity {
        return Err(RepositoryError::InsufficientStock {
            part_id: crate::domain::types::PartId::new(part_id)?,
            requested: quantity,
            available,
        });
    }

    diesel::update(parts::table.filter(parts::id.eq(part_id)))
        .set((
            parts::stock_count.eq(available - quantity),
            parts::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;

    Ok(())
}

/// Put reserved inventory back: stock for part lines, visibility for car
/// lines. Runs exactly once per order, on the transition into `Cancelled`.
fn release_order_inventory(conn: &mut SqliteConnection, order_id: i32) -> RepositoryResult<()> {
    use crate::schema::{car_orders, cars, order_items, parts};

    let lines: Vec<(i32, i32)> = order_items::table
        .filter(order_items::order_id.eq(order_id))
        .select((order_items::part_id, order_items::quantity))
        .load(conn)?;

    for (part_id, quantity) in lines {
        let current: i32 = parts::table
            .filter(parts::id.eq(part_id))
            .select(parts::stock_count)
            .first(conn)?;
        diesel::update(parts::table.filter(parts::id.eq(part_id)))
            .set((
                parts::stock_count.eq(current + quantity),
                parts::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)?;
    }

    let released_cars: Vec<i32> = car_orders::table
        .filter(car_orders::order_id.eq(order_id))
        .select(car_orders::car_id)
        .load(conn)?;

    for car_id in released_cars {
        diesel::update(cars::table.filter(cars::id.eq(car_id)))
            .set((
                cars::is_visible.eq(true),
                cars::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)?;
    }

    Ok(())
}

/// Resolve the delivery choice into order columns, verifying that the target
/// exists and is active.
fn delivery_columns(
    conn: &mut SqliteConnection,
    user_id: i32,
    delivery: DeliveryChoice,
) -> RepositoryResult<(Option<i32>, Option<i32>)> {
    use crate::schema::{pickup_points, user_addresses};

    match delivery {
        DeliveryChoice::Address(address_id) => {
            let active: bool = user_addresses::table
                .filter(user_addresses::id.eq(address_id.get()))
                .filter(user_addresses::user_id.eq(user_id))
                .select(user_addresses::is_active)
                .first(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            if !active {
                return Err(RepositoryError::Unavailable(
                    "shipping address is inactive".to_string(),
                ));
            }
            Ok((Some(address_id.get()), None))
        }
        DeliveryChoice::Pickup(pickup_id) => {
            let active: bool = pickup_points::table
                .filter(pickup_points::id.eq(pickup_id.get()))
                .select(pickup_points::is_active)
                .first(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            if !active {
                return Err(RepositoryError::Unavailable(
                    "pickup point is inactive".to_string(),
                ));
            }
            Ok((None, Some(pickup_id.get())))
        }
    }
}

impl OrderReader for DieselRepository {
    fn get_order_by_id(&self, id: OrderId) -> RepositoryResult<Option<Order>> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        let row = orders::table
            .filter(orders::id.eq(id.get()))
            .first::<DbOrder>(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(assemble_orders(&mut conn, vec![row])?.pop())
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<Page<Order>> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        let mut items = orders::table.into_boxed::<Sqlite>();
        if let Some(user_id) = query.user_id {
            items = items.filter(orders::user_id.eq(user_id.get()));
        }

        items = match query.sort {
            OrderSort::StatusPriority => items.order((
                diesel::dsl::sql::<Integer>(STATUS_PRIORITY_SQL),
                orders::order_date.desc(),
            )),
            OrderSort::NewestFirst => items.order(orders::order_date.desc()),
        };

        let rows = items
            .offset(query.pagination.offset)
            .limit(query.pagination.limit + 1)
            .load::<DbOrder>(&mut conn)?;

        let limit = query.pagination.limit;
        let orders = assemble_orders(&mut conn, rows)?;
        Ok(Page::from_lookahead(orders, limit))
    }
}

impl OrderWriter for DieselRepository {
    fn create_part_order(&self, order: &NewPartOrder) -> RepositoryResult<Order> {
        use crate::schema::{cart_items, order_items, orders};

        if order.lines.is_empty() {
            return Err(RepositoryError::InvalidOperation(
                "order must contain at least one line".to_string(),
            ));
        }

        let mut conn = self.conn()?;

        let order_id = conn.transaction::<i32, RepositoryError, _>(|conn| {
            let (shipping_address_id, pickup_point_id) =
                delivery_columns(conn, order.user_id.get(), order.delivery)?;

            // No partial reservation: the first short line aborts the whole
            // placement.
            for line in &order.lines {
                reserve_part(conn, line.part_id.get(), line.quantity.get())?;
            }

            let row = diesel::insert_into(orders::table)
                .values(NewOrder {
                    user_id: order.user_id.get(),
                    shipping_address_id,
                    pickup_point_id,
                    payment_method: order.payment_method.as_str().to_string(),
                    is_paid: false,
                    status: OrderStatus::Processing.as_str().to_string(),
                    service_fee_cents: order.service_fee.cents(),
                    shipping_cost_cents: order.shipping_cost.cents(),
                    discount_cents: order.discount.cents(),
                    customer_notes: order.customer_notes.clone(),
                })
                .get_result::<DbOrder>(conn)?;

            let items: Vec<NewOrderItem> = order
                .lines
                .iter()
                .map(|line| NewOrderItem {
                    order_id: row.id,
                    part_id: line.part_id.get(),
                    quantity: line.quantity.get(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&items)
                .execute(conn)?;

            // Checkout consumes the cart within the same unit of work.
            diesel::delete(
                cart_items::table.filter(cart_items::user_id.eq(order.user_id.get())),
            )
            .execute(conn)?;

            Ok(row.id)
        })?;

        load_order(&mut conn, order_id)
    }

    fn create_car_order(&self, order: &NewCarOrder) -> RepositoryResult<Order> {
        use crate::schema::{car_orders, cars, orders, pickup_points};

        let mut conn = self.conn()?;

        let order_id = conn.transaction::<i32, RepositoryError, _>(|conn| {
            let pickup_active: bool = pickup_points::table
                .filter(pickup_points::id.eq(order.pickup_point_id.get()))
                .select(pickup_points::is_active)
                .first(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            if !pickup_active {
                return Err(RepositoryError::Unavailable(
                    "pickup point is inactive".to_string(),
                ));
            }

            // Re-read the car inside the transaction; a racing order may have
            // hidden it since the caller looked.
            let (is_visible, price_cents): (bool, Option<i64>) = cars::table
                .filter(cars::id.eq(order.car_id.get()))
                .select((cars::is_visible, cars::price_cents))
                .first(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            if !is_visible {
                return Err(RepositoryError::Unavailable(
                    "car is not available for order".to_string(),
                ));
            }
            let Some(price_cents) = price_cents else {
                return Err(RepositoryError::Unavailable(
                    "car has no sale price".to_string(),
                ));
            };

            let active_orders: i64 = car_orders::table
                .inner_join(orders::table)
                .filter(car_orders::car_id.eq(order.car_id.get()))
                .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
                .count()
                .get_result(conn)?;
            if active_orders > 0 {
                return Err(RepositoryError::Unavailable(
                    "car is already reserved by another order".to_string(),
                ));
            }

            let row = diesel::insert_into(orders::table)
                .values(NewOrder {
                    user_id: order.user_id.get(),
                    shipping_address_id: None,
                    pickup_point_id: Some(order.pickup_point_id.get()),
                    payment_method: order.payment_method.as_str().to_string(),
                    is_paid: false,
                    status: OrderStatus::Processing.as_str().to_string(),
                    service_fee_cents: order.service_fee.cents(),
                    shipping_cost_cents: order.shipping_cost.cents(),
                    discount_cents: 0,
                    customer_notes: order.customer_notes.clone(),
                })
                .get_result::<DbOrder>(conn)?;

            diesel::insert_into(car_orders::table)
                .values(DbNewCarOrder {
                    order_id: row.id,
                    car_id: order.car_id.get(),
                    price_cents,
                })
                .execute(conn)?;

            diesel::update(cars::table.filter(cars::id.eq(order.car_id.get())))
                .set((
                    cars::is_visible.eq(false),
                    cars::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;

            Ok(row.id)
        })?;

        load_order(&mut conn, order_id)
    }

    fn transition_status(&self, id: OrderId, next: OrderStatus) -> RepositoryResult<Order> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let status: String = orders::table
                .filter(orders::id.eq(id.get()))
                .select(orders::status)
                .first(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            let current: OrderStatus = status.parse()?;

            if !current.can_transition_to(next) {
                return Err(RepositoryError::InvalidTransition {
                    from: current,
                    to: next,
                });
            }

            // The release is part of the transition's atomicity: status write
            // and inventory restoration commit together or not at all.
            if next == OrderStatus::Cancelled {
                release_order_inventory(conn, id.get())?;
            }

            diesel::update(orders::table.filter(orders::id.eq(id.get())))
                .set((
                    orders::status.eq(next.as_str()),
                    orders::status_updated.eq(diesel::dsl::now),
                ))
                .execute(conn)?;

            Ok(())
        })?;

        load_order(&mut conn, id.get())
    }

    fn set_paid(&self, id: OrderId, paid: bool) -> RepositoryResult<Order> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let (status, is_paid): (String, bool) = orders::table
                .filter(orders::id.eq(id.get()))
                .select((orders::status, orders::is_paid))
                .first(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            if status.parse::<OrderStatus>()?.is_terminal() {
                return Err(RepositoryError::InvalidOperation(
                    "order is in a terminal state".to_string(),
                ));
            }
            if paid && is_paid {
                return Err(RepositoryError::AlreadyPaid);
            }

            diesel::update(orders::table.filter(orders::id.eq(id.get())))
                .set(orders::is_paid.eq(paid))
                .execute(conn)?;

            Ok(())
        })?;

        load_order(&mut conn, id.get())
    }

    fn set_admin_notes(&self, id: OrderId, notes: &str) -> RepositoryResult<Order> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let status: String = orders::table
                .filter(orders::id.eq(id.get()))
                .select(orders::status)
                .first(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            if status.parse::<OrderStatus>()?.is_terminal() {
                return Err(RepositoryError::InvalidOperation(
                    "order is in a terminal state".to_string(),
                ));
            }

            diesel::update(orders::table.filter(orders::id.eq(id.get())))
                .set(orders::admin_notes.eq(notes))
                .execute(conn)?;

            Ok(())
        })?;

        load_order(&mut conn, id.get())
    }
}
