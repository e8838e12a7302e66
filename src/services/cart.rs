use crate::domain::cart::{CartItem, CartLine};
use crate::domain::types::{PartId, Quantity, UserId};
use crate::repository::{CartReader, CartWriter, PartReader};

use super::{ServiceError, ServiceResult};

fn user(user_id: i32) -> ServiceResult<UserId> {
    UserId::new(user_id).map_err(|_| ServiceError::NotFound)
}

fn part(part_id: i32) -> ServiceResult<PartId> {
    PartId::new(part_id).map_err(|_| ServiceError::NotFound)
}

/// The user's cart with parts loaded, newest first.
pub fn list_cart<R>(user_id: i32, repo: &R) -> ServiceResult<Vec<CartItem>>
where
    R: CartReader,
{
    Ok(repo.list_cart_items(user(user_id)?)?)
}

/// Add a part to the cart, merging quantities with an existing row.
///
/// The stock check here is a courtesy so customers learn about shortages
/// before checkout; the binding check happens again at order placement.
pub fn add_to_cart<R>(
    user_id: i32,
    part_id: i32,
    quantity: i32,
    repo: &R,
) -> ServiceResult<CartLine>
where
    R: PartReader + CartReader + CartWriter,
{
    let user_id = user(user_id)?;
    let part_id = part(part_id)?;
    let quantity =
        Quantity::new(quantity).map_err(|e| ServiceError::Validation(e.to_string()))?;

    let part = repo.get_part_by_id(part_id)?.ok_or(ServiceError::NotFound)?;

    let already_held = repo
        .get_cart_line(user_id, part_id)?
        .map(|line| line.quantity.get())
        .unwrap_or(0);
    let requested = already_held + quantity.get();
    if requested > part.stock_count.get() {
        return Err(ServiceError::InsufficientStock {
            requested,
            available: part.stock_count.get(),
        });
    }

    Ok(repo.add_to_cart(user_id, part_id, quantity)?)
}

/// Overwrite a row's quantity; zero or negative removes it.
pub fn set_quantity<R>(
    user_id: i32,
    part_id: i32,
    quantity: i32,
    repo: &R,
) -> ServiceResult<Option<CartLine>>
where
    R: CartWriter,
{
    Ok(repo.set_cart_quantity(user(user_id)?, part(part_id)?, quantity)?)
}

pub fn remove_from_cart<R>(user_id: i32, part_id: i32, repo: &R) -> ServiceResult<bool>
where
    R: CartWriter,
{
    Ok(repo.remove_from_cart(user(user_id)?, part(part_id)?)? > 0)
}

pub fn clear_cart<R>(user_id: i32, repo: &R) -> ServiceResult<usize>
where
    R: CartWriter,
{
    Ok(repo.clear_cart(user(user_id)?)?)
}

/// Total quantity across the cart, for the badge in the shell's header.
pub fn cart_count<R>(user_id: i32, repo: &R) -> ServiceResult<i64>
where
    R: CartReader,
{
    Ok(repo.cart_count(user(user_id)?)?)
}

/// Replace-style sync from a client snapshot: quantities in the snapshot win
/// over whatever the server held.
pub fn sync_cart<R>(user_id: i32, lines: &[CartLine], repo: &R) -> ServiceResult<usize>
where
    R: CartWriter,
{
    Ok(repo.sync_cart(user(user_id)?, lines)?)
}
