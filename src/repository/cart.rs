use diesel::prelude::*;

use crate::domain::cart::{CartItem, CartLine};
use crate::domain::types::{PartId, Quantity, UserId};
use crate::models::cart::{CartItem as DbCartItem, NewCartItem};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CartReader, CartWriter, DieselRepository, PartReader};

impl CartReader for DieselRepository {
    fn list_cart_items(&self, user_id: UserId) -> RepositoryResult<Vec<CartItem>> {
        use crate::schema::cart_items;

        let rows = {
            let mut conn = self.conn()?;
            cart_items::table
                .filter(cart_items::user_id.eq(user_id.get()))
                .order(cart_items::created_at.desc())
                .load::<DbCartItem>(&mut conn)?
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let part = self
                .get_part_by_id(PartId::new(row.part_id)?)?
                .ok_or(RepositoryError::NotFound)?;
            items.push(CartItem {
                user_id,
                part,
                quantity: Quantity::new(row.quantity)?,
                created_at: row.created_at,
            });
        }

        Ok(items)
    }

    fn cart_lines(&self, user_id: UserId) -> RepositoryResult<Vec<CartLine>> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        let lines = cart_items::table
            .filter(cart_items::user_id.eq(user_id.get()))
            .order(cart_items::created_at.desc())
            .load::<DbCartItem>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<CartLine>, _>>()?;

        Ok(lines)
    }

    fn get_cart_line(
        &self,
        user_id: UserId,
        part_id: PartId,
    ) -> RepositoryResult<Option<CartLine>> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        let row = cart_items::table
            .filter(cart_items::user_id.eq(user_id.get()))
            .filter(cart_items::part_id.eq(part_id.get()))
            .first::<DbCartItem>(&mut conn)
            .optional()?;

        Ok(row.map(TryInto::try_into).transpose()?)
    }

    fn cart_count(&self, user_id: UserId) -> RepositoryResult<i64> {
        use crate::schema::cart_items;
        use diesel::dsl::sum;

        let mut conn = self.conn()?;

        let total: Option<i64> = cart_items::table
            .filter(cart_items::user_id.eq(user_id.get()))
            .select(sum(cart_items::quantity))
            .first(&mut conn)?;

        Ok(total.unwrap_or(0))
    }
}

impl CartWriter for DieselRepository {
    fn add_to_cart(
        &self,
        user_id: UserId,
        part_id: PartId,
        quantity: Quantity,
    ) -> RepositoryResult<CartLine> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        diesel::insert_into(cart_items::table)
            .values(NewCartItem {
                user_id: user_id.get(),
                part_id: part_id.get(),
                quantity: quantity.get(),
            })
            .on_conflict((cart_items::user_id, cart_items::part_id))
            .do_update()
            .set(cart_items::quantity.eq(cart_items::quantity + quantity.get()))
            .execute(&mut conn)?;

        drop(conn);
        self.get_cart_line(user_id, part_id)?
            .ok_or(RepositoryError::NotFound)
    }

    fn set_cart_quantity(
        &self,
        user_id: UserId,
        part_id: PartId,
        quantity: i32,
    ) -> RepositoryResult<Option<CartLine>> {
        use crate::schema::cart_items;

        if quantity <= 0 {
            self.remove_from_cart(user_id, part_id)?;
            return Ok(None);
        }

        let mut conn = self.conn()?;

        let affected = diesel::update(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id.get()))
                .filter(cart_items::part_id.eq(part_id.get())),
        )
        .set(cart_items::quantity.eq(quantity))
        .execute(&mut conn)?;

        if affected == 0 {
            return Ok(None);
        }

        drop(conn);
        self.get_cart_line(user_id, part_id)
    }

    fn remove_from_cart(&self, user_id: UserId, part_id: PartId) -> RepositoryResult<usize> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        let affected = diesel::delete(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id.get()))
                .filter(cart_items::part_id.eq(part_id.get())),
        )
        .execute(&mut conn)?;

        Ok(affected)
    }

    fn clear_cart(&self, user_id: UserId) -> RepositoryResult<usize> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        let affected =
            diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id.get())))
                .execute(&mut conn)?;

        Ok(affected)
    }

    fn sync_cart(&self, user_id: UserId, lines: &[CartLine]) -> RepositoryResult<usize> {
        use crate::schema::{cart_items, parts};

        let mut conn = self.conn()?;

        let written = conn.transaction::<usize, RepositoryError, _>(|conn| {
            let requested: Vec<i32> = lines.iter().map(|l| l.part_id.get()).collect();
            let known: Vec<i32> = parts::table
                .filter(parts::id.eq_any(requested))
                .select(parts::id)
                .load(conn)?;

            let mut written = 0;
            for line in lines {
                // Entries referencing unknown parts are skipped, not fatal.
                if !known.contains(&line.part_id.get()) {
                    continue;
                }
                diesel::insert_into(cart_items::table)
                    .values(NewCartItem {
                        user_id: user_id.get(),
                        part_id: line.part_id.get(),
                        quantity: line.quantity.get(),
                    })
                    .on_conflict((cart_items::user_id, cart_items::part_id))
                    .do_update()
                    // Client snapshot wins: replace, do not accumulate.
                    .set(cart_items::quantity.eq(line.quantity.get()))
                    .execute(conn)?;
                written += 1;
            }

            Ok(written)
        })?;

        Ok(written)
    }
}
