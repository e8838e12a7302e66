use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;

use crate::db::DbConnection;
use crate::domain::car::{Car, CarUpdate, NewCar, NewTrim, Trim};
use crate::domain::order::OrderStatus;
use crate::domain::types::{CarId, Money, Vin};
use crate::models::car::{
    Car as DbCar, NewCar as DbNewCar, NewTrim as DbNewTrim, Trim as DbTrim,
};
use crate::models::image::{Image as DbImage, NewImage};
use crate::pagination::Page;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CarFilters, CarListQuery, CarReader, CarWriter, DieselRepository};

/// Upper bound accepted for a production-year search hint.
const MAX_YEAR_HINT: i32 = 2030;
/// Upper bound accepted for an engine-power search hint (hp).
const MAX_POWER_HINT: i32 = 1000;
/// Plausible engine displacement band for a decimal search hint (litres).
const ENGINE_VOLUME_HINTS: (f64, f64) = (0.1, 10.0);

type CarSource = diesel::dsl::InnerJoin<crate::schema::cars::table, crate::schema::car_trims::table>;
type CarQuerySource =
    diesel::dsl::InnerJoinQuerySource<crate::schema::cars::table, crate::schema::car_trims::table>;
type CarPredicate = Box<dyn BoxableExpression<CarQuerySource, Sqlite, SqlType = Bool>>;

/// Parse a bare token as a numeric hint, stripping everything but digits and
/// the decimal point. Returns `None` for tokens that are not plain numbers.
fn numeric_hint(token: &str) -> Option<f64> {
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned.matches('.').count() > 1 {
        return None;
    }
    cleaned.parse().ok()
}

/// Free-text predicate for one token: brand/model/color substrings plus
/// year, engine-power and engine-volume hints within plausible ranges.
fn token_predicate(token: &str) -> CarPredicate {
    use crate::schema::{car_trims, cars};

    let pattern = format!("%{token}%");
    let mut predicate: CarPredicate = Box::new(
        car_trims::brand
            .like(pattern.clone())
            .or(car_trims::model
                .is_not_null()
                .and(car_trims::model.assume_not_null().like(pattern.clone())))
            .or(cars::color.like(pattern)),
    );

    if let Some(value) = numeric_hint(token) {
        if value.fract() == 0.0 {
            let int_value = value as i32;
            if (0..=MAX_YEAR_HINT).contains(&int_value) {
                predicate = Box::new(predicate.or(cars::production_year.eq(int_value)));
            }
            if (0..=MAX_POWER_HINT).contains(&int_value) {
                predicate = Box::new(
                    predicate.or(car_trims::engine_power
                        .is_not_null()
                        .and(car_trims::engine_power.assume_not_null().ge(int_value))),
                );
            }
        } else if (ENGINE_VOLUME_HINTS.0..=ENGINE_VOLUME_HINTS.1).contains(&value) {
            predicate = Box::new(
                predicate.or(car_trims::engine_volume
                    .is_not_null()
                    .and(car_trims::engine_volume.assume_not_null().ge(value))),
            );
        }
    }

    predicate
}

/// Combined free-text predicate, or `None` when the query holds no usable
/// token.
fn search_predicate(raw: &str) -> Option<CarPredicate> {
    let mut predicate: Option<CarPredicate> = None;
    for token in raw.split_whitespace() {
        if token.chars().count() < 2 {
            continue;
        }
        let next = token_predicate(token);
        predicate = Some(match predicate {
            Some(prior) => Box::new(prior.or(next)),
            None => next,
        });
    }
    predicate
}

/// Load images for a page of car rows and assemble domain cars.
fn assemble_cars(
    conn: &mut DbConnection,
    rows: Vec<(DbCar, DbTrim)>,
) -> RepositoryResult<Vec<Car>> {
    use crate::schema::images;

    let ids: Vec<Option<i32>> = rows.iter().map(|(car, _)| Some(car.id)).collect();

    let mut images_by_car: HashMap<i32, Vec<DbImage>> = HashMap::new();
    let image_rows = images::table
        .filter(images::car_id.eq_any(ids))
        .order(images::sort_order.asc())
        .load::<DbImage>(conn)?;
    for image in image_rows {
        if let Some(car_id) = image.car_id {
            images_by_car.entry(car_id).or_default().push(image);
        }
    }

    rows.into_iter()
        .map(|(car, trim)| {
            let images = images_by_car.remove(&car.id).unwrap_or_default();
            car.into_domain(trim, images).map_err(Into::into)
        })
        .collect()
}

fn apply_filters(
    mut items: diesel::helper_types::IntoBoxed<'static, CarSource, Sqlite>,
    filters: &CarFilters,
) -> diesel::helper_types::IntoBoxed<'static, CarSource, Sqlite> {
    use crate::schema::{car_trims, cars};

    if !filters.colors.is_empty() {
        items = items.filter(cars::color.eq_any(filters.colors.clone()));
    }
    if !filters.conditions.is_empty() {
        let values: Vec<&'static str> =
            filters.conditions.iter().map(|c| c.as_str()).collect();
        items = items.filter(cars::condition.eq_any(values));
    }
    if !filters.brands.is_empty() {
        items = items.filter(car_trims::brand.eq_any(filters.brands.clone()));
    }
    if !filters.fuel_types.is_empty() {
        let values: Vec<Option<&'static str>> =
            filters.fuel_types.iter().map(|v| Some(v.as_str())).collect();
        items = items.filter(car_trims::fuel_type.eq_any(values));
    }
    if !filters.transmissions.is_empty() {
        let values: Vec<Option<&'static str>> =
            filters.transmissions.iter().map(|v| Some(v.as_str())).collect();
        items = items.filter(car_trims::transmission.eq_any(values));
    }
    if !filters.drive_types.is_empty() {
        let values: Vec<Option<&'static str>> =
            filters.drive_types.iter().map(|v| Some(v.as_str())).collect();
        items = items.filter(car_trims::drive_type.eq_any(values));
    }
    if !filters.body_types.is_empty() {
        let values: Vec<Option<&'static str>> =
            filters.body_types.iter().map(|v| Some(v.as_str())).collect();
        items = items.filter(car_trims::body_type.eq_any(values));
    }
    if let Some(min) = filters.min_mileage {
        items = items.filter(cars::mileage.ge(min));
    }
    if let Some(max) = filters.max_mileage {
        items = items.filter(cars::mileage.le(max));
    }
    if let Some(min) = filters.min_year {
        items = items.filter(cars::production_year.ge(min));
    }
    if let Some(max) = filters.max_year {
        items = items.filter(cars::production_year.le(max));
    }
    if let Some(min) = filters.min_price {
        items = items.filter(cars::price_cents.ge(Some(min.cents())));
    }
    if let Some(max) = filters.max_price {
        items = items.filter(cars::price_cents.le(Some(max.cents())));
    }
    if let Some(min) = filters.min_engine_volume {
        items = items.filter(car_trims::engine_volume.ge(Some(min)));
    }
    if let Some(max) = filters.max_engine_volume {
        items = items.filter(car_trims::engine_volume.le(Some(max)));
    }
    if let Some(min) = filters.min_engine_power {
        items = items.filter(car_trims::engine_power.ge(Some(min)));
    }
    if let Some(max) = filters.max_engine_power {
        items = items.filter(car_trims::engine_power.le(Some(max)));
    }
    if let Some(min) = filters.min_engine_torque {
        items = items.filter(car_trims::engine_torque.ge(Some(min)));
    }
    if let Some(max) = filters.max_engine_torque {
        items = items.filter(car_trims::engine_torque.le(Some(max)));
    }

    items
}

impl CarReader for DieselRepository {
    fn list_cars(&self, query: CarListQuery) -> RepositoryResult<Page<Car>> {
        use crate::schema::{car_orders, car_trims, cars, orders};

        let mut conn = self.conn()?;

        let mut items = cars::table.inner_join(car_trims::table).into_boxed::<Sqlite>();

        if let Some(raw) = query.search.as_deref() {
            // A VIN in the query short-circuits everything else to an exact
            // match.
            if let Some(vin) = Vin::extract(raw) {
                items = items.filter(cars::vin.eq(vin.as_str().to_string()));
            } else if let Some(predicate) = search_predicate(raw) {
                items = items.filter(predicate);
            }
        }

        items = apply_filters(items, &query.filters);

        if !query.include_hidden {
            let active_car_ids = car_orders::table
                .inner_join(orders::table)
                .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
                .select(car_orders::car_id);
            items = items
                .filter(cars::is_visible.eq(true))
                .filter(diesel::dsl::not(cars::id.eq_any(active_car_ids)));
        }

        let rows = items
            .order(cars::id.asc())
            .offset(query.pagination.offset)
            .limit(query.pagination.limit + 1)
            .load::<(DbCar, DbTrim)>(&mut conn)?;

        let limit = query.pagination.limit;
        let cars = assemble_cars(&mut conn, rows)?;
        Ok(Page::from_lookahead(cars, limit))
    }

    fn get_car_by_id(&self, id: CarId) -> RepositoryResult<Option<Car>> {
        use crate::schema::{car_trims, cars};

        let mut conn = self.conn()?;

        let row = cars::table
            .inner_join(car_trims::table)
            .filter(cars::id.eq(id.get()))
            .first::<(DbCar, DbTrim)>(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(assemble_cars(&mut conn, vec![row])?.pop())
    }
}

impl CarWriter for DieselRepository {
    fn create_trim(&self, trim: &NewTrim) -> RepositoryResult<Trim> {
        use crate::schema::car_trims;

        let mut conn = self.conn()?;

        let db_trim: DbNewTrim = trim.into();
        let created = diesel::insert_into(car_trims::table)
            .values(db_trim)
            .get_result::<DbTrim>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn create_car(&self, car: &NewCar) -> RepositoryResult<Car> {
        use crate::schema::{car_trims, cars, images};

        let mut conn = self.conn()?;

        let created = conn.transaction::<DbCar, RepositoryError, _>(|conn| {
            let trim_exists: i64 = car_trims::table
                .filter(car_trims::id.eq(car.trim_id.get()))
                .count()
                .get_result(conn)?;
            if trim_exists == 0 {
                return Err(RepositoryError::NotFound);
            }

            let clashes: i64 = cars::table
                .filter(cars::vin.eq(car.vin.as_str()))
                .count()
                .get_result(conn)?;
            if clashes > 0 {
                return Err(RepositoryError::ValidationError(format!(
                    "a car with VIN {} already exists",
                    car.vin
                )));
            }

            let db_car: DbNewCar = car.into();
            let row = diesel::insert_into(cars::table)
                .values(db_car)
                .get_result::<DbCar>(conn)?;

            let image_rows: Vec<NewImage> = car
                .images
                .iter()
                .map(|image| NewImage::for_car(row.id, image))
                .collect();
            diesel::insert_into(images::table)
                .values(&image_rows)
                .execute(conn)?;

            Ok(row)
        })?;

        let car_id = CarId::new(created.id)?;
        self.get_car_by_id(car_id)?.ok_or(RepositoryError::NotFound)
    }

    fn update_car(&self, id: CarId, update: &CarUpdate) -> RepositoryResult<Car> {
        use crate::schema::{car_trims, cars, images};

        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let exists: i64 = cars::table
                .filter(cars::id.eq(id.get()))
                .count()
                .get_result(conn)?;
            if exists == 0 {
                return Err(RepositoryError::NotFound);
            }

            if let Some(trim_id) = update.trim_id {
                let trim_exists: i64 = car_trims::table
                    .filter(car_trims::id.eq(trim_id.get()))
                    .count()
                    .get_result(conn)?;
                if trim_exists == 0 {
                    return Err(RepositoryError::NotFound);
                }
            }

            diesel::update(cars::table.filter(cars::id.eq(id.get())))
                .set((
                    update.trim_id.map(|v| cars::trim_id.eq(v.get())),
                    update.production_year.map(|v| cars::production_year.eq(v)),
                    update
                        .condition
                        .map(|v| cars::condition.eq(v.as_str().to_string())),
                    update.mileage.map(|v| cars::mileage.eq(v)),
                    update
                        .color
                        .as_ref()
                        .map(|v| cars::color.eq(v.as_str().to_string())),
                    update
                        .price
                        .map(|v| cars::price_cents.eq(v.map(Money::cents))),
                    cars::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;

            if let Some(image_list) = update.images.as_ref() {
                diesel::delete(images::table.filter(images::car_id.eq(Some(id.get()))))
                    .execute(conn)?;
                let rows: Vec<NewImage> = image_list
                    .iter()
                    .map(|image| NewImage::for_car(id.get(), image))
                    .collect();
                diesel::insert_into(images::table).values(&rows).execute(conn)?;
            }

            Ok(())
        })?;

        self.get_car_by_id(id)?.ok_or(RepositoryError::NotFound)
    }

    fn delete_car(&self, id: CarId) -> RepositoryResult<usize> {
        use crate::schema::{cars, images};

        let mut conn = self.conn()?;

        let affected = conn.transaction::<usize, RepositoryError, _>(|conn| {
            diesel::delete(images::table.filter(images::car_id.eq(Some(id.get()))))
                .execute(conn)?;
            Ok(diesel::delete(cars::table.filter(cars::id.eq(id.get()))).execute(conn)?)
        })?;

        Ok(affected)
    }

    fn set_car_visibility(&self, id: CarId, visible: bool) -> RepositoryResult<usize> {
        use crate::schema::cars;

        let mut conn = self.conn()?;

        let affected = diesel::update(cars::table.filter(cars::id.eq(id.get())))
            .set((
                cars::is_visible.eq(visible),
                cars::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
