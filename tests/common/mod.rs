//! Helpers for integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::NamedTempFile;

use avtomarket::db::{DbPool, establish_connection_pool};
use avtomarket::schema::{
    car_trims, cars, cart_items, categories, part_specifications, parts, pickup_points,
    user_addresses,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

pub fn seed_category(pool: &DbPool, name: &str, parent_id: Option<i32>) -> i32 {
    let mut conn = pool.get().unwrap();
    diesel::insert_into(categories::table)
        .values((categories::name.eq(name), categories::parent_id.eq(parent_id)))
        .returning(categories::id)
        .get_result(&mut conn)
        .expect("should seed category")
}

pub fn seed_part(
    pool: &DbPool,
    name: &str,
    article: Option<&str>,
    category_id: i32,
    price_cents: i64,
    stock_count: i32,
    manufacturer: &str,
) -> i32 {
    let mut conn = pool.get().unwrap();
    diesel::insert_into(parts::table)
        .values((
            parts::name.eq(name),
            parts::article.eq(article),
            parts::description.eq(""),
            parts::price_cents.eq(price_cents),
            parts::stock_count.eq(stock_count),
            parts::manufacturer.eq(manufacturer),
            parts::category_id.eq(category_id),
        ))
        .returning(parts::id)
        .get_result(&mut conn)
        .expect("should seed part")
}

pub fn seed_spec(pool: &DbPool, part_id: i32, name: &str, value: &str, unit: Option<&str>) {
    let mut conn = pool.get().unwrap();
    diesel::insert_into(part_specifications::table)
        .values((
            part_specifications::part_id.eq(part_id),
            part_specifications::name.eq(name),
            part_specifications::value.eq(value),
            part_specifications::unit.eq(unit),
        ))
        .execute(&mut conn)
        .expect("should seed specification");
}

pub fn seed_trim(pool: &DbPool, brand: &str, model: &str) -> i32 {
    let mut conn = pool.get().unwrap();
    diesel::insert_into(car_trims::table)
        .values((
            car_trims::brand.eq(brand),
            car_trims::model.eq(Some(model)),
            car_trims::engine_volume.eq(Some(2.0_f64)),
            car_trims::engine_power.eq(Some(150)),
            car_trims::fuel_type.eq(Some("petrol")),
            car_trims::transmission.eq(Some("automatic")),
            car_trims::drive_type.eq(Some("fwd")),
            car_trims::body_type.eq(Some("sedan")),
        ))
        .returning(car_trims::id)
        .get_result(&mut conn)
        .expect("should seed trim")
}

pub fn seed_car(
    pool: &DbPool,
    trim_id: i32,
    vin: &str,
    production_year: i32,
    color: &str,
    price_cents: Option<i64>,
) -> i32 {
    let mut conn = pool.get().unwrap();
    diesel::insert_into(cars::table)
        .values((
            cars::trim_id.eq(trim_id),
            cars::vin.eq(vin),
            cars::production_year.eq(production_year),
            cars::condition.eq("used"),
            cars::mileage.eq(50_000),
            cars::color.eq(color),
            cars::price_cents.eq(price_cents),
        ))
        .returning(cars::id)
        .get_result(&mut conn)
        .expect("should seed car")
}

pub fn seed_pickup_point(pool: &DbPool, is_active: bool) -> i32 {
    let mut conn = pool.get().unwrap();
    diesel::insert_into(pickup_points::table)
        .values((
            pickup_points::name.eq("Central"),
            pickup_points::city.eq("Moscow"),
            pickup_points::street.eq("Tverskaya"),
            pickup_points::house.eq("1"),
            pickup_points::is_active.eq(is_active),
        ))
        .returning(pickup_points::id)
        .get_result(&mut conn)
        .expect("should seed pickup point")
}

pub fn seed_address(pool: &DbPool, user_id: i32, is_active: bool) -> i32 {
    let mut conn = pool.get().unwrap();
    diesel::insert_into(user_addresses::table)
        .values((
            user_addresses::user_id.eq(user_id),
            user_addresses::city.eq("Moscow"),
            user_addresses::street.eq("Lenina"),
            user_addresses::house.eq("10"),
            user_addresses::is_active.eq(is_active),
        ))
        .returning(user_addresses::id)
        .get_result(&mut conn)
        .expect("should seed address")
}

pub fn seed_cart_item(pool: &DbPool, user_id: i32, part_id: i32, quantity: i32) {
    let mut conn = pool.get().unwrap();
    diesel::insert_into(cart_items::table)
        .values((
            cart_items::user_id.eq(user_id),
            cart_items::part_id.eq(part_id),
            cart_items::quantity.eq(quantity),
        ))
        .execute(&mut conn)
        .expect("should seed cart item");
}

pub fn part_stock(pool: &DbPool, part_id: i32) -> i32 {
    let mut conn = pool.get().unwrap();
    parts::table
        .filter(parts::id.eq(part_id))
        .select(parts::stock_count)
        .first(&mut conn)
        .expect("part should exist")
}

pub fn car_visibility(pool: &DbPool, car_id: i32) -> bool {
    let mut conn = pool.get().unwrap();
    cars::table
        .filter(cars::id.eq(car_id))
        .select(cars::is_visible)
        .first(&mut conn)
        .expect("car should exist")
}
