use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::car::{Car as DomainCar, Trim as DomainTrim};
use crate::domain::types::{CarId, Money, NonEmptyString, TrimId, TypeConstraintError, Vin};
use crate::models::image::Image;

/// Diesel model representing the `car_trims` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::car_trims)]
pub struct Trim {
    pub id: i32,
    pub name: Option<String>,
    pub brand: String,
    pub model: Option<String>,
    pub engine_volume: Option<f64>,
    pub engine_power: Option<i32>,
    pub engine_torque: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub drive_type: Option<String>,
    pub body_type: Option<String>,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
}

/// Insertable form of [`Trim`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::car_trims)]
pub struct NewTrim {
    pub name: Option<String>,
    pub brand: String,
    pub model: Option<String>,
    pub engine_volume: Option<f64>,
    pub engine_power: Option<i32>,
    pub engine_torque: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub drive_type: Option<String>,
    pub body_type: Option<String>,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
}

/// Diesel model representing the `cars` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::cars)]
pub struct Car {
    pub id: i32,
    pub trim_id: i32,
    pub vin: String,
    pub production_year: i32,
    pub condition: String,
    pub mileage: i32,
    pub color: String,
    pub price_cents: Option<i64>,
    pub is_visible: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Car`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::cars)]
pub struct NewCar {
    pub trim_id: i32,
    pub vin: String,
    pub production_year: i32,
    pub condition: String,
    pub mileage: i32,
    pub color: String,
    pub price_cents: Option<i64>,
    pub is_visible: bool,
}

impl TryFrom<Trim> for DomainTrim {
    type Error = TypeConstraintError;

    fn try_from(trim: Trim) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TrimId::new(trim.id)?,
            name: trim.name,
            brand: NonEmptyString::new_for_field(trim.brand, "brand")?,
            model: trim.model,
            engine_volume: trim.engine_volume,
            engine_power: trim.engine_power,
            engine_torque: trim.engine_torque,
            fuel_type: trim.fuel_type.as_deref().map(str::parse).transpose()?,
            transmission: trim.transmission.as_deref().map(str::parse).transpose()?,
            drive_type: trim.drive_type.as_deref().map(str::parse).transpose()?,
            body_type: trim.body_type.as_deref().map(str::parse).transpose()?,
            doors: trim.doors,
            seats: trim.seats,
        })
    }
}

impl From<&crate::domain::car::NewTrim> for NewTrim {
    fn from(trim: &crate::domain::car::NewTrim) -> Self {
        Self {
            name: trim.name.clone(),
            brand: trim.brand.as_str().to_string(),
            model: trim.model.clone(),
            engine_volume: trim.engine_volume,
            engine_power: trim.engine_power,
            engine_torque: trim.engine_torque,
            fuel_type: trim.fuel_type.map(|v| v.as_str().to_string()),
            transmission: trim.transmission.map(|v| v.as_str().to_string()),
            drive_type: trim.drive_type.map(|v| v.as_str().to_string()),
            body_type: trim.body_type.map(|v| v.as_str().to_string()),
            doors: trim.doors,
            seats: trim.seats,
        }
    }
}

impl Car {
    /// Assemble the domain car from its row plus the joined trim and images.
    pub fn into_domain(
        self,
        trim: Trim,
        images: Vec<Image>,
    ) -> Result<DomainCar, TypeConstraintError> {
        Ok(DomainCar {
            id: CarId::new(self.id)?,
            trim: trim.try_into()?,
            vin: Vin::new(&self.vin)?,
            production_year: self.production_year,
            condition: self.condition.parse()?,
            mileage: self.mileage,
            color: NonEmptyString::new_for_field(self.color, "color")?,
            price: self.price_cents.map(Money::new).transpose()?,
            is_visible: self.is_visible,
            images: images.into_iter().map(Into::into).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<&crate::domain::car::NewCar> for NewCar {
    fn from(car: &crate::domain::car::NewCar) -> Self {
        Self {
            trim_id: car.trim_id.get(),
            vin: car.vin.as_str().to_string(),
            production_year: car.production_year,
            condition: car.condition.as_str().to_string(),
            mileage: car.mileage,
            color: car.color.as_str().to_string(),
            price_cents: car.price.map(Money::cents),
            is_visible: true,
        }
    }
}
