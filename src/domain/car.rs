use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::part::Image;
use crate::domain::types::{CarId, Money, NonEmptyString, TrimId, TypeConstraintError, Vin};

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(TypeConstraintError::InvalidValue(format!(
                        concat!("unknown ", stringify!($name), ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

string_enum!(
    /// Whether a car is sold new or with mileage.
    Condition {
        New => "new",
        Used => "used",
    }
);

string_enum!(
    FuelType {
        Petrol => "petrol",
        Diesel => "diesel",
        Hybrid => "hybrid",
        Electric => "electric",
        Gas => "gas",
    }
);

string_enum!(
    Transmission {
        Manual => "manual",
        Automatic => "automatic",
        Robot => "robot",
        Cvt => "cvt",
    }
);

string_enum!(
    DriveType {
        Fwd => "fwd",
        Rwd => "rwd",
        Awd => "awd",
        FourWd => "4wd",
    }
);

string_enum!(
    BodyType {
        Sedan => "sedan",
        Hatchback => "hatchback",
        Wagon => "wagon",
        Coupe => "coupe",
        Suv => "suv",
        Minivan => "minivan",
        Pickup => "pickup",
        Van => "van",
    }
);

/// A normalized bundle of car attributes shared by multiple physical units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trim {
    pub id: TrimId,
    pub name: Option<String>,
    pub brand: NonEmptyString,
    pub model: Option<String>,
    /// Litres.
    pub engine_volume: Option<f64>,
    /// Horsepower.
    pub engine_power: Option<i32>,
    /// Newton-metres.
    pub engine_torque: Option<i32>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub drive_type: Option<DriveType>,
    pub body_type: Option<BodyType>,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
}

/// Data required to insert a new [`Trim`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrim {
    pub name: Option<String>,
    pub brand: NonEmptyString,
    pub model: Option<String>,
    pub engine_volume: Option<f64>,
    pub engine_power: Option<i32>,
    pub engine_torque: Option<i32>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub drive_type: Option<DriveType>,
    pub body_type: Option<BodyType>,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
}

/// A physical car unit offered for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub trim: Trim,
    pub vin: Vin,
    pub production_year: i32,
    pub condition: Condition,
    /// Kilometres.
    pub mileage: i32,
    pub color: NonEmptyString,
    /// Unpriced cars are not orderable.
    pub price: Option<Money>,
    /// Flipped off while an active order references the car.
    pub is_visible: bool,
    pub images: Vec<Image>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Car {
    /// A car can be ordered only while it is listed and carries a price.
    pub fn is_orderable(&self) -> bool {
        self.is_visible && self.price.is_some()
    }
}

/// Information required to create a new [`Car`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCar {
    pub trim_id: TrimId,
    pub vin: Vin,
    pub production_year: i32,
    pub condition: Condition,
    pub mileage: i32,
    pub color: NonEmptyString,
    pub price: Option<Money>,
    pub images: Vec<Image>,
}

/// Partial update of a car; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CarUpdate {
    pub trim_id: Option<TrimId>,
    pub production_year: Option<i32>,
    pub condition: Option<Condition>,
    pub mileage: Option<i32>,
    pub color: Option<NonEmptyString>,
    pub price: Option<Option<Money>>,
    pub images: Option<Vec<Image>>,
}
