//! Diesel row types mirroring `schema.rs`, with conversions into the domain
//! layer.

pub mod car;
pub mod cart;
pub mod category;
pub mod image;
pub mod order;
pub mod part;
pub mod pickup;
