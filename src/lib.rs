//! Core library for the Avtomarket marketplace.
//!
//! This crate exposes the domain model, Diesel persistence layer, repositories
//! and service layer for a car and spare-part marketplace: faceted catalog
//! search, the category tree, cart handling and the order/inventory lifecycle.
//! HTTP routing, templating and authentication live in a separate shell that
//! consumes the `services` module.

pub mod db;
pub mod domain;
pub mod error_conversions;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod schema;
pub mod services;
