use std::collections::{BTreeMap, BTreeSet};

use crate::db::{DbConnection, DbPool};
use crate::domain::car::{Car, CarUpdate, Condition, NewCar, NewTrim, Trim};
use crate::domain::car::{BodyType, DriveType, FuelType, Transmission};
use crate::domain::cart::{CartItem, CartLine};
use crate::domain::category::{Category, CategoryTreeNode, NewCategory};
use crate::domain::facet::{FacetConfig, SpecSample};
use crate::domain::order::{NewCarOrder, NewPartOrder, Order, OrderStatus};
use crate::domain::part::{NewPart, Part, PartUpdate};
use crate::domain::pickup::{PickupPoint, UserAddress};
use crate::domain::types::{
    AddressId, CarId, CategoryId, Money, NonEmptyString, OrderId, PartId, PickupPointId, Quantity,
    UserId,
};
use crate::pagination::{Page, Pagination};

pub mod car;
pub mod cart;
pub mod category;
pub mod errors;
pub mod order;
pub mod part;
pub mod pickup;
#[cfg(test)]
pub mod test;

use errors::RepositoryResult;
use part::SpecCache;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers. The facet cache is shared across
/// clones.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
    spec_cache: SpecCache,
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            spec_cache: SpecCache::default(),
        }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    pub(crate) fn spec_cache(&self) -> &SpecCache {
        &self.spec_cache
    }
}

/// A single facet selection applied to a parts query.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecSelection {
    /// Match parts carrying a specification with one of these exact values.
    Options(Vec<String>),
    /// Match parts whose specification value parses into the given band.
    Range { min: Option<f64>, max: Option<f64> },
}

/// Facet selections keyed by specification name. All entries must match.
pub type SpecsFilter = BTreeMap<String, SpecSelection>;

/// Query parameters used when listing or searching parts.
#[derive(Debug, Clone, Default)]
pub struct PartListQuery {
    /// Free-text search string.
    pub search: Option<String>,
    /// Restrict to a category and all its descendants.
    pub category_id: Option<CategoryId>,
    /// Facet selections (leaf categories only produce meaningful ones).
    pub specs: SpecsFilter,
    /// Pagination window.
    pub pagination: Pagination,
}

impl PartListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn specs(mut self, specs: SpecsFilter) -> Self {
        self.specs = specs;
        self
    }

    pub fn paginate(mut self, offset: i64, limit: i64) -> Self {
        self.pagination = Pagination::new(offset, limit);
        self
    }
}

/// Structured column filters for the cars pipeline.
#[derive(Debug, Clone, Default)]
pub struct CarFilters {
    pub colors: Vec<String>,
    pub conditions: Vec<Condition>,
    pub brands: Vec<String>,
    pub fuel_types: Vec<FuelType>,
    pub transmissions: Vec<Transmission>,
    pub drive_types: Vec<DriveType>,
    pub body_types: Vec<BodyType>,
    pub min_mileage: Option<i32>,
    pub max_mileage: Option<i32>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub min_engine_volume: Option<f64>,
    pub max_engine_volume: Option<f64>,
    pub min_engine_power: Option<i32>,
    pub max_engine_power: Option<i32>,
    pub min_engine_torque: Option<i32>,
    pub max_engine_torque: Option<i32>,
}

/// Query parameters used when listing or searching cars.
#[derive(Debug, Clone, Default)]
pub struct CarListQuery {
    /// Free-text search string; a VIN short-circuits to an exact match.
    pub search: Option<String>,
    pub filters: CarFilters,
    /// Staff callers may opt into seeing hidden/ordered cars.
    pub include_hidden: bool,
    pub pagination: Pagination,
}

impl CarListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn filters(mut self, filters: CarFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn include_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn paginate(mut self, offset: i64, limit: i64) -> Self {
        self.pagination = Pagination::new(offset, limit);
        self
    }
}

/// Ordering applied to order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    /// Management view: status priority first, newest within a status.
    #[default]
    StatusPriority,
    /// Customer view: plain reverse chronology.
    NewestFirst,
}

/// Query parameters used when listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    pub user_id: Option<UserId>,
    pub sort: OrderSort,
    pub pagination: Pagination,
}

impl OrderListQuery {
    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn sort(mut self, sort: OrderSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, offset: i64, limit: i64) -> Self {
        self.pagination = Pagination::new(offset, limit);
        self
    }
}

/// Read-only operations for the category tree.
pub trait CategoryReader {
    /// Retrieve a category by its identifier.
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    /// All categories, sorted by name.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    /// True iff no category has this id as parent.
    fn is_leaf(&self, id: CategoryId) -> RepositoryResult<bool>;
    /// Breadth-first closure over parent→children edges, including the
    /// inputs. Bounded by a visited set so corrupted cyclic data cannot hang
    /// the traversal.
    fn descendants(&self, roots: &[CategoryId]) -> RepositoryResult<BTreeSet<CategoryId>>;
    /// Full forest rooted at top-level categories, name-sorted at every
    /// level.
    fn category_tree(&self) -> RepositoryResult<Vec<CategoryTreeNode>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    fn rename_category(&self, id: CategoryId, name: &NonEmptyString) -> RepositoryResult<usize>;
    /// Delete a category and all of its descendants.
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Read-only operations for part entities and their facet metadata.
pub trait PartReader {
    /// List parts matching the supplied query parameters.
    fn list_parts(&self, query: PartListQuery) -> RepositoryResult<Page<Part>>;
    /// Retrieve a part by its identifier.
    fn get_part_by_id(&self, id: PartId) -> RepositoryResult<Option<Part>>;
    /// Distinct `(value, unit)` samples per specification name across the
    /// parts directly in the category.
    fn specs_for_category(
        &self,
        category_id: CategoryId,
    ) -> RepositoryResult<BTreeMap<String, Vec<SpecSample>>>;
    /// Facet descriptors for a leaf category.
    fn filter_config(&self, category_id: CategoryId) -> RepositoryResult<FacetConfig>;
}

/// Write operations for part entities. Every write invalidates the facet
/// cache for the categories involved.
pub trait PartWriter {
    fn create_part(&self, part: &NewPart) -> RepositoryResult<Part>;
    fn update_part(&self, id: PartId, update: &PartUpdate) -> RepositoryResult<Part>;
    fn delete_part(&self, id: PartId) -> RepositoryResult<usize>;
}

/// Read-only operations for car entities.
pub trait CarReader {
    /// List cars matching the supplied query parameters.
    fn list_cars(&self, query: CarListQuery) -> RepositoryResult<Page<Car>>;
    /// Retrieve a car by its identifier.
    fn get_car_by_id(&self, id: CarId) -> RepositoryResult<Option<Car>>;
}

/// Write operations for car and trim entities.
pub trait CarWriter {
    fn create_trim(&self, trim: &NewTrim) -> RepositoryResult<Trim>;
    fn create_car(&self, car: &NewCar) -> RepositoryResult<Car>;
    fn update_car(&self, id: CarId, update: &CarUpdate) -> RepositoryResult<Car>;
    fn delete_car(&self, id: CarId) -> RepositoryResult<usize>;
    /// Direct administrative visibility toggle, bypassing the order
    /// lifecycle.
    fn set_car_visibility(&self, id: CarId, visible: bool) -> RepositoryResult<usize>;
}

/// Read-only operations for orders.
pub trait OrderReader {
    /// Retrieve an order with its lines.
    fn get_order_by_id(&self, id: OrderId) -> RepositoryResult<Option<Order>>;
    /// List orders with the requested ordering.
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<Page<Order>>;
}

/// Order lifecycle mutations. These are the only legitimate mutators of part
/// stock and car visibility outside direct administrative edits; every
/// inventory adjustment commits in the same transaction as the order row.
pub trait OrderWriter {
    fn create_part_order(&self, order: &NewPartOrder) -> RepositoryResult<Order>;
    fn create_car_order(&self, order: &NewCarOrder) -> RepositoryResult<Order>;
    /// Apply a lifecycle transition; cancelling releases reserved inventory
    /// in the same transaction.
    fn transition_status(&self, id: OrderId, next: OrderStatus) -> RepositoryResult<Order>;
    fn set_paid(&self, id: OrderId, paid: bool) -> RepositoryResult<Order>;
    fn set_admin_notes(&self, id: OrderId, notes: &str) -> RepositoryResult<Order>;
}

/// Read-only operations for cart entities.
pub trait CartReader {
    /// Cart rows with their parts loaded, newest first.
    fn list_cart_items(&self, user_id: UserId) -> RepositoryResult<Vec<CartItem>>;
    /// Bare `(part, quantity)` snapshot used by order placement.
    fn cart_lines(&self, user_id: UserId) -> RepositoryResult<Vec<CartLine>>;
    fn get_cart_line(&self, user_id: UserId, part_id: PartId)
    -> RepositoryResult<Option<CartLine>>;
    /// Sum of quantities across the user's cart.
    fn cart_count(&self, user_id: UserId) -> RepositoryResult<i64>;
}

/// Write operations for cart entities.
pub trait CartWriter {
    /// Add a part to the cart, merging with an existing row.
    fn add_to_cart(
        &self,
        user_id: UserId,
        part_id: PartId,
        quantity: Quantity,
    ) -> RepositoryResult<CartLine>;
    /// Overwrite the quantity; zero or negative removes the row.
    fn set_cart_quantity(
        &self,
        user_id: UserId,
        part_id: PartId,
        quantity: i32,
    ) -> RepositoryResult<Option<CartLine>>;
    fn remove_from_cart(&self, user_id: UserId, part_id: PartId) -> RepositoryResult<usize>;
    fn clear_cart(&self, user_id: UserId) -> RepositoryResult<usize>;
    /// Replace-style sync from a client snapshot; rows for unknown parts are
    /// skipped. Returns the number of rows written.
    fn sync_cart(&self, user_id: UserId, lines: &[CartLine]) -> RepositoryResult<usize>;
}

/// Read-only operations for pickup points and shipping addresses (managed by
/// the excluded CRUD layer).
pub trait PickupReader {
    fn get_pickup_point_by_id(
        &self,
        id: PickupPointId,
    ) -> RepositoryResult<Option<PickupPoint>>;
    fn list_pickup_points(&self) -> RepositoryResult<Vec<PickupPoint>>;
    /// A user's address; scoped by owner so one user cannot order against
    /// another's address.
    fn get_user_address(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> RepositoryResult<Option<UserAddress>>;
}
