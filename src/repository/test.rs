//! Simple in-memory repository used for service-layer unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::domain::car::{BodyType, Car, Condition, DriveType, FuelType, Transmission, Trim};
use crate::domain::cart::{CartItem, CartLine};
use crate::domain::category::{Category, CategoryTreeNode};
use crate::domain::facet::{self, FacetConfig, SpecSample};
use crate::domain::order::{
    CarOrder, DeliveryChoice, NewCarOrder, NewPartOrder, Order, OrderItem, OrderStatus,
};
use crate::domain::part::{Part, PartSpecification};
use crate::domain::pickup::{PickupPoint, UserAddress};
use crate::domain::types::{
    AddressId, CarId, CategoryId, Money, NonEmptyString, OrderId, PartId, PickupPointId,
    Quantity, StockCount, TrimId, UserId, Vin,
};
use crate::pagination::Page;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CarListQuery, CarReader, CartReader, CartWriter, CategoryReader, OrderListQuery,
    OrderReader, OrderSort, OrderWriter, PartListQuery, PartReader, PickupReader, SpecSelection,
};

fn epoch() -> NaiveDateTime {
    chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc()
}

/// In-memory repository with just enough behavior to drive the services.
#[derive(Default)]
pub struct TestRepository {
    categories: RefCell<Vec<Category>>,
    parts: RefCell<Vec<Part>>,
    cars: RefCell<Vec<Car>>,
    pickup_points: RefCell<Vec<PickupPoint>>,
    addresses: RefCell<Vec<UserAddress>>,
    cart: RefCell<Vec<(UserId, CartLine)>>,
    orders: RefCell<Vec<Order>>,
    next_order_id: Cell<i32>,
}

impl TestRepository {
    /// A repository seeded with a small consistent catalog:
    /// category 1 ("Parts", root) → category 2 ("Brakes", leaf); part 1
    /// ("Brake disc", stock 5) filed under "Brakes"; car 1 (visible, priced);
    /// pickup point 1 (active) and 2 (inactive); address 1 for user 1.
    pub fn with_catalog() -> Self {
        let repo = Self::default();

        repo.categories.borrow_mut().extend([
            Category {
                id: CategoryId::new(1).unwrap(),
                name: NonEmptyString::new("Parts").unwrap(),
                parent_id: None,
            },
            Category {
                id: CategoryId::new(2).unwrap(),
                name: NonEmptyString::new("Brakes").unwrap(),
                parent_id: Some(CategoryId::new(1).unwrap()),
            },
        ]);

        repo.parts.borrow_mut().push(Part {
            id: PartId::new(1).unwrap(),
            name: NonEmptyString::new("Brake disc").unwrap(),
            article: Some(NonEmptyString::new("BD-280").unwrap()),
            description: "Front brake disc".to_string(),
            price: Money::new(100_000).unwrap(),
            stock_count: StockCount::new(5).unwrap(),
            manufacturer: NonEmptyString::new("Brembo").unwrap(),
            category_id: CategoryId::new(2).unwrap(),
            specifications: vec![PartSpecification {
                name: NonEmptyString::new("Diameter").unwrap(),
                value: NonEmptyString::new("280").unwrap(),
                unit: Some("мм".to_string()),
            }],
            images: vec![],
            created_at: epoch(),
            updated_at: epoch(),
        });

        repo.cars.borrow_mut().push(Car {
            id: CarId::new(1).unwrap(),
            trim: Trim {
                id: TrimId::new(1).unwrap(),
                name: Some("Comfort".to_string()),
                brand: NonEmptyString::new("Honda").unwrap(),
                model: Some("Accord".to_string()),
                engine_volume: Some(2.4),
                engine_power: Some(160),
                engine_torque: Some(220),
                fuel_type: Some(FuelType::Petrol),
                transmission: Some(Transmission::Automatic),
                drive_type: Some(DriveType::Fwd),
                body_type: Some(BodyType::Sedan),
                doors: Some(4),
                seats: Some(5),
            },
            vin: Vin::new("1HGCM82633A004352").unwrap(),
            production_year: 2003,
            condition: Condition::Used,
            mileage: 120_000,
            color: NonEmptyString::new("silver").unwrap(),
            price: Some(Money::new(2_000_000).unwrap()),
            is_visible: true,
            images: vec![],
            created_at: epoch(),
            updated_at: epoch(),
        });

        repo.pickup_points.borrow_mut().extend([
            PickupPoint {
                id: PickupPointId::new(1).unwrap(),
                name: "Central".to_string(),
                city: "Moscow".to_string(),
                street: "Tverskaya".to_string(),
                house: "1".to_string(),
                is_active: true,
            },
            PickupPoint {
                id: PickupPointId::new(2).unwrap(),
                name: "Closed".to_string(),
                city: "Moscow".to_string(),
                street: "Arbat".to_string(),
                house: "2".to_string(),
                is_active: false,
            },
        ]);

        repo.addresses.borrow_mut().push(UserAddress {
            id: AddressId::new(1).unwrap(),
            user_id: UserId::new(1).unwrap(),
            city: "Moscow".to_string(),
            street: "Lenina".to_string(),
            house: "10".to_string(),
            apartment: None,
            is_active: true,
        });

        repo
    }

    /// Administrative helper mirroring `CarWriter::set_car_visibility`.
    pub fn hide_car(&self, car_id: i32) {
        if let Some(car) = self.cars.borrow_mut().iter_mut().find(|c| c.id.get() == car_id) {
            car.is_visible = false;
        }
    }

    fn car_has_active_order(&self, car_id: CarId) -> bool {
        self.orders.borrow().iter().any(|order| {
            order.status != OrderStatus::Cancelled
                && order.car_orders.iter().any(|co| co.car_id == car_id)
        })
    }

    fn allocate_order_id(&self) -> OrderId {
        let next = self.next_order_id.get() + 1;
        self.next_order_id.set(next);
        OrderId::new(next).expect("order ids start at 1")
    }
}

impl CategoryReader for TestRepository {
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        Ok(self
            .categories
            .borrow()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let mut categories = self.categories.borrow().clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn is_leaf(&self, id: CategoryId) -> RepositoryResult<bool> {
        Ok(!self
            .categories
            .borrow()
            .iter()
            .any(|c| c.parent_id == Some(id)))
    }

    fn descendants(&self, roots: &[CategoryId]) -> RepositoryResult<BTreeSet<CategoryId>> {
        let categories = self.categories.borrow();
        let mut visited: BTreeSet<CategoryId> = roots.iter().copied().collect();
        let mut frontier: Vec<CategoryId> = roots.to_vec();
        while let Some(parent) = frontier.pop() {
            for category in categories.iter().filter(|c| c.parent_id == Some(parent)) {
                if visited.insert(category.id) {
                    frontier.push(category.id);
                }
            }
        }
        Ok(visited)
    }

    fn category_tree(&self) -> RepositoryResult<Vec<CategoryTreeNode>> {
        fn build(parent: Option<CategoryId>, categories: &[Category]) -> Vec<CategoryTreeNode> {
            let mut nodes: Vec<CategoryTreeNode> = categories
                .iter()
                .filter(|c| c.parent_id == parent)
                .map(|c| {
                    let children = build(Some(c.id), categories);
                    CategoryTreeNode {
                        id: c.id,
                        name: c.name.as_str().to_string(),
                        is_leaf: children.is_empty(),
                        children,
                    }
                })
                .collect();
            nodes.sort_by(|a, b| a.name.cmp(&b.name));
            nodes
        }
        Ok(build(None, &self.categories.borrow()))
    }
}

impl PartReader for TestRepository {
    fn list_parts(&self, query: PartListQuery) -> RepositoryResult<Page<Part>> {
        let mut items: Vec<Part> = self.parts.borrow().clone();

        if let Some(search) = &query.search {
            let needle = search.to_lowercase();
            items.retain(|p| p.name.as_str().to_lowercase().contains(&needle));
        }

        if let Some(category_id) = query.category_id {
            let scope = self.descendants(&[category_id])?;
            items.retain(|p| scope.contains(&p.category_id));
        }

        for (name, selection) in &query.specs {
            items.retain(|part| {
                part.specifications.iter().any(|spec| {
                    if spec.name.as_str() != name {
                        return false;
                    }
                    match selection {
                        SpecSelection::Options(values) => {
                            values.iter().any(|v| v == spec.value.as_str())
                        }
                        SpecSelection::Range { min, max } => {
                            match facet::parse_numeric(spec.value.as_str()) {
                                Some(v) => {
                                    min.is_none_or(|lo| v >= lo)
                                        && max.is_none_or(|hi| v <= hi)
                                }
                                None => false,
                            }
                        }
                    }
                })
            });
        }

        let offset = query.pagination.offset.max(0) as usize;
        let items: Vec<Part> = items
            .into_iter()
            .skip(offset)
            .take(query.pagination.limit as usize + 1)
            .collect();
        Ok(Page::from_lookahead(items, query.pagination.limit))
    }

    fn get_part_by_id(&self, id: PartId) -> RepositoryResult<Option<Part>> {
        Ok(self.parts.borrow().iter().find(|p| p.id == id).cloned())
    }

    fn specs_for_category(
        &self,
        category_id: CategoryId,
    ) -> RepositoryResult<BTreeMap<String, Vec<SpecSample>>> {
        if self.get_category_by_id(category_id)?.is_none() {
            return Err(RepositoryError::NotFound);
        }
        let mut specs: BTreeMap<String, Vec<SpecSample>> = BTreeMap::new();
        for part in self.parts.borrow().iter().filter(|p| p.category_id == category_id) {
            for spec in &part.specifications {
                let samples = specs.entry(spec.name.as_str().to_string()).or_default();
                let sample = SpecSample::new(spec.value.as_str(), spec.unit.clone());
                if !samples.contains(&sample) {
                    samples.push(sample);
                }
            }
        }
        Ok(specs)
    }

    fn filter_config(&self, category_id: CategoryId) -> RepositoryResult<FacetConfig> {
        if self.get_category_by_id(category_id)?.is_none() {
            return Err(RepositoryError::NotFound);
        }
        if !self.is_leaf(category_id)? {
            return Err(RepositoryError::InvalidOperation(
                "facet filters are only available on leaf categories".to_string(),
            ));
        }
        let specs = self.specs_for_category(category_id)?;
        Ok(specs
            .into_iter()
            .map(|(name, samples)| (name, facet::classify(&samples)))
            .collect())
    }
}

impl CarReader for TestRepository {
    fn list_cars(&self, query: CarListQuery) -> RepositoryResult<Page<Car>> {
        let mut items: Vec<Car> = self.cars.borrow().clone();

        if !query.include_hidden {
            items.retain(|car| car.is_visible && !self.car_has_active_order(car.id));
        }

        if let Some(search) = &query.search {
            if let Some(vin) = Vin::extract(search) {
                items.retain(|car| car.vin == vin);
            } else {
                let needle = search.to_lowercase();
                items.retain(|car| {
                    car.trim.brand.as_str().to_lowercase().contains(&needle)
                        || car
                            .trim
                            .model
                            .as_deref()
                            .is_some_and(|m| m.to_lowercase().contains(&needle))
                        || car.color.as_str().to_lowercase().contains(&needle)
                });
            }
        }

        let filters = &query.filters;
        if !filters.colors.is_empty() {
            items.retain(|car| filters.colors.iter().any(|c| c == car.color.as_str()));
        }
        if !filters.conditions.is_empty() {
            items.retain(|car| filters.conditions.contains(&car.condition));
        }
        if !filters.brands.is_empty() {
            items.retain(|car| filters.brands.iter().any(|b| b == car.trim.brand.as_str()));
        }
        if let Some(min) = filters.min_year {
            items.retain(|car| car.production_year >= min);
        }
        if let Some(max) = filters.max_year {
            items.retain(|car| car.production_year <= max);
        }
        if let Some(min) = filters.min_price {
            items.retain(|car| car.price.is_some_and(|p| p >= min));
        }
        if let Some(max) = filters.max_price {
            items.retain(|car| car.price.is_some_and(|p| p <= max));
        }

        let offset = query.pagination.offset.max(0) as usize;
        let items: Vec<Car> = items
            .into_iter()
            .skip(offset)
            .take(query.pagination.limit as usize + 1)
            .collect();
        Ok(Page::from_lookahead(items, query.pagination.limit))
    }

    fn get_car_by_id(&self, id: CarId) -> RepositoryResult<Option<Car>> {
        Ok(self.cars.borrow().iter().find(|c| c.id == id).cloned())
    }
}

impl PickupReader for TestRepository {
    fn get_pickup_point_by_id(
        &self,
        id: PickupPointId,
    ) -> RepositoryResult<Option<PickupPoint>> {
        Ok(self
            .pickup_points
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    fn list_pickup_points(&self) -> RepositoryResult<Vec<PickupPoint>> {
        Ok(self
            .pickup_points
            .borrow()
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    fn get_user_address(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> RepositoryResult<Option<UserAddress>> {
        Ok(self
            .addresses
            .borrow()
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }
}

impl CartReader for TestRepository {
    fn list_cart_items(&self, user_id: UserId) -> RepositoryResult<Vec<CartItem>> {
        let mut items = Vec::new();
        for (_, line) in self.cart.borrow().iter().filter(|(u, _)| *u == user_id) {
            let part = self
                .get_part_by_id(line.part_id)?
                .ok_or(RepositoryError::NotFound)?;
            items.push(CartItem {
                user_id,
                part,
                quantity: line.quantity,
                created_at: epoch(),
            });
        }
        Ok(items)
    }

    fn cart_lines(&self, user_id: UserId) -> RepositoryResult<Vec<CartLine>> {
        Ok(self
            .cart
            .borrow()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, line)| *line)
            .collect())
    }

    fn get_cart_line(
        &self,
        user_id: UserId,
        part_id: PartId,
    ) -> RepositoryResult<Option<CartLine>> {
        Ok(self
            .cart
            .borrow()
            .iter()
            .find(|(u, line)| *u == user_id && line.part_id == part_id)
            .map(|(_, line)| *line))
    }

    fn cart_count(&self, user_id: UserId) -> RepositoryResult<i64> {
        Ok(self
            .cart
            .borrow()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, line)| i64::from(line.quantity.get()))
            .sum())
    }
}

impl CartWriter for TestRepository {
    fn add_to_cart(
        &self,
        user_id: UserId,
        part_id: PartId,
        quantity: Quantity,
    ) -> RepositoryResult<CartLine> {
        let mut cart = self.cart.borrow_mut();
        if let Some((_, line)) = cart
            .iter_mut()
            .find(|(u, line)| *u == user_id && line.part_id == part_id)
        {
            line.quantity = Quantity::new(line.quantity.get() + quantity.get())?;
            return Ok(*line);
        }
        let line = CartLine { part_id, quantity };
        cart.push((user_id, line));
        Ok(line)
    }

    fn set_cart_quantity(
        &self,
        user_id: UserId,
        part_id: PartId,
        quantity: i32,
    ) -> RepositoryResult<Option<CartLine>> {
        let mut cart = self.cart.borrow_mut();
        if quantity <= 0 {
            cart.retain(|(u, line)| !(*u == user_id && line.part_id == part_id));
            return Ok(None);
        }
        if let Some((_, line)) = cart
            .iter_mut()
            .find(|(u, line)| *u == user_id && line.part_id == part_id)
        {
            line.quantity = Quantity::new(quantity)?;
            return Ok(Some(*line));
        }
        Ok(None)
    }

    fn remove_from_cart(&self, user_id: UserId, part_id: PartId) -> RepositoryResult<usize> {
        let mut cart = self.cart.borrow_mut();
        let before = cart.len();
        cart.retain(|(u, line)| !(*u == user_id && line.part_id == part_id));
        Ok(before - cart.len())
    }

    fn clear_cart(&self, user_id: UserId) -> RepositoryResult<usize> {
        let mut cart = self.cart.borrow_mut();
        let before = cart.len();
        cart.retain(|(u, _)| *u != user_id);
        Ok(before - cart.len())
    }

    fn sync_cart(&self, user_id: UserId, lines: &[CartLine]) -> RepositoryResult<usize> {
        let known: Vec<PartId> = self.parts.borrow().iter().map(|p| p.id).collect();
        let mut written = 0;
        for line in lines {
            if !known.contains(&line.part_id) {
                continue;
            }
            let mut cart = self.cart.borrow_mut();
            if let Some((_, existing)) = cart
                .iter_mut()
                .find(|(u, l)| *u == user_id && l.part_id == line.part_id)
            {
                existing.quantity = line.quantity;
            } else {
                cart.push((user_id, *line));
            }
            written += 1;
        }
        Ok(written)
    }
}

impl OrderReader for TestRepository {
    fn get_order_by_id(&self, id: OrderId) -> RepositoryResult<Option<Order>> {
        Ok(self.orders.borrow().iter().find(|o| o.id == id).cloned())
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<Page<Order>> {
        let mut items: Vec<Order> = self.orders.borrow().clone();
        if let Some(user_id) = query.user_id {
            items.retain(|o| o.user_id == user_id);
        }
        match query.sort {
            OrderSort::StatusPriority => items.sort_by(|a, b| {
                a.status
                    .priority()
                    .cmp(&b.status.priority())
                    .then(b.order_date.cmp(&a.order_date))
            }),
            OrderSort::NewestFirst => items.sort_by(|a, b| b.order_date.cmp(&a.order_date)),
        }

        let offset = query.pagination.offset.max(0) as usize;
        let items: Vec<Order> = items
            .into_iter()
            .skip(offset)
            .take(query.pagination.limit as usize + 1)
            .collect();
        Ok(Page::from_lookahead(items, query.pagination.limit))
    }
}

impl OrderWriter for TestRepository {
    fn create_part_order(&self, order: &NewPartOrder) -> RepositoryResult<Order> {
        if order.lines.is_empty() {
            return Err(RepositoryError::InvalidOperation(
                "order must contain at least one line".to_string(),
            ));
        }

        match order.delivery {
            DeliveryChoice::Address(address_id) => {
                let address = self
                    .get_user_address(address_id, order.user_id)?
                    .ok_or(RepositoryError::NotFound)?;
                if !address.is_active {
                    return Err(RepositoryError::Unavailable(
                        "shipping address is inactive".to_string(),
                    ));
                }
            }
            DeliveryChoice::Pickup(pickup_id) => {
                let point = self
                    .get_pickup_point_by_id(pickup_id)?
                    .ok_or(RepositoryError::NotFound)?;
                if !point.is_active {
                    return Err(RepositoryError::Unavailable(
                        "pickup point is inactive".to_string(),
                    ));
                }
            }
        }

        let mut items = Vec::new();
        {
            let mut parts = self.parts.borrow_mut();
            for line in &order.lines {
                let part = parts
                    .iter_mut()
                    .find(|p| p.id == line.part_id)
                    .ok_or(RepositoryError::NotFound)?;
                let available = part.stock_count.get();
                if available < line.quantity.get() {
                    return Err(RepositoryError::InsufficientStock {
                        part_id: line.part_id,
                        requested: line.quantity.get(),
                        available,
                    });
                }
                part.stock_count = StockCount::new(available - line.quantity.get())?;
                items.push(OrderItem {
                    part_id: part.id,
                    part_name: part.name.as_str().to_string(),
                    quantity: line.quantity,
                    unit_price: part.price,
                });
            }
        }

        self.clear_cart(order.user_id)?;

        let created = Order {
            id: self.allocate_order_id(),
            user_id: order.user_id,
            delivery: order.delivery,
            payment_method: order.payment_method,
            is_paid: false,
            status: OrderStatus::Processing,
            order_date: epoch(),
            status_updated: epoch(),
            service_fee: order.service_fee,
            shipping_cost: order.shipping_cost,
            discount: order.discount,
            customer_notes: order.customer_notes.clone(),
            admin_notes: None,
            items,
            car_orders: vec![],
        };
        self.orders.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn create_car_order(&self, order: &NewCarOrder) -> RepositoryResult<Order> {
        let point = self
            .get_pickup_point_by_id(order.pickup_point_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !point.is_active {
            return Err(RepositoryError::Unavailable(
                "pickup point is inactive".to_string(),
            ));
        }

        let price = {
            let cars = self.cars.borrow();
            let car = cars
                .iter()
                .find(|c| c.id == order.car_id)
                .ok_or(RepositoryError::NotFound)?;
            if !car.is_visible {
                return Err(RepositoryError::Unavailable(
                    "car is not available for order".to_string(),
                ));
            }
            car.price.ok_or_else(|| {
                RepositoryError::Unavailable("car has no sale price".to_string())
            })?
        };

        if self.car_has_active_order(order.car_id) {
            return Err(RepositoryError::Unavailable(
                "car is already reserved by another order".to_string(),
            ));
        }

        if let Some(car) = self
            .cars
            .borrow_mut()
            .iter_mut()
            .find(|c| c.id == order.car_id)
        {
            car.is_visible = false;
        }

        let created = Order {
            id: self.allocate_order_id(),
            user_id: order.user_id,
            delivery: DeliveryChoice::Pickup(order.pickup_point_id),
            payment_method: order.payment_method,
            is_paid: false,
            status: OrderStatus::Processing,
            order_date: epoch(),
            status_updated: epoch(),
            service_fee: order.service_fee,
            shipping_cost: order.shipping_cost,
            discount: Money::ZERO,
            customer_notes: order.customer_notes.clone(),
            admin_notes: None,
            items: vec![],
            car_orders: vec![CarOrder {
                car_id: order.car_id,
                price,
            }],
        };
        self.orders.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn transition_status(&self, id: OrderId, next: OrderStatus) -> RepositoryResult<Order> {
        let (current, items, car_orders): (OrderStatus, Vec<OrderItem>, Vec<CarOrder>) = {
            let orders = self.orders.borrow();
            let order = orders
                .iter()
                .find(|o| o.id == id)
                .ok_or(RepositoryError::NotFound)?;
            (order.status, order.items.clone(), order.car_orders.clone())
        };

        if !current.can_transition_to(next) {
            return Err(RepositoryError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        if next == OrderStatus::Cancelled {
            let mut parts = self.parts.borrow_mut();
            for item in &items {
                if let Some(part) = parts.iter_mut().find(|p| p.id == item.part_id) {
                    part.stock_count =
                        StockCount::new(part.stock_count.get() + item.quantity.get())?;
                }
            }
            drop(parts);
            let mut cars = self.cars.borrow_mut();
            for co in &car_orders {
                if let Some(car) = cars.iter_mut().find(|c| c.id == co.car_id) {
                    car.is_visible = true;
                }
            }
        }

        let mut orders = self.orders.borrow_mut();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = next;
        Ok(order.clone())
    }

    fn set_paid(&self, id: OrderId, paid: bool) -> RepositoryResult<Order> {
        let mut orders = self.orders.borrow_mut();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if order.status.is_terminal() {
            return Err(RepositoryError::InvalidOperation(
                "order is in a terminal state".to_string(),
            ));
        }
        if paid && order.is_paid {
            return Err(RepositoryError::AlreadyPaid);
        }
        order.is_paid = paid;
        Ok(order.clone())
    }

    fn set_admin_notes(&self, id: OrderId, notes: &str) -> RepositoryResult<Order> {
        let mut orders = self.orders.borrow_mut();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if order.status.is_terminal() {
            return Err(RepositoryError::InvalidOperation(
                "order is in a terminal state".to_string(),
            ));
        }
        order.admin_notes = Some(notes.to_string());
        Ok(order.clone())
    }
}
