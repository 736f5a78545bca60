//! In-memory record store for fleet, branch, driver, and order data.
//!
//! The store exclusively owns the persisted collections. Entity invariants
//! are enforced on insert and on snapshot load; a failed operation leaves
//! the store untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::model::{
    Branch, Driver, Order, OrderId, OrderStatus, Route, RouteStatus, ValidatedRoute, Vehicle,
};

/// The five snapshot collections. The keys of this document are the external
/// exchange contract: all five must be present as sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub vehicles: Vec<Vehicle>,
    pub branches: Vec<Branch>,
    pub drivers: Vec<Driver>,
    pub orders: Vec<Order>,
    #[serde(rename = "validatedRoutes")]
    pub validated_routes: Vec<ValidatedRoute>,
}

const SNAPSHOT_KEYS: [&str; 5] = ["vehicles", "branches", "drivers", "orders", "validatedRoutes"];

impl Snapshot {
    /// Parses a snapshot document, rejecting anything that is not an object
    /// with all five collections as sequences.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|err| PlannerError::InvalidDataShape(err.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| PlannerError::InvalidDataShape("document is not an object".into()))?;
        for key in SNAPSHOT_KEYS {
            match object.get(key) {
                Some(entry) if entry.is_array() => {}
                Some(_) => {
                    return Err(PlannerError::InvalidDataShape(format!(
                        "'{key}' is not a sequence"
                    )));
                }
                None => {
                    return Err(PlannerError::InvalidDataShape(format!(
                        "missing collection '{key}'"
                    )));
                }
            }
        }

        serde_json::from_value(value).map_err(|err| PlannerError::InvalidDataShape(err.to_string()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Default)]
pub struct RecordStore {
    vehicles: Vec<Vehicle>,
    branches: Vec<Branch>,
    drivers: Vec<Driver>,
    orders: Vec<Order>,
    validated_routes: Vec<ValidatedRoute>,
    next_order_id: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Inserts
    // ------------------------------------------------------------------

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<()> {
        validate_vehicle(&vehicle)?;
        if self.vehicles.iter().any(|v| v.plate == vehicle.plate) {
            return Err(PlannerError::Validation(format!(
                "a vehicle with plate '{}' already exists",
                vehicle.plate
            )));
        }
        self.vehicles.push(vehicle);
        Ok(())
    }

    pub fn add_branch(&mut self, branch: Branch) -> Result<()> {
        validate_branch(&branch)?;
        if self.branches.iter().any(|b| b.name == branch.name) {
            return Err(PlannerError::Validation(format!(
                "a branch named '{}' already exists",
                branch.name
            )));
        }
        self.branches.push(branch);
        Ok(())
    }

    pub fn add_driver(&mut self, driver: Driver) -> Result<()> {
        validate_driver(&driver)?;
        if self.drivers.iter().any(|d| d.license == driver.license) {
            return Err(PlannerError::Validation(format!(
                "a driver with license '{}' already exists",
                driver.license
            )));
        }
        self.drivers.push(driver);
        Ok(())
    }

    /// Registers a pending order against a branch, snapshotting the branch
    /// record and allocating a stable id.
    pub fn add_order(
        &mut self,
        branch_name: &str,
        quantity: f64,
        created: NaiveDate,
    ) -> Result<OrderId> {
        if !(quantity > 0.0) {
            return Err(PlannerError::Validation(
                "order quantity must be positive".into(),
            ));
        }
        let branch = self
            .branches
            .iter()
            .find(|b| b.name == branch_name)
            .cloned()
            .ok_or_else(|| PlannerError::not_found("branch", branch_name))?;

        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        self.orders.push(Order {
            id,
            branch,
            quantity,
            status: OrderStatus::Pending,
            created,
            dispatched: None,
            delivered: None,
        });
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn validated_routes(&self) -> &[ValidatedRoute] {
        &self.validated_routes
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Pending orders, the pool offered to route construction.
    pub fn pending_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
    }

    // ------------------------------------------------------------------
    // Deletes
    // ------------------------------------------------------------------

    pub fn remove_vehicle(&mut self, index: usize) -> Result<Vehicle> {
        take_at(&mut self.vehicles, "vehicle", index)
    }

    pub fn remove_branch(&mut self, index: usize) -> Result<Branch> {
        take_at(&mut self.branches, "branch", index)
    }

    pub fn remove_driver(&mut self, index: usize) -> Result<Driver> {
        take_at(&mut self.drivers, "driver", index)
    }

    pub fn remove_order(&mut self, index: usize) -> Result<Order> {
        take_at(&mut self.orders, "order", index)
    }

    pub fn remove_validated_route(&mut self, index: usize) -> Result<ValidatedRoute> {
        take_at(&mut self.validated_routes, "validated route", index)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Advances an order one step along the lifecycle, stamping the dispatch
    /// or delivery date where applicable.
    ///
    /// Unknown ids fail with `NotFound`; a backward or skipping transition
    /// fails with `Validation`. Either way the order is untouched.
    pub fn update_order_status(
        &mut self,
        id: OrderId,
        new_status: OrderStatus,
        date: NaiveDate,
    ) -> Result<()> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| PlannerError::not_found("order", id.to_string()))?;

        if !order.status.can_advance_to(new_status) {
            return Err(PlannerError::Validation(format!(
                "order {} cannot move from {} to {}",
                id, order.status, new_status
            )));
        }

        order.status = new_status;
        match new_status {
            OrderStatus::Dispatched => order.dispatched = Some(date),
            OrderStatus::Delivered => order.delivered = Some(date),
            _ => {}
        }
        debug!(order = %id, status = %new_status, "order advanced");
        Ok(())
    }

    pub fn set_vehicle_availability(&mut self, plate: &str, available: bool) -> Result<()> {
        let vehicle = self
            .vehicles
            .iter_mut()
            .find(|v| v.plate == plate)
            .ok_or_else(|| PlannerError::not_found("vehicle", plate))?;
        vehicle.available = available;
        Ok(())
    }

    pub fn set_driver_availability(&mut self, license: &str, available: bool) -> Result<()> {
        let driver = self
            .drivers
            .iter_mut()
            .find(|d| d.license == license)
            .ok_or_else(|| PlannerError::not_found("driver", license))?;
        driver.available = available;
        Ok(())
    }

    /// Stores a committed route with its validation date.
    pub fn add_validated_route(&mut self, route: Route, validated_on: NaiveDate) {
        self.validated_routes.push(ValidatedRoute {
            route,
            validated_on,
            status: RouteStatus::Validated,
        });
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            vehicles: self.vehicles.clone(),
            branches: self.branches.clone(),
            drivers: self.drivers.clone(),
            orders: self.orders.clone(),
            validated_routes: self.validated_routes.clone(),
        }
    }

    /// Replaces every collection with the snapshot's contents.
    ///
    /// All entities are revalidated first; on any failure the prior data is
    /// left unchanged. Order id allocation resumes past the highest loaded id.
    pub fn replace_all(&mut self, snapshot: Snapshot) -> Result<()> {
        for vehicle in &snapshot.vehicles {
            validate_vehicle(vehicle)?;
        }
        for branch in &snapshot.branches {
            validate_branch(branch)?;
        }
        for driver in &snapshot.drivers {
            validate_driver(driver)?;
        }
        for order in &snapshot.orders {
            if !(order.quantity > 0.0) {
                return Err(PlannerError::Validation(format!(
                    "order {} has a non-positive quantity",
                    order.id
                )));
            }
        }

        self.next_order_id = snapshot
            .orders
            .iter()
            .map(|o| o.id.0 + 1)
            .max()
            .unwrap_or(0);
        self.vehicles = snapshot.vehicles;
        self.branches = snapshot.branches;
        self.drivers = snapshot.drivers;
        self.orders = snapshot.orders;
        self.validated_routes = snapshot.validated_routes;
        Ok(())
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    /// CSV export of the vehicle table.
    pub fn vehicles_csv_report(&self) -> String {
        let mut csv = String::from(
            "Plate,Make,Year,Capacity (Ton),Tank (gal),Fuel Cost ($/gal),Km/gal\n",
        );
        for v in &self.vehicles {
            let year = v
                .purchase_year
                .map(|y| y.to_string())
                .unwrap_or_default();
            csv.push_str(&format!(
                "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"\n",
                v.plate, v.make, year, v.capacity, v.tank_capacity, v.fuel_cost_per_gallon,
                v.km_per_gallon
            ));
        }
        csv
    }
}

fn take_at<T>(items: &mut Vec<T>, kind: &'static str, index: usize) -> Result<T> {
    if index < items.len() {
        Ok(items.remove(index))
    } else {
        Err(PlannerError::not_found(kind, index.to_string()))
    }
}

fn validate_vehicle(vehicle: &Vehicle) -> Result<()> {
    if !(vehicle.km_per_gallon > 0.0) {
        return Err(PlannerError::Validation(format!(
            "vehicle '{}': fuel economy must be positive",
            vehicle.plate
        )));
    }
    if !(vehicle.capacity > 0.0) {
        return Err(PlannerError::Validation(format!(
            "vehicle '{}': capacity must be positive",
            vehicle.plate
        )));
    }
    if !(vehicle.tank_capacity >= 0.0) {
        return Err(PlannerError::Validation(format!(
            "vehicle '{}': tank capacity cannot be negative",
            vehicle.plate
        )));
    }
    Ok(())
}

fn validate_branch(branch: &Branch) -> Result<()> {
    if !branch.latitude.is_finite() || !branch.longitude.is_finite() {
        return Err(PlannerError::Validation(format!(
            "branch '{}': coordinates must be finite",
            branch.name
        )));
    }
    if !(branch.demand >= 0.0) {
        return Err(PlannerError::Validation(format!(
            "branch '{}': demand cannot be negative",
            branch.name
        )));
    }
    Ok(())
}

fn validate_driver(driver: &Driver) -> Result<()> {
    if !(driver.salary >= 0.0) {
        return Err(PlannerError::Validation(format!(
            "driver '{}': salary cannot be negative",
            driver.license
        )));
    }
    Ok(())
}
