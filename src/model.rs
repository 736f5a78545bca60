//! Domain records for the delivery fleet.
//!
//! Persisted entities carry serde derives so a whole store can round-trip
//! through the snapshot document. A [`Route`] stays caller-owned until the
//! lifecycle gate commits it as a [`ValidatedRoute`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::costing::RouteCosting;

fn default_available() -> bool {
    true
}

/// A delivery truck. Identified by its plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub plate: String,
    pub make: String,
    #[serde(default)]
    pub purchase_year: Option<i32>,
    /// Load capacity in tons.
    pub capacity: f64,
    /// Fuel tank capacity in gallons.
    pub tank_capacity: f64,
    pub fuel_cost_per_gallon: f64,
    /// Fuel economy. Must be positive: costing divides by it.
    pub km_per_gallon: f64,
    #[serde(default = "default_available")]
    pub available: bool,
}

/// A branch to deliver to. Identified by name within the active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Standing demand in tons.
    pub demand: f64,
}

/// A driver. Identified by license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub license: String,
    pub salary: f64,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

/// Stable order identifier, allocated by the record store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order lifecycle states, strictly forward-ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    InProgress,
    Dispatched,
    Delivered,
}

impl OrderStatus {
    /// The single legal successor state, if any.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::InProgress),
            OrderStatus::InProgress => Some(OrderStatus::Dispatched),
            OrderStatus::Dispatched => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// Whether `target` is the legal next state. No backward moves, no skips.
    pub fn can_advance_to(self, target: OrderStatus) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Dispatched => "Dispatched",
            OrderStatus::Delivered => "Delivered",
        };
        f.write_str(label)
    }
}

/// A branch order moving through the delivery lifecycle.
///
/// The branch is snapshotted at order time so later branch edits do not
/// rewrite history on open orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub branch: Branch,
    /// Requested quantity in tons. Must be positive.
    pub quantity: f64,
    pub status: OrderStatus,
    pub created: NaiveDate,
    #[serde(default)]
    pub dispatched: Option<NaiveDate>,
    #[serde(default)]
    pub delivered: Option<NaiveDate>,
}

/// A constructed route, owned by the caller until committed.
///
/// The vehicle is a snapshot taken at calculation time together with the
/// working fuel-on-board value, so later fleet edits do not shift an
/// in-flight plan. Orders are referenced by stable id, never copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub vehicle: Vehicle,
    /// Fuel on board when the route was calculated, in gallons.
    pub fuel_available: f64,
    /// Stops in travel order.
    pub stops: Vec<Branch>,
    /// Orders this route satisfies.
    #[serde(default)]
    pub order_ids: Vec<OrderId>,
    pub total_distance_km: f64,
    /// Total load in tons.
    pub total_load: f64,
    /// Set when a candidate stop was rejected for fuel, or when the trip
    /// exceeds the fuel on board.
    pub needs_refuel: bool,
    #[serde(default)]
    pub costing: Option<RouteCosting>,
}

impl Route {
    /// An empty route for a vehicle with a given fuel-on-board value.
    pub fn new(vehicle: &Vehicle, fuel_available: f64) -> Self {
        Self {
            vehicle: vehicle.clone(),
            fuel_available,
            stops: Vec::new(),
            order_ids: Vec::new(),
            total_distance_km: 0.0,
            total_load: 0.0,
            needs_refuel: false,
            costing: None,
        }
    }
}

/// Status of a committed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteStatus {
    Validated,
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validated")
    }
}

/// A route committed through the validation gate. Stored, delete-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRoute {
    pub route: Route,
    pub validated_on: NaiveDate,
    pub status: RouteStatus,
}
