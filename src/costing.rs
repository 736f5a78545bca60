//! Route costing and fuel estimation.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::model::{Driver, Route};

/// Share of a driver's salary billed to a route.
const DRIVER_SURCHARGE: f64 = 0.10;

/// Gallons over the requirement before the excess is worth reporting.
const FUEL_EXCESS_NOTE_GAL: f64 = 3.0;

/// The cost breakdown written back onto a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCosting {
    /// Whole gallons, rounded up after the safety margin.
    pub required_fuel: f64,
    pub fuel_cost: f64,
    pub operational_cost: f64,
    pub other_costs: f64,
    pub total_cost: f64,
    pub estimated_time: TravelTime,
}

/// Estimated time on route, displayed as `"3h 25min"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelTime {
    pub hours: u32,
    pub minutes: u32,
}

impl TravelTime {
    pub fn from_hours(hours: f64) -> Self {
        let whole = hours.floor() as u32;
        let minutes = ((hours - hours.floor()) * 60.0).round() as u32;
        if minutes == 60 {
            Self {
                hours: whole + 1,
                minutes: 0,
            }
        } else {
            Self {
                hours: whole,
                minutes,
            }
        }
    }
}

impl fmt::Display for TravelTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}min", self.hours, self.minutes)
    }
}

pub struct CostEstimator {
    config: PlannerConfig,
}

impl CostEstimator {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Prices a route from its finalized distance and writes the breakdown
    /// back onto it.
    ///
    /// With a driver assigned, other costs are the salary surcharge;
    /// otherwise a previously stored value survives recosting, and a fresh
    /// route gets zero.
    pub fn cost_route(&self, route: &mut Route, driver: Option<&Driver>) {
        let raw_fuel = route.total_distance_km / route.vehicle.km_per_gallon;
        let required_fuel = (raw_fuel * self.config.fuel_safety_margin).ceil();
        let fuel_cost = required_fuel * route.vehicle.fuel_cost_per_gallon;
        let operational_cost = route.total_distance_km * self.config.cost_per_km;

        let other_costs = match driver {
            Some(driver) => driver.salary * DRIVER_SURCHARGE,
            None => route
                .costing
                .as_ref()
                .map(|c| c.other_costs)
                .unwrap_or(0.0),
        };

        let total_cost = operational_cost + fuel_cost + other_costs;
        let estimated_time =
            TravelTime::from_hours(route.total_distance_km / self.config.average_speed_kmh);

        route.costing = Some(RouteCosting {
            required_fuel,
            fuel_cost,
            operational_cost,
            other_costs,
            total_cost,
            estimated_time,
        });
    }

    /// Costs every route of a fleet plan. No driver surcharge in bulk mode.
    pub fn cost_fleet(&self, routes: &mut [Route]) {
        routes
            .par_iter_mut()
            .for_each(|route| self.cost_route(route, None));
    }

    /// Gallons by which the fuel on board exceeds the requirement, once the
    /// surplus is large enough to mention to the operator.
    pub fn fuel_excess(&self, route: &Route) -> Option<f64> {
        let costing = route.costing.as_ref()?;
        let excess = route.fuel_available - costing.required_fuel;
        (excess >= FUEL_EXCESS_NOTE_GAL).then_some(excess)
    }
}
