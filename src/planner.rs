//! Route construction: bulk fleet assignment and consolidated routes.
//!
//! Packing is deliberately greedy and order-preserving. Branches are taken
//! in input iteration order with no backtracking; the bulk assignment loop
//! terminates at a fixed point and reports whatever could not be served.

use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::geo;
use crate::model::{Branch, Route, Vehicle};
use crate::traits::RouteRefiner;

/// Outcome of a bulk fleet assignment.
#[derive(Debug, Clone)]
pub struct FleetPlan {
    pub routes: Vec<Route>,
    /// Branches no vehicle could take, with the blocking constraint.
    pub unserved: Vec<UnservedBranch>,
}

#[derive(Debug, Clone)]
pub struct UnservedBranch {
    pub branch: Branch,
    pub reason: UnservedReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnservedReason {
    /// Demand exceeds every available vehicle's capacity.
    ExceedsCapacity,
    /// Reachable by capacity but not within any vehicle's fuel range.
    OutOfFuelRange,
}

pub struct RoutePlanner {
    config: PlannerConfig,
}

impl RoutePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Greedily partitions `branches` across `vehicles`.
    ///
    /// Each pass offers the still-pending set to every available vehicle in
    /// turn. Served branches leave the pending set; the loop stops when a
    /// full pass adds nothing or nothing is pending. The remainder is
    /// reported as a warning, not a failure.
    pub fn build_fleet_assignment(&self, branches: &[Branch], vehicles: &[Vehicle]) -> FleetPlan {
        let mut pending: Vec<Branch> = branches.to_vec();
        let mut routes = Vec::new();

        while !pending.is_empty() {
            let mut served_any = false;

            for vehicle in vehicles.iter().filter(|v| v.available) {
                if pending.is_empty() {
                    break;
                }
                let route = self.pack_vehicle(&pending, vehicle);
                if route.stops.is_empty() {
                    continue;
                }
                pending.retain(|b| !route.stops.iter().any(|s| s.name == b.name));
                routes.push(route);
                served_any = true;
            }

            if !served_any {
                warn!(
                    remaining = pending.len(),
                    "no vehicle can serve the remaining branches"
                );
                break;
            }
        }

        let unserved = pending
            .into_iter()
            .map(|branch| {
                let reason = if vehicles
                    .iter()
                    .filter(|v| v.available)
                    .any(|v| v.capacity >= branch.demand)
                {
                    UnservedReason::OutOfFuelRange
                } else {
                    UnservedReason::ExceedsCapacity
                };
                UnservedBranch { branch, reason }
            })
            .collect();

        FleetPlan { routes, unserved }
    }

    /// Packs one vehicle from the depot against the pending set.
    ///
    /// A branch whose demand exceeds the remaining capacity is skipped
    /// silently; one rejected on the fuel budget marks the route as
    /// fuel-constrained but packing continues. The return leg is appended
    /// only when at least one stop was accepted.
    fn pack_vehicle(&self, pending: &[Branch], vehicle: &Vehicle) -> Route {
        let mut route = Route::new(vehicle, vehicle.tank_capacity);
        let mut remaining_capacity = vehicle.capacity;
        let mut remaining_fuel = vehicle.tank_capacity;
        let (mut lat, mut lon) = self.config.depot;

        for branch in pending {
            if branch.demand > remaining_capacity {
                continue;
            }

            let leg = geo::distance_km(lat, lon, branch.latitude, branch.longitude);
            let fuel_needed = leg / vehicle.km_per_gallon;

            if fuel_needed <= remaining_fuel {
                remaining_capacity -= branch.demand;
                remaining_fuel -= fuel_needed;
                route.total_distance_km += leg;
                route.total_load += branch.demand;
                (lat, lon) = (branch.latitude, branch.longitude);
                debug!(vehicle = %vehicle.plate, branch = %branch.name, "stop accepted");
                route.stops.push(branch.clone());
            } else {
                route.needs_refuel = true;
            }
        }

        if !route.stops.is_empty() {
            let (depot_lat, depot_lon) = self.config.depot;
            route.total_distance_km += geo::distance_km(lat, lon, depot_lat, depot_lon);
        }

        route
    }

    /// Builds one route serving `ordered_branches` in the caller-supplied
    /// order. No reordering is performed; stop order is the caller's call.
    pub fn build_consolidated_route(
        &self,
        ordered_branches: &[Branch],
        vehicle: &Vehicle,
        fuel_available: f64,
        total_load: f64,
    ) -> Route {
        let mut route = Route::new(vehicle, fuel_available);
        route.stops = ordered_branches.to_vec();
        route.total_load = total_load;

        let (depot_lat, depot_lon) = self.config.depot;
        let (mut lat, mut lon) = (depot_lat, depot_lon);
        let mut total = 0.0;
        for branch in ordered_branches {
            total += geo::distance_km(lat, lon, branch.latitude, branch.longitude);
            (lat, lon) = (branch.latitude, branch.longitude);
        }
        total += geo::distance_km(lat, lon, depot_lat, depot_lon);

        route.total_distance_km = total;
        route.needs_refuel = total / vehicle.km_per_gallon > fuel_available;
        route
    }

    /// Single-stop route: the depot round trip to one branch.
    ///
    /// Kept as a distinct entry point so a vehicle swap on an existing
    /// single-order route recalculates the same way it always has.
    pub fn build_single_route(
        &self,
        branch: &Branch,
        vehicle: &Vehicle,
        fuel_available: f64,
        quantity: f64,
    ) -> Route {
        self.build_consolidated_route(
            std::slice::from_ref(branch),
            vehicle,
            fuel_available,
            quantity,
        )
    }

    /// Replaces the straight-line estimate with the refiner's road-network
    /// distance. On failure the estimate is kept and a warning logged;
    /// refinement never fails route construction.
    pub fn refine_route(&self, route: &mut Route, refiner: &dyn RouteRefiner) {
        if route.stops.is_empty() {
            return;
        }

        let mut sequence = Vec::with_capacity(route.stops.len() + 2);
        sequence.push(self.config.depot);
        sequence.extend(route.stops.iter().map(|s| (s.latitude, s.longitude)));
        sequence.push(self.config.depot);

        match refiner.refine(&sequence) {
            Ok(km) => route.total_distance_km = km,
            Err(err) => {
                warn!(%err, "route refinement failed, keeping straight-line estimate");
            }
        }
    }
}
