//! Order lifecycle tests
//!
//! The validation gate, warning confirmation flow, and monotonic status
//! progression.

use chrono::NaiveDate;

use fleet_planner::config::PlannerConfig;
use fleet_planner::costing::CostEstimator;
use fleet_planner::error::{PlannerError, RouteWarning};
use fleet_planner::lifecycle;
use fleet_planner::model::{Branch, OrderId, OrderStatus, Route, Vehicle};
use fleet_planner::planner::RoutePlanner;
use fleet_planner::store::RecordStore;

// ============================================================================
// Test Fixtures
// ============================================================================

fn vehicle(plate: &str) -> Vehicle {
    Vehicle {
        plate: plate.to_string(),
        make: "Kenworth".to_string(),
        purchase_year: Some(2019),
        capacity: 10.0,
        tank_capacity: 50.0,
        fuel_cost_per_gallon: 4.0,
        km_per_gallon: 8.0,
        available: true,
    }
}

fn branch(name: &str, lat: f64, lon: f64) -> Branch {
    Branch {
        name: name.to_string(),
        latitude: lat,
        longitude: lon,
        demand: 5.0,
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).expect("valid date")
}

/// Store with one truck, two branches, and pending orders of the given
/// quantities against the first branch.
fn store_with_orders(quantities: &[f64]) -> (RecordStore, Vec<OrderId>) {
    let mut store = RecordStore::new();
    store.add_vehicle(vehicle("C-101")).unwrap();
    store.add_branch(branch("Merliot", 13.70, -89.20)).unwrap();
    store
        .add_branch(branch("Soyapango", 13.71, -89.14))
        .unwrap();

    let ids = quantities
        .iter()
        .map(|q| store.add_order("Merliot", *q, day(1)).unwrap())
        .collect();
    (store, ids)
}

/// Consolidated route over the linked orders' branches, costed and ready to
/// validate.
fn costed_route(store: &RecordStore, order_ids: &[OrderId], fuel_available: f64) -> Route {
    let config = PlannerConfig::default();
    let planner = RoutePlanner::new(config.clone());

    let stops: Vec<Branch> = order_ids
        .iter()
        .map(|id| store.order(*id).unwrap().branch.clone())
        .collect();
    let total_load: f64 = order_ids
        .iter()
        .map(|id| store.order(*id).unwrap().quantity)
        .sum();

    let mut route = planner.build_consolidated_route(
        &stops,
        &store.vehicles()[0],
        fuel_available,
        total_load,
    );
    route.order_ids = order_ids.to_vec();
    CostEstimator::new(config).cost_route(&mut route, None);
    route
}

// ============================================================================
// Validation Gate
// ============================================================================

#[test]
fn uncosted_route_cannot_be_validated() {
    let (store, ids) = store_with_orders(&[5.0]);
    let mut route = costed_route(&store, &ids, 50.0);
    route.costing = None;

    assert!(matches!(
        lifecycle::validate(&route, &store),
        Err(PlannerError::Validation(_))
    ));
}

#[test]
fn clean_route_validates_without_warnings() {
    let (store, ids) = store_with_orders(&[5.0]);
    let route = costed_route(&store, &ids, 50.0);

    let warnings = lifecycle::validate(&route, &store).unwrap();
    assert!(warnings.is_empty());
}

#[test]
fn low_fuel_is_a_warning_not_an_error() {
    let (store, ids) = store_with_orders(&[5.0]);
    let route = costed_route(&store, &ids, 0.5); // needs 1 gal

    let warnings = lifecycle::validate(&route, &store).unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        RouteWarning::InsufficientFuel { required, available }
            if required == 1.0 && available == 0.5
    ));
}

#[test]
fn overloaded_route_warns_then_commits_on_confirmation() {
    // Two pending orders totalling 12t on a 10t truck.
    let (mut store, ids) = store_with_orders(&[6.0, 6.0]);
    let route = costed_route(&store, &ids, 50.0);

    let warnings = lifecycle::validate(&route, &store).unwrap();
    assert!(warnings.iter().any(|w| matches!(
        w,
        RouteWarning::CapacityExceeded { load, capacity }
            if *load == 12.0 && *capacity == 10.0
    )));

    // Operator confirmed: the commit still goes through.
    lifecycle::commit(route, &mut store, day(2)).unwrap();
    for id in &ids {
        assert_eq!(store.order(*id).unwrap().status, OrderStatus::InProgress);
    }
}

#[test]
fn stale_order_id_fails_validation() {
    let (store, ids) = store_with_orders(&[5.0]);
    let mut route = costed_route(&store, &ids, 50.0);
    route.order_ids.push(OrderId(99));

    assert!(matches!(
        lifecycle::validate(&route, &store),
        Err(PlannerError::NotFound { .. })
    ));
}

// ============================================================================
// Commit
// ============================================================================

#[test]
fn commit_stores_route_and_advances_orders() {
    let (mut store, ids) = store_with_orders(&[5.0]);
    let route = costed_route(&store, &ids, 50.0);

    lifecycle::commit(route, &mut store, day(2)).unwrap();

    assert_eq!(store.validated_routes().len(), 1);
    let committed = &store.validated_routes()[0];
    assert_eq!(committed.validated_on, day(2));
    assert_eq!(committed.status.to_string(), "Validated");
    assert_eq!(store.order(ids[0]).unwrap().status, OrderStatus::InProgress);
}

#[test]
fn committed_orders_cannot_be_validated_again() {
    let (mut store, ids) = store_with_orders(&[5.0]);
    let route = costed_route(&store, &ids, 50.0);
    let rebuilt = route.clone();

    lifecycle::commit(route, &mut store, day(2)).unwrap();

    // A rebuilt route over the same orders no longer passes the gate.
    assert!(matches!(
        lifecycle::validate(&rebuilt, &store),
        Err(PlannerError::Validation(_))
    ));
    assert!(lifecycle::commit(rebuilt, &mut store, day(2)).is_err());
    assert_eq!(store.validated_routes().len(), 1);
}

#[test]
fn commit_with_stale_id_mutates_nothing() {
    let (mut store, ids) = store_with_orders(&[5.0]);
    let mut route = costed_route(&store, &ids, 50.0);
    route.order_ids.push(OrderId(99));

    assert!(lifecycle::commit(route, &mut store, day(2)).is_err());

    assert!(store.validated_routes().is_empty());
    assert_eq!(store.order(ids[0]).unwrap().status, OrderStatus::Pending);
}

// ============================================================================
// Operator Actions
// ============================================================================

#[test]
fn full_lifecycle_is_monotonic() {
    let (mut store, ids) = store_with_orders(&[5.0]);
    let id = ids[0];
    let route = costed_route(&store, &ids, 50.0);

    lifecycle::commit(route, &mut store, day(2)).unwrap();
    lifecycle::mark_dispatched(&mut store, id, day(3)).unwrap();
    lifecycle::mark_delivered(&mut store, id, day(4)).unwrap();

    let order = store.order(id).unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.dispatched, Some(day(3)));
    assert_eq!(order.delivered, Some(day(4)));
}

#[test]
fn pending_order_cannot_be_dispatched_directly() {
    let (mut store, ids) = store_with_orders(&[5.0]);

    assert!(lifecycle::mark_dispatched(&mut store, ids[0], day(2)).is_err());
    assert_eq!(store.order(ids[0]).unwrap().status, OrderStatus::Pending);
}

#[test]
fn delivery_requires_dispatch_first() {
    let (mut store, ids) = store_with_orders(&[5.0]);
    let route = costed_route(&store, &ids, 50.0);
    lifecycle::commit(route, &mut store, day(2)).unwrap();

    assert!(lifecycle::mark_delivered(&mut store, ids[0], day(3)).is_err());

    lifecycle::mark_dispatched(&mut store, ids[0], day(3)).unwrap();
    lifecycle::mark_delivered(&mut store, ids[0], day(4)).unwrap();
    assert_eq!(store.order(ids[0]).unwrap().status, OrderStatus::Delivered);
}
