//! Route validation gate and order lifecycle transitions.
//!
//! Validation is the only path a Pending order can take forward. The flow
//! is construct -> (refine) -> cost -> [`validate`] -> operator confirms any
//! warnings -> [`commit`]. Committing consumes the route, so a committed
//! route cannot be validated twice.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{PlannerError, Result, RouteWarning};
use crate::model::{Order, OrderId, OrderStatus, Route};
use crate::store::RecordStore;

/// Checks a costed route against its vehicle and linked orders.
///
/// Returns the warnings the operator must confirm; an empty list means the
/// route can be committed directly. Fails when the route was never costed,
/// when a linked order does not resolve, or when one is no longer Pending.
pub fn validate(route: &Route, store: &RecordStore) -> Result<Vec<RouteWarning>> {
    let costing = route.costing.as_ref().ok_or_else(|| {
        PlannerError::Validation("route has no cost breakdown; run the estimator first".into())
    })?;

    let orders = resolve_orders(route, store)?;
    for order in &orders {
        if order.status != OrderStatus::Pending {
            return Err(PlannerError::Validation(format!(
                "order {} is already {}",
                order.id, order.status
            )));
        }
    }

    let mut warnings = Vec::new();

    if costing.required_fuel > route.fuel_available {
        warnings.push(RouteWarning::InsufficientFuel {
            required: costing.required_fuel,
            available: route.fuel_available,
        });
    }

    let load = if orders.is_empty() {
        route.total_load
    } else {
        orders.iter().map(|o| o.quantity).sum()
    };
    if load > route.vehicle.capacity {
        warnings.push(RouteWarning::CapacityExceeded {
            load,
            capacity: route.vehicle.capacity,
        });
    }

    Ok(warnings)
}

/// Commits a validated route: stores it with the validation stamp and moves
/// every linked order from Pending to In Progress.
///
/// Consumes the route. All linked orders are resolved before anything is
/// mutated, so a stale id leaves both the store and the orders untouched.
pub fn commit(route: Route, store: &mut RecordStore, date: NaiveDate) -> Result<()> {
    let orders = resolve_orders(&route, store)?;
    for order in &orders {
        if order.status != OrderStatus::Pending {
            return Err(PlannerError::Validation(format!(
                "order {} is already {}",
                order.id, order.status
            )));
        }
    }

    let order_ids: Vec<OrderId> = route.order_ids.clone();
    store.add_validated_route(route, date);
    for id in order_ids {
        store.update_order_status(id, OrderStatus::InProgress, date)?;
    }
    debug!(%date, "route committed");
    Ok(())
}

/// Operator action: a route's order left the depot.
pub fn mark_dispatched(store: &mut RecordStore, id: OrderId, date: NaiveDate) -> Result<()> {
    store.update_order_status(id, OrderStatus::Dispatched, date)
}

/// Operator action: the order reached its branch.
pub fn mark_delivered(store: &mut RecordStore, id: OrderId, date: NaiveDate) -> Result<()> {
    store.update_order_status(id, OrderStatus::Delivered, date)
}

fn resolve_orders<'a>(route: &Route, store: &'a RecordStore) -> Result<Vec<&'a Order>> {
    route
        .order_ids
        .iter()
        .map(|id| {
            store
                .order(*id)
                .ok_or_else(|| PlannerError::not_found("order", id.to_string()))
        })
        .collect()
}
