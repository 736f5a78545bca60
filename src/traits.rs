//! Seam for the external route refinement collaborator.

use crate::error::Result;

/// Resolves a road-network travel distance for an ordered stop sequence.
///
/// The sequence includes the depot as its first and last element.
/// Implementations return the total distance in kilometers, or
/// [`crate::error::PlannerError::RouteUnresolvable`] when no path exists.
pub trait RouteRefiner {
    fn refine(&self, stops: &[(f64, f64)]) -> Result<f64>;
}
