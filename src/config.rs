//! Process-wide planning constants, passed in explicitly.

/// Configuration for route construction and costing.
///
/// Injected into [`crate::planner::RoutePlanner`] and
/// [`crate::costing::CostEstimator`] at construction time so tests can run
/// with deterministic values.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Depot coordinates (lat, lon). Every route starts and ends here.
    pub depot: (f64, f64),
    /// Operational cost per kilometer driven.
    pub cost_per_km: f64,
    /// Average speed used for travel time estimation, in km/h.
    pub average_speed_kmh: f64,
    /// Safety factor applied to the raw fuel requirement.
    pub fuel_safety_margin: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            depot: (13.6894, -89.1872), // central depot, San Salvador
            cost_per_km: 0.50,
            average_speed_kmh: 50.0,
            fuel_safety_margin: 1.10,
        }
    }
}
