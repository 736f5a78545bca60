//! Error taxonomy and soft route warnings.

use std::fmt;

use thiserror::Error;

/// Errors surfaced by the planning engine.
///
/// Business-rule violations during routing (capacity, fuel) are never errors;
/// they travel as [`RouteWarning`] values so the caller can ask the operator
/// for confirmation instead of aborting.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A snapshot document is structurally invalid (missing collection,
    /// non-sequence value, unparsable field).
    #[error("invalid snapshot: {0}")]
    InvalidDataShape(String),

    /// An entity violates a model invariant or a state-machine rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An index or identifier resolved to nothing.
    #[error("{kind} '{key}' not found")]
    NotFound { kind: &'static str, key: String },

    /// The routing service could not resolve a path for the stop sequence.
    #[error("no road route could be resolved for the stop sequence")]
    RouteUnresolvable,

    /// Transport failure while talking to the routing service.
    #[error("routing service error: {0}")]
    Refinement(#[from] reqwest::Error),
}

impl PlannerError {
    pub(crate) fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Recoverable conditions detected during route validation.
///
/// A warning requires operator confirmation before the route is committed,
/// but never blocks on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteWarning {
    /// The fuel on board does not cover the estimated requirement.
    InsufficientFuel { required: f64, available: f64 },
    /// The combined order load exceeds the vehicle's capacity.
    CapacityExceeded { load: f64, capacity: f64 },
}

impl fmt::Display for RouteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteWarning::InsufficientFuel {
                required,
                available,
            } => write!(
                f,
                "available fuel ({available:.2} gal) is not enough for this route ({required:.0} gal needed)"
            ),
            RouteWarning::CapacityExceeded { load, capacity } => write!(
                f,
                "total load ({load:.2} t) exceeds the vehicle capacity ({capacity:.2} t)"
            ),
        }
    }
}
