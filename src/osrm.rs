//! OSRM HTTP adapter for route refinement.

use serde::Deserialize;

use crate::error::{PlannerError, Result};
use crate::traits::RouteRefiner;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl RouteRefiner for OsrmClient {
    fn refine(&self, stops: &[(f64, f64)]) -> Result<f64> {
        if stops.len() < 2 {
            return Err(PlannerError::RouteUnresolvable);
        }

        let coords = stops
            .iter()
            .map(|(lat, lon)| format!("{:.6},{:.6}", lon, lat))
            .collect::<Vec<_>>()
            .join(";");

        let url = format!(
            "{}/route/v1/{}/{}?overview=false",
            self.config.base_url, self.config.profile, coords
        );

        let body: OsrmRouteResponse = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json()?;

        let meters = body
            .routes
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|route| route.distance)
            .ok_or(PlannerError::RouteUnresolvable)?;

        Ok(meters / 1000.0)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
}
