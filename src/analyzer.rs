//! Route analysis: score candidate routes by predicted emissions and
//! recommend the cleanest one.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::model::EmissionsLevel;
use crate::synthetic::SyntheticRoutes;
use crate::traits::{EmissionsPredictor, Route, RouteSource, TravelMode, VehicleProfile};

/// A route with its predicted emissions attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRoute {
    #[serde(flatten)]
    pub route: Route,
    pub emissions_kg: f64,
    pub level: EmissionsLevel,
    pub emissions_interpretation: String,
}

/// Savings of the best route relative to the worst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EcoSavings {
    pub absolute_kg: f64,
    /// Percentage of the worst route's emissions saved. Zero when the worst
    /// route itself emits nothing.
    pub percentage: f64,
}

impl EcoSavings {
    pub fn between(best_kg: f64, worst_kg: f64) -> Self {
        let absolute_kg = worst_kg - best_kg;
        let percentage = if worst_kg > 0.0 {
            absolute_kg / worst_kg * 100.0
        } else {
            0.0
        };
        Self { absolute_kg, percentage }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteAnalysis {
    pub origin: String,
    pub destination: String,
    pub travel_mode: TravelMode,
    /// True when the provider failed and synthetic routes were scored instead.
    pub used_fallback: bool,
    /// Ascending by `emissions_kg`; never empty.
    pub routes: Vec<ScoredRoute>,
    pub eco_recommended_route: String,
    pub eco_savings: EcoSavings,
}

impl RouteAnalysis {
    pub fn recommended(&self) -> &ScoredRoute {
        &self.routes[0]
    }
}

#[derive(Debug, Clone)]
pub struct RouteAnalyzer<S, P> {
    source: S,
    predictor: P,
    fallback: SyntheticRoutes,
}

impl<S, P> RouteAnalyzer<S, P>
where
    S: RouteSource,
    P: EmissionsPredictor,
{
    pub fn new(source: S, predictor: P) -> Self {
        Self {
            source,
            predictor,
            fallback: SyntheticRoutes::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: SyntheticRoutes) -> Self {
        self.fallback = fallback;
        self
    }

    /// Score every candidate route for `vehicle` and rank them.
    ///
    /// Provider failures fall back to synthetic routes. A prediction failure
    /// on any route fails the whole analysis, so the ranking only ever covers
    /// the complete candidate set.
    pub fn analyze(
        &self,
        origin: &str,
        destination: &str,
        vehicle: &VehicleProfile,
        mode: TravelMode,
    ) -> Result<RouteAnalysis, PlannerError> {
        let (candidates, used_fallback) = match self.source.routes(origin, destination, mode) {
            Ok(routes) if !routes.is_empty() => (routes, false),
            Ok(_) => {
                warn!(
                    origin,
                    destination,
                    "route source returned no routes, using synthetic routes"
                );
                (self.fallback.generate(), true)
            }
            Err(err) => {
                warn!(
                    origin,
                    destination,
                    error = %err,
                    "route source unavailable, using synthetic routes"
                );
                (self.fallback.generate(), true)
            }
        };

        let mut routes = candidates
            .into_iter()
            .map(|route| self.score(route, vehicle))
            .collect::<Result<Vec<_>, _>>()?;

        // Stable: equal emissions keep provider order.
        routes.sort_by(|a, b| a.emissions_kg.total_cmp(&b.emissions_kg));

        let best = &routes[0];
        let worst = &routes[routes.len() - 1];
        let eco_savings = EcoSavings::between(best.emissions_kg, worst.emissions_kg);
        let eco_recommended_route = best.route.name.clone();

        debug!(
            recommended = %eco_recommended_route,
            saved_kg = eco_savings.absolute_kg,
            used_fallback,
            "route analysis complete"
        );

        Ok(RouteAnalysis {
            origin: origin.to_string(),
            destination: destination.to_string(),
            travel_mode: mode,
            used_fallback,
            routes,
            eco_recommended_route,
            eco_savings,
        })
    }

    fn score(&self, route: Route, vehicle: &VehicleProfile) -> Result<ScoredRoute, PlannerError> {
        let result = self
            .predictor
            .predict(
                &vehicle.vehicle_type,
                &vehicle.fuel_type,
                route.distance_km,
                vehicle.mileage_kmpl,
            )
            .map_err(|source| PlannerError::PredictionUnavailable {
                item: route.name.clone(),
                source,
            })?;

        debug!(
            route = %route.name,
            distance_km = route.distance_km,
            emissions_kg = result.emissions_kg,
            "scored route"
        );

        Ok(ScoredRoute {
            emissions_interpretation: result.level.description().to_string(),
            level: result.level,
            emissions_kg: result.emissions_kg,
            route,
        })
    }
}
