//! Test fixtures for eco-route-planner.
//!
//! Provides:
//! - A synthetic journey dataset with known per-fuel emission factors
//! - Mock emissions predictors and route sources

#![allow(dead_code)]

use std::collections::HashMap;

use eco_route_planner::dataset::{Dataset, JourneyRecord};
use eco_route_planner::error::{CategoryField, PredictionError, RouteSourceError};
use eco_route_planner::forest::ForestConfig;
use eco_route_planner::model::{EmissionsModel, EmissionsResult};
use eco_route_planner::traits::{EmissionsPredictor, Route, RouteSource, TrafficLevel, TravelMode};

/// kg CO2 per litre burned.
pub const PETROL_FACTOR: f64 = 2.31;
pub const DIESEL_FACTOR: f64 = 2.68;
pub const ELECTRIC_FACTOR: f64 = 0.5;

/// (vehicle type, fuel type, factor, mileages seen in the data)
const FLEET: [(&str, &str, f64, &[f64]); 5] = [
    ("Car", "Petrol", PETROL_FACTOR, &[10.0, 12.0, 14.0, 16.0, 18.0]),
    ("Car", "Diesel", DIESEL_FACTOR, &[14.0, 16.0, 18.0, 20.0, 22.0]),
    ("Car", "Electric", ELECTRIC_FACTOR, &[20.0, 25.0, 30.0]),
    ("Bus", "Diesel", DIESEL_FACTOR, &[3.0, 4.0, 5.0, 6.0]),
    ("Motorcycle", "Petrol", PETROL_FACTOR, &[30.0, 35.0, 40.0, 45.0]),
];

pub fn expected_emissions(distance_km: f64, mileage_kmpl: f64, factor: f64) -> f64 {
    distance_km / mileage_kmpl * factor
}

/// Journeys of 5..=300 km for every fleet entry, emissions = litres * factor.
pub fn journeys(include_electric: bool) -> Dataset {
    let mut records = Vec::new();
    for (vehicle_type, fuel_type, factor, mileages) in FLEET {
        if !include_electric && fuel_type == "Electric" {
            continue;
        }
        for step in 1..=60 {
            let distance_km = step as f64 * 5.0;
            for &mileage_kmpl in mileages {
                records.push(JourneyRecord {
                    vehicle_type: vehicle_type.to_string(),
                    fuel_type: fuel_type.to_string(),
                    distance_km,
                    mileage_kmpl,
                    emissions_kg: expected_emissions(distance_km, mileage_kmpl, factor),
                });
            }
        }
    }
    Dataset::from_records(records).expect("fixture dataset is non-empty")
}

pub fn test_forest() -> ForestConfig {
    ForestConfig {
        n_trees: 20,
        ..ForestConfig::default()
    }
}

pub fn trained_model() -> EmissionsModel {
    EmissionsModel::trained(&journeys(true), test_forest())
}

/// Exact physics-style predictor: litres burned times a per-fuel factor.
pub struct RatePredictor {
    factors: HashMap<String, f64>,
    vehicles: Vec<String>,
}

impl RatePredictor {
    pub fn new() -> Self {
        let factors = [
            ("Petrol", PETROL_FACTOR),
            ("Diesel", DIESEL_FACTOR),
            ("Electric", ELECTRIC_FACTOR),
        ]
        .into_iter()
        .map(|(fuel, factor)| (fuel.to_string(), factor))
        .collect();
        let vehicles = ["Car", "Bus", "Motorcycle"].iter().map(|v| v.to_string()).collect();
        Self { factors, vehicles }
    }
}

impl EmissionsPredictor for RatePredictor {
    fn predict(
        &self,
        vehicle_type: &str,
        fuel_type: &str,
        distance_km: f64,
        mileage_kmpl: f64,
    ) -> Result<EmissionsResult, PredictionError> {
        if distance_km <= 0.0 || mileage_kmpl <= 0.0 {
            return Err(PredictionError::InvalidInput("non-positive input".into()));
        }
        if !self.vehicles.iter().any(|v| v == vehicle_type) {
            return Err(PredictionError::UnknownCategory {
                field: CategoryField::VehicleType,
                value: vehicle_type.to_string(),
            });
        }
        let factor = self.factors.get(fuel_type).ok_or_else(|| PredictionError::UnknownCategory {
            field: CategoryField::FuelType,
            value: fuel_type.to_string(),
        })?;
        EmissionsResult::from_estimate(
            expected_emissions(distance_km, mileage_kmpl, *factor),
            Default::default(),
        )
    }
}

/// Predicts the same value for every input.
pub struct ConstantPredictor(pub f64);

impl EmissionsPredictor for ConstantPredictor {
    fn predict(
        &self,
        _: &str,
        _: &str,
        _: f64,
        _: f64,
    ) -> Result<EmissionsResult, PredictionError> {
        EmissionsResult::from_estimate(self.0, Default::default())
    }
}

/// Returns a fixed list of routes.
pub struct FixedRoutes(pub Vec<Route>);

impl RouteSource for FixedRoutes {
    fn routes(&self, _: &str, _: &str, _: TravelMode) -> Result<Vec<Route>, RouteSourceError> {
        Ok(self.0.clone())
    }
}

/// Always unavailable.
pub struct DownProvider;

impl RouteSource for DownProvider {
    fn routes(&self, _: &str, _: &str, _: TravelMode) -> Result<Vec<Route>, RouteSourceError> {
        Err(RouteSourceError::Status("OVER_QUERY_LIMIT".into()))
    }
}

pub fn route(name: &str, distance_km: f64) -> Route {
    Route {
        name: name.to_string(),
        distance_km,
        distance_text: format!("{distance_km} km"),
        duration_minutes: distance_km * 1.2,
        duration_text: format!("{:.0} mins", distance_km * 1.2),
        traffic: TrafficLevel::Unknown,
    }
}
