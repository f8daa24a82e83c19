//! Core domain traits for the eco route planner.
//!
//! The analyzer and ranker only talk to the outside world through these two
//! seams: something that predicts emissions, and something that supplies
//! candidate routes.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{PredictionError, RouteSourceError};
use crate::model::EmissionsResult;

/// Predicts journey emissions from vehicle attributes and distance.
///
/// Implementations must be deterministic: identical inputs yield identical
/// output, and nothing is mutated by a call.
pub trait EmissionsPredictor {
    fn predict(
        &self,
        vehicle_type: &str,
        fuel_type: &str,
        distance_km: f64,
        mileage_kmpl: f64,
    ) -> Result<EmissionsResult, PredictionError>;
}

impl<P: EmissionsPredictor + ?Sized> EmissionsPredictor for &P {
    fn predict(
        &self,
        vehicle_type: &str,
        fuel_type: &str,
        distance_km: f64,
        mileage_kmpl: f64,
    ) -> Result<EmissionsResult, PredictionError> {
        (**self).predict(vehicle_type, fuel_type, distance_km, mileage_kmpl)
    }
}

/// Provides candidate routes between two places.
///
/// Any provider-side failure is reported as a [`RouteSourceError`]; callers
/// decide how to recover.
pub trait RouteSource {
    fn routes(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<Vec<Route>, RouteSourceError>;
}

impl<S: RouteSource + ?Sized> RouteSource for &S {
    fn routes(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<Vec<Route>, RouteSourceError> {
        (**self).routes(origin, destination, mode)
    }
}

/// An absent provider always reports [`RouteSourceError::NotConfigured`].
impl<S: RouteSource> RouteSource for Option<S> {
    fn routes(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<Vec<Route>, RouteSourceError> {
        match self {
            Some(source) => source.routes(origin, destination, mode),
            None => Err(RouteSourceError::NotConfigured),
        }
    }
}

/// Travel mode understood by the directions provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "walking" => Ok(TravelMode::Walking),
            "bicycling" => Ok(TravelMode::Bicycling),
            "transit" => Ok(TravelMode::Transit),
            other => Err(format!("unknown travel mode: {other}")),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative congestion bucket for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrafficLevel {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    Unknown,
}

impl TrafficLevel {
    /// Bucket the ratio of live-traffic duration to free-flow duration.
    pub fn from_ratio(ratio: f64) -> Self {
        if !ratio.is_finite() {
            TrafficLevel::Unknown
        } else if ratio < 1.1 {
            TrafficLevel::Low
        } else if ratio < 1.3 {
            TrafficLevel::Moderate
        } else if ratio < 1.5 {
            TrafficLevel::High
        } else {
            TrafficLevel::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficLevel::Low => "Low",
            TrafficLevel::Moderate => "Moderate",
            TrafficLevel::High => "High",
            TrafficLevel::VeryHigh => "Very High",
            TrafficLevel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The vehicle a journey is made with.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleProfile {
    pub vehicle_type: String,
    pub fuel_type: String,
    /// Kilometres per litre (or litre-equivalent).
    pub mileage_kmpl: f64,
}

impl VehicleProfile {
    pub fn new(
        vehicle_type: impl Into<String>,
        fuel_type: impl Into<String>,
        mileage_kmpl: f64,
    ) -> Self {
        Self {
            vehicle_type: vehicle_type.into(),
            fuel_type: fuel_type.into(),
            mileage_kmpl,
        }
    }
}

/// A candidate route as reported by a [`RouteSource`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub name: String,
    pub distance_km: f64,
    pub distance_text: String,
    pub duration_minutes: f64,
    pub duration_text: String,
    pub traffic: TrafficLevel,
}
