//! Error types for prediction, route lookup, and training data.

use thiserror::Error;

/// Failure of a single emissions prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unrecognized {field} category: {value:?}")]
    UnknownCategory { field: CategoryField, value: String },

    #[error("emissions model has not been trained")]
    ModelUnavailable,

    #[error("model produced a non-finite estimate ({0})")]
    NonFiniteEstimate(f64),
}

/// Which categorical feature a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    VehicleType,
    FuelType,
}

impl std::fmt::Display for CategoryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryField::VehicleType => f.write_str("vehicle type"),
            CategoryField::FuelType => f.write_str("fuel type"),
        }
    }
}

/// The route provider could not supply routes.
///
/// Never fatal for route analysis: the analyzer substitutes synthetic routes.
#[derive(Debug, Error)]
pub enum RouteSourceError {
    #[error("directions request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("directions provider returned status {0}")]
    Status(String),

    #[error("directions response could not be read: {0}")]
    Decode(String),

    #[error("directions provider returned no routes")]
    NoRoutes,

    #[error("no directions provider configured")]
    NotConfigured,
}

/// Whole-operation failure of the analyzer or the alternatives ranker.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not score {item}: {source}")]
    PredictionUnavailable {
        item: String,
        #[source]
        source: PredictionError,
    },
}

/// Failure while loading a training dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("dataset has no records")]
    Empty,

    #[error("no record has a mileage value to impute from")]
    MissingMileage,

    /// `row` counts data records from 1, not including the CSV header.
    #[error("record {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },
}
