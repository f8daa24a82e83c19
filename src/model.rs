//! Trained emissions model.
//!
//! Features are `[vehicle code, fuel code, distance km, mileage km/l]`, with
//! the two categorical columns label-encoded against the training vocabulary.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::dataset::Dataset;
use crate::encoder::LabelEncoder;
use crate::error::{CategoryField, PredictionError};
use crate::forest::{ForestConfig, RandomForest};
use crate::traits::EmissionsPredictor;

/// Reference classes reported alongside every prediction, as
/// (comparison key, vehicle type in the training data).
pub const REFERENCE_CLASSES: [(&str, &str); 3] =
    [("car", "Car"), ("bus", "Bus"), ("motorcycle", "Motorcycle")];

/// Qualitative size of a journey's emissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionsLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl EmissionsLevel {
    pub fn from_kg(emissions_kg: f64) -> Self {
        if emissions_kg < 10.0 {
            EmissionsLevel::Low
        } else if emissions_kg < 30.0 {
            EmissionsLevel::Moderate
        } else if emissions_kg < 50.0 {
            EmissionsLevel::High
        } else {
            EmissionsLevel::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmissionsLevel::Low => "low",
            EmissionsLevel::Moderate => "moderate",
            EmissionsLevel::High => "high",
            EmissionsLevel::VeryHigh => "very high",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EmissionsLevel::Low => "This journey has relatively low carbon emissions.",
            EmissionsLevel::Moderate => "This journey has moderate carbon emissions.",
            EmissionsLevel::High => "This journey has high carbon emissions.",
            EmissionsLevel::VeryHigh => "This journey has very high carbon emissions.",
        }
    }
}

impl fmt::Display for EmissionsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a single emissions prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionsResult {
    pub emissions_kg: f64,
    pub level: EmissionsLevel,
    /// Reference class -> average emissions text, e.g. `"~19.2 kg CO2 per 100km"`.
    pub comparison: BTreeMap<String, String>,
}

impl EmissionsResult {
    /// Build a result from a raw model estimate.
    ///
    /// Regression output can dip below zero for inputs outside the training
    /// range; it is clamped to zero here. A NaN or infinite estimate is an
    /// error rather than a clamped value.
    pub fn from_estimate(
        raw_kg: f64,
        comparison: BTreeMap<String, String>,
    ) -> Result<Self, PredictionError> {
        if !raw_kg.is_finite() {
            return Err(PredictionError::NonFiniteEstimate(raw_kg));
        }
        let emissions_kg = raw_kg.max(0.0);
        Ok(Self {
            emissions_kg,
            level: EmissionsLevel::from_kg(emissions_kg),
            comparison,
        })
    }
}

#[derive(Debug, Clone)]
struct Trained {
    vehicle_types: LabelEncoder,
    fuel_types: LabelEncoder,
    forest: RandomForest,
    comparison: BTreeMap<String, String>,
}

/// Random-forest emissions model.
///
/// Training takes `&mut self`; once trained, the model is only read, so a
/// shared reference (or an `Arc`) can serve concurrent predictions.
#[derive(Debug, Clone)]
pub struct EmissionsModel {
    config: ForestConfig,
    trained: Option<Trained>,
}

impl Default for EmissionsModel {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl EmissionsModel {
    /// An untrained model. Predictions fail until [`EmissionsModel::fit`] runs.
    pub fn new(config: ForestConfig) -> Self {
        Self { config, trained: None }
    }

    pub fn trained(dataset: &Dataset, config: ForestConfig) -> Self {
        let mut model = Self::new(config);
        model.fit(dataset);
        model
    }

    pub fn fit(&mut self, dataset: &Dataset) {
        let records = dataset.records();
        let vehicle_types = LabelEncoder::fit(records.iter().map(|r| r.vehicle_type.as_str()));
        let fuel_types = LabelEncoder::fit(records.iter().map(|r| r.fuel_type.as_str()));

        // Every label was just fitted, so encoding cannot miss.
        let features: Vec<Vec<f64>> = records
            .iter()
            .map(|r| {
                vec![
                    vehicle_types.encode(&r.vehicle_type).unwrap_or_default() as f64,
                    fuel_types.encode(&r.fuel_type).unwrap_or_default() as f64,
                    r.distance_km,
                    r.mileage_kmpl,
                ]
            })
            .collect();
        let targets: Vec<f64> = records.iter().map(|r| r.emissions_kg).collect();

        let forest = RandomForest::fit(&features, &targets, &self.config);

        let comparison = REFERENCE_CLASSES
            .iter()
            .filter_map(|(key, vehicle_type)| {
                dataset
                    .mean_emissions_per_100km(vehicle_type)
                    .filter(|avg| avg.is_finite())
                    .map(|avg| (key.to_string(), format!("~{avg:.1} kg CO2 per 100km")))
            })
            .collect();

        info!(
            records = records.len(),
            trees = forest.n_trees(),
            vehicle_types = vehicle_types.classes().len(),
            fuel_types = fuel_types.classes().len(),
            "emissions model trained"
        );

        self.trained = Some(Trained {
            vehicle_types,
            fuel_types,
            forest,
            comparison,
        });
    }

    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    /// Vehicle types in the trained vocabulary (empty before training).
    pub fn vehicle_types(&self) -> &[String] {
        self.trained
            .as_ref()
            .map(|t| t.vehicle_types.classes())
            .unwrap_or_default()
    }

    /// Fuel types in the trained vocabulary (empty before training).
    pub fn fuel_types(&self) -> &[String] {
        self.trained
            .as_ref()
            .map(|t| t.fuel_types.classes())
            .unwrap_or_default()
    }
}

impl EmissionsPredictor for EmissionsModel {
    fn predict(
        &self,
        vehicle_type: &str,
        fuel_type: &str,
        distance_km: f64,
        mileage_kmpl: f64,
    ) -> Result<EmissionsResult, PredictionError> {
        let trained = self.trained.as_ref().ok_or(PredictionError::ModelUnavailable)?;

        if !distance_km.is_finite() || distance_km <= 0.0 {
            return Err(PredictionError::InvalidInput(format!(
                "distance must be a positive number of km, got {distance_km}"
            )));
        }
        if !mileage_kmpl.is_finite() || mileage_kmpl <= 0.0 {
            return Err(PredictionError::InvalidInput(format!(
                "mileage must be a positive number of km/l, got {mileage_kmpl}"
            )));
        }

        let vehicle_code = trained
            .vehicle_types
            .encode(vehicle_type)
            .ok_or_else(|| PredictionError::UnknownCategory {
                field: CategoryField::VehicleType,
                value: vehicle_type.to_string(),
            })?;
        let fuel_code = trained
            .fuel_types
            .encode(fuel_type)
            .ok_or_else(|| PredictionError::UnknownCategory {
                field: CategoryField::FuelType,
                value: fuel_type.to_string(),
            })?;

        let raw = trained
            .forest
            .predict(&[vehicle_code as f64, fuel_code as f64, distance_km, mileage_kmpl]);

        EmissionsResult::from_estimate(raw, trained.comparison.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::JourneyRecord;

    fn small_dataset() -> Dataset {
        let mut records = Vec::new();
        for distance in [10.0, 40.0, 80.0, 120.0] {
            records.push(JourneyRecord {
                vehicle_type: "Car".into(),
                fuel_type: "Petrol".into(),
                distance_km: distance,
                mileage_kmpl: 14.0,
                emissions_kg: distance / 14.0 * 2.31,
            });
            records.push(JourneyRecord {
                vehicle_type: "Bus".into(),
                fuel_type: "Diesel".into(),
                distance_km: distance,
                mileage_kmpl: 5.0,
                emissions_kg: distance / 5.0 * 2.68,
            });
        }
        Dataset::from_records(records).unwrap()
    }

    fn small_model() -> EmissionsModel {
        EmissionsModel::trained(
            &small_dataset(),
            ForestConfig {
                n_trees: 8,
                ..ForestConfig::default()
            },
        )
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(EmissionsLevel::from_kg(0.0), EmissionsLevel::Low);
        assert_eq!(EmissionsLevel::from_kg(9.99), EmissionsLevel::Low);
        assert_eq!(EmissionsLevel::from_kg(10.0), EmissionsLevel::Moderate);
        assert_eq!(EmissionsLevel::from_kg(30.0), EmissionsLevel::High);
        assert_eq!(EmissionsLevel::from_kg(42.0), EmissionsLevel::High);
        assert_eq!(EmissionsLevel::from_kg(50.0), EmissionsLevel::VeryHigh);
    }

    #[test]
    fn negative_estimate_is_clamped() {
        let result = EmissionsResult::from_estimate(-3.2, BTreeMap::new()).unwrap();
        assert_eq!(result.emissions_kg, 0.0);
        assert_eq!(result.level, EmissionsLevel::Low);
    }

    #[test]
    fn non_finite_estimate_is_an_error() {
        for raw in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                EmissionsResult::from_estimate(raw, BTreeMap::new()),
                Err(PredictionError::NonFiniteEstimate(_))
            ));
        }
    }

    #[test]
    fn overflowing_training_targets_fail_prediction() {
        // Each value is finite, but leaf and forest means overflow to infinity.
        let records = [10.0, 20.0, 30.0]
            .into_iter()
            .map(|distance| JourneyRecord {
                vehicle_type: "Car".into(),
                fuel_type: "Petrol".into(),
                distance_km: distance,
                mileage_kmpl: 14.0,
                emissions_kg: f64::MAX,
            })
            .collect();
        let dataset = Dataset::from_records(records).unwrap();
        let model = EmissionsModel::trained(
            &dataset,
            ForestConfig {
                n_trees: 4,
                ..ForestConfig::default()
            },
        );

        assert!(matches!(
            model.predict("Car", "Petrol", 20.0, 14.0),
            Err(PredictionError::NonFiniteEstimate(_))
        ));
    }

    #[test]
    fn untrained_model_is_unavailable() {
        let model = EmissionsModel::default();
        assert!(!model.is_trained());
        assert!(model.vehicle_types().is_empty());
        assert_eq!(
            model.predict("Car", "Petrol", 10.0, 14.0),
            Err(PredictionError::ModelUnavailable)
        );
    }

    #[test]
    fn rejects_non_positive_numbers() {
        let model = small_model();
        assert!(matches!(
            model.predict("Car", "Petrol", 0.0, 14.0),
            Err(PredictionError::InvalidInput(_))
        ));
        assert!(matches!(
            model.predict("Car", "Petrol", 10.0, -1.0),
            Err(PredictionError::InvalidInput(_))
        ));
        assert!(matches!(
            model.predict("Car", "Petrol", f64::INFINITY, 14.0),
            Err(PredictionError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_categories_are_reported() {
        let model = small_model();
        assert_eq!(
            model.predict("Truck", "Petrol", 10.0, 14.0),
            Err(PredictionError::UnknownCategory {
                field: CategoryField::VehicleType,
                value: "Truck".into(),
            })
        );
        assert_eq!(
            model.predict("Car", "Hydrogen", 10.0, 14.0),
            Err(PredictionError::UnknownCategory {
                field: CategoryField::FuelType,
                value: "Hydrogen".into(),
            })
        );
    }

    #[test]
    fn comparison_skips_classes_without_data() {
        let result = small_model().predict("Car", "Petrol", 40.0, 14.0).unwrap();
        assert!(result.comparison.contains_key("car"));
        assert!(result.comparison.contains_key("bus"));
        assert!(!result.comparison.contains_key("motorcycle"));
        assert_eq!(result.comparison["car"], "~16.5 kg CO2 per 100km");
    }
}
