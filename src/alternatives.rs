//! Ranking of alternative vehicles and transport modes for a trip distance.

use serde::Serialize;
use tracing::warn;

use crate::error::{PlannerError, PredictionError};
use crate::traits::EmissionsPredictor;

/// Trips under this many kg CO2 count as eco-friendly.
pub const ECO_FRIENDLY_THRESHOLD_KG: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Propulsion {
    /// Scored by the emissions predictor.
    Fuel {
        vehicle_type: &'static str,
        fuel_type: &'static str,
        mileage_kmpl: f64,
    },
    /// Bicycle, walking: zero emissions, never sent to the predictor.
    Human,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    pub label: &'static str,
    pub propulsion: Propulsion,
}

impl ModeProfile {
    const fn fuel(
        label: &'static str,
        vehicle_type: &'static str,
        fuel_type: &'static str,
        mileage_kmpl: f64,
    ) -> Self {
        Self {
            label,
            propulsion: Propulsion::Fuel {
                vehicle_type,
                fuel_type,
                mileage_kmpl,
            },
        }
    }

    const fn human(label: &'static str) -> Self {
        Self {
            label,
            propulsion: Propulsion::Human,
        }
    }
}

pub const DEFAULT_CATALOG: [ModeProfile; 7] = [
    ModeProfile::fuel("Car (Petrol)", "Car", "Petrol", 14.0),
    ModeProfile::fuel("Car (Diesel)", "Car", "Diesel", 18.0),
    ModeProfile::fuel("Car (Electric)", "Car", "Electric", 25.0),
    ModeProfile::fuel("Bus", "Bus", "Diesel", 5.0),
    ModeProfile::fuel("Motorcycle", "Motorcycle", "Petrol", 35.0),
    ModeProfile::human("Bicycle"),
    ModeProfile::human("Walking"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub vehicle_label: String,
    pub emissions_kg: f64,
    pub is_eco_friendly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeAnalysis {
    pub distance_km: f64,
    /// Ascending by `emissions_kg`; never empty.
    pub alternatives: Vec<Alternative>,
    pub eco_recommended: String,
}

#[derive(Debug, Clone)]
pub struct AlternativeRanker<P> {
    predictor: P,
    catalog: Vec<ModeProfile>,
}

impl<P: EmissionsPredictor> AlternativeRanker<P> {
    pub fn new(predictor: P) -> Self {
        Self {
            predictor,
            catalog: DEFAULT_CATALOG.to_vec(),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<ModeProfile>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Score every profile in the catalog for a trip of `distance_km`.
    ///
    /// Profiles the predictor cannot score (for example a fuel type missing
    /// from the training data) are left out of the ranking.
    pub fn rank_alternatives(&self, distance_km: f64) -> Result<AlternativeAnalysis, PlannerError> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(PlannerError::InvalidInput(format!(
                "distance must be a non-negative number of km, got {distance_km}"
            )));
        }
        if self.catalog.is_empty() {
            return Err(PlannerError::InvalidInput("no alternatives to rank".into()));
        }

        let mut alternatives = Vec::with_capacity(self.catalog.len());
        let mut last_failure: Option<(&str, PredictionError)> = None;

        for profile in &self.catalog {
            match self.score(profile, distance_km) {
                Ok(alternative) => alternatives.push(alternative),
                Err(err) => {
                    warn!(vehicle = profile.label, error = %err, "skipping alternative");
                    last_failure = Some((profile.label, err));
                }
            }
        }

        if alternatives.is_empty() {
            // Non-empty catalog with nothing scored, so a failure was recorded.
            let (item, source) =
                last_failure.unwrap_or(("alternatives", PredictionError::ModelUnavailable));
            return Err(PlannerError::PredictionUnavailable {
                item: item.to_string(),
                source,
            });
        }

        alternatives.sort_by(|a, b| a.emissions_kg.total_cmp(&b.emissions_kg));
        let eco_recommended = alternatives[0].vehicle_label.clone();

        Ok(AlternativeAnalysis {
            distance_km,
            alternatives,
            eco_recommended,
        })
    }

    fn score(
        &self,
        profile: &ModeProfile,
        distance_km: f64,
    ) -> Result<Alternative, PredictionError> {
        let emissions_kg = match profile.propulsion {
            Propulsion::Human => 0.0,
            Propulsion::Fuel {
                vehicle_type,
                fuel_type,
                mileage_kmpl,
            } => {
                self.predictor
                    .predict(vehicle_type, fuel_type, distance_km, mileage_kmpl)?
                    .emissions_kg
            }
        };

        Ok(Alternative {
            vehicle_label: profile.label.to_string(),
            emissions_kg,
            is_eco_friendly: emissions_kg < ECO_FRIENDLY_THRESHOLD_KG,
        })
    }
}
