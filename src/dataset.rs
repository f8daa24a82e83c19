//! Historical journey records used to train the emissions model.
//!
//! The CSV layout is `Vehicle_Type,Fuel_Type,Distance_km,Mileage_kmpl,Carbon_Emitted_kg`.
//! Blank mileage cells are filled with the mean of the recorded mileages.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::DatasetError;

/// One observed journey.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyRecord {
    pub vehicle_type: String,
    pub fuel_type: String,
    pub distance_km: f64,
    pub mileage_kmpl: f64,
    pub emissions_kg: f64,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Vehicle_Type")]
    vehicle_type: String,
    #[serde(rename = "Fuel_Type")]
    fuel_type: String,
    #[serde(rename = "Distance_km")]
    distance_km: f64,
    #[serde(rename = "Mileage_kmpl")]
    mileage_kmpl: Option<f64>,
    #[serde(rename = "Carbon_Emitted_kg")]
    emissions_kg: f64,
}

/// Reject values that would poison training: non-finite cells, a
/// non-positive distance or mileage, negative emissions.
fn check_record(
    row: usize,
    distance_km: f64,
    mileage_kmpl: Option<f64>,
    emissions_kg: f64,
) -> Result<(), DatasetError> {
    let invalid = |reason: String| Err(DatasetError::InvalidRecord { row, reason });

    if !distance_km.is_finite() || distance_km <= 0.0 {
        return invalid(format!("distance must be a positive number of km, got {distance_km}"));
    }
    if let Some(mileage) = mileage_kmpl {
        if !mileage.is_finite() || mileage <= 0.0 {
            return invalid(format!("mileage must be a positive number of km/l, got {mileage}"));
        }
    }
    if !emissions_kg.is_finite() || emissions_kg < 0.0 {
        return invalid(format!(
            "emissions must be a non-negative number of kg, got {emissions_kg}"
        ));
    }
    Ok(())
}

/// A non-empty set of journey records.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<JourneyRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<JourneyRecord>) -> Result<Self, DatasetError> {
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }
        for (index, r) in records.iter().enumerate() {
            check_record(index + 1, r.distance_km, Some(r.mileage_kmpl), r.emissions_kg)?;
        }
        Ok(Self { records })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading journey dataset");
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let rows = csv_reader
            .deserialize::<CsvRow>()
            .collect::<Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        for (index, row) in rows.iter().enumerate() {
            check_record(index + 1, row.distance_km, row.mileage_kmpl, row.emissions_kg)?;
        }

        let known: Vec<f64> = rows.iter().filter_map(|row| row.mileage_kmpl).collect();
        let missing = rows.len() - known.len();
        let fill = if missing == 0 {
            0.0
        } else if known.is_empty() {
            return Err(DatasetError::MissingMileage);
        } else {
            known.iter().sum::<f64>() / known.len() as f64
        };

        if missing > 0 {
            info!(missing, fill, "imputed missing mileage values");
        }

        let records = rows
            .into_iter()
            .map(|row| JourneyRecord {
                vehicle_type: row.vehicle_type,
                fuel_type: row.fuel_type,
                distance_km: row.distance_km,
                mileage_kmpl: row.mileage_kmpl.unwrap_or(fill),
                emissions_kg: row.emissions_kg,
            })
            .collect();

        Ok(Self { records })
    }

    pub fn records(&self) -> &[JourneyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean emissions per 100 km over records of the given vehicle type.
    ///
    /// Records with a non-positive distance are ignored.
    pub fn mean_emissions_per_100km(&self, vehicle_type: &str) -> Option<f64> {
        let rates: Vec<f64> = self
            .records
            .iter()
            .filter(|r| r.vehicle_type.eq_ignore_ascii_case(vehicle_type) && r.distance_km > 0.0)
            .map(|r| r.emissions_kg / r.distance_km * 100.0)
            .collect();
        if rates.is_empty() {
            return None;
        }
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    }
}
