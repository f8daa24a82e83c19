//! Synthetic route generator (fallback when the directions provider is unavailable).
//!
//! Always produces the same three named routes; only the distances and
//! durations are random, drawn from fixed ranges.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::traits::{Route, TrafficLevel};

struct Template {
    name: &'static str,
    distance_km: (f64, f64),
    duration_minutes: (f64, f64),
    traffic: TrafficLevel,
}

const TEMPLATES: [Template; 3] = [
    Template {
        name: "Route A (Fastest)",
        distance_km: (10.0, 30.0),
        duration_minutes: (15.0, 45.0),
        traffic: TrafficLevel::Moderate,
    },
    Template {
        name: "Route B (Shortest)",
        distance_km: (8.0, 25.0),
        duration_minutes: (20.0, 60.0),
        traffic: TrafficLevel::Moderate,
    },
    Template {
        name: "Route C (Alternative)",
        distance_km: (12.0, 35.0),
        duration_minutes: (25.0, 70.0),
        traffic: TrafficLevel::Low,
    },
];

#[derive(Debug, Clone, Default)]
pub struct SyntheticRoutes {
    /// Fixed seed for reproducible routes. `None` draws fresh entropy per call.
    pub seed: Option<u64>,
}

impl SyntheticRoutes {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn generate(&self) -> Vec<Route> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        TEMPLATES
            .iter()
            .map(|template| {
                let (lo, hi) = template.distance_km;
                let distance_km = rng.gen_range(lo..hi);
                let (lo, hi) = template.duration_minutes;
                let duration_minutes = rng.gen_range(lo..hi);
                Route {
                    name: template.name.to_string(),
                    distance_km,
                    distance_text: format!(
                        "{:.0}-{:.0} km",
                        template.distance_km.0, template.distance_km.1
                    ),
                    duration_minutes,
                    duration_text: format!(
                        "{:.0}-{:.0} mins",
                        template.duration_minutes.0, template.duration_minutes.1
                    ),
                    traffic: template.traffic,
                }
            })
            .collect()
    }
}
