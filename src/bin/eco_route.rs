// Command-line front end: train on a journey dataset, then predict, rank
// routes, or rank alternative transport modes.
//
// Usage:
//   eco-route --dataset journeys.csv routes "Downtown" "Suburb" \
//       --vehicle Car --fuel Petrol --mileage 12.5

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eco_route_planner::alternatives::{AlternativeAnalysis, AlternativeRanker};
use eco_route_planner::analyzer::{RouteAnalysis, RouteAnalyzer};
use eco_route_planner::dataset::Dataset;
use eco_route_planner::directions::{DirectionsClient, DirectionsConfig};
use eco_route_planner::forest::ForestConfig;
use eco_route_planner::model::{EmissionsModel, EmissionsResult};
use eco_route_planner::synthetic::SyntheticRoutes;
use eco_route_planner::traits::{EmissionsPredictor, TravelMode, VehicleProfile};

#[derive(Parser, Debug)]
#[command(version, about = "Estimate journey emissions and find greener routes")]
struct Cli {
    /// Training data (CSV: Vehicle_Type,Fuel_Type,Distance_km,Mileage_kmpl,Carbon_Emitted_kg).
    #[arg(long, env = "ECO_DATASET")]
    dataset: PathBuf,

    /// Trees in the emissions forest.
    #[arg(long, default_value_t = 100)]
    trees: usize,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict emissions for one journey.
    Predict {
        #[command(flatten)]
        vehicle: VehicleArgs,
        /// Journey distance in km.
        #[arg(long)]
        distance: f64,
    },
    /// Rank routes between two places by predicted emissions.
    Routes {
        origin: String,
        destination: String,
        #[command(flatten)]
        vehicle: VehicleArgs,
        #[command(flatten)]
        provider: ProviderArgs,
        #[arg(long, default_value = "driving")]
        mode: TravelMode,
        /// Seed for synthetic fallback routes.
        #[arg(long)]
        seed: Option<u64>,
        /// Also rank alternative modes over the recommended route's distance.
        #[arg(long)]
        with_alternatives: bool,
    },
    /// Rank alternative vehicles and modes for a trip distance.
    Alternatives {
        #[arg(long)]
        distance: f64,
    },
    /// Look up distance and duration between two places.
    Distance {
        origin: String,
        destination: String,
        #[command(flatten)]
        provider: ProviderArgs,
        #[arg(long, default_value = "driving")]
        mode: TravelMode,
    },
    /// List the vehicle and fuel types the model was trained on.
    Vocab,
}

#[derive(Args, Debug)]
struct VehicleArgs {
    #[arg(long = "vehicle")]
    vehicle_type: String,
    #[arg(long = "fuel")]
    fuel_type: String,
    /// Vehicle mileage in km/l.
    #[arg(long)]
    mileage: f64,
}

impl VehicleArgs {
    fn profile(&self) -> VehicleProfile {
        VehicleProfile::new(&self.vehicle_type, &self.fuel_type, self.mileage)
    }
}

#[derive(Args, Debug)]
struct ProviderArgs {
    /// Google Maps API key. Without one, synthetic routes are used.
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

impl ProviderArgs {
    fn client(&self) -> Result<Option<DirectionsClient>> {
        let Some(api_key) = self.api_key.clone() else {
            return Ok(None);
        };
        let config = DirectionsConfig {
            api_key,
            timeout_secs: self.timeout_secs,
            ..DirectionsConfig::default()
        };
        Ok(Some(DirectionsClient::new(config)?))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eco_route_planner=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let dataset = Dataset::from_path(&cli.dataset)
        .with_context(|| format!("loading dataset {}", cli.dataset.display()))?;
    let model = EmissionsModel::trained(
        &dataset,
        ForestConfig {
            n_trees: cli.trees,
            ..ForestConfig::default()
        },
    );

    match &cli.command {
        Command::Predict { vehicle, distance } => {
            let result = model.predict(
                &vehicle.vehicle_type,
                &vehicle.fuel_type,
                *distance,
                vehicle.mileage,
            )?;
            emit(cli.json, &result, print_prediction)?;
        }
        Command::Routes {
            origin,
            destination,
            vehicle,
            provider,
            mode,
            seed,
            with_alternatives,
        } => {
            let analyzer = RouteAnalyzer::new(provider.client()?, &model)
                .with_fallback(SyntheticRoutes { seed: *seed });
            let analysis = analyzer.analyze(origin, destination, &vehicle.profile(), *mode)?;
            emit(cli.json, &analysis, print_routes)?;

            if *with_alternatives {
                let distance = analysis.recommended().route.distance_km;
                let alternatives = AlternativeRanker::new(&model).rank_alternatives(distance)?;
                emit(cli.json, &alternatives, print_alternatives)?;
            }
        }
        Command::Alternatives { distance } => {
            let alternatives = AlternativeRanker::new(&model).rank_alternatives(*distance)?;
            emit(cli.json, &alternatives, print_alternatives)?;
        }
        Command::Distance {
            origin,
            destination,
            provider,
            mode,
        } => {
            let client = provider
                .client()?
                .context("a Google Maps API key is required for distance lookups")?;
            let trip = client.distance(origin, destination, *mode)?;
            println!(
                "{origin} -> {destination}: {:.1} km ({}), {:.0} min ({})",
                trip.distance_km, trip.distance_text, trip.duration_minutes, trip.duration_text
            );
        }
        Command::Vocab => {
            println!("Vehicle types: {}", model.vehicle_types().join(", "));
            println!("Fuel types: {}", model.fuel_types().join(", "));
        }
    }

    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, text: fn(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

fn print_prediction(result: &EmissionsResult) {
    println!("PREDICTED CARBON EMISSIONS: {:.2} kg CO2", result.emissions_kg);
    println!("{}", result.level.description());
    println!("\nComparison with average vehicles (per 100km):");
    for (class, text) in &result.comparison {
        println!("- Average {class}: {text}");
    }
}

fn print_routes(analysis: &RouteAnalysis) {
    println!("===== ROUTE ANALYSIS =====");
    println!("From {} to {} ({})", analysis.origin, analysis.destination, analysis.travel_mode);
    if analysis.used_fallback {
        println!("(directions unavailable, showing estimated routes)");
    }
    for (i, scored) in analysis.routes.iter().enumerate() {
        let route = &scored.route;
        println!("\nROUTE {}: {}", i + 1, route.name);
        println!("Distance: {:.1} km ({})", route.distance_km, route.distance_text);
        println!("Time: {:.1} minutes ({})", route.duration_minutes, route.duration_text);
        println!("Traffic: {}", route.traffic);
        println!("Emissions: {:.2} kg CO2", scored.emissions_kg);
        println!("Impact: {}", scored.emissions_interpretation);
    }
    println!("\nECO-RECOMMENDED ROUTE: {}", analysis.eco_recommended_route);
    println!("Potential CO2 savings: {:.2} kg", analysis.eco_savings.absolute_kg);
    println!("Percentage reduction: {:.1}%", analysis.eco_savings.percentage);
}

fn print_alternatives(analysis: &AlternativeAnalysis) {
    println!("\n===== ALTERNATIVE TRANSPORTATION ({:.1} km) =====", analysis.distance_km);
    for (i, alt) in analysis.alternatives.iter().enumerate() {
        let label = if alt.is_eco_friendly { " [eco-friendly]" } else { "" };
        println!("{}. {} - {:.2} kg CO2{}", i + 1, alt.vehicle_label, alt.emissions_kg, label);
    }
    println!("\nMOST ECO-FRIENDLY OPTION: {}", analysis.eco_recommended);
}
