//! Google Directions / Distance Matrix HTTP adapter.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RouteSourceError;
use crate::traits::{Route, RouteSource, TrafficLevel, TravelMode};

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Ask the provider for alternative routes, not just the best one.
    pub alternatives: bool,
    /// Traffic assumption for driving requests: `best_guess`, `pessimistic`
    /// or `optimistic`.
    pub traffic_model: String,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
            alternatives: true,
            traffic_model: "best_guess".to_string(),
        }
    }
}

/// Distance and duration for a single origin-destination pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TripEstimate {
    pub distance_km: f64,
    pub distance_text: String,
    pub duration_minutes: f64,
    pub duration_text: String,
}

#[derive(Debug, Clone)]
pub struct DirectionsClient {
    config: DirectionsConfig,
    client: reqwest::blocking::Client,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Distance Matrix lookup for one origin and one destination.
    pub fn distance(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<TripEstimate, RouteSourceError> {
        let url = format!("{}/distancematrix/json", self.config.base_url);
        let body: MatrixResponse = self
            .client
            .get(url)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("mode", mode.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())?;

        trip_from_matrix(body)
    }
}

impl RouteSource for DirectionsClient {
    fn routes(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<Vec<Route>, RouteSourceError> {
        let url = format!("{}/directions/json", self.config.base_url);
        let mut query = vec![
            ("origin", origin),
            ("destination", destination),
            ("mode", mode.as_str()),
            ("alternatives", if self.config.alternatives { "true" } else { "false" }),
            ("key", self.config.api_key.as_str()),
        ];
        // Live traffic durations are only reported for driving with a departure time.
        if mode == TravelMode::Driving {
            query.push(("departure_time", "now"));
            query.push(("traffic_model", self.config.traffic_model.as_str()));
        }

        debug!(origin, destination, %mode, "requesting directions");

        let body: DirectionsResponse = self
            .client
            .get(url)
            .query(&query)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())?;

        routes_from_directions(body)
    }
}

/// Turn a decoded Directions response into routes named `Route A (summary)`,
/// `Route B (summary)`, ... in provider order.
pub(crate) fn routes_from_directions(
    body: DirectionsResponse,
) -> Result<Vec<Route>, RouteSourceError> {
    if body.status != "OK" {
        warn!(
            status = %body.status,
            message = ?body.error_message,
            "directions provider rejected request"
        );
        return Err(RouteSourceError::Status(body.status));
    }

    let routes = body
        .routes
        .into_iter()
        .enumerate()
        .map(|(index, route)| -> Result<Route, RouteSourceError> {
            let leg = route
                .legs
                .into_iter()
                .next()
                .ok_or_else(|| RouteSourceError::Decode(format!("route {index} has no legs")))?;
            Ok(Route {
                name: format!("Route {} ({})", route_letter(index), route.summary),
                distance_km: leg.distance.value / 1000.0,
                distance_text: leg.distance.text,
                duration_minutes: leg.duration.value / 60.0,
                duration_text: leg.duration.text,
                traffic: traffic_level(
                    leg.duration.value,
                    leg.duration_in_traffic.map(|d| d.value),
                ),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if routes.is_empty() {
        return Err(RouteSourceError::NoRoutes);
    }
    Ok(routes)
}

pub(crate) fn trip_from_matrix(body: MatrixResponse) -> Result<TripEstimate, RouteSourceError> {
    if body.status != "OK" {
        return Err(RouteSourceError::Status(body.status));
    }

    let element = body
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or(RouteSourceError::NoRoutes)?;

    if element.status != "OK" {
        return Err(RouteSourceError::Status(element.status));
    }

    match (element.distance, element.duration) {
        (Some(distance), Some(duration)) => Ok(TripEstimate {
            distance_km: distance.value / 1000.0,
            distance_text: distance.text,
            duration_minutes: duration.value / 60.0,
            duration_text: duration.text,
        }),
        _ => Err(RouteSourceError::Decode("matrix element without distance or duration".into())),
    }
}

fn traffic_level(free_flow_secs: f64, in_traffic_secs: Option<f64>) -> TrafficLevel {
    match in_traffic_secs {
        Some(live) if free_flow_secs > 0.0 => TrafficLevel::from_ratio(live / free_flow_secs),
        _ => TrafficLevel::Unknown,
    }
}

fn route_letter(index: usize) -> String {
    // A..Z, then AA, AB, ...
    let mut n = index;
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: TextValue,
    duration: TextValue,
    #[serde(default)]
    duration_in_traffic: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<TextValue>,
    duration: Option<TextValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn directions(json: &str) -> DirectionsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_routes_in_provider_order() {
        let body = directions(
            r#"{
                "status": "OK",
                "routes": [
                    {"summary": "I-95 N", "legs": [{
                        "distance": {"text": "346 km", "value": 346000},
                        "duration": {"text": "3 hours 50 mins", "value": 13800},
                        "duration_in_traffic": {"text": "4 hours 30 mins", "value": 16200}
                    }]},
                    {"summary": "I-84 E", "legs": [{
                        "distance": {"text": "370 km", "value": 370000},
                        "duration": {"text": "4 hours", "value": 14400}
                    }]}
                ]
            }"#,
        );

        let routes = routes_from_directions(body).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].name, "Route A (I-95 N)");
        assert_relative_eq!(routes[0].distance_km, 346.0);
        assert_relative_eq!(routes[0].duration_minutes, 230.0);
        // 16200 / 13800 = 1.17
        assert_eq!(routes[0].traffic, TrafficLevel::Moderate);
        assert_eq!(routes[1].name, "Route B (I-84 E)");
        assert_eq!(routes[1].traffic, TrafficLevel::Unknown);
    }

    #[test]
    fn non_ok_status_is_unavailable() {
        let body = directions(
            r#"{"status": "REQUEST_DENIED", "error_message": "bad key", "routes": []}"#,
        );
        assert!(matches!(
            routes_from_directions(body),
            Err(RouteSourceError::Status(status)) if status == "REQUEST_DENIED"
        ));
    }

    #[test]
    fn zero_results_is_unavailable() {
        let body = directions(r#"{"status": "OK", "routes": []}"#);
        assert!(matches!(routes_from_directions(body), Err(RouteSourceError::NoRoutes)));
    }

    #[test]
    fn route_without_legs_is_decode_error() {
        let body = directions(r#"{"status": "OK", "routes": [{"summary": "x", "legs": []}]}"#);
        assert!(matches!(routes_from_directions(body), Err(RouteSourceError::Decode(_))));
    }

    #[test]
    fn matrix_element_status_is_checked() {
        let body: MatrixResponse = serde_json::from_str(
            r#"{"status": "OK", "rows": [{"elements": [{"status": "ZERO_RESULTS"}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            trip_from_matrix(body),
            Err(RouteSourceError::Status(status)) if status == "ZERO_RESULTS"
        ));
    }

    #[test]
    fn matrix_trip_converts_units() {
        let body: MatrixResponse = serde_json::from_str(
            r#"{"status": "OK", "rows": [{"elements": [{
                "status": "OK",
                "distance": {"text": "12.5 km", "value": 12500},
                "duration": {"text": "18 mins", "value": 1080}
            }]}]}"#,
        )
        .unwrap();
        let trip = trip_from_matrix(body).unwrap();
        assert_relative_eq!(trip.distance_km, 12.5);
        assert_relative_eq!(trip.duration_minutes, 18.0);
        assert_eq!(trip.distance_text, "12.5 km");
    }

    #[test]
    fn letters_continue_past_z() {
        assert_eq!(route_letter(0), "A");
        assert_eq!(route_letter(25), "Z");
        assert_eq!(route_letter(26), "AA");
        assert_eq!(route_letter(27), "AB");
    }
}
