//! eco-route-planner core
//!
//! Predicts journey emissions, ranks candidate routes by emissions, and
//! compares alternative transport modes for a trip.

pub mod traits;
pub mod error;
pub mod dataset;
pub mod encoder;
pub mod forest;
pub mod model;
pub mod directions;
pub mod synthetic;
pub mod analyzer;
pub mod alternatives;
