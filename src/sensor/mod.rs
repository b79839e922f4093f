//! Simulated telemetry sources

pub mod generator;

pub use generator::TemperatureGenerator;
