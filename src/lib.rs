pub mod aircraft;
pub mod config;
pub mod math;
pub mod perf;
pub mod plot;
pub mod runner;
