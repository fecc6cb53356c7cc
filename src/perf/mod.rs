pub mod aero;
pub mod atmosphere;
pub mod fit;
pub mod performance;
