pub mod analysis_controller;
pub mod assistant_controller;
