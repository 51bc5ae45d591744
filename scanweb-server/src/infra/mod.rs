pub mod app_state;
pub mod errors;
pub mod wiring;
