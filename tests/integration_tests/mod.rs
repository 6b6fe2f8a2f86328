pub mod errors;
pub mod status;
pub mod tracking;
