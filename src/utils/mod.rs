//! Utils module - logging setup and helpers

pub mod logging;

pub use logging::init_logging;
