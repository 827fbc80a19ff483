pub mod audit;
pub mod config;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod preprocessing;
pub mod schema;
pub mod server;

pub use error::{Error, Result};
