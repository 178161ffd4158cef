pub mod availability;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod services;
pub mod store;

pub use error::{CoreResult, Error};
