//! Listing creation wizard for a rental platform: BAN address autocomplete,
//! a step-by-step draft kept on the device, and publication to a hosted
//! backend.

pub mod address;
pub mod config;
pub mod error;
pub mod models;
pub mod publish;
pub mod wizard;

pub use config::Config;
pub use error::{Error, Result};
