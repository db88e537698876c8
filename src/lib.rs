pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{
    JwtMinter, LocalCallingGuideClient, LocalStorage, OneVoiceClient, UControlClient,
};
pub use crate::config::{CarrierConfig, CliConfig};
pub use crate::core::classifier::NumberClassifier;
pub use crate::core::engine::{BatchReport, PortingEngine};
pub use crate::core::submission::PortCoordinator;
pub use crate::utils::error::{PortingError, Result};
