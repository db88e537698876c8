pub mod carrier;

pub use carrier::{CarrierConfig, PortOrderMetadata};

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "lnp-porter")]
#[command(about = "Reconciles a phone-number batch against carrier records and submits LNP port requests")]
pub struct CliConfig {
    /// Batch identifier; prefixes every export artifact (may contain a path
    /// component, e.g. "porting/acme")
    #[arg(long)]
    pub batch: String,

    /// Comma-separated list of 10-digit phone numbers
    #[arg(long, value_delimiter = ',')]
    pub numbers: Vec<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Carrier configuration file (endpoints and credentials)
    #[arg(long, default_value = "carrier.toml")]
    pub config: String,

    #[arg(long, default_value = "5")]
    pub concurrent_requests: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("batch", &self.batch)?;
        if self.numbers.is_empty() {
            return Err(crate::utils::error::PortingError::MissingConfigError {
                field: "numbers".to_string(),
            });
        }
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_path("config", &self.config)?;
        validation::validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        Ok(())
    }
}
