pub mod classifier;
pub mod engine;
pub mod export;
pub mod grouping;
pub mod reconcile;
pub mod submission;

pub use crate::domain::model::{
    ClassifiedNumber, DidClassification, PhoneNumber, PortBatchOutcome, RateCenterGroups,
    ReconciledState,
};
pub use crate::domain::ports::{
    CredentialMinter, DidRegistry, EmergencyRecords, PortSubmitter, RateCenterLookup, Storage,
};
pub use crate::utils::error::Result;
