use crate::config::PortOrderMetadata;
use crate::domain::model::{
    AddressRecord, PhoneNumber, RateCenterRecord, SubmissionReceipt, TrunkDids,
};
use crate::utils::error::{LookupFailure, Result};
use async_trait::async_trait;

/// Enumerates a carrier account's provisioned numbers. Which account (911 or
/// non-911 scope) is fixed by the credentials the implementation was built
/// with.
#[async_trait]
pub trait DidRegistry: Send + Sync {
    async fn lookup_dids(&self) -> std::result::Result<Vec<TrunkDids>, LookupFailure>;
}

/// Fetches the 911 service address registered for a number. `Ok(None)` means
/// the registry confirmed there is no record.
#[async_trait]
pub trait EmergencyRecords: Send + Sync {
    async fn lookup_emergency_record(
        &self,
        number: &PhoneNumber,
    ) -> std::result::Result<Option<AddressRecord>, LookupFailure>;
}

#[async_trait]
pub trait RateCenterLookup: Send + Sync {
    async fn lookup_rate_center(
        &self,
        npa: &str,
        nxx: &str,
    ) -> std::result::Result<RateCenterRecord, LookupFailure>;
}

/// Issues one grouped LNP request. A transport-level error is a hard failure
/// (`Err`); a carrier rejection comes back as a receipt with `success: false`
/// and whatever structured errors the carrier reported.
#[async_trait]
pub trait PortSubmitter: Send + Sync {
    async fn submit_port_request(
        &self,
        numbers: &[PhoneNumber],
        metadata: &PortOrderMetadata,
        credential: &str,
    ) -> Result<SubmissionReceipt>;
}

/// Mints the short-lived (~30 s) credential required per submission call.
pub trait CredentialMinter: Send + Sync {
    fn mint(&self) -> Result<String>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
