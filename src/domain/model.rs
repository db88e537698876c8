use crate::utils::error::{PortingError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// NANP line numbers: optional +1/1 prefix, then ten digits with a 2-9 lead.
fn nanp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\+?1)?([2-9]\d{9})$").expect("valid NANP pattern"))
}

/// A validated 10-digit line number. Construction is the only place format
/// checks happen; everything downstream can rely on the digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        match nanp_pattern().captures(trimmed) {
            Some(captures) => Ok(Self(captures[2].to_string())),
            None => Err(PortingError::InvalidNumber {
                input: raw.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Area code, first three digits.
    pub fn npa(&self) -> &str {
        &self.0[..3]
    }

    /// Exchange, next three digits.
    pub fn nxx(&self) -> &str {
        &self.0[3..6]
    }

    pub fn as_u64(&self) -> u64 {
        self.0.parse().expect("digits only by construction")
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 911 service address as returned by the carrier's V911 registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRecord {
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "StreetNumber")]
    pub street_number: String,
    #[serde(rename = "SuiteNumber")]
    pub suite_number: String,
    #[serde(rename = "StreetName")]
    pub street_name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "ProvinceState")]
    pub province_state: String,
    #[serde(rename = "PostalZip")]
    pub postal_zip: String,
    #[serde(rename = "OtherInfo")]
    pub other_info: String,
}

/// Rate-center data for one NPA-NXX prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCenterRecord {
    pub rate_center: String,
    pub block: String,
    pub region: String,
    pub switch: String,
    pub ocn: String,
}

/// Full routing record kept for a confirmed ordinary line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingInfo {
    #[serde(rename = "NPA")]
    pub npa: String,
    #[serde(rename = "NXX")]
    pub nxx: String,
    #[serde(rename = "Block")]
    pub block: String,
    #[serde(rename = "RateCenter")]
    pub rate_center: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Switch")]
    pub switch: String,
    #[serde(rename = "OCN")]
    pub ocn: String,
}

impl RoutingInfo {
    pub fn from_lookup(number: &PhoneNumber, record: RateCenterRecord) -> Self {
        Self {
            npa: number.npa().to_string(),
            nxx: number.nxx().to_string(),
            block: record.block,
            rate_center: record.rate_center,
            region: record.region,
            switch: record.switch,
            ocn: record.ocn,
        }
    }
}

/// Terminal disposition of one valid number. Assigned exactly once; the 911
/// check always precedes the non-911 check, so a line provisioned in both
/// registries lands here as `Is911`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DidClassification {
    Is911(AddressRecord),
    NonNine11(RoutingInfo),
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedNumber {
    pub number: PhoneNumber,
    pub classification: DidClassification,
}

/// Which upstream call produced a soft failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    EmergencyDids,
    EmergencyRecord,
    OrdinaryDids,
    RateCenter,
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupStage::EmergencyDids => "911 DID registry",
            LookupStage::EmergencyRecord => "911 address record",
            LookupStage::OrdinaryDids => "non-911 DID registry",
            LookupStage::RateCenter => "rate-center lookup",
        };
        f.write_str(name)
    }
}

/// Soft-failure record: the lookup could not be completed, so the number was
/// treated as absent from that registry rather than aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupDiagnostic {
    pub number: PhoneNumber,
    pub stage: LookupStage,
    pub detail: String,
}

/// Outcome of reconciling the batch's 911-registered numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciledState {
    /// No 911 numbers in the batch.
    NoConflict,
    /// Exactly one 911 registration; its address is authoritative.
    SingleAuthoritative(AddressRecord),
    /// Two or more 911 registrations. Automated submission must halt and
    /// every record goes to a human for adjudication.
    RequiresManualReview(Vec<(PhoneNumber, AddressRecord)>),
}

impl ReconciledState {
    pub fn requires_manual_review(&self) -> bool {
        matches!(self, ReconciledState::RequiresManualReview(_))
    }
}

/// One rate-center cohort, numbers in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCenterGroup {
    pub rate_center: String,
    pub numbers: Vec<PhoneNumber>,
}

/// Partition of the non-911 set keyed by rate center. Group order follows
/// first appearance in the input, as does number order within a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateCenterGroups {
    groups: Vec<RateCenterGroup>,
}

impl RateCenterGroups {
    pub fn push(&mut self, rate_center: &str, number: PhoneNumber) {
        match self
            .groups
            .iter_mut()
            .find(|group| group.rate_center == rate_center)
        {
            Some(group) => group.numbers.push(number),
            None => self.groups.push(RateCenterGroup {
                rate_center: rate_center.to_string(),
                numbers: vec![number],
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateCenterGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_numbers(&self) -> usize {
        self.groups.iter().map(|group| group.numbers.len()).sum()
    }
}

/// Carrier response to one grouped LNP submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub success: bool,
    pub errors: Vec<String>,
}

/// Final per-number submission outcome. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBatchOutcome {
    pub number: PhoneNumber,
    pub rate_center: String,
    pub accepted: bool,
    pub errors: Vec<String>,
}

/// One row of the regulatory CSV artifact. Header names are fixed by the
/// receiving side and differ slightly from the V911 field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "StreetNumber")]
    pub street_number: String,
    #[serde(rename = "SuiteApt")]
    pub suite_apt: String,
    #[serde(rename = "StreetName")]
    pub street_name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "ProvinceState")]
    pub province_state: String,
    #[serde(rename = "PostalCodeZip")]
    pub postal_code_zip: String,
    #[serde(rename = "OtherAddressInfo")]
    pub other_address_info: String,
    #[serde(rename = "EnhancedCapable")]
    pub enhanced_capable: String,
}

impl ExportRecord {
    pub fn blank(number: &PhoneNumber) -> Self {
        Self {
            phone_number: number.to_string(),
            last_name: String::new(),
            first_name: String::new(),
            street_number: String::new(),
            suite_apt: String::new(),
            street_name: String::new(),
            city: String::new(),
            province_state: String::new(),
            postal_code_zip: String::new(),
            other_address_info: String::new(),
            enhanced_capable: "N".to_string(),
        }
    }

    pub fn from_address(number: &PhoneNumber, address: &AddressRecord) -> Self {
        Self {
            phone_number: number.to_string(),
            last_name: address.last_name.clone(),
            first_name: address.first_name.clone(),
            street_number: address.street_number.clone(),
            suite_apt: address.suite_number.clone(),
            street_name: address.street_name.clone(),
            city: address.city.clone(),
            province_state: address.province_state.clone(),
            postal_code_zip: address.postal_zip.clone(),
            other_address_info: address.other_info.clone(),
            enhanced_capable: "N".to_string(),
        }
    }
}

/// DIDs provisioned under a single SIP trunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrunkDids {
    pub trunk_id: String,
    pub numbers: Vec<u64>,
}
