use crate::domain::model::{
    AddressRecord, DidClassification, LookupDiagnostic, LookupStage, PhoneNumber, RoutingInfo,
    TrunkDids,
};
use crate::domain::ports::{DidRegistry, EmergencyRecords, RateCenterLookup};
use std::sync::Arc;

/// Determines one number's disposition. Lookup order is fixed: the 911 DID
/// set is checked first, so a line provisioned in both registries is always
/// `Is911`.
pub struct NumberClassifier<E, O, R> {
    emergency: Arc<E>,
    ordinary: Arc<O>,
    rate_centers: Arc<R>,
}

impl<E, O, R> NumberClassifier<E, O, R>
where
    E: DidRegistry + EmergencyRecords,
    O: DidRegistry,
    R: RateCenterLookup,
{
    pub fn new(emergency: Arc<E>, ordinary: Arc<O>, rate_centers: Arc<R>) -> Self {
        Self {
            emergency,
            ordinary,
            rate_centers,
        }
    }

    /// Classifies a single number. Upstream failures never abort the call:
    /// each failed sub-lookup is downgraded to a miss and recorded as a
    /// diagnostic so operators can tell "confirmed absent" from "couldn't
    /// check".
    pub async fn classify(
        &self,
        number: &PhoneNumber,
    ) -> (DidClassification, Vec<LookupDiagnostic>) {
        let mut diagnostics = Vec::new();

        let in_emergency_set = match self.emergency.lookup_dids().await {
            Ok(trunks) => contains_number(&trunks, number),
            Err(failure) => {
                diagnostics.push(LookupDiagnostic {
                    number: number.clone(),
                    stage: LookupStage::EmergencyDids,
                    detail: failure.0,
                });
                false
            }
        };

        if in_emergency_set {
            let address = match self.emergency.lookup_emergency_record(number).await {
                Ok(Some(record)) => record,
                Ok(None) => {
                    // Provisioned as a 911 DID but the registry has no
                    // address on file. Still 911; exported fields stay blank.
                    diagnostics.push(LookupDiagnostic {
                        number: number.clone(),
                        stage: LookupStage::EmergencyRecord,
                        detail: "no address record on file for provisioned 911 DID".to_string(),
                    });
                    AddressRecord::default()
                }
                Err(failure) => {
                    diagnostics.push(LookupDiagnostic {
                        number: number.clone(),
                        stage: LookupStage::EmergencyRecord,
                        detail: failure.0,
                    });
                    AddressRecord::default()
                }
            };
            return (DidClassification::Is911(address), diagnostics);
        }

        let in_ordinary_set = match self.ordinary.lookup_dids().await {
            Ok(trunks) => contains_number(&trunks, number),
            Err(failure) => {
                diagnostics.push(LookupDiagnostic {
                    number: number.clone(),
                    stage: LookupStage::OrdinaryDids,
                    detail: failure.0,
                });
                false
            }
        };

        if !in_ordinary_set {
            return (DidClassification::Invalid, diagnostics);
        }

        match self
            .rate_centers
            .lookup_rate_center(number.npa(), number.nxx())
            .await
        {
            Ok(record) => (
                DidClassification::NonNine11(RoutingInfo::from_lookup(number, record)),
                diagnostics,
            ),
            Err(failure) => {
                // A confirmed ordinary DID without a resolvable rate center
                // cannot be grouped for porting.
                diagnostics.push(LookupDiagnostic {
                    number: number.clone(),
                    stage: LookupStage::RateCenter,
                    detail: failure.0,
                });
                (DidClassification::Invalid, diagnostics)
            }
        }
    }
}

fn contains_number(trunks: &[TrunkDids], number: &PhoneNumber) -> bool {
    let wanted = number.as_u64();
    trunks
        .iter()
        .any(|trunk| trunk.numbers.contains(&wanted))
}
