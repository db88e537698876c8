use crate::config::PortOrderMetadata;
use crate::domain::model::{PortBatchOutcome, RateCenterGroup, RateCenterGroups};
use crate::domain::ports::{CredentialMinter, PortSubmitter};

/// Issues one grouped LNP submission per rate-center cohort, sequentially.
///
/// Credentials are ~30 s tokens, so a fresh one is minted per submission
/// call rather than per batch run. There is no retry: a failed group is
/// reported failed for every number it carried and the operator decides
/// what to do next.
pub struct PortCoordinator<P, M> {
    submitter: P,
    minter: M,
    metadata: PortOrderMetadata,
}

impl<P, M> PortCoordinator<P, M>
where
    P: PortSubmitter,
    M: CredentialMinter,
{
    pub fn new(submitter: P, minter: M, metadata: PortOrderMetadata) -> Self {
        Self {
            submitter,
            minter,
            metadata,
        }
    }

    pub async fn submit(&self, groups: &RateCenterGroups) -> Vec<PortBatchOutcome> {
        let mut outcomes = Vec::with_capacity(groups.total_numbers());
        for group in groups.iter() {
            tracing::info!(
                "Submitting port request for rate center {} ({} numbers)",
                group.rate_center,
                group.numbers.len()
            );
            outcomes.extend(self.submit_group(group).await);
        }
        outcomes
    }

    async fn submit_group(&self, group: &RateCenterGroup) -> Vec<PortBatchOutcome> {
        let credential = match self.minter.mint() {
            Ok(token) => token,
            Err(err) => {
                // Clean authentication failure; no submission is attempted.
                tracing::error!(
                    "Could not mint credential for rate center {}: {}",
                    group.rate_center,
                    err
                );
                return whole_group_failed(group, vec![format!("authentication failure: {}", err)]);
            }
        };

        match self
            .submitter
            .submit_port_request(&group.numbers, &self.metadata, &credential)
            .await
        {
            Ok(receipt) if receipt.success => group
                .numbers
                .iter()
                .map(|number| PortBatchOutcome {
                    number: number.clone(),
                    rate_center: group.rate_center.clone(),
                    accepted: true,
                    errors: Vec::new(),
                })
                .collect(),
            Ok(receipt) => {
                // Batch-level rejection. The carrier's error list applies to
                // the group as a whole; partial success is never inferred.
                tracing::warn!(
                    "Port request for rate center {} rejected: {:?}",
                    group.rate_center,
                    receipt.errors
                );
                whole_group_failed(group, receipt.errors)
            }
            Err(err) => {
                tracing::error!(
                    "Port request for rate center {} failed: {}",
                    group.rate_center,
                    err
                );
                whole_group_failed(group, vec![err.to_string()])
            }
        }
    }
}

fn whole_group_failed(group: &RateCenterGroup, errors: Vec<String>) -> Vec<PortBatchOutcome> {
    group
        .numbers
        .iter()
        .map(|number| PortBatchOutcome {
            number: number.clone(),
            rate_center: group.rate_center.clone(),
            accepted: false,
            errors: errors.clone(),
        })
        .collect()
}
