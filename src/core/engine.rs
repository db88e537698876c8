use crate::core::classifier::NumberClassifier;
use crate::core::export::{ExportRenderer, RejectedNumber};
use crate::core::grouping::group_by_rate_center;
use crate::core::reconcile::reconcile;
use crate::core::submission::PortCoordinator;
use crate::domain::model::{
    AddressRecord, ClassifiedNumber, DidClassification, LookupDiagnostic, PhoneNumber,
    PortBatchOutcome, ReconciledState, RoutingInfo,
};
use crate::domain::ports::{
    CredentialMinter, DidRegistry, EmergencyRecords, PortSubmitter, RateCenterLookup, Storage,
};
use crate::utils::error::{PortingError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Everything a batch run produced, for console reporting and exit-code
/// selection. Artifact files are already on disk by the time this exists.
#[derive(Debug)]
pub struct BatchReport {
    pub batch: String,
    pub classified: Vec<ClassifiedNumber>,
    pub rejected: Vec<RejectedNumber>,
    pub diagnostics: Vec<LookupDiagnostic>,
    pub reconciled: ReconciledState,
    pub outcomes: Vec<PortBatchOutcome>,
    pub artifacts: Vec<String>,
}

impl BatchReport {
    pub fn manual_review_required(&self) -> bool {
        self.reconciled.requires_manual_review()
    }

    pub fn submission_failed(&self) -> bool {
        self.outcomes.iter().any(|outcome| !outcome.accepted)
    }

    pub fn emergency_count(&self) -> usize {
        self.count(|c| matches!(c, DidClassification::Is911(_)))
    }

    pub fn ordinary_count(&self) -> usize {
        self.count(|c| matches!(c, DidClassification::NonNine11(_)))
    }

    pub fn not_found_count(&self) -> usize {
        self.count(|c| matches!(c, DidClassification::Invalid))
    }

    fn count(&self, predicate: impl Fn(&DidClassification) -> bool) -> usize {
        self.classified
            .iter()
            .filter(|entry| predicate(&entry.classification))
            .count()
    }

    /// 0 = clean run, 1 = at least one submission hard-failed,
    /// 2 = batch needs manual review before any port can be submitted.
    pub fn exit_code(&self) -> i32 {
        if self.manual_review_required() {
            2
        } else if self.submission_failed() {
            1
        } else {
            0
        }
    }
}

/// Drives a batch end to end: classify, reconcile, group, submit, export.
pub struct PortingEngine<E, O, R, P, M, S> {
    classifier: Arc<NumberClassifier<E, O, R>>,
    coordinator: PortCoordinator<P, M>,
    storage: S,
    batch: String,
    concurrent_requests: usize,
}

impl<E, O, R, P, M, S> PortingEngine<E, O, R, P, M, S>
where
    E: DidRegistry + EmergencyRecords + Send + Sync + 'static,
    O: DidRegistry + Send + Sync + 'static,
    R: RateCenterLookup + Send + Sync + 'static,
    P: PortSubmitter,
    M: CredentialMinter,
    S: Storage,
{
    pub fn new(
        classifier: NumberClassifier<E, O, R>,
        coordinator: PortCoordinator<P, M>,
        storage: S,
        batch: String,
        concurrent_requests: usize,
    ) -> Self {
        Self {
            classifier: Arc::new(classifier),
            coordinator,
            storage,
            batch,
            concurrent_requests,
        }
    }

    pub async fn run(&self, raw_numbers: &[String]) -> Result<BatchReport> {
        let (parsed, rejected) = partition_input(raw_numbers);
        for rejection in &rejected {
            println!(
                "Invalid number provided: {}. Please provide a valid 10-digit number.",
                rejection.input
            );
        }

        println!("Classifying {} numbers...", parsed.len());
        let (classified, diagnostics) = self.classify_all(parsed).await?;
        for entry in &classified {
            match &entry.classification {
                DidClassification::Is911(_) => {
                    println!("The number {} exists as a 911 DID.", entry.number);
                }
                DidClassification::NonNine11(info) => {
                    println!(
                        "Number {} belongs to rate center: {}",
                        entry.number, info.rate_center
                    );
                }
                DidClassification::Invalid => {
                    println!("The number {} is NOT valid.", entry.number);
                }
            }
        }
        for diagnostic in &diagnostics {
            tracing::warn!(
                "Lookup for {} could not be completed ({}): {}",
                diagnostic.number,
                diagnostic.stage,
                diagnostic.detail
            );
        }

        let emergency = emergency_set(&classified);
        let ordinary = ordinary_set(&classified);
        let not_found: Vec<PhoneNumber> = classified
            .iter()
            .filter(|entry| entry.classification == DidClassification::Invalid)
            .map(|entry| entry.number.clone())
            .collect();

        let reconciled = reconcile(&emergency);

        let outcomes = if reconciled.requires_manual_review() {
            println!(
                "Multiple 911 registrations found ({}); automated port submission halted for manual review.",
                emergency.len()
            );
            tracing::error!(
                "Batch {} requires manual review: {} conflicting 911 registrations",
                self.batch,
                emergency.len()
            );
            Vec::new()
        } else {
            let groups = group_by_rate_center(&ordinary);
            if groups.is_empty() {
                Vec::new()
            } else {
                println!(
                    "Submitting {} numbers across {} rate-center group(s)...",
                    groups.total_numbers(),
                    groups.len()
                );
                let outcomes = self.coordinator.submit(&groups).await;
                for outcome in &outcomes {
                    if outcome.accepted {
                        println!(
                            "Successfully submitted LNP request for number: {}",
                            outcome.number
                        );
                    } else {
                        println!(
                            "Failed to submit LNP request for number: {} ({})",
                            outcome.number,
                            outcome.errors.join("; ")
                        );
                    }
                }
                outcomes
            }
        };

        let artifacts = self
            .write_artifacts(&classified, &rejected, &not_found, &emergency, &ordinary, &reconciled)
            .await?;

        Ok(BatchReport {
            batch: self.batch.clone(),
            classified,
            rejected,
            diagnostics,
            reconciled,
            outcomes,
            artifacts,
        })
    }

    /// Classification fans out over a bounded worker set; results are merged
    /// back in input order so downstream grouping sees a stable sequence.
    async fn classify_all(
        &self,
        parsed: Vec<(usize, PhoneNumber)>,
    ) -> Result<(Vec<ClassifiedNumber>, Vec<LookupDiagnostic>)> {
        let semaphore = Arc::new(Semaphore::new(self.concurrent_requests.max(1)));
        let mut join_set = JoinSet::new();

        for (index, number) in parsed {
            let classifier = Arc::clone(&self.classifier);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("classification semaphore closed");
                let (classification, diagnostics) = classifier.classify(&number).await;
                (index, number, classification, diagnostics)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let result = joined.map_err(|e| PortingError::ProcessingError {
                message: format!("classification task failed: {}", e),
            })?;
            results.push(result);
        }
        results.sort_by_key(|(index, ..)| *index);

        let mut classified = Vec::with_capacity(results.len());
        let mut diagnostics = Vec::new();
        for (_, number, classification, mut task_diagnostics) in results {
            classified.push(ClassifiedNumber {
                number,
                classification,
            });
            diagnostics.append(&mut task_diagnostics);
        }
        Ok((classified, diagnostics))
    }

    async fn write_artifacts(
        &self,
        classified: &[ClassifiedNumber],
        rejected: &[RejectedNumber],
        not_found: &[PhoneNumber],
        emergency: &[(PhoneNumber, AddressRecord)],
        ordinary: &[(PhoneNumber, RoutingInfo)],
        reconciled: &ReconciledState,
    ) -> Result<Vec<String>> {
        let mut artifacts = Vec::new();

        let csv = ExportRenderer::render_csv(classified, reconciled)?;
        let csv_name = format!("{}-N911.csv", self.batch);
        self.storage.write_file(&csv_name, csv.as_bytes()).await?;
        artifacts.push(csv_name);

        if !emergency.is_empty() {
            let lines = ExportRenderer::render_emergency_lines(emergency)?;
            let name = format!("{}-Thinktel911.txt", self.batch);
            self.storage.write_file(&name, lines.as_bytes()).await?;
            artifacts.push(name);
        }

        let invalid_lines = ExportRenderer::render_invalid_lines(rejected, not_found);
        let invalid_name = format!("{}-InvalidNumbers.txt", self.batch);
        self.storage
            .write_file(&invalid_name, invalid_lines.as_bytes())
            .await?;
        artifacts.push(invalid_name);

        let routing_lines = ExportRenderer::render_routing_lines(ordinary)?;
        let routing_name = format!("{}-NpaNxxInfo.txt", self.batch);
        self.storage
            .write_file(&routing_name, routing_lines.as_bytes())
            .await?;
        artifacts.push(routing_name);

        for artifact in &artifacts {
            tracing::info!("Wrote {}", artifact);
        }
        Ok(artifacts)
    }
}

fn partition_input(raw_numbers: &[String]) -> (Vec<(usize, PhoneNumber)>, Vec<RejectedNumber>) {
    let mut parsed = Vec::new();
    let mut rejected = Vec::new();
    for raw in raw_numbers {
        match PhoneNumber::parse(raw) {
            Ok(number) => parsed.push((parsed.len(), number)),
            Err(_) => rejected.push(RejectedNumber {
                input: raw.trim().to_string(),
                reason: "malformed input".to_string(),
            }),
        }
    }
    (parsed, rejected)
}

fn emergency_set(classified: &[ClassifiedNumber]) -> Vec<(PhoneNumber, AddressRecord)> {
    classified
        .iter()
        .filter_map(|entry| match &entry.classification {
            DidClassification::Is911(address) => Some((entry.number.clone(), address.clone())),
            _ => None,
        })
        .collect()
}

fn ordinary_set(classified: &[ClassifiedNumber]) -> Vec<(PhoneNumber, RoutingInfo)> {
    classified
        .iter()
        .filter_map(|entry| match &entry.classification {
            DidClassification::NonNine11(info) => Some((entry.number.clone(), info.clone())),
            _ => None,
        })
        .collect()
}
