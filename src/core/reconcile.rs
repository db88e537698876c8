use crate::domain::model::{AddressRecord, PhoneNumber, ReconciledState};

/// Resolves the batch's 911 registrations to a single actionable state.
///
/// One registration is authoritative. Two or more indicate a multi-location
/// or ambiguous account: automated address selection cannot pick safely, so
/// the whole batch is escalated for human adjudication. First-wins and
/// blank-out are deliberately not options here.
pub fn reconcile(registrations: &[(PhoneNumber, AddressRecord)]) -> ReconciledState {
    match registrations {
        [] => ReconciledState::NoConflict,
        [(_, address)] => ReconciledState::SingleAuthoritative(address.clone()),
        _ => ReconciledState::RequiresManualReview(registrations.to_vec()),
    }
}
