use crate::model::{IndexStats, Mismatch, MismatchKind, ReconSummary};

/// Compute summary statistics from the mismatch list.
pub fn compute_summary(
    reference_records: usize,
    subject_records: usize,
    mismatches: &[Mismatch],
    index: IndexStats,
) -> ReconSummary {
    let mut missing_operator = 0;
    let mut missing_snapshot = 0;

    for m in mismatches {
        match m.kind {
            MismatchKind::MissingOperator => missing_operator += 1,
            MismatchKind::MissingSnapshot => missing_snapshot += 1,
        }
    }

    ReconSummary {
        reference_records,
        subject_records,
        matched: subject_records - mismatches.len(),
        missing_operator,
        missing_snapshot,
        total_mismatches: mismatches.len(),
        index,
    }
}
