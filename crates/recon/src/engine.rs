use crate::config::{KeyTransform, ReconConfig};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::index::GroupIndex;
use crate::model::{Mismatch, MismatchKind, ReconInput, ReconMeta, ReconReport, Record};

/// Run reconciliation per config. Returns the mismatch list + summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconReport, ReconError> {
    config.validate()?;

    let transform = config.matching.key_transform;
    let index = match transform {
        KeyTransform::None => GroupIndex::build(&input.reference),
        _ => GroupIndex::build(&normalize(&input.reference, transform)),
    };

    log::debug!(
        "{}: probing {} record(s) against {} ({} record(s))",
        config.subject_name(),
        input.subject.len(),
        config.reference_name(),
        input.reference.len(),
    );
    let mismatches = reconcile_with(&input.subject, &index, transform);

    let summary = compute_summary(
        input.reference.len(),
        input.subject.len(),
        &mismatches,
        index.stats(),
    );

    Ok(ReconReport {
        meta: ReconMeta {
            config_name: config.name.clone(),
            reference: config.reference_name().to_string(),
            subject: config.subject_name().to_string(),
            key_transform: transform.as_str().to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        mismatches,
    })
}

/// Subject records with no exact (avs, operator, snapshot) match in `index`,
/// in subject order.
pub fn reconcile(subject: &[Record], index: &GroupIndex) -> Vec<Mismatch> {
    reconcile_with(subject, index, KeyTransform::None)
}

/// Like [`reconcile`], probing with `transform` applied to each field.
///
/// `index` must have been built from records normalized with the same
/// transform. Mismatches carry the subject's original values.
pub fn reconcile_with(
    subject: &[Record],
    index: &GroupIndex,
    transform: KeyTransform,
) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for (position, record) in subject.iter().enumerate() {
        let avs = transform.apply(&record.avs);
        let operator = transform.apply(&record.operator);

        let kind = match index.snapshots(&avs, &operator) {
            None => MismatchKind::MissingOperator,
            Some(snapshots) if !snapshots.contains(&*transform.apply(&record.snapshot)) => {
                MismatchKind::MissingSnapshot
            }
            Some(_) => continue,
        };

        log::trace!("{kind} at {position}: {} / {} / {}", record.avs, record.operator, record.snapshot);
        mismatches.push(Mismatch {
            kind,
            position,
            operator: record.operator.clone(),
            avs: record.avs.clone(),
            snapshot: record.snapshot.clone(),
        });
    }

    mismatches
}

fn normalize(records: &[Record], transform: KeyTransform) -> Vec<Record> {
    records
        .iter()
        .map(|r| Record {
            operator: transform.apply(&r.operator).into_owned(),
            avs: transform.apply(&r.avs).into_owned(),
            snapshot: transform.apply(&r.snapshot).into_owned(),
        })
        .collect()
}
