//! Batch driver that refreshes the stored `matrix` of every employee.
//!
//! The driver folds an owned accumulator over the roster and hands a batch to
//! the [`MatrixStore`] every `batch_size` changed records. Employees whose
//! stored matrix already matches the recomputed one are not rewritten, so a
//! second run over persisted output flushes nothing.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::compliance::evaluate_position_compliance;
use super::domain::{ComplianceResult, PositionSnapshot};
use crate::workflows::normalizer::normalize_position_name;
use crate::workflows::roster::EmployeeSnapshot;

/// New matrix value for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixUpdate {
    pub employee_id: String,
    pub matrix: ComplianceResult,
}

/// Persistence hook for recomputed matrices (document store, file, memory).
pub trait MatrixStore: Send + Sync {
    fn persist_batch(&self, batch: &[MatrixUpdate]) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("matrix store unavailable: {0}")]
    Unavailable(String),
    #[error("matrix store rejected batch of {size} update(s): {reason}")]
    Rejected { size: usize, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecomputeSummary {
    pub processed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub batches: usize,
}

#[derive(Default)]
struct RecomputeAccumulator {
    pending: Vec<MatrixUpdate>,
    summary: RecomputeSummary,
}

impl RecomputeAccumulator {
    fn flush<S: MatrixStore + ?Sized>(&mut self, store: &S) -> Result<(), StoreError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        store.persist_batch(&self.pending)?;
        debug!(size = self.pending.len(), "flushed matrix batch");
        self.summary.batches += 1;
        self.pending.clear();
        Ok(())
    }
}

pub fn recompute_matrices<'a, I, S>(
    employees: I,
    positions: &[PositionSnapshot],
    batch_size: usize,
    store: &S,
) -> Result<RecomputeSummary, StoreError>
where
    I: IntoIterator<Item = &'a EmployeeSnapshot>,
    S: MatrixStore + ?Sized,
{
    let batch_size = batch_size.max(1);
    let lookup: HashMap<String, &PositionSnapshot> = positions
        .iter()
        .map(|position| (normalize_position_name(&position.name), position))
        .collect();

    let mut accumulator = employees.into_iter().try_fold(
        RecomputeAccumulator::default(),
        |mut acc: RecomputeAccumulator,
         employee: &EmployeeSnapshot|
         -> Result<RecomputeAccumulator, StoreError> {
            acc.summary.processed += 1;

            let Some(position) = lookup.get(&normalize_position_name(&employee.position)) else {
                debug!(
                    employee_id = %employee.id,
                    position = %employee.position,
                    "no position definition; skipping"
                );
                acc.summary.skipped += 1;
                return Ok(acc);
            };

            let matrix = evaluate_position_compliance(&employee.history, position);
            if employee.matrix.as_ref() == Some(&matrix) {
                acc.summary.unchanged += 1;
                return Ok(acc);
            }

            acc.pending.push(MatrixUpdate {
                employee_id: employee.id.clone(),
                matrix,
            });
            acc.summary.updated += 1;

            if acc.pending.len() >= batch_size {
                acc.flush(store)?;
            }

            Ok(acc)
        },
    )?;

    accumulator.flush(store)?;

    let summary = accumulator.summary;
    info!(
        processed = summary.processed,
        updated = summary.updated,
        unchanged = summary.unchanged,
        skipped = summary.skipped,
        batches = summary.batches,
        "matrix recompute finished"
    );
    Ok(summary)
}

/// Writes flushed matrices back onto the snapshots they were computed from.
pub fn apply_updates(employees: &mut [EmployeeSnapshot], updates: &[MatrixUpdate]) {
    let by_id: HashMap<&str, &ComplianceResult> = updates
        .iter()
        .map(|update| (update.employee_id.as_str(), &update.matrix))
        .collect();

    for employee in employees.iter_mut() {
        if let Some(matrix) = by_id.get(employee.id.as_str()) {
            employee.matrix = Some((*matrix).clone());
        }
    }
}

/// Keeps every flushed batch in memory; backs the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemoryMatrixStore {
    batches: Mutex<Vec<Vec<MatrixUpdate>>>,
}

impl InMemoryMatrixStore {
    pub fn batches(&self) -> Vec<Vec<MatrixUpdate>> {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn updates(&self) -> Vec<MatrixUpdate> {
        self.batches().into_iter().flatten().collect()
    }
}

impl MatrixStore for InMemoryMatrixStore {
    fn persist_batch(&self, batch: &[MatrixUpdate]) -> Result<(), StoreError> {
        let mut guard = self
            .batches
            .lock()
            .map_err(|_| StoreError::Unavailable("matrix store lock poisoned".to_string()))?;
        guard.push(batch.to_vec());
        Ok(())
    }
}
