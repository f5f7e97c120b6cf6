//! Report generation: compares a revision's results with the previous revision
//! of the same branch once enough results have arrived.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{BenchmarkChange, ColorCode, Id, Report, SavedResult};
use crate::store::{ResultStore, StoreState};

/// Percentage change above which a difference counts as significant.
pub const CHANGE_THRESHOLD: f64 = 3.0;

fn compute_changes(
    state: &StoreState,
    saved: SavedResult,
    previous_revision_id: Id,
) -> Vec<BenchmarkChange> {
    let previous =
        state.results_for(previous_revision_id, saved.executable_id, saved.environment_id);

    let mut changes: Vec<BenchmarkChange> = state
        .results_for(saved.revision_id, saved.executable_id, saved.environment_id)
        .into_iter()
        .filter_map(|current| {
            let prev = previous
                .iter()
                .find(|p| p.benchmark_id == current.benchmark_id)?;
            if prev.value == 0.0 {
                return None;
            }
            let benchmark = state.benchmark(current.benchmark_id)?;

            let change = (current.value - prev.value) / prev.value * 100.0;
            let significant = change.abs() > CHANGE_THRESHOLD;
            let worse = if benchmark.lessisbetter {
                change > 0.0
            } else {
                change < 0.0
            };

            Some(BenchmarkChange {
                benchmark: benchmark.name.clone(),
                units: benchmark.units.clone(),
                value: current.value,
                previous: prev.value,
                change,
                significant,
                regression: significant && worse,
            })
        })
        .collect();

    changes.sort_by(|a, b| a.benchmark.cmp(&b.benchmark));
    changes
}

/// Verdict and one-line summary for a set of changes.
pub fn summarize(changes: &[BenchmarkChange]) -> (ColorCode, String) {
    let largest = |regression: bool| {
        changes
            .iter()
            .filter(|c| c.significant && c.regression == regression)
            .max_by(|a, b| a.change.abs().total_cmp(&b.change.abs()))
    };

    if let Some(c) = largest(true) {
        (
            ColorCode::Red,
            format!("{}: {:+.1}% (regression)", c.benchmark, c.change),
        )
    } else if let Some(c) = largest(false) {
        (
            ColorCode::Green,
            format!("{}: {:+.1}% (improvement)", c.benchmark, c.change),
        )
    } else {
        (ColorCode::Neutral, "No significant changes".to_string())
    }
}

/// Create or refresh the report for `saved` when the revision has at least as
/// many results as the previous one. Returns the report id when one was written.
pub fn create_report_if_enough_data_locked(
    state: &mut StoreState,
    saved: SavedResult,
) -> AppResult<Option<Uuid>> {
    let rev = state
        .revision(saved.revision_id)
        .ok_or_else(|| AppError::NotFound(format!("Revision {}", saved.revision_id)))?;
    let tracked = state.project(rev.project_id).is_some_and(|p| p.track);
    if !tracked {
        return Ok(None);
    }

    // Compare against whichever of the branch's two newest revisions is not this one.
    let newest = state.revisions_newest_first(rev.branch_id);
    if newest.len() < 2 {
        return Ok(None);
    }
    let Some(previous_id) = newest
        .iter()
        .take(2)
        .map(|r| r.id)
        .find(|id| *id != saved.revision_id)
    else {
        return Ok(None);
    };

    let current_count = state
        .results_for(saved.revision_id, saved.executable_id, saved.environment_id)
        .len();
    let previous_count = state
        .results_for(previous_id, saved.executable_id, saved.environment_id)
        .len();
    if current_count < previous_count {
        debug!(
            current_count,
            previous_count, "Not enough results for a report yet"
        );
        return Ok(None);
    }

    let changes = compute_changes(state, saved, previous_id);
    let (colorcode, summary) = summarize(&changes);
    let now = Utc::now();

    let id = match state.report_mut(saved.revision_id, saved.executable_id, saved.environment_id)
    {
        Some(report) => {
            report.changes = changes;
            report.summary = summary;
            report.colorcode = colorcode;
            report.updated_at = now;
            report.id
        }
        None => {
            let id = Uuid::now_v7();
            state.insert_report(Report {
                id,
                revision_id: saved.revision_id,
                executable_id: saved.executable_id,
                environment_id: saved.environment_id,
                changes,
                summary,
                colorcode,
                created_at: now,
                updated_at: now,
            });
            id
        }
    };

    info!(report_id = %id, colorcode = %colorcode, "Report written");
    Ok(Some(id))
}

/// Locking wrapper around [`create_report_if_enough_data_locked`].
pub fn create_report_if_enough_data(
    store: &ResultStore,
    saved: SavedResult,
) -> AppResult<Option<Uuid>> {
    let mut state = store.write()?;
    create_report_if_enough_data_locked(&mut state, saved)
}
