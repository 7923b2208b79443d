// ABOUTME: The strategy chain executor: ordered attempts, first non-Miss result wins.
// ABOUTME: Transport failures advance the chain like any miss but are surfaced to telemetry.

//! Strategy chain execution.
//!
//! Strategies are mutually exclusive alternatives, not merged: the first
//! one producing a usable result wins and later strategies are never
//! invoked. Mixing fields extracted by different strategies in one call
//! would risk referencing inconsistent document state, so the executor
//! returns exactly one strategy's output or nothing.

use std::future::Future;

use crate::error::Miss;

/// Execute strategy attempts strictly in declared order, returning the
/// first non-Miss result.
///
/// `attempt(index)` builds the future for the index-th strategy; attempts
/// are created lazily so strategies after the first hit are never run.
/// Returns `None` when every strategy missed — the caller maps that onto
/// the EmptyResult appropriate to the call site (empty sequence, fallback
/// set, or NotFound for seedless detail lookups).
pub async fn resolve_first<T, F, Fut>(
    op: &str,
    source: &str,
    names: &[&str],
    mut attempt: F,
) -> Option<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, Miss>>,
{
    for (index, &name) in names.iter().enumerate() {
        match attempt(index).await {
            Ok(value) => {
                tracing::debug!(op, source, strategy = name, "strategy hit");
                return Some(value);
            }
            Err(Miss::Transport(err)) => {
                tracing::warn!(op, source, strategy = name, error = %err, "strategy transport failure");
            }
            Err(miss) => {
                tracing::debug!(op, source, strategy = name, outcome = %miss, "strategy miss");
            }
        }
    }
    tracing::debug!(op, source, "all strategies missed");
    None
}
