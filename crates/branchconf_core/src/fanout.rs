//! Concurrent per-target execution.
//!
//! Every operation is started together and awaited to completion. A failure
//! does not cancel siblings and nothing is rolled back, so a failed call can
//! leave some targets written (or removed) and others not.

use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;
use tracing::{error, warn};

use crate::error::CoreResult;

/// Run `op` for every item concurrently.
///
/// Returns the first error in submission order once every operation has
/// finished. All failures are logged.
pub async fn run_all<'a, T, F, Fut>(items: &'a [T], op: F) -> CoreResult<()>
where
    T: Display,
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = CoreResult<()>>,
{
    let results = join_all(items.iter().map(&op)).await;

    let mut first_error = None;
    let mut failed = 0usize;
    for (item, result) in items.iter().zip(results) {
        if let Err(e) = result {
            error!("Target {} failed: {}", item, e);
            failed += 1;
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }

    match first_error {
        Some(e) => {
            warn!(
                "{} of {} targets failed; completed targets were kept",
                failed,
                items.len()
            );
            Err(e)
        }
        None => Ok(()),
    }
}
