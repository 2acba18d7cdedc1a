//! Timing helpers for diagnostics.

use std::future::Future;
use std::time::Instant;

use tracing::debug;

/// Awaits `future` and logs how long it took.
pub async fn timed<F>(label: &'static str, future: F) -> F::Output
where
    F: Future,
{
    let start = Instant::now();
    let output = future.await;
    debug!("{} took {:?}", label, start.elapsed());
    output
}
