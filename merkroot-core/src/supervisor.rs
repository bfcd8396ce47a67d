//! Deadline-bounded execution of a reduction.
//!
//! The work runs on its own OS thread and reports once over a oneshot channel.
//! On timeout the caller stops listening; the thread is left to finish and its
//! send fails silently.

use crate::error::{MerkleError, Result};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Run `work` on a detached worker and wait at most `deadline` for its result.
pub async fn run_with_deadline<F, T>(label: &'static str, deadline: Duration, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    thread::Builder::new().name(format!("merkroot-{}", label.to_ascii_lowercase())).spawn(
        move || {
            // receiver may be gone after a timeout
            let _ = tx.send(work());
        },
    )?;

    match tokio::time::timeout(deadline, rx).await {
        Ok(Ok(res)) => {
            debug!(process = label, "worker finished");
            res
        }
        // sender dropped without sending: the worker panicked
        Ok(Err(_)) => Err(MerkleError::WorkerLost),
        Err(_) => {
            warn!(process = label, ?deadline, "worker abandoned after deadline");
            Err(MerkleError::TimedOut { deadline })
        }
    }
}
