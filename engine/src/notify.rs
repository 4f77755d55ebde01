//! Best-effort shell notification for completed locks.
//!
//! The user-supplied command runs on a detached task with no join guarantee;
//! the engine never waits on it. Failures are logged and otherwise ignored.

use directsend_types::TxHash;
use tracing::{debug, warn};

/// Substitute `%s` with the tx-hash and run the command in a detached
/// background task.
pub fn spawn_lock_notification(template: &str, tx_hash: &TxHash) {
    let command = template.replace("%s", &tx_hash.to_string());

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                match tokio::process::Command::new("sh")
                    .arg("-c")
                    .arg(&command)
                    .status()
                    .await
                {
                    Ok(status) if status.success() => {
                        debug!(%command, "lock notification command finished");
                    }
                    Ok(status) => {
                        warn!(%command, %status, "lock notification command failed");
                    }
                    Err(e) => {
                        warn!(%command, error = %e, "could not run lock notification command");
                    }
                }
            });
        }
        Err(_) => {
            debug!(%command, "no async runtime, lock notification skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_runtime_is_a_no_op() {
        // Outside a tokio runtime the call must neither panic nor block.
        spawn_lock_notification("echo %s", &TxHash::new([1; 32]));
    }

    #[tokio::test]
    async fn spawns_detached_inside_runtime() {
        // Returns immediately; the command runs (or fails) in the background.
        spawn_lock_notification("true # %s", &TxHash::new([2; 32]));
    }
}
