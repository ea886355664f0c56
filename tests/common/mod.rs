#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

pub use opine_test_utils::init_tracing;

/// Poll `fut` briefly and report whether it finished.
///
/// Used for actions that are expected to never complete.
pub async fn completes_within<F: Future>(fut: F, millis: u64) -> bool {
    tokio::time::timeout(Duration::from_millis(millis), fut)
        .await
        .is_ok()
}
