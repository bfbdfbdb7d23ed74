//! Shared fixtures for QueryGraph integration tests

#![allow(dead_code)]

pub mod scripted_database;

use querygraph::{QueryCoordinator, QueryId, QueryStatus};

/// Yield until query `id` reaches `status`.
pub async fn wait_for_status(coordinator: &QueryCoordinator, id: QueryId, status: QueryStatus) {
    for _ in 0..1000 {
        let reached = coordinator
            .registry()
            .read()
            .get(id)
            .map(|q| q.status() == status)
            .unwrap_or(false);
        if reached {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("query {} never reached {}", id, status);
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
