//! Integration tests for query execution lifecycles
//!
//! Drives the coordinator against a scripted database and checks status
//! transitions, the busy guard, default-select routing and failure handling.

#[path = "testutils/mod.rs"]
mod testutils;

use std::time::Duration;

use querygraph::query::ExecutionOutcome;
use querygraph::result::Value;
use querygraph::{
    record, ConfigError, EngineConfig, Error, ExecutionError, QueryCoordinator, QueryStatus,
};
use testutils::scripted_database::ScriptedDatabase;
use testutils::{init_logging, wait_for_status};

fn coordinator_with(db: &std::sync::Arc<ScriptedDatabase>) -> QueryCoordinator {
    init_logging();
    let coordinator = QueryCoordinator::default();
    coordinator.attach_database("main", db.clone());
    coordinator
}

#[tokio::test]
async fn test_execution_succeeds_and_refuses_overlap() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT 1", vec![record! { "x" => 1 }]);
    let release = db.gate("SELECT 1");
    let coordinator = coordinator_with(&db);
    let q1 = coordinator.new_query("main");

    let (first, second) = tokio::join!(coordinator.execute_if_needed(q1, "SELECT 1"), async {
        wait_for_status(&coordinator, q1, QueryStatus::Executing).await;
        let second = coordinator.execute_if_needed(q1, "SELECT 1").await.unwrap();

        let status = coordinator.registry().read().get(q1).unwrap().status();
        assert_eq!(status, QueryStatus::Executing);

        release.send(()).unwrap();
        second
    });

    assert_eq!(second.outcome, ExecutionOutcome::Refused);
    assert_eq!(first.unwrap().outcome, ExecutionOutcome::Succeeded { row_count: 1 });

    let registry = coordinator.registry().read();
    let query = registry.get(q1).unwrap();
    assert_eq!(query.status(), QueryStatus::Success);
    assert_eq!(query.result().unwrap().rows, vec![record! { "x" => 1 }]);
    assert_eq!(query.history().len(), 1);
    assert_eq!(db.executed(), vec!["SELECT 1".to_string()]);
}

#[tokio::test]
async fn test_failure_is_recorded_and_keeps_previous_result() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT 1", vec![record! { "x" => 1 }]);
    db.respond_error("SELEC 1", "syntax error at or near \"SELEC\"");
    let coordinator = coordinator_with(&db);
    let id = coordinator.new_query("main");

    coordinator.execute_if_needed(id, "SELECT 1").await.unwrap();
    let report = coordinator.execute_if_needed(id, "SELEC 1").await.unwrap();

    assert!(matches!(report.outcome, ExecutionOutcome::Failed(ExecutionError::Database(_))));
    let registry = coordinator.registry().read();
    let query = registry.get(id).unwrap();
    assert_eq!(query.status(), QueryStatus::Failed);
    assert_eq!(query.result().unwrap().rows, vec![record! { "x" => 1 }]);
    assert!(query.error().is_some());
}

#[tokio::test]
async fn test_failure_is_not_retried() {
    let db = ScriptedDatabase::new();
    db.respond_error("SELECT boom", "connection reset");
    let coordinator = coordinator_with(&db);
    let id = coordinator.new_query("main");

    coordinator.execute_if_needed(id, "SELECT boom").await.unwrap();
    assert_eq!(db.executed().len(), 1);
}

#[tokio::test]
async fn test_missing_connection_settles_as_failed() {
    let db = ScriptedDatabase::new();
    let coordinator = coordinator_with(&db);
    let id = coordinator.new_query("ghost");

    let report = coordinator.execute_if_needed(id, "SELECT 1").await.unwrap();

    assert_eq!(
        report.outcome,
        ExecutionOutcome::Failed(ExecutionError::ConnectionNotFound("ghost".to_string()))
    );
    let status = coordinator.registry().read().get(id).unwrap().status();
    assert_eq!(status, QueryStatus::Failed);
}

#[tokio::test]
async fn test_abandoned_execution_does_not_stay_executing() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT slow", vec![]);
    let _release = db.gate("SELECT slow");
    let coordinator = coordinator_with(&db);
    let id = coordinator.new_query("main");

    let timed_out = tokio::time::timeout(
        Duration::from_millis(20),
        coordinator.execute_if_needed(id, "SELECT slow"),
    )
    .await;
    assert!(timed_out.is_err());

    let registry = coordinator.registry().read();
    let query = registry.get(id).unwrap();
    assert_eq!(query.status(), QueryStatus::Failed);
    assert_eq!(query.error(), Some(&ExecutionError::Abandoned));
}

#[tokio::test]
async fn test_queries_execute_independently() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT a", vec![record! { "a" => 1 }]);
    db.respond_rows("SELECT b", vec![record! { "b" => 2 }, record! { "b" => 3 }]);
    let release_a = db.gate("SELECT a");
    let release_b = db.gate("SELECT b");
    let coordinator = coordinator_with(&db);
    let qa = coordinator.new_query("main");
    let qb = coordinator.new_query("main");

    let (a, b, _) = tokio::join!(
        coordinator.execute_if_needed(qa, "SELECT a"),
        coordinator.execute_if_needed(qb, "SELECT b"),
        async {
            wait_for_status(&coordinator, qa, QueryStatus::Executing).await;
            wait_for_status(&coordinator, qb, QueryStatus::Executing).await;
            release_b.send(()).unwrap();
            release_a.send(()).unwrap();
        }
    );

    assert_eq!(a.unwrap().outcome, ExecutionOutcome::Succeeded { row_count: 1 });
    assert_eq!(b.unwrap().outcome, ExecutionOutcome::Succeeded { row_count: 2 });
}

#[tokio::test]
async fn test_removed_query_discards_late_result() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT 1", vec![record! { "x" => 1 }]);
    let release = db.gate("SELECT 1");
    let coordinator = coordinator_with(&db);
    let id = coordinator.new_query("main");

    let (report, _) = tokio::join!(coordinator.execute_if_needed(id, "SELECT 1"), async {
        wait_for_status(&coordinator, id, QueryStatus::Executing).await;
        coordinator.remove_query(id).unwrap();
        release.send(()).unwrap();
    });

    assert_eq!(report.unwrap().outcome, ExecutionOutcome::Discarded);
    assert!(coordinator.registry().read().is_empty());
    assert_eq!(coordinator.current_query_id(), None);
}

#[tokio::test]
async fn test_default_select_reuses_blank_query_on_other_database() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT * FROM people LIMIT 1000", vec![record! { "name" => "Ada" }]);
    let coordinator = coordinator_with(&db);
    let blank = coordinator.new_query("archive");

    let report = coordinator
        .execute_default_select_if_needed("main", "people")
        .await
        .unwrap();

    assert_eq!(report.query_id, blank);
    let registry = coordinator.registry().read();
    assert_eq!(registry.len(), 1);
    let query = registry.get(blank).unwrap();
    assert_eq!(query.database, "main");
    assert_eq!(query.text(), "SELECT * FROM people LIMIT 1000");
    assert!(query.is_default_select());
    assert!(query.history()[0].default_select);
    assert_eq!(query.result().unwrap().rows[0].get("name"), Some(&Value::from("Ada")));
}

#[tokio::test]
async fn test_default_select_protects_user_text() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT * FROM people LIMIT 1000", vec![]);
    let coordinator = coordinator_with(&db);
    let mine = coordinator.new_query("archive");
    coordinator
        .update_if_needed(mine, "SELECT count(*) FROM invoices", None)
        .unwrap();

    let report = coordinator
        .execute_default_select_if_needed("main", "people")
        .await
        .unwrap();

    assert_ne!(report.query_id, mine);
    assert_eq!(coordinator.current_query_id(), Some(report.query_id));
    let registry = coordinator.registry().read();
    assert_eq!(registry.get(mine).unwrap().text(), "SELECT count(*) FROM invoices");
    assert_eq!(registry.get(report.query_id).unwrap().database, "main");
}

#[tokio::test]
async fn test_default_select_without_queries_opens_one() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT * FROM people LIMIT 1000", vec![]);
    let coordinator = coordinator_with(&db);

    let report = coordinator
        .execute_default_select_if_needed("main", "people")
        .await
        .unwrap();

    assert_eq!(coordinator.current_query_id(), Some(report.query_id));
    assert_eq!(report.outcome, ExecutionOutcome::Succeeded { row_count: 0 });
}

#[tokio::test]
async fn test_default_select_refused_while_current_executing() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT 1", vec![]);
    let release = db.gate("SELECT 1");
    let coordinator = coordinator_with(&db);
    let id = coordinator.new_query("main");

    let (_, report) = tokio::join!(coordinator.execute_if_needed(id, "SELECT 1"), async {
        wait_for_status(&coordinator, id, QueryStatus::Executing).await;
        let report = coordinator
            .execute_default_select_if_needed("main", "people")
            .await
            .unwrap();
        release.send(()).unwrap();
        report
    });

    assert_eq!(report.outcome, ExecutionOutcome::Refused);
    assert_eq!(coordinator.registry().read().len(), 1);
    assert_eq!(db.executed(), vec!["SELECT 1".to_string()]);
}

#[tokio::test]
async fn test_edits_blocked_while_executing() {
    let db = ScriptedDatabase::new();
    db.respond_rows("SELECT 1", vec![]);
    let release = db.gate("SELECT 1");
    let coordinator = coordinator_with(&db);
    let id = coordinator.new_query("main");
    assert!(coordinator.update_if_needed(id, "SELECT 1", None).unwrap());
    assert!(!coordinator.update_if_needed(id, "SELECT 1", None).unwrap());

    let (_, (edited, appended)) = tokio::join!(coordinator.execute_current_if_needed("SELECT 1"), async {
        wait_for_status(&coordinator, id, QueryStatus::Executing).await;
        let edited = coordinator.update_if_needed(id, "SELECT 2", None).unwrap();
        let appended = coordinator.append_to_current("SELECT 3").unwrap();
        release.send(()).unwrap();
        (edited, appended)
    });

    assert!(!edited);
    assert!(!appended);
    assert!(coordinator.append_to_current("SELECT 3").unwrap());
    let text = coordinator.registry().read().get(id).unwrap().text().to_string();
    assert_eq!(text, "SELECT 1\nSELECT 3");
}

#[tokio::test]
async fn test_graph_follows_latest_result() {
    let db = ScriptedDatabase::new();
    db.respond_rows(
        "SELECT friends",
        vec![
            record! { "node1" => "A", "type1" => "Person", "node2" => "B", "type2" => "Person", "since" => 2020 },
        ],
    );
    let coordinator = coordinator_with(&db);
    let id = coordinator.new_query("main");

    let placeholder = coordinator.graph_for(id).unwrap();
    assert_eq!(placeholder, querygraph::GraphPayload::placeholder());

    coordinator.execute_if_needed(id, "SELECT friends").await.unwrap();
    let graph = coordinator.graph_for(id).unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].attributes, record! { "since" => 2020 });
}

#[test]
fn test_coordinator_rejects_invalid_config() {
    let mut config = EngineConfig::default();
    config.markers.second = config.markers.first.clone();

    let result = QueryCoordinator::new(config);
    assert!(matches!(result, Err(Error::Config(ConfigError::Invalid(_)))));

    assert!(QueryCoordinator::new(EngineConfig::default()).is_ok());
}
