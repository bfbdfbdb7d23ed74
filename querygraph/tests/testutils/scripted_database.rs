//! Database collaborator answering from a script
//!
//! Responses are keyed by query text. A gated text blocks until the test
//! releases it, which lets tests observe the `Executing` state.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;

use querygraph::{Database, DatabaseError, ResultSet, Row};

#[derive(Default)]
pub struct ScriptedDatabase {
    responses: Mutex<HashMap<String, Result<ResultSet, String>>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond_rows(&self, text: &str, rows: Vec<Row>) {
        self.responses
            .lock()
            .insert(text.to_string(), Ok(ResultSet::new(rows)));
    }

    pub fn respond_error(&self, text: &str, message: &str) {
        self.responses
            .lock()
            .insert(text.to_string(), Err(message.to_string()));
    }

    /// Block executions of `text` until the returned sender fires.
    pub fn gate(&self, text: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(text.to_string(), rx);
        tx
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl Database for ScriptedDatabase {
    async fn execute_query(&self, text: &str) -> Result<Arc<ResultSet>, DatabaseError> {
        self.executed.lock().push(text.to_string());

        let gate = self.gates.lock().remove(text);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let response = self.responses.lock().get(text).cloned();
        match response {
            Some(Ok(rows)) => Ok(Arc::new(rows)),
            Some(Err(message)) => Err(DatabaseError::new(message)),
            None => Err(DatabaseError::new(format!("unexpected query: {}", text))),
        }
    }

    async fn default_select_query(&self, table: &str) -> Result<String, DatabaseError> {
        Ok(format!("SELECT * FROM {} LIMIT 1000", table))
    }
}
