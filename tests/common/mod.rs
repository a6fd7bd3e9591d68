use std::sync::Arc;
use tempfile::TempDir;

use parley::gateway::ScriptedGateway;
use parley::history::SledHistory;

#[allow(dead_code)]
pub fn create_temp_history() -> (Arc<SledHistory>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("history");
    let store =
        SledHistory::new_with_path(db_path).expect("failed to open sled history with path");
    (Arc::new(store), tmp)
}

#[allow(dead_code)]
pub fn scripted(replies: &[&str]) -> Arc<ScriptedGateway> {
    let gateway = ScriptedGateway::new();
    for reply in replies {
        gateway.push_reply(*reply);
    }
    Arc::new(gateway)
}
