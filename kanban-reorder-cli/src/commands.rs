//! Subcommand implementations.
//!
//! Output goes to the supplied writer so the commands can be exercised
//! without a terminal.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use kanban_reorder::{
    CollectionStore, DragEvent, DropResult, InMemoryRemote, ReorderConfig, ReorderEngine,
    SyncDispatcher,
};
use tracing::{debug, info};

use crate::cli::{ApplyArgs, OutputFormat, ReconcileArgs};

/// Read a drop result file (json, or yaml for anything else) as a drag event
pub async fn load_drop(path: &Path, config: &ReorderConfig) -> Result<DragEvent> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read drop file {}", path.display()))?;
    let drop: DropResult = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml_ng::from_str(&content)?
    };
    debug!(?drop, "parsed drop result");
    Ok(drop.into_event(&config.pool_droppable_id)?)
}

async fn load_board(path: &Path) -> Result<CollectionStore> {
    CollectionStore::load(path)
        .await
        .with_context(|| format!("failed to load board {}", path.display()))
}

/// Print the intents for a drop without applying them
pub async fn run_reconcile(
    args: &ReconcileArgs,
    config: &ReorderConfig,
    out: &mut impl Write,
) -> Result<()> {
    let store = load_board(&args.board).await?;
    let event = load_drop(&args.drop, config).await?;

    let engine = ReorderEngine::with_policy(config.policy());
    let intents = engine.reconcile(&event, &store.snapshot_for(&event))?;
    info!(count = intents.len(), "reconciled drop");

    match args.format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&intents)?)?,
        OutputFormat::Yaml => write!(out, "{}", serde_yaml_ng::to_string(&intents)?)?,
    }
    Ok(())
}

/// Apply a drop through the dispatcher and write the updated board
pub async fn run_apply(args: &ApplyArgs, config: &ReorderConfig, out: &mut impl Write) -> Result<()> {
    let store = load_board(&args.board).await?;
    let event = load_drop(&args.drop, config).await?;

    let remote = InMemoryRemote::from_store(&store);
    let dispatcher = SyncDispatcher::with_config(store, remote, config);
    let report = dispatcher.handle_drop(&event).await?;
    info!(
        applied = report.applied,
        retries = report.retries,
        "drop applied"
    );

    let store = dispatcher.store();
    let store = store.read().await;
    match &args.out {
        Some(path) => store
            .save(path)
            .await
            .with_context(|| format!("failed to write board {}", path.display()))?,
        None => write!(out, "{}", serde_yaml_ng::to_string(&store.to_document())?)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_reorder::ReorderError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const BOARD: &str = r#"
board:
  id: b1
  title: Sprint
pool:
  - id: P1
    name: Kim
columns:
  - id: A
    title: To Do
    tasks:
      - id: T1
        title: one
        users:
          - id: U1
            name: Sam
          - id: U2
            name: Alex
          - id: U3
            name: Lee
      - id: T2
        title: two
  - id: B
    title: Done
    tasks:
      - id: T3
        title: three
"#;

    fn write_fixture(dir: &TempDir, drop: &str) -> (PathBuf, PathBuf) {
        let board = dir.path().join("board.yaml");
        let drop_path = dir.path().join("drop.json");
        fs::write(&board, BOARD).unwrap();
        fs::write(&drop_path, drop).unwrap();
        (board, drop_path)
    }

    #[tokio::test]
    async fn test_reconcile_prints_intents() {
        let dir = TempDir::new().unwrap();
        let (board, drop) = write_fixture(
            &dir,
            r#"{"draggableId":"T1","type":"task","source":{"droppableId":"A","index":0},"destination":{"droppableId":"B","index":1}}"#,
        );
        let args = ReconcileArgs {
            board,
            drop,
            format: OutputFormat::Json,
        };

        let mut out = Vec::new();
        run_reconcile(&args, &ReorderConfig::default(), &mut out)
            .await
            .unwrap();

        let intents: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let intents = intents.as_array().unwrap();
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0]["column"], "A");
        assert_eq!(intents[1]["column"], "B");
    }

    #[tokio::test]
    async fn test_reconcile_full_task_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (board, drop) = write_fixture(
            &dir,
            r#"{"draggableId":"P1","type":"user","source":{"droppableId":"user-list","index":0},"destination":{"droppableId":"T1","index":0}}"#,
        );
        let args = ReconcileArgs {
            board,
            drop,
            format: OutputFormat::Yaml,
        };

        let mut out = Vec::new();
        let err = run_reconcile(&args, &ReorderConfig::default(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReorderError>(),
            Some(ReorderError::CapacityExceeded { .. })
        ));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_apply_writes_board() {
        let dir = TempDir::new().unwrap();
        let (board, drop) = write_fixture(
            &dir,
            r#"{"draggableId":"T2","type":"task","source":{"droppableId":"A","index":1},"destination":{"droppableId":"B","index":0}}"#,
        );
        let target = dir.path().join("out.yaml");
        let args = ApplyArgs {
            board,
            drop,
            out: Some(target.clone()),
        };

        let mut out = Vec::new();
        run_apply(&args, &ReorderConfig::default(), &mut out)
            .await
            .unwrap();

        let store = CollectionStore::load(&target).await.unwrap();
        let ids: Vec<&str> = store
            .column_tasks(&"B".into())
            .unwrap()
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["T2", "T3"]);
        assert_eq!(store.column_tasks(&"A".into()).unwrap().len(), 1);
    }
}
