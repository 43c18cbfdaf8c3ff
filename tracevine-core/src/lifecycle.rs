//! ML-lifecycle record types and tracker trait surfaces.
//!
//! Backends (MLflow, W&B, ...) implement these against their own storage;
//! the vocabulary here is the portable subset.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::TracevineError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Run {
    pub id: String,
    pub experiment_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStage {
    None,
    Staging,
    Production,
    Archived,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelVersion {
    pub name: String,
    pub version: String,
    pub stage: ModelStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    pub path: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ExperimentTracker: Send + Sync {
    async fn create_experiment(&self, name: &str) -> Result<Experiment, TracevineError>;

    async fn start_run(&self, experiment_id: &str) -> Result<Run, TracevineError>;

    async fn log_param(&self, run_id: &str, key: &str, value: Value)
        -> Result<(), TracevineError>;

    async fn log_metric(&self, run_id: &str, key: &str, value: f64)
        -> Result<(), TracevineError>;

    async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TracevineError>;
}

#[async_trait]
pub trait ModelRegistry: Send + Sync {
    async fn register_model(
        &self,
        name: &str,
        run_id: Option<&str>,
    ) -> Result<ModelVersion, TracevineError>;

    async fn transition_stage(
        &self,
        name: &str,
        version: &str,
        stage: ModelStage,
    ) -> Result<(), TracevineError>;

    async fn latest_version(&self, name: &str) -> Result<Option<ModelVersion>, TracevineError>;

    /// Optional capability; registries without aliasing keep the default.
    async fn set_alias(
        &self,
        _name: &str,
        _alias: &str,
        _version: &str,
    ) -> Result<(), TracevineError> {
        Err(TracevineError::NotSupported)
    }
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn upload(
        &self,
        run_id: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<Artifact, TracevineError>;

    async fn download(&self, run_id: &str, path: &str) -> Result<Vec<u8>, TracevineError>;

    async fn list(&self, run_id: &str) -> Result<Vec<Artifact>, TracevineError>;
}

/// Tracker that keeps experiments and runs in process memory.
#[derive(Clone, Default)]
pub struct InMemoryTracker {
    experiments: Arc<RwLock<Vec<Experiment>>>,
    runs: Arc<RwLock<HashMap<String, Run>>>,
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_run<T>(
        &self,
        run_id: &str,
        apply: impl FnOnce(&mut Run) -> T,
    ) -> Result<T, TracevineError> {
        let mut runs = self.runs.write().unwrap_or_else(PoisonError::into_inner);
        match runs.get_mut(run_id) {
            Some(run) => Ok(apply(run)),
            None => Err(TracevineError::config(
                "run_id",
                format!("unknown run '{run_id}'"),
            )),
        }
    }
}

#[async_trait]
impl ExperimentTracker for InMemoryTracker {
    async fn create_experiment(&self, name: &str) -> Result<Experiment, TracevineError> {
        let experiment = Experiment {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            tags: BTreeMap::new(),
            created_at: Utc::now(),
        };
        self.experiments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(experiment.clone());
        Ok(experiment)
    }

    async fn start_run(&self, experiment_id: &str) -> Result<Run, TracevineError> {
        let run = Run {
            id: Uuid::new_v4().to_string(),
            experiment_id: experiment_id.to_string(),
            status: RunStatus::Running,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started_at: Utc::now(),
            ended_at: None,
        };
        self.runs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(run.id.clone(), run.clone());
        Ok(run)
    }

    async fn log_param(
        &self,
        run_id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), TracevineError> {
        self.with_run(run_id, |run| {
            run.params.insert(key.to_string(), value);
        })
    }

    async fn log_metric(
        &self,
        run_id: &str,
        key: &str,
        value: f64,
    ) -> Result<(), TracevineError> {
        self.with_run(run_id, |run| {
            run.metrics.insert(key.to_string(), value);
        })
    }

    async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TracevineError> {
        self.with_run(run_id, |run| {
            run.status = status;
            run.ended_at = Some(Utc::now());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[tokio::test]
    async fn tracker_round_trips_a_run() {
        let tracker = InMemoryTracker::new();
        let experiment = tracker.create_experiment("tuning").await.expect("create");
        let run = tracker.start_run(&experiment.id).await.expect("start");

        tracker
            .log_param(&run.id, "lr", json!(0.003))
            .await
            .expect("param");
        tracker
            .log_metric(&run.id, "loss", 0.42)
            .await
            .expect("metric");
        tracker
            .end_run(&run.id, RunStatus::Completed)
            .await
            .expect("end");

        let runs = tracker.runs.read().unwrap();
        let stored = &runs[&run.id];
        assert_eq!(stored.status, RunStatus::Completed);
        assert_eq!(stored.params["lr"], json!(0.003));
        assert_eq!(stored.metrics["loss"], 0.42);
        assert!(stored.ended_at.is_some());
    }

    #[tokio::test]
    async fn unknown_run_is_a_config_error() {
        let tracker = InMemoryTracker::new();
        let err = tracker.log_metric("missing", "loss", 1.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
