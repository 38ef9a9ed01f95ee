//! ONNX artifact loader
//!
//! Loads the three classifier sessions and the scaler once at startup into an
//! immutable [`ModelArtifacts`] context. Any failure is fatal.

use crate::config::ArtifactsConfig;
use crate::error::{ArtifactError, ArtifactResult, InferenceError};
use crate::models::classifier::{ModelKind, ModelOutput};
use crate::models::scaler::StandardScaler;
use crate::types::listing::{FeatureVector, FEATURE_COUNT};
use crate::types::prediction::PriceClass;
use anyhow::Context;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Output holding the predicted class id per row
pub const LABEL_OUTPUT: &str = "label";
/// Output holding `[p(low), p(high)]` per row, when exported
pub const PROBABILITY_OUTPUT: &str = "probabilities";

/// Loaded ONNX classifier with metadata
pub struct LoadedModel {
    /// Model family
    pub kind: ModelKind,
    /// Source artifact path
    pub path: PathBuf,
    /// Probability capability, resolved once at load
    pub supports_probability: bool,
    /// Input name for the model
    input_name: String,
    /// ONNX Runtime session; running needs exclusive access
    session: Mutex<Session>,
}

impl LoadedModel {
    /// Run the session on one scaled row
    pub fn run(&self, scaled: &FeatureVector) -> Result<ModelOutput, InferenceError> {
        let row: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_array((vec![1_i64, FEATURE_COUNT as i64], row))
            .map_err(|e| self.run_error(e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| self.run_error("session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| self.run_error(e))?;

        let label = outputs
            .get(LABEL_OUTPUT)
            .ok_or_else(|| self.run_error("no label output"))?;
        let (_, class_ids) = label
            .try_extract_tensor::<i64>()
            .map_err(|e| self.run_error(e))?;
        let class_id = *class_ids
            .first()
            .ok_or_else(|| self.run_error("empty label output"))?;
        let class = PriceClass::from_class_id(class_id).ok_or(InferenceError::UnknownClass {
            model: self.kind,
            class_id,
        })?;

        let probabilities = if self.supports_probability {
            let value = outputs
                .get(PROBABILITY_OUTPUT)
                .ok_or_else(|| self.run_error("no probabilities output"))?;
            let (_, proba) = value
                .try_extract_tensor::<f32>()
                .map_err(|e| self.run_error(e))?;
            match proba {
                [low, high, ..] => Some([f64::from(*low), f64::from(*high)]),
                _ => return Err(self.run_error("probabilities output has fewer than 2 classes")),
            }
        } else {
            None
        };

        Ok(ModelOutput {
            model: self.kind,
            class,
            probabilities,
        })
    }

    fn run_error(&self, reason: impl fmt::Display) -> InferenceError {
        InferenceError::Run {
            model: self.kind,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("supports_probability", &self.supports_probability)
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

/// All artifacts needed for a render pass. Only [`ArtifactLoader`] builds one.
#[derive(Debug)]
pub struct ModelArtifacts {
    /// Classifiers in `ModelKind::ALL` order
    pub(crate) models: Vec<LoadedModel>,
    pub(crate) scaler: StandardScaler,
}

/// Loader for the ONNX classifiers and the JSON scaler
pub struct ArtifactLoader {
    config: ArtifactsConfig,
}

impl ArtifactLoader {
    pub fn new(config: &ArtifactsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Loader reading the default file names from `dir`
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config: ArtifactsConfig {
                dir: dir.as_ref().to_string_lossy().into_owned(),
                ..ArtifactsConfig::default()
            },
        }
    }

    /// Load a single ONNX classifier and check its signature with one run
    pub fn load_model(&self, kind: ModelKind) -> ArtifactResult<LoadedModel> {
        let path = self.config.model_path(kind);
        let invalid = |reason: String| ArtifactError::Invalid {
            artifact: kind.key().to_string(),
            path: path.clone(),
            reason,
        };

        info!(
            model = %kind,
            path = %path.display(),
            threads = self.config.onnx_threads,
            "Loading ONNX model"
        );

        let bytes = read_artifact(&path, kind.key())?;
        let session = self
            .build_session(&bytes)
            .map_err(|e| ArtifactError::Session {
                artifact: kind.key().to_string(),
                path: path.clone(),
                reason: format!("{:#}", e),
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| invalid("model declares no inputs".to_string()))?;

        if !session.outputs.iter().any(|o| o.name == LABEL_OUTPUT) {
            return Err(invalid(format!("missing `{}` output", LABEL_OUTPUT)));
        }
        let supports_probability = session.outputs.iter().any(|o| o.name == PROBABILITY_OUTPUT);

        let model = LoadedModel {
            kind,
            path: path.clone(),
            supports_probability,
            input_name,
            session: Mutex::new(session),
        };

        // A zero row exercises the input width and both output dtypes
        model
            .run(&[0.0; FEATURE_COUNT])
            .map_err(|e| invalid(e.to_string()))?;

        info!(
            model = %kind,
            input = %model.input_name,
            supports_probability = supports_probability,
            "Model loaded successfully"
        );

        Ok(model)
    }

    fn build_session(&self, bytes: &[u8]) -> anyhow::Result<Session> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.config.onnx_threads)?
            .commit_from_memory(bytes)
            .context("Failed to commit session")?;
        Ok(session)
    }

    /// Load the fitted feature scaler
    pub fn load_scaler(&self) -> ArtifactResult<StandardScaler> {
        let path = self.config.scaler_path();

        info!(path = %path.display(), "Loading scaler artifact");

        let bytes = read_artifact(&path, "scaler")?;
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
            artifact: "scaler".to_string(),
            path,
            source,
        })
    }

    /// Load all artifacts in fixed order: logistic, random forest, SVM, scaler
    pub fn load_all(&self) -> ArtifactResult<ModelArtifacts> {
        let models = ModelKind::ALL
            .iter()
            .map(|&kind| self.load_model(kind))
            .collect::<ArtifactResult<Vec<_>>>()?;
        let scaler = self.load_scaler()?;

        info!(
            count = models.len(),
            "Loaded {} models from {}",
            models.len(),
            self.config.dir
        );

        Ok(ModelArtifacts { models, scaler })
    }
}

fn read_artifact(path: &Path, artifact: &str) -> ArtifactResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| ArtifactError::Read {
        artifact: artifact.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixtures_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/artifacts")
    }

    /// Copy the fixtures into a scratch directory so single files can be broken
    fn scratch_copy() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for entry in fs::read_dir(fixtures_dir()).unwrap() {
            let entry = entry.unwrap();
            fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_all_fixtures() {
        let artifacts = ArtifactLoader::from_dir(fixtures_dir()).load_all().unwrap();

        let kinds: Vec<ModelKind> = artifacts.models.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, ModelKind::ALL.to_vec());

        let capabilities: Vec<bool> = artifacts
            .models
            .iter()
            .map(|m| m.supports_probability)
            .collect();
        assert_eq!(capabilities, vec![true, true, false]);
        assert_eq!(artifacts.models[0].input_name, "float_input");
    }

    #[test]
    fn test_calibrated_svm_exposes_probabilities() {
        let config = ArtifactsConfig {
            dir: fixtures_dir().to_string_lossy().into_owned(),
            svm_file: "svm_calibrated.onnx".to_string(),
            ..ArtifactsConfig::default()
        };

        let svm = ArtifactLoader::new(&config).load_model(ModelKind::Svm).unwrap();
        assert!(svm.supports_probability);

        let output = svm.run(&[-0.5, -1.0, 0.4]).unwrap();
        assert_eq!(output.class, PriceClass::High);
        let proba = output.probability().unwrap();
        assert!((proba[1] - 0.574443).abs() < 1e-5);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = scratch_copy();
        fs::remove_file(dir.path().join("svm_model.onnx")).unwrap();

        let err = ArtifactLoader::from_dir(dir.path()).load_all().unwrap_err();
        assert!(matches!(err, ArtifactError::Read { ref artifact, .. } if artifact == "svm"));
    }

    #[test]
    fn test_corrupt_model_is_fatal() {
        let dir = scratch_copy();
        fs::write(dir.path().join("rf_model.onnx"), b"\x80\x04\x95pickle").unwrap();

        let err = ArtifactLoader::from_dir(dir.path()).load_all().unwrap_err();
        assert!(
            matches!(err, ArtifactError::Session { ref artifact, .. } if artifact == "random_forest")
        );
    }

    #[test]
    fn test_corrupt_scaler_is_fatal() {
        let dir = scratch_copy();
        fs::write(dir.path().join("scaler.json"), b"\x80\x04\x95pickle").unwrap();

        let err = ArtifactLoader::from_dir(dir.path()).load_all().unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn test_wrong_scaler_width_is_fatal() {
        let dir = scratch_copy();
        fs::write(
            dir.path().join("scaler.json"),
            r#"{"mean":[5.0,20.0],"scale":[4.0,10.0]}"#,
        )
        .unwrap();

        let err = ArtifactLoader::from_dir(dir.path()).load_scaler().unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
        assert!(err.to_string().contains("mean has 2 entries"));
    }
}
