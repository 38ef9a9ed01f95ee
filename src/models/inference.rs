//! Multi-model inference engine for price category prediction

use crate::config::AppConfig;
use crate::error::{ArtifactResult, InferenceError};
use crate::feature_transformer::FeatureTransformer;
use crate::models::classifier::ModelOutput;
use crate::models::loader::{ArtifactLoader, LoadedModel, ModelArtifacts};
use crate::types::listing::{FeatureVector, ListingFeatures};
use crate::types::prediction::{
    to_percentage, ModelPrediction, PredictionReport, ProbabilityOutcome,
};
use tracing::{debug, info, warn};

/// Runs render passes against the immutable artifact context
pub struct InferenceEngine {
    /// Loaded ONNX classifiers in render order
    models: Vec<LoadedModel>,
    /// Scaler-backed feature transformer
    transformer: FeatureTransformer,
}

impl InferenceEngine {
    /// Load all artifacts named by the configuration
    pub fn new(config: &AppConfig) -> ArtifactResult<Self> {
        let artifacts = ArtifactLoader::new(&config.artifacts).load_all()?;
        Ok(Self::with_artifacts(artifacts))
    }

    /// Build an engine over artifacts produced by [`ArtifactLoader`]
    pub fn with_artifacts(artifacts: ModelArtifacts) -> Self {
        let ModelArtifacts { models, scaler } = artifacts;

        info!(
            models = ?models.iter().map(|m| m.kind.key()).collect::<Vec<_>>(),
            "Inference engine initialized"
        );

        Self {
            models,
            transformer: FeatureTransformer::new(scaler),
        }
    }

    /// Get the number of loaded models
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Loaded models in render order
    pub fn models(&self) -> &[LoadedModel] {
        &self.models
    }

    /// Get loaded model names
    pub fn model_names(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.kind.display_name()).collect()
    }

    pub fn transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    /// Run every model once on the scaled row
    pub fn predict(&self, scaled: &FeatureVector) -> Result<Vec<ModelOutput>, InferenceError> {
        self.models.iter().map(|model| model.run(scaled)).collect()
    }

    /// High price probability for one model output. A model without the
    /// capability yields a warning outcome; the others are unaffected.
    fn probability_outcome(output: &ModelOutput) -> ProbabilityOutcome {
        match output.probability() {
            Ok(proba) => ProbabilityOutcome::Available {
                model: output.model,
                high_price_pct: to_percentage(proba[1]),
            },
            Err(e) => {
                warn!(model = %output.model, "Probability estimates unavailable");
                ProbabilityOutcome::Unavailable {
                    model: output.model,
                    warning: e.to_string(),
                }
            }
        }
    }

    /// Execute one full pass: transform, predict, and optionally report
    /// probabilities.
    pub fn run_pass(
        &self,
        features: &ListingFeatures,
        show_probabilities: bool,
    ) -> Result<PredictionReport, InferenceError> {
        let scaled = self.transformer.transform(features);
        let outputs = self.predict(&scaled)?;

        let predictions = outputs
            .iter()
            .map(|output| ModelPrediction::new(output.model, output.class))
            .collect();

        let mut report = PredictionReport::new(*features, scaled, predictions);
        if show_probabilities {
            report = report.with_probabilities(
                outputs.iter().map(Self::probability_outcome).collect(),
            );
        }

        debug!(
            pass_id = %report.pass_id,
            features = ?features,
            scaled = ?scaled,
            predictions = ?report
                .predictions
                .iter()
                .map(|p| (p.model.key(), p.label))
                .collect::<Vec<_>>(),
            "Render pass complete"
        );

        Ok(report)
    }
}
