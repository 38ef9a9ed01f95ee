//! Render pass metrics and statistics tracking.

use crate::models::aggregator::voting_score;
use crate::types::prediction::{PredictionReport, PriceClass};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared by all render passes
pub struct PredictionMetrics {
    /// Total render passes
    pub passes_rendered: AtomicU64,
    /// Passes with the probability toggle on
    pub probability_requests: AtomicU64,
    /// Probability warnings shown
    pub probability_warnings: AtomicU64,
    /// `[low, high]` counts per model key
    class_counts: RwLock<HashMap<&'static str, [u64; 2]>>,
    /// Pass durations (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Per-pass agreement (1.0 when all models agree)
    model_agreements: RwLock<Vec<f64>>,
    start_time: Instant,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            passes_rendered: AtomicU64::new(0),
            probability_requests: AtomicU64::new(0),
            probability_warnings: AtomicU64::new(0),
            class_counts: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            model_agreements: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a completed render pass
    pub fn record_pass(&self, report: &PredictionReport, processing_time: Duration) {
        self.passes_rendered.fetch_add(1, Ordering::Relaxed);

        if report.probabilities.is_some() {
            self.probability_requests.fetch_add(1, Ordering::Relaxed);
            self.probability_warnings
                .fetch_add(report.warning_count() as u64, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Ok(mut counts) = self.class_counts.write() {
            for prediction in &report.predictions {
                let entry = counts.entry(prediction.model.key()).or_insert([0, 0]);
                entry[prediction.class.class_id() as usize] += 1;
            }
        }

        if report.predictions.len() >= 2 {
            // Share of the majority vote, rescaled so 0.5 split -> 0, unanimous -> 1
            let high = voting_score(&report.predictions);
            let agreement = (2.0 * high - 1.0).abs();
            if let Ok(mut agreements) = self.model_agreements.write() {
                agreements.push(agreement);
                if agreements.len() > 1000 {
                    agreements.drain(0..500);
                }
            }
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let Ok(times) = self.processing_times.read() else {
            return ProcessingStats::default();
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[((count as f64 * 0.95) as usize).min(count - 1)],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Prediction counts per model
    pub fn get_class_counts(&self) -> HashMap<&'static str, ClassCounts> {
        self.class_counts
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(model, c)| {
                        (
                            *model,
                            ClassCounts {
                                low: c[PriceClass::Low.class_id() as usize],
                                high: c[PriceClass::High.class_id() as usize],
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get average model agreement
    pub fn get_avg_agreement(&self) -> f64 {
        match self.model_agreements.read() {
            Ok(agreements) if !agreements.is_empty() => {
                agreements.iter().sum::<f64>() / agreements.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Render passes per second since start
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.passes_rendered.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Point-in-time view for the health endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            passes_rendered: self.passes_rendered.load(Ordering::Relaxed),
            probability_requests: self.probability_requests.load(Ordering::Relaxed),
            probability_warnings: self.probability_warnings.load(Ordering::Relaxed),
            avg_agreement: self.get_avg_agreement(),
            processing: self.get_processing_stats(),
            class_counts: self.get_class_counts(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let passes = self.passes_rendered.load(Ordering::Relaxed);
        let requests = self.probability_requests.load(Ordering::Relaxed);
        let warnings = self.probability_warnings.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║          LISTING PRICE CLASSIFIER - METRICS SUMMARY          ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Passes Rendered: {:>8}  │  Throughput: {:>8.2} passes/s   ║",
            passes,
            self.get_throughput()
        );
        info!(
            "║ Probability Requests: {:>6}  │  Warnings Shown: {:>8}    ║",
            requests, warnings
        );
        info!(
            "║ Pass Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5}     ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!(
            "║ Model Agreement: {:>5.1}% (higher = models agree more)        ║",
            self.get_avg_agreement() * 100.0
        );
        info!("╠══════════════════════════════════════════════════════════════╣");

        let mut counts: Vec<_> = self.get_class_counts().into_iter().collect();
        counts.sort_by_key(|(model, _)| *model);
        for (model, c) in counts {
            info!("║   {:20}: low={:>6} high={:>6}", model, c.low, c.high);
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Predicted classes for one model
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub low: u64,
    pub high: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub passes_rendered: u64,
    pub probability_requests: u64,
    pub probability_warnings: u64,
    pub avg_agreement: f64,
    pub processing: ProcessingStats,
    pub class_counts: HashMap<&'static str, ClassCounts>,
}

/// Logs a metrics summary on a fixed interval
pub struct MetricsReporter {
    metrics: Arc<PredictionMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<PredictionMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classifier::ModelKind;
    use crate::types::listing::ListingFeatures;
    use crate::types::prediction::{ModelPrediction, ProbabilityOutcome};

    fn report(classes: [PriceClass; 3], with_probabilities: bool) -> PredictionReport {
        let predictions = ModelKind::ALL
            .iter()
            .zip(classes)
            .map(|(&kind, class)| ModelPrediction::new(kind, class))
            .collect();
        let report = PredictionReport::new(ListingFeatures::default(), [0.0; 3], predictions);
        if with_probabilities {
            report.with_probabilities(vec![ProbabilityOutcome::Unavailable {
                model: ModelKind::Svm,
                warning: "Probabilities not available for SVM.".to_string(),
            }])
        } else {
            report
        }
    }

    #[test]
    fn test_metrics_recording() {
        let metrics = PredictionMetrics::new();

        metrics.record_pass(&report([PriceClass::High; 3], false), Duration::from_micros(100));
        metrics.record_pass(
            &report([PriceClass::Low, PriceClass::High, PriceClass::Low], true),
            Duration::from_micros(300),
        );

        assert_eq!(metrics.passes_rendered.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.probability_requests.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.probability_warnings.load(Ordering::Relaxed), 1);

        let counts = metrics.get_class_counts();
        assert_eq!(counts["logistic_regression"], ClassCounts { low: 1, high: 1 });
        assert_eq!(counts["random_forest"], ClassCounts { low: 0, high: 2 });

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }

    #[test]
    fn test_model_agreement() {
        let metrics = PredictionMetrics::new();
        metrics.record_pass(&report([PriceClass::High; 3], false), Duration::from_micros(10));
        assert!((metrics.get_avg_agreement() - 1.0).abs() < 1e-12);

        metrics.record_pass(
            &report([PriceClass::High, PriceClass::Low, PriceClass::Low], false),
            Duration::from_micros(10),
        );
        // (1.0 + 1/3) / 2
        assert!((metrics.get_avg_agreement() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats() {
        let metrics = PredictionMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.passes_rendered, 0);
        assert_eq!(snapshot.processing.count, 0);
        assert_eq!(snapshot.avg_agreement, 0.0);
    }
}
