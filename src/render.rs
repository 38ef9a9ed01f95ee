//! Prediction rendering.
//!
//! Turns a [`PredictionReport`] into the HTML page served by the front-end or
//! the plain-text block printed by the CLI.

use crate::models::classifier::ModelKind;
use crate::types::listing::{
    MIN_MINIMUM_NIGHTS, MIN_NUMBER_OF_REVIEWS, MIN_REVIEWS_PER_MONTH, REVIEWS_PER_MONTH_STEP,
};
use crate::types::prediction::{PredictionReport, ProbabilityOutcome};
use std::fmt;

pub const PAGE_TITLE: &str = "Listing price category prediction";

const STYLE: &str = r#"
    body { font-family: sans-serif; margin: 0; display: flex; }
    .sidebar { width: 280px; padding: 24px; background-color: #f0f2f6; min-height: 100vh; }
    .sidebar label { display: block; margin-top: 16px; font-size: 14px; }
    .sidebar input[type=number] { width: 100%; padding: 6px; }
    .main { flex: 1; max-width: 720px; margin: 0 auto; padding: 24px; }
    .main-title { font-size: 32px; font-weight: bold; text-align: center; margin-bottom: 10px; }
    .subtitle { font-size: 18px; color: #6c757d; text-align: center; margin-bottom: 30px; }
    .model-box { background-color: #f9f9f9; padding: 20px; border-radius: 15px; margin-bottom: 15px; box-shadow: 0 2px 8px rgba(0,0,0,0.06); }
    .model-title { font-size: 20px; font-weight: 600; margin-bottom: 8px; }
    .model-result { font-size: 18px; color: #333; }
    .warning { background-color: #fffce7; color: #926c05; padding: 12px; border-radius: 8px; margin-bottom: 8px; }
    .consensus { color: #6c757d; margin-top: 20px; }
    .footer { color: #adb5bd; font-size: 12px; margin-top: 40px; }
"#;

fn model_icon(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::LogisticRegression => "🧮",
        ModelKind::RandomForest => "🌲",
        ModelKind::Svm => "🧭",
    }
}

/// Sentence shown for a successful probability query. `emphasis` wraps the
/// percentage, e.g. `("<b>", "</b>")` on the page.
pub fn probability_line(kind: ModelKind, high_price_pct: f64, emphasis: (&str, &str)) -> String {
    format!(
        "{}: {}{:.2}%{} probability of a high price",
        kind, emphasis.0, high_price_pct, emphasis.1
    )
}

/// Render the full HTML page for one pass
pub fn render_page(report: &PredictionReport) -> String {
    HtmlPage(report).to_string()
}

/// Render the plain-text summary printed by the CLI
pub fn render_text(report: &PredictionReport) -> String {
    TextSummary(report).to_string()
}

struct HtmlPage<'a>(&'a PredictionReport);

impl fmt::Display for HtmlPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let features = &report.features;
        let checked = if report.probabilities.is_some() {
            " checked"
        } else {
            ""
        };

        write!(
            f,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<form class="sidebar" method="get" action="/">
  <h3>🎯 Listing characteristics</h3>
  <label for="minimum_nights">Minimum nights</label>
  <input type="number" id="minimum_nights" name="minimum_nights" min="{min_nights}" step="1" value="{nights}" onchange="this.form.submit()">
  <label for="number_of_reviews">Number of reviews</label>
  <input type="number" id="number_of_reviews" name="number_of_reviews" min="{min_reviews}" step="1" value="{reviews}" onchange="this.form.submit()">
  <label for="reviews_per_month">Reviews per month</label>
  <input type="number" id="reviews_per_month" name="reviews_per_month" min="{min_rate:.1}" step="{step}" value="{rate}" onchange="this.form.submit()">
  <label><input type="checkbox" name="probabilities" value="on"{checked} onchange="this.form.submit()"> 🔍 Show probabilities (if available)</label>
  <noscript><button type="submit">Predict</button></noscript>
</form>
<div class="main">
<div class="main-title">🏠 {title}</div>
<div class="subtitle">Predict whether a listing has a <b>low price</b> or a <b>high price</b> with three machine learning models.</div>
<h2>📊 Classification results</h2>
"#,
            title = PAGE_TITLE,
            style = STYLE,
            min_nights = MIN_MINIMUM_NIGHTS,
            nights = features.minimum_nights,
            min_reviews = MIN_NUMBER_OF_REVIEWS,
            reviews = features.number_of_reviews,
            min_rate = MIN_REVIEWS_PER_MONTH,
            step = REVIEWS_PER_MONTH_STEP,
            rate = features.reviews_per_month,
            checked = checked,
        )?;

        for prediction in &report.predictions {
            write!(
                f,
                r#"<div class="model-box">
    <div class="model-title">{} {}</div>
    <div class="model-result">{}</div>
</div>
"#,
                model_icon(prediction.model),
                prediction.model,
                prediction.label
            )?;
        }

        if let Some(consensus) = &report.consensus {
            writeln!(
                f,
                r#"<div class="consensus">{} of {} models predict a high price (majority: {}).</div>"#,
                consensus.high_votes, consensus.total, consensus.majority
            )?;
        }

        if let Some(outcomes) = &report.probabilities {
            writeln!(f, "<h3>📈 Model probabilities</h3>")?;
            for outcome in outcomes {
                match outcome {
                    ProbabilityOutcome::Available {
                        model,
                        high_price_pct,
                    } => writeln!(
                        f,
                        "<p>{}</p>",
                        probability_line(*model, *high_price_pct, ("<b>", "</b>"))
                    )?,
                    ProbabilityOutcome::Unavailable { warning, .. } => {
                        writeln!(f, r#"<div class="warning">⚠️ {}</div>"#, warning)?
                    }
                }
            }
        }

        write!(
            f,
            r#"<div class="footer">pass {} · {}</div>
</div>
</body>
</html>
"#,
            report.pass_id,
            report.generated_at.to_rfc3339()
        )
    }
}

struct TextSummary<'a>(&'a PredictionReport);

impl fmt::Display for TextSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let features = &report.features;

        writeln!(f, "{}", PAGE_TITLE)?;
        writeln!(
            f,
            "  minimum nights: {}, number of reviews: {}, reviews per month: {}",
            features.minimum_nights, features.number_of_reviews, features.reviews_per_month
        )?;
        writeln!(f)?;
        writeln!(f, "Classification results")?;

        for prediction in &report.predictions {
            writeln!(f, "  {:<20} {}", prediction.model.display_name(), prediction.label)?;
        }

        if let Some(consensus) = &report.consensus {
            writeln!(
                f,
                "  {} of {} models predict a high price",
                consensus.high_votes, consensus.total
            )?;
        }

        if let Some(outcomes) = &report.probabilities {
            writeln!(f)?;
            writeln!(f, "Model probabilities")?;
            for outcome in outcomes {
                match outcome {
                    ProbabilityOutcome::Available {
                        model,
                        high_price_pct,
                    } => writeln!(f, "  {}", probability_line(*model, *high_price_pct, ("", "")))?,
                    ProbabilityOutcome::Unavailable { warning, .. } => {
                        writeln!(f, "  warning: {}", warning)?
                    }
                }
            }
        }

        Ok(())
    }
}
