//! Best-model selection over a catalog

use super::catalog::{Candidate, Catalog};
use super::engine::TrainedModel;
use super::evaluator::evaluate;
use super::models::Estimator;
use super::split::Split;
use crate::error::{Result, ResultExt, ScorecastError};
use rayon::prelude::*;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Selection knobs; the default evaluates sequentially with no time limit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Wall-clock limit per candidate (fit + score)
    pub candidate_budget: Option<Duration>,
    /// Evaluate candidates on the rayon pool
    pub parallel: bool,
}

impl SelectorConfig {
    pub fn with_candidate_budget(mut self, budget: Duration) -> Self {
        self.candidate_budget = Some(budget);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Held-out scores in catalog order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreReport {
    entries: Vec<(String, f64)>,
}

impl ScoreReport {
    fn push(&mut self, name: &str, score: f64) {
        self.entries.push((name.to_string(), score));
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| *s)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest score; ties resolve to the earliest entry
    pub fn best(&self) -> Option<(usize, &str, f64)> {
        let mut best: Option<(usize, &str, f64)> = None;
        for (idx, (name, score)) in self.entries.iter().enumerate() {
            if best.map_or(true, |(_, _, b)| *score > b) {
                best = Some((idx, name.as_str(), *score));
            }
        }
        best
    }
}

impl Serialize for ScoreReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, score) in &self.entries {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

/// The winning candidate, already fitted
#[derive(Debug, Clone)]
pub struct SelectionResult<M = TrainedModel> {
    pub name: String,
    pub model: M,
    pub score: f64,
    pub report: ScoreReport,
}

/// Evaluate every candidate with the default configuration
pub fn select<E: Estimator>(catalog: &Catalog<E>, split: &Split) -> Result<SelectionResult<E::Fitted>> {
    select_with_config(catalog, split, &SelectorConfig::default())
}

/// Evaluate every candidate in catalog order and keep the first best.
///
/// Any candidate failure aborts the selection; the error is wrapped with the
/// candidate's name.
pub fn select_with_config<E: Estimator>(
    catalog: &Catalog<E>,
    split: &Split,
    config: &SelectorConfig,
) -> Result<SelectionResult<E::Fitted>> {
    info!(
        candidates = catalog.len(),
        parallel = config.parallel,
        "evaluating candidates"
    );

    let outcomes: Vec<Result<(E::Fitted, f64)>> = if config.parallel {
        catalog
            .entries()
            .par_iter()
            .map(|candidate| evaluate_within_budget(candidate, split, config.candidate_budget))
            .collect()
    } else {
        let mut outcomes = Vec::with_capacity(catalog.len());
        for candidate in catalog.entries() {
            let outcome = evaluate_within_budget(candidate, split, config.candidate_budget);
            let failed = outcome.is_err();
            outcomes.push(outcome);
            if failed {
                break;
            }
        }
        outcomes
    };

    let mut report = ScoreReport::default();
    let mut models = Vec::with_capacity(outcomes.len());
    for (candidate, outcome) in catalog.entries().iter().zip(outcomes) {
        let (model, score) =
            outcome.with_context(|| format!("evaluating candidate '{}'", candidate.name))?;
        report.push(&candidate.name, score);
        models.push(Some(model));
    }

    let (winner_idx, winner_name, best_score) = report
        .best()
        .map(|(idx, name, score)| (idx, name.to_string(), score))
        .ok_or_else(|| ScorecastError::ConfigError("no candidates were evaluated".to_string()))?;

    let model = models
        .get_mut(winner_idx)
        .and_then(Option::take)
        .ok_or_else(|| ScorecastError::ConfigError(format!("no fitted model for '{}'", winner_name)))?;

    info!(best_model = %winner_name, r2 = best_score, "candidate selected");

    Ok(SelectionResult {
        name: winner_name,
        model,
        score: best_score,
        report,
    })
}

fn evaluate_within_budget<E: Estimator>(
    candidate: &Candidate<E>,
    split: &Split,
    budget: Option<Duration>,
) -> Result<(E::Fitted, f64)> {
    let start = Instant::now();
    let outcome = evaluate(
        candidate,
        split.train().features(),
        split.train().target(),
        split.test().features(),
        split.test().target(),
    )?;
    let elapsed = start.elapsed();
    debug!(model = %candidate.name, elapsed_ms = elapsed.as_millis() as u64, "candidate evaluated");

    // Checked after the fact; the evaluation itself is not interrupted
    if let Some(limit) = budget {
        if elapsed > limit {
            return Err(ScorecastError::FitError {
                model: candidate.name.clone(),
                reason: format!("took {:.3}s, over the {:.3}s budget", elapsed.as_secs_f64(), limit.as_secs_f64()),
                source: None,
            });
        }
    }

    Ok(outcome)
}
