//! Question selection for drilling.
//!
//! Every candidate gets a weight that falls with its strength and grows with
//! the time since it was last answered; the next question is a weighted
//! random draw over all candidates, so well-known material still comes up
//! now and then. Never-asked questions sit in the top staleness tier.

use chrono::Utc;
use rand::Rng;

use crate::db::config::env_f64;
use crate::db::operations::Question;

const DEFAULT_STRENGTH_DECAY: f64 = 0.5;
const DEFAULT_MAX_STALENESS_HOURS: f64 = 24.0 * 30.0;
const SECONDS_PER_HOUR: f64 = 3600.0;
/// Bound on the strength exponent so extreme scores stay finite.
const MAX_STRENGTH_EXPONENT: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Per-point falloff of weight as strength rises.
    pub strength_decay: f64,
    /// Staleness stops growing past this age; never-asked questions get it outright.
    pub max_staleness_hours: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            strength_decay: DEFAULT_STRENGTH_DECAY,
            max_staleness_hours: DEFAULT_MAX_STALENESS_HOURS,
        }
    }
}

impl SelectionConfig {
    pub fn from_env() -> Self {
        let strength_decay = env_f64("DRILL_STRENGTH_DECAY", DEFAULT_STRENGTH_DECAY);
        let max_staleness_hours = env_f64("DRILL_MAX_STALENESS_HOURS", DEFAULT_MAX_STALENESS_HOURS);

        Self {
            strength_decay: if strength_decay > 0.0 {
                strength_decay
            } else {
                DEFAULT_STRENGTH_DECAY
            },
            max_staleness_hours: if max_staleness_hours > 0.0 {
                max_staleness_hours
            } else {
                DEFAULT_MAX_STALENESS_HOURS
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionPolicy {
    config: SelectionConfig,
}

impl SelectionPolicy {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// Draw weight of `question` at time `now` (seconds since epoch). Always positive.
    pub fn weight(&self, question: &Question, now: i64) -> f64 {
        self.strength_factor(question.strength) * self.staleness_factor(question.time_last_asked, now)
    }

    pub fn weights(&self, questions: &[Question], now: i64) -> Vec<f64> {
        questions.iter().map(|q| self.weight(q, now)).collect()
    }

    fn strength_factor(&self, strength: i64) -> f64 {
        let exponent = (-self.config.strength_decay * strength as f64)
            .clamp(-MAX_STRENGTH_EXPONENT, MAX_STRENGTH_EXPONENT);
        exponent.exp()
    }

    fn staleness_factor(&self, time_last_asked: Option<i64>, now: i64) -> f64 {
        let cap = self.config.max_staleness_hours;
        let age_hours = match time_last_asked {
            None => cap,
            Some(asked) => {
                let elapsed = now.saturating_sub(asked).max(0) as f64;
                (elapsed / SECONDS_PER_HOUR).min(cap)
            }
        };
        1.0 + age_hours.ln_1p()
    }

    /// Picks one question with probability proportional to its weight.
    /// Returns `None` only for an empty slice.
    pub fn select<'a, R: Rng>(
        &self,
        questions: &'a [Question],
        now: i64,
        rng: &mut R,
    ) -> Option<&'a Question> {
        if questions.is_empty() {
            return None;
        }

        let weights = self.weights(questions, now);
        let total: f64 = weights.iter().sum();

        if !total.is_finite() || total <= 0.0 {
            tracing::warn!(total, "degenerate selection weights, falling back to uniform draw");
            return questions.get(rng.random_range(0..questions.len()));
        }

        let mut target = rng.random::<f64>() * total;
        for (question, weight) in questions.iter().zip(weights.iter()) {
            if target < *weight {
                return Some(question);
            }
            target -= weight;
        }

        // rounding residue
        questions.last()
    }
}

/// Selects with the default policy, the thread-local RNG and the current time.
pub fn select_question(questions: &[Question]) -> Option<&Question> {
    SelectionPolicy::default().select(questions, Utc::now().timestamp(), &mut rand::rng())
}
