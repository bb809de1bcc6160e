use std::sync::Arc;

use crate::error::Result;
use crate::models::{MatchMode, Pattern, Prediction, PredictionSource, Transaction};
use crate::predictor::AccountCache;
use crate::repository::{AccountRepository, PatternRepository};
use crate::similarity::similarity;

/// Raw score a keyword pattern earns when it appears in the description.
pub const KEYWORD_SCORE: f64 = 0.9;

/// Raw match score of `pattern` against `description`, before weighting.
pub fn raw_score(pattern: &Pattern, description: &str) -> f64 {
    if pattern.pattern.is_empty() {
        return 0.0;
    }
    match pattern.mode {
        MatchMode::Exact => {
            if pattern.pattern == description {
                1.0
            } else {
                0.0
            }
        }
        MatchMode::Fuzzy => similarity(&pattern.pattern, description),
        MatchMode::Keyword => {
            if description
                .to_lowercase()
                .contains(&pattern.pattern.to_lowercase())
            {
                KEYWORD_SCORE
            } else {
                0.0
            }
        }
    }
}

/// Fills `{description}` in a pattern's explanation template.
pub fn render_explanation(pattern: &Pattern, description: &str) -> String {
    if pattern.explanation.trim().is_empty() {
        return format!("Matches {} pattern '{}'", pattern.mode, pattern.pattern);
    }
    pattern.explanation.replace("{description}", description)
}

pub struct PatternMatcher {
    patterns: Arc<dyn PatternRepository>,
    accounts: Arc<dyn AccountRepository>,
    min_confidence: f64,
    limit: usize,
}

impl PatternMatcher {
    pub fn new(
        patterns: Arc<dyn PatternRepository>,
        accounts: Arc<dyn AccountRepository>,
        min_confidence: f64,
        limit: usize,
    ) -> Self {
        Self {
            patterns,
            accounts,
            min_confidence,
            limit,
        }
    }

    pub async fn predict(&self, txn: &Transaction) -> Result<Vec<Prediction>> {
        let patterns = self.patterns.enabled_patterns().await?;

        let mut accounts = AccountCache::new(self.accounts.as_ref());
        let mut predictions = Vec::new();
        for pattern in &patterns {
            let confidence = pattern.weight * raw_score(pattern, &txn.description);
            if confidence < self.min_confidence {
                continue;
            }
            let Some(account) = accounts.find_active(pattern.account_id).await? else {
                tracing::debug!(
                    pattern_id = pattern.id,
                    account_id = pattern.account_id,
                    "dropping pattern with unresolvable account"
                );
                continue;
            };
            predictions.push(Prediction {
                explanation: render_explanation(pattern, &txn.description),
                account_id: account.id,
                account_name: account.name,
                confidence,
                source: PredictionSource::Pattern,
            });
        }

        // Stable: equal confidences keep pattern order.
        predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        predictions.truncate(self.limit);
        Ok(predictions)
    }
}
