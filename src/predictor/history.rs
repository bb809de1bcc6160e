use std::sync::Arc;

use crate::error::Result;
use crate::models::{HistoricalMatch, Prediction, PredictionSource, Transaction};
use crate::predictor::AccountCache;
use crate::repository::{AccountRepository, HistoricalMatchRepository};

pub const MAX_HISTORY_CONFIDENCE: f64 = 0.9;

/// `min(0.9, 0.5 + frequency / 10)`: one prior use gives 0.6, four or more hit the cap.
pub fn history_confidence(frequency: i64) -> f64 {
    ((5 + frequency.max(0)) as f64 / 10.0).min(MAX_HISTORY_CONFIDENCE)
}

fn explanation_for(record: &HistoricalMatch) -> String {
    if !record.explanation.trim().is_empty() {
        return record.explanation.clone();
    }
    match record.frequency {
        1 => "Used once before for a similar transaction".to_string(),
        n => format!("Used {n} times before for similar transactions"),
    }
}

pub struct HistoryMatcher {
    history: Arc<dyn HistoricalMatchRepository>,
    accounts: Arc<dyn AccountRepository>,
    limit: usize,
}

impl HistoryMatcher {
    pub fn new(
        history: Arc<dyn HistoricalMatchRepository>,
        accounts: Arc<dyn AccountRepository>,
        limit: usize,
    ) -> Self {
        Self {
            history,
            accounts,
            limit,
        }
    }

    pub async fn predict(&self, txn: &Transaction) -> Result<Vec<Prediction>> {
        let candidates = self.history.overlapping(&txn.description).await?;

        let mut accounts = AccountCache::new(self.accounts.as_ref());
        let mut predictions = Vec::new();
        for record in candidates {
            if predictions.len() == self.limit {
                break;
            }
            let Some(account) = accounts.find_active(record.account_id).await? else {
                tracing::debug!(
                    history_id = record.id,
                    account_id = record.account_id,
                    "dropping history with unresolvable account"
                );
                continue;
            };
            predictions.push(Prediction {
                explanation: explanation_for(&record),
                account_id: account.id,
                account_name: account.name,
                confidence: history_confidence(record.frequency),
                source: PredictionSource::Database,
            });
        }
        Ok(predictions)
    }
}
