use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{AccountKind, Prediction, PredictionSource, Transaction};
use crate::repository::AccountRepository;
use crate::settings::KeywordRule;

/// Strongest keyword found in a description.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordHit {
    pub keyword: String,
    pub kind: AccountKind,
    pub confidence: f64,
}

/// Lower-cased keyword → (kind, confidence). The first rule wins on duplicates;
/// rules with a confidence outside [0, 1] are skipped.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    entries: HashMap<String, (AccountKind, f64)>,
}

impl KeywordTable {
    pub fn new(rules: &[KeywordRule]) -> Self {
        let mut entries = HashMap::new();
        for rule in rules {
            if !(0.0..=1.0).contains(&rule.confidence) {
                tracing::warn!(
                    keyword = %rule.keyword,
                    confidence = rule.confidence,
                    "skipping keyword rule with confidence outside [0, 1]"
                );
                continue;
            }
            entries
                .entry(rule.keyword.trim().to_lowercase())
                .or_insert((rule.kind, rule.confidence));
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest-confidence keyword among the whitespace tokens of
    /// `description`; ties go to the earliest token.
    pub fn classify(&self, description: &str) -> Option<KeywordHit> {
        let mut best: Option<KeywordHit> = None;
        for token in description.split_whitespace() {
            let token = token.to_lowercase();
            let Some(&(kind, confidence)) = self.entries.get(&token) else {
                continue;
            };
            if best.as_ref().map_or(true, |b| confidence > b.confidence) {
                best = Some(KeywordHit {
                    keyword: token,
                    kind,
                    confidence,
                });
            }
        }
        best
    }
}

pub struct HeuristicClassifier {
    table: KeywordTable,
    accounts: Arc<dyn AccountRepository>,
}

impl HeuristicClassifier {
    pub fn new(table: KeywordTable, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { table, accounts }
    }

    pub async fn predict(&self, txn: &Transaction) -> Result<Vec<Prediction>> {
        let Some(hit) = self.table.classify(&txn.description) else {
            return Ok(Vec::new());
        };
        let Some(account) = self.accounts.first_active_of_kind(hit.kind).await? else {
            tracing::debug!(kind = %hit.kind, keyword = %hit.keyword, "no active account for keyword kind");
            return Ok(Vec::new());
        };
        Ok(vec![Prediction {
            explanation: format!("Keyword '{}' suggests {} account", hit.keyword, hit.kind),
            account_id: account.id,
            account_name: account.name,
            confidence: hit.confidence,
            source: PredictionSource::Ai,
        }])
    }
}
