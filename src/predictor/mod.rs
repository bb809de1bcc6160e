//! Ranked account suggestions for a single transaction.
//!
//! Three independent sources feed the ranking: stored patterns, the
//! history of earlier assignments, and a keyword heuristic. They run
//! concurrently and a failing source contributes nothing instead of
//! failing the whole request.

pub mod heuristic;
pub mod history;
pub mod pattern;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join3;

use crate::error::{LedgerError, Result};
use crate::models::{Account, Prediction, PredictionSource, Transaction};
use crate::repository::{AccountRepository, HistoricalMatchRepository, PatternRepository, SqliteStore};
use crate::settings::PredictionSettings;

pub use heuristic::{HeuristicClassifier, KeywordTable};
pub use history::HistoryMatcher;
pub use pattern::PatternMatcher;

/// Most suggestions a single source may contribute.
pub const MAX_PER_SOURCE: usize = 3;
/// Most suggestions returned for one transaction.
pub const MAX_SUGGESTIONS: usize = 5;

fn capped(name: &str, requested: usize, cap: usize) -> usize {
    if requested > cap {
        tracing::warn!(setting = name, requested, cap, "prediction limit above cap; using cap");
    }
    requested.min(cap)
}

/// Per-request memo of active-account lookups so each id hits the store once.
pub(crate) struct AccountCache<'a> {
    repo: &'a dyn AccountRepository,
    seen: HashMap<i64, Option<Account>>,
}

impl<'a> AccountCache<'a> {
    pub(crate) fn new(repo: &'a dyn AccountRepository) -> Self {
        Self {
            repo,
            seen: HashMap::new(),
        }
    }

    pub(crate) async fn find_active(&mut self, id: i64) -> Result<Option<Account>> {
        if let Some(hit) = self.seen.get(&id) {
            return Ok(hit.clone());
        }
        let account = self.repo.find_active(id).await?;
        self.seen.insert(id, account.clone());
        Ok(account)
    }
}

pub struct Predictor {
    patterns: PatternMatcher,
    history: HistoryMatcher,
    heuristic: HeuristicClassifier,
    max_suggestions: usize,
}

impl Predictor {
    pub fn new(
        patterns: Arc<dyn PatternRepository>,
        history: Arc<dyn HistoricalMatchRepository>,
        accounts: Arc<dyn AccountRepository>,
        settings: &PredictionSettings,
    ) -> Self {
        let table = KeywordTable::new(&settings.keywords);
        if table.is_empty() {
            tracing::warn!("keyword table is empty; heuristic suggestions are disabled");
        } else {
            tracing::debug!(keywords = table.len(), "keyword table loaded");
        }
        let per_source = capped("per_source_limit", settings.per_source_limit, MAX_PER_SOURCE);
        Self {
            patterns: PatternMatcher::new(
                patterns,
                accounts.clone(),
                settings.min_pattern_confidence,
                per_source,
            ),
            history: HistoryMatcher::new(history, accounts.clone(), per_source),
            heuristic: HeuristicClassifier::new(table, accounts),
            max_suggestions: capped("max_suggestions", settings.max_suggestions, MAX_SUGGESTIONS),
        }
    }

    pub fn from_store(store: SqliteStore, settings: &PredictionSettings) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store, settings)
    }

    /// Suggestions for `txn`, best first.
    ///
    /// Returns an error only when every source failed; "no match" is an empty list.
    pub async fn predict(&self, txn: &Transaction) -> Result<Vec<Prediction>> {
        let (patterns, history, heuristic) = join3(
            self.patterns.predict(txn),
            self.history.predict(txn),
            self.heuristic.predict(txn),
        )
        .await;

        let mut batches = Vec::with_capacity(3);
        let mut failures = Vec::new();
        for (source, outcome) in [
            (PredictionSource::Pattern, patterns),
            (PredictionSource::Database, history),
            (PredictionSource::Ai, heuristic),
        ] {
            match outcome {
                Ok(predictions) => {
                    tracing::debug!(txn_id = txn.id, %source, count = predictions.len(), "source finished");
                    batches.push(predictions);
                }
                Err(e) => {
                    tracing::warn!(txn_id = txn.id, %source, error = %e, "prediction source failed; skipping");
                    failures.push(format!("{source}: {e}"));
                }
            }
        }

        if batches.is_empty() {
            return Err(LedgerError::PredictionUnavailable(failures.join("; ")));
        }
        Ok(rank(batches, self.max_suggestions))
    }
}

/// Concatenates per-source batches (in source order) and keeps the `limit`
/// most confident. Equal confidences keep their concatenated order and no
/// deduplication by account is done.
pub fn rank(batches: Vec<Vec<Prediction>>, limit: usize) -> Vec<Prediction> {
    let mut all: Vec<Prediction> = batches.into_iter().flatten().collect();
    all.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    all.truncate(limit);
    all
}


#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::fixtures::*;
    use super::*;
    use crate::models::{Account, AccountKind, HistoricalMatch, Pattern};
    use crate::settings::KeywordRule;

    struct Unavailable;

    #[async_trait]
    impl PatternRepository for Unavailable {
        async fn enabled_patterns(&self) -> Result<Vec<Pattern>> {
            Err(LedgerError::MalformedPattern("pattern 3 has weight 7 outside [0, 1]".into()))
        }
    }

    #[async_trait]
    impl HistoricalMatchRepository for Unavailable {
        async fn overlapping(&self, _description: &str) -> Result<Vec<HistoricalMatch>> {
            Err(LedgerError::Settings("history store offline".into()))
        }
    }

    #[async_trait]
    impl AccountRepository for Unavailable {
        async fn find_active(&self, _id: i64) -> Result<Option<Account>> {
            Err(LedgerError::Settings("account store offline".into()))
        }

        async fn first_active_of_kind(&self, _kind: AccountKind) -> Result<Option<Account>> {
            Err(LedgerError::Settings("account store offline".into()))
        }
    }

    fn predictor(store: SqliteStore) -> Predictor {
        Predictor::from_store(store, &PredictionSettings::default())
    }

    fn prediction(confidence: f64, source: PredictionSource, account_id: i64) -> Prediction {
        Prediction {
            explanation: String::new(),
            account_id,
            account_name: format!("acct {account_id}"),
            confidence,
            source,
        }
    }

    #[tokio::test]
    async fn test_salary_deposit_gets_pattern_and_keyword_suggestions() {
        let (_dir, store, conn) = test_store();
        add_pattern(&conn, "salary", "keyword", "4000", 0.9);
        let preds = predictor(store).predict(&txn("MONTHLY SALARY DEPOSIT")).await.unwrap();

        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].source, PredictionSource::Ai);
        assert_eq!(preds[0].confidence, 0.9);
        assert_eq!(preds[1].source, PredictionSource::Pattern);
        assert!((preds[1].confidence - 0.81).abs() < 1e-9);
        assert!(preds.iter().all(|p| p.account_name == "Salary Income"));
    }

    #[tokio::test]
    async fn test_frequent_history_scores_cap() {
        let (_dir, store, conn) = test_store();
        add_history(&conn, "CITY WATER CO", "5100", 4, "2025-02-01 10:00:00");
        let preds = predictor(store).predict(&txn("CITY WATER CO")).await.unwrap();
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].confidence, 0.9);
        assert_eq!(preds[0].source, PredictionSource::Database);
    }

    #[tokio::test]
    async fn test_unmatched_description_yields_empty_list() {
        let (_dir, store, _conn) = test_store();
        let preds = predictor(store).predict(&txn("XYZ RANDOM TEXT 123")).await.unwrap();
        assert!(preds.is_empty());
    }

    #[tokio::test]
    async fn test_exact_rent_pattern() {
        let (_dir, store, conn) = test_store();
        add_pattern(&conn, "RENT PAYMENT", "exact", "5000", 0.95);
        let preds = predictor(store).predict(&txn("RENT PAYMENT")).await.unwrap();
        let pattern = preds.iter().find(|p| p.source == PredictionSource::Pattern).unwrap();
        assert_eq!(pattern.confidence, 0.95);
        assert_eq!(pattern.account_name, "Rent / Lease");
    }

    #[tokio::test]
    async fn test_equal_confidence_orders_pattern_database_ai() {
        let (_dir, store, conn) = test_store();
        add_pattern(&conn, "salary", "keyword", "4100", 1.0);
        add_history(&conn, "ACME SALARY", "4200", 4, "2025-02-01 10:00:00");
        let preds = predictor(store).predict(&txn("ACME SALARY")).await.unwrap();
        let sources: Vec<PredictionSource> = preds.iter().map(|p| p.source).collect();
        assert_eq!(
            sources,
            vec![PredictionSource::Pattern, PredictionSource::Database, PredictionSource::Ai]
        );
        assert!(preds.iter().all(|p| (p.confidence - 0.9).abs() < 1e-9));
    }

    #[tokio::test]
    async fn test_output_bounded_to_five() {
        let (_dir, store, conn) = test_store();
        for code in ["5300", "5400", "5500", "5600"] {
            add_pattern(&conn, "rent", "keyword", code, 1.0);
            add_history(&conn, "OFFICE RENT", code, 2, "2025-01-01 00:00:00");
        }
        let preds = predictor(store).predict(&txn("OFFICE RENT")).await.unwrap();
        assert_eq!(preds.len(), 5);
        let pattern_count = preds.iter().filter(|p| p.source == PredictionSource::Pattern).count();
        assert_eq!(pattern_count, 3);
    }

    #[tokio::test]
    async fn test_configured_limits_cannot_exceed_caps() {
        let (_dir, store, conn) = test_store();
        for code in ["5300", "5400", "5500", "5600", "5900"] {
            add_pattern(&conn, "rent", "keyword", code, 1.0);
            add_history(&conn, "OFFICE RENT", code, 2, "2025-01-01 00:00:00");
        }
        let settings = PredictionSettings {
            max_suggestions: 50,
            per_source_limit: 20,
            ..PredictionSettings::default()
        };
        let preds = Predictor::from_store(store, &settings)
            .predict(&txn("OFFICE RENT"))
            .await
            .unwrap();
        assert_eq!(preds.len(), MAX_SUGGESTIONS);
        let pattern_count = preds.iter().filter(|p| p.source == PredictionSource::Pattern).count();
        assert_eq!(pattern_count, MAX_PER_SOURCE);
    }

    #[tokio::test]
    async fn test_out_of_range_keyword_confidence_never_reaches_output() {
        let (_dir, store, _conn) = test_store();
        let settings = PredictionSettings {
            keywords: vec![KeywordRule {
                keyword: "salary".to_string(),
                kind: AccountKind::Income,
                confidence: 1.5,
            }],
            ..PredictionSettings::default()
        };
        let preds = Predictor::from_store(store, &settings)
            .predict(&txn("SALARY"))
            .await
            .unwrap();
        assert!(preds.iter().all(|p| (0.0..=1.0).contains(&p.confidence)));
        assert!(preds.is_empty());
    }

    #[tokio::test]
    async fn test_account_cache_hits_store_once_per_id() {
        let (_dir, store, conn) = test_store();
        let accounts = CountingAccounts::new(store);
        let mut cache = AccountCache::new(&accounts);
        let rent = account_id(&conn, "5000");
        for _ in 0..3 {
            assert!(cache.find_active(rent).await.unwrap().is_some());
            assert!(cache.find_active(9999).await.unwrap().is_none());
        }
        assert_eq!(accounts.lookups(), 2);
    }

    #[tokio::test]
    async fn test_same_account_from_several_sources_is_not_deduplicated() {
        let (_dir, store, conn) = test_store();
        add_pattern(&conn, "rent", "keyword", "5000", 1.0);
        add_history(&conn, "OFFICE RENT", "5000", 1, "2025-01-01 00:00:00");
        let preds = predictor(store).predict(&txn("OFFICE RENT")).await.unwrap();
        assert_eq!(preds.len(), 3);
        let rent_id = account_id(&conn, "5000");
        assert!(preds.iter().all(|p| p.account_id == rent_id));
    }

    #[tokio::test]
    async fn test_failing_pattern_source_leaves_others_intact() {
        let (_dir, store, conn) = test_store();
        add_pattern(&conn, "salary", "keyword", "4000", 1.0);
        add_history(&conn, "MONTHLY SALARY", "4100", 1, "2025-01-01 00:00:00");
        let store = Arc::new(store);
        let predictor = Predictor::new(
            Arc::new(Unavailable),
            store.clone(),
            store,
            &PredictionSettings::default(),
        );
        let preds = predictor.predict(&txn("MONTHLY SALARY")).await.unwrap();
        let sources: Vec<PredictionSource> = preds.iter().map(|p| p.source).collect();
        assert_eq!(sources, vec![PredictionSource::Ai, PredictionSource::Database]);
    }

    #[tokio::test]
    async fn test_every_source_failing_is_an_error() {
        let predictor = Predictor::new(
            Arc::new(Unavailable),
            Arc::new(Unavailable),
            Arc::new(Unavailable),
            &PredictionSettings::default(),
        );
        let err = predictor.predict(&txn("MONTHLY SALARY")).await.unwrap_err();
        assert!(matches!(err, LedgerError::PredictionUnavailable(_)));
    }

    #[tokio::test]
    async fn test_sources_without_matches_do_not_count_as_failures() {
        let predictor = Predictor::new(
            Arc::new(Unavailable),
            Arc::new(Unavailable),
            Arc::new(Unavailable),
            &PredictionSettings::default(),
        );
        // No keyword hit means the heuristic never touches the account store.
        let preds = predictor.predict(&txn("XYZ RANDOM TEXT 123")).await.unwrap();
        assert!(preds.is_empty());
    }

    #[test]
    fn test_rank_sorts_stably_and_truncates() {
        let batches = vec![
            vec![prediction(0.7, PredictionSource::Pattern, 1), prediction(0.6, PredictionSource::Pattern, 2)],
            vec![prediction(0.9, PredictionSource::Database, 3), prediction(0.7, PredictionSource::Database, 4)],
            vec![prediction(0.7, PredictionSource::Ai, 5)],
        ];
        let ranked = rank(batches, 4);
        let ids: Vec<i64> = ranked.iter().map(|p| p.account_id).collect();
        assert_eq!(ids, vec![3, 1, 4, 5]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(vec![Vec::new(), Vec::new(), Vec::new()], 5).is_empty());
    }
}
