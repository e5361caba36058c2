//! The search pipeline facade.
//!
//! Wires keyword extraction, corpus selection, strategy building,
//! execution, scoring and ranking into one entry point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::corpus::CorpusClient;
use crate::executor::{ExecutorError, SearchExecutor};
use crate::keywords::{FallbackExtractor, KeywordBundle, KeywordExtractor};
use crate::metrics;
use crate::ranker::{QualityDistribution, RankedResultSet, Ranker};
use crate::scorer::QualityScorer;
use crate::selector::{CorpusClassifier, CorpusSelector};
use crate::strategy::{CorpusQueryPlan, SearchOptions, StrategyBuilder};

/// Errors that end a search with no result set.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("No corpora configured")]
    NoCorporaConfigured,

    #[error("All corpora failed")]
    AllCorporaFailed(HashMap<String, String>),

    #[error("No client configured for corpus: {0}")]
    MissingClient(String),
}

impl From<ExecutorError> for PipelineError {
    fn from(error: ExecutorError) -> Self {
        match error {
            ExecutorError::AllCorporaFailed(errors) => PipelineError::AllCorporaFailed(errors),
            ExecutorError::MissingClient(corpus) => PipelineError::MissingClient(corpus),
        }
    }
}

/// End-to-end search pipeline over injected capabilities.
pub struct SearchPipeline {
    config: Config,
    extractor: Arc<dyn KeywordExtractor>,
    classifier: Option<Arc<dyn CorpusClassifier>>,
    clients: HashMap<String, Arc<dyn CorpusClient>>,
    fallback: FallbackExtractor,
    selector: CorpusSelector,
    builder: StrategyBuilder,
    executor: SearchExecutor,
    scorer: QualityScorer,
    ranker: Ranker,
}

impl SearchPipeline {
    pub fn new(
        mut config: Config,
        extractor: Arc<dyn KeywordExtractor>,
        clients: HashMap<String, Arc<dyn CorpusClient>>,
    ) -> Self {
        // A corpus without a client can never be queried; dropping it
        // here keeps selection and execution to the reachable ones.
        config.corpora.retain(|corpus| {
            let reachable = clients.contains_key(&corpus.id);
            if !reachable {
                warn!(corpus = %corpus.id, "No client for corpus, excluded from searches");
            }
            reachable
        });

        let selector = CorpusSelector::new(config.pipeline.clone(), config.rules.clone());
        let builder = StrategyBuilder::new(config.query.clone(), config.stages.clone());
        let executor = SearchExecutor::new(
            config.pipeline.sufficiency_threshold,
            Duration::from_secs(config.pipeline.deadline_secs),
        );
        let scorer = QualityScorer::new(config.scoring.clone());
        let ranker = Ranker::new(config.scoring.clone(), config.ranking.clone());

        Self {
            config,
            extractor,
            classifier: None,
            clients,
            fallback: FallbackExtractor::new(),
            selector,
            builder,
            executor,
            scorer,
            ranker,
        }
    }

    /// Attach an optional classifier for corpus selection.
    pub fn with_classifier(mut self, classifier: Arc<dyn CorpusClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Run a full search.
    ///
    /// Deterministic given deterministic capabilities. Returns an empty
    /// result set with an explanatory summary when nothing matched;
    /// fails only when no corpus could be queried at all.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<RankedResultSet, PipelineError> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        if self.config.corpora.is_empty() {
            return Err(PipelineError::NoCorporaConfigured);
        }

        debug!(%request_id, query, "Search started");

        let bundle = match self.extract(query).await {
            Some(bundle) => bundle,
            None => {
                metrics::SEARCHES_TOTAL.with_label_values(&["empty"]).inc();
                return Ok(empty_set("no keywords could be extracted from the query"));
            }
        };
        debug!(
            %request_id,
            keywords = ?bundle.keywords,
            intent = bundle.intent.as_str(),
            "Keywords extracted"
        );

        let selection = self
            .selector
            .select(&bundle, &self.config.corpora, self.classifier.as_deref())
            .await;
        if let Some(top) = selection
            .selected
            .first()
            .and_then(|id| selection.confidences.get(id))
        {
            metrics::SELECTION_CONFIDENCE
                .with_label_values(&[])
                .observe(*top as f64);
        }

        let plans: Vec<CorpusQueryPlan> = selection
            .selected
            .iter()
            .filter_map(|id| self.config.corpora.iter().find(|c| &c.id == id))
            .map(|corpus| self.builder.build_plan(&bundle, corpus, options))
            .collect();

        let report = match self.executor.execute(&plans, &self.clients).await {
            Ok(report) => report,
            Err(e) => {
                metrics::SEARCHES_TOTAL.with_label_values(&["failed"]).inc();
                metrics::SEARCH_DURATION
                    .with_label_values(&["failed"])
                    .observe(started.elapsed().as_secs_f64());
                return Err(e.into());
            }
        };

        let corpus_weights: HashMap<String, f32> = plans
            .iter()
            .map(|plan| (plan.corpus.clone(), plan.declared_weight))
            .collect();
        let scored = self.scorer.score_all(
            report.candidates,
            &bundle,
            &corpus_weights,
            chrono::Utc::now(),
        );

        let mut set = self.ranker.rank(scored, options.max_results);
        if set.results.is_empty() {
            set.summary = format!("no matching results | {}", selection.reasoning);
            metrics::SEARCHES_TOTAL.with_label_values(&["empty"]).inc();
        } else {
            metrics::SEARCHES_TOTAL.with_label_values(&["success"]).inc();
        }
        metrics::SEARCH_DURATION
            .with_label_values(&["success"])
            .observe(started.elapsed().as_secs_f64());
        metrics::RESULTS_RETURNED
            .with_label_values(&[])
            .observe(set.results.len() as f64);

        debug!(
            %request_id,
            results = set.results.len(),
            duration_ms = report.duration_ms,
            "Search finished"
        );
        Ok(set)
    }

    /// Extract keywords, degrading to the heuristic tokenizer when the
    /// injected extractor fails.
    async fn extract(&self, query: &str) -> Option<KeywordBundle> {
        match self.extractor.extract(query).await {
            Ok(bundle) if !bundle.keywords.is_empty() => Some(bundle),
            Ok(_) => {
                warn!("Extractor returned no keywords, using fallback tokenizer");
                self.fallback.extract(query).await.ok()
            }
            Err(e) => {
                warn!(extractor = self.extractor.name(), error = %e, "Extractor failed, using fallback tokenizer");
                self.fallback.extract(query).await.ok()
            }
        }
    }
}

fn empty_set(reason: &str) -> RankedResultSet {
    RankedResultSet {
        results: Vec::new(),
        distribution: QualityDistribution::default(),
        summary: reason.to_string(),
    }
}
