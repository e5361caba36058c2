//! Builds the three-stage query sequence for each corpus.
//!
//! Stages go from precise to broad: title match, full-text AND,
//! full-text OR with synonym expansion. Pure string construction,
//! no I/O.

use std::collections::HashSet;

use crate::config::{CorpusConfig, CorpusKind, QueryConfig, StageConfig};
use crate::keywords::KeywordBundle;

use super::{CorpusQueryPlan, Operator, QueryStage, SearchOptions, StageKind};

/// Builds per-corpus query plans from a keyword bundle.
pub struct StrategyBuilder {
    query: QueryConfig,
    stages: StageConfig,
}

impl StrategyBuilder {
    pub fn new(query: QueryConfig, stages: StageConfig) -> Self {
        Self { query, stages }
    }

    /// Build the full stage sequence for one corpus.
    pub fn build_plan(
        &self,
        bundle: &KeywordBundle,
        corpus: &CorpusConfig,
        options: &SearchOptions,
    ) -> CorpusQueryPlan {
        let filters = self.build_filters(corpus, options);
        let declared_weight = options
            .corpus_weights
            .get(&corpus.id)
            .copied()
            .unwrap_or(corpus.weight);
        let stage_weight = |kind: StageKind, configured: f32| {
            options
                .stage_weights
                .get(kind.as_str())
                .copied()
                .unwrap_or(configured)
        };

        let mut stages = Vec::with_capacity(3);
        if let Some(query) = self.title_query(bundle, corpus.kind) {
            stages.push(QueryStage {
                index: stages.len(),
                kind: StageKind::TitleExact,
                operator: Operator::Or,
                query: append_filters(query, &filters),
                max_results: self.stages.title_exact_max_results,
                weight: stage_weight(StageKind::TitleExact, self.stages.title_exact_weight),
            });
        }
        if let Some(query) = self.strict_query(bundle, corpus.kind) {
            stages.push(QueryStage {
                index: stages.len(),
                kind: StageKind::Strict,
                operator: Operator::And,
                query: append_filters(query, &filters),
                max_results: self.stages.strict_max_results,
                weight: stage_weight(StageKind::Strict, self.stages.strict_weight),
            });
        }
        if let Some(query) = self.relaxed_query(bundle, corpus.kind) {
            stages.push(QueryStage {
                index: stages.len(),
                kind: StageKind::Relaxed,
                operator: Operator::Or,
                query: append_filters(query, &filters),
                max_results: self.stages.relaxed_max_results,
                weight: stage_weight(StageKind::Relaxed, self.stages.relaxed_weight),
            });
        }

        CorpusQueryPlan {
            corpus: corpus.id.clone(),
            corpus_kind: corpus.kind,
            declared_weight,
            stages,
        }
    }

    /// Title OR query over the top keywords.
    fn title_query(&self, bundle: &KeywordBundle, kind: CorpusKind) -> Option<String> {
        let field = title_field(kind);
        let clauses: Vec<String> = bundle
            .keywords
            .iter()
            .take(self.query.title_keyword_limit)
            .map(|kw| format!("{field} ~ \"{}\"", quote(kw)))
            .collect();
        join_clauses(clauses, " OR ")
    }

    /// Full-text AND query over all keywords.
    fn strict_query(&self, bundle: &KeywordBundle, _kind: CorpusKind) -> Option<String> {
        let clauses: Vec<String> = bundle
            .keywords
            .iter()
            .map(|kw| format!("text ~ \"{}\"", quote(kw)))
            .collect();
        join_clauses(clauses, " AND ")
    }

    /// Full-text OR query with stop words removed and up to one synonym
    /// appended per surviving keyword.
    fn relaxed_query(&self, bundle: &KeywordBundle, _kind: CorpusKind) -> Option<String> {
        let terms = self.relaxed_terms(&bundle.keywords);
        let clauses: Vec<String> = terms
            .iter()
            .map(|t| format!("text ~ \"{}\"", quote(t)))
            .collect();
        join_clauses(clauses, " OR ")
    }

    fn relaxed_terms(&self, keywords: &[String]) -> Vec<String> {
        let stop_words: HashSet<String> = self
            .query
            .stop_words
            .iter()
            .map(|s| s.to_lowercase())
            .collect();

        let mut surviving: Vec<String> = keywords
            .iter()
            .filter(|kw| !stop_words.contains(&kw.to_lowercase()))
            .cloned()
            .collect();
        // All keywords gone means they were all noise, keep them anyway.
        if surviving.is_empty() {
            surviving = keywords.to_vec();
        }

        let mut seen: HashSet<String> = surviving.iter().map(|s| s.to_lowercase()).collect();
        let mut terms = Vec::new();
        for keyword in &surviving {
            terms.push(keyword.clone());
            if let Some(synonyms) = self.query.synonyms.get(&keyword.to_lowercase()) {
                if let Some(synonym) = synonyms.iter().find(|s| !seen.contains(&s.to_lowercase()))
                {
                    seen.insert(synonym.to_lowercase());
                    terms.push(synonym.clone());
                }
            }
        }
        terms.truncate(self.query.relaxed_term_limit);
        terms
    }

    /// Corpus-scoped filter clauses, always ANDed onto the stage query.
    fn build_filters(&self, corpus: &CorpusConfig, options: &SearchOptions) -> Vec<String> {
        let mut filters = Vec::new();

        if let Some(category) = options.categories.get(&corpus.id) {
            let field = corpus
                .category_field
                .clone()
                .unwrap_or_else(|| default_category_field(corpus.kind).to_string());
            filters.push(format!("{field} = \"{}\"", quote(category)));
        }

        let date_field = date_field(corpus.kind);
        if let Some(from) = options.date_from {
            filters.push(format!("{date_field} >= \"{}\"", from.format("%Y-%m-%d")));
        }
        if let Some(to) = options.date_to {
            filters.push(format!("{date_field} <= \"{}\"", to.format("%Y-%m-%d")));
        }

        if !options.include_soft_deleted {
            filters.push(match corpus.kind {
                CorpusKind::Documents => "status != \"trashed\"".to_string(),
                CorpusKind::Tickets => "status != \"Deleted\"".to_string(),
            });
        }

        filters
    }
}

fn title_field(kind: CorpusKind) -> &'static str {
    match kind {
        CorpusKind::Documents => "title",
        CorpusKind::Tickets => "summary",
    }
}

fn date_field(kind: CorpusKind) -> &'static str {
    match kind {
        CorpusKind::Documents => "lastmodified",
        CorpusKind::Tickets => "updated",
    }
}

fn default_category_field(kind: CorpusKind) -> &'static str {
    match kind {
        CorpusKind::Documents => "space",
        CorpusKind::Tickets => "project",
    }
}

fn quote(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

fn join_clauses(clauses: Vec<String>, separator: &str) -> Option<String> {
    if clauses.is_empty() {
        None
    } else if clauses.len() == 1 {
        Some(clauses.into_iter().next().unwrap_or_default())
    } else {
        Some(format!("({})", clauses.join(separator)))
    }
}

fn append_filters(query: String, filters: &[String]) -> String {
    if filters.is_empty() {
        query
    } else {
        format!("{query} AND {}", filters.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::SearchIntent;
    use chrono::{TimeZone, Utc};

    fn make_builder() -> StrategyBuilder {
        StrategyBuilder::new(QueryConfig::default(), StageConfig::default())
    }

    fn make_bundle(keywords: &[&str]) -> KeywordBundle {
        KeywordBundle::new(
            keywords.iter().map(|s| s.to_string()).collect(),
            SearchIntent::General,
            0.8,
        )
    }

    fn make_corpus(id: &str, kind: CorpusKind) -> CorpusConfig {
        CorpusConfig {
            id: id.to_string(),
            kind,
            weight: 1.0,
            category_field: None,
            http: None,
        }
    }

    #[test]
    fn test_plan_has_three_stages_in_order() {
        let builder = make_builder();
        let bundle = make_bundle(&["login", "auth"]);
        let corpus = make_corpus("confluence", CorpusKind::Documents);
        let plan = builder.build_plan(&bundle, &corpus, &SearchOptions::default());

        assert_eq!(plan.stages.len(), 3);
        assert_eq!(plan.stages[0].kind, StageKind::TitleExact);
        assert_eq!(plan.stages[1].kind, StageKind::Strict);
        assert_eq!(plan.stages[2].kind, StageKind::Relaxed);
        assert_eq!(plan.stages[0].weight, 1.0);
        assert_eq!(plan.stages[1].weight, 0.8);
        assert_eq!(plan.stages[2].weight, 0.6);
        assert_eq!(plan.stages[0].max_results, 50);
        assert_eq!(plan.stages[1].max_results, 100);
        assert_eq!(plan.stages[2].max_results, 150);
    }

    #[test]
    fn test_title_stage_is_or_over_top_keywords() {
        let builder = make_builder();
        let bundle = make_bundle(&["login", "auth", "mobile", "crash"]);
        let corpus = make_corpus("confluence", CorpusKind::Documents);
        let plan = builder.build_plan(&bundle, &corpus, &SearchOptions::default());

        let title = &plan.stages[0];
        assert_eq!(title.operator, Operator::Or);
        assert!(title.query.contains("title ~ \"login\""));
        assert!(title.query.contains("title ~ \"mobile\""));
        // Fourth keyword is beyond the title limit
        assert!(!title.query.contains("crash"));
    }

    #[test]
    fn test_strict_stage_is_and_over_all_keywords() {
        let builder = make_builder();
        let bundle = make_bundle(&["login", "auth", "mobile", "crash"]);
        let corpus = make_corpus("jira", CorpusKind::Tickets);
        let plan = builder.build_plan(&bundle, &corpus, &SearchOptions::default());

        let strict = &plan.stages[1];
        assert_eq!(strict.operator, Operator::And);
        assert!(strict.query.contains("text ~ \"crash\""));
        assert!(strict.query.contains(" AND "));
    }

    #[test]
    fn test_tickets_title_stage_uses_summary_field() {
        let builder = make_builder();
        let bundle = make_bundle(&["login"]);
        let corpus = make_corpus("jira", CorpusKind::Tickets);
        let plan = builder.build_plan(&bundle, &corpus, &SearchOptions::default());
        assert!(plan.stages[0].query.contains("summary ~ \"login\""));
    }

    #[test]
    fn test_relaxed_stage_adds_synonyms_and_drops_stop_words() {
        let builder = make_builder();
        let bundle = make_bundle(&["login", "the", "error"]);
        let corpus = make_corpus("confluence", CorpusKind::Documents);
        let plan = builder.build_plan(&bundle, &corpus, &SearchOptions::default());

        let relaxed = &plan.stages[2];
        assert!(!relaxed.query.contains("\"the\""));
        // One synonym per surviving keyword
        assert!(relaxed.query.contains("signin") || relaxed.query.contains("authentication"));
        assert!(relaxed.query.contains("failure") || relaxed.query.contains("exception"));
    }

    #[test]
    fn test_relaxed_terms_respect_cap() {
        let config = QueryConfig {
            relaxed_term_limit: 3,
            ..Default::default()
        };
        let builder = StrategyBuilder::new(config, StageConfig::default());
        let terms = builder.relaxed_terms(&[
            "login".to_string(),
            "error".to_string(),
            "api".to_string(),
            "config".to_string(),
        ]);
        assert_eq!(terms.len(), 3);
    }

    #[test]
    fn test_relaxed_all_stop_words_keeps_originals() {
        let builder = make_builder();
        let terms = builder.relaxed_terms(&["the".to_string(), "of".to_string()]);
        assert_eq!(terms, vec!["the".to_string(), "of".to_string()]);
    }

    #[test]
    fn test_filters_applied_to_every_stage() {
        let builder = make_builder();
        let bundle = make_bundle(&["login"]);
        let corpus = make_corpus("confluence", CorpusKind::Documents);
        let mut options = SearchOptions::default();
        options
            .categories
            .insert("confluence".to_string(), "ENG".to_string());
        options.date_from = Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());

        let plan = builder.build_plan(&bundle, &corpus, &options);
        for stage in &plan.stages {
            assert!(stage.query.contains("space = \"ENG\""), "{}", stage.query);
            assert!(stage.query.contains("lastmodified >= \"2024-01-15\""));
            assert!(stage.query.contains("status != \"trashed\""));
        }
    }

    #[test]
    fn test_soft_deleted_included_drops_exclusion() {
        let builder = make_builder();
        let bundle = make_bundle(&["login"]);
        let corpus = make_corpus("jira", CorpusKind::Tickets);
        let options = SearchOptions {
            include_soft_deleted: true,
            ..Default::default()
        };
        let plan = builder.build_plan(&bundle, &corpus, &options);
        for stage in &plan.stages {
            assert!(!stage.query.contains("Deleted"));
        }
    }

    #[test]
    fn test_corpus_weight_override() {
        let builder = make_builder();
        let bundle = make_bundle(&["login"]);
        let corpus = make_corpus("jira", CorpusKind::Tickets);
        let mut options = SearchOptions::default();
        options.corpus_weights.insert("jira".to_string(), 0.5);
        let plan = builder.build_plan(&bundle, &corpus, &options);
        assert_eq!(plan.declared_weight, 0.5);
    }

    #[test]
    fn test_stage_weight_override() {
        let builder = make_builder();
        let bundle = make_bundle(&["login"]);
        let corpus = make_corpus("confluence", CorpusKind::Documents);
        let mut options = SearchOptions::default();
        options.stage_weights.insert("strict".to_string(), 0.9);
        let plan = builder.build_plan(&bundle, &corpus, &options);
        assert_eq!(plan.stages[0].weight, 1.0);
        assert_eq!(plan.stages[1].weight, 0.9);
    }

    #[test]
    fn test_keyword_quoting() {
        let builder = make_builder();
        let bundle = make_bundle(&["log\"in"]);
        let corpus = make_corpus("confluence", CorpusKind::Documents);
        let plan = builder.build_plan(&bundle, &corpus, &SearchOptions::default());
        assert!(plan.stages[0].query.contains("log\\\"in"));
    }

    #[test]
    fn test_empty_bundle_yields_no_stages() {
        let builder = make_builder();
        let bundle = make_bundle(&[]);
        let corpus = make_corpus("confluence", CorpusKind::Documents);
        let plan = builder.build_plan(&bundle, &corpus, &SearchOptions::default());
        assert!(plan.stages.is_empty());
    }
}
