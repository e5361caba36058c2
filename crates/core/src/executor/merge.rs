//! Candidate merging across stages of one corpus.

use std::collections::HashSet;

use crate::corpus::Candidate;

/// Merge a stage's candidates into the collection, first seen id wins.
///
/// Stages run precision-first, so the kept copy is always the one from
/// the most precise stage that found it.
pub fn merge_candidates<I>(collected: &mut Vec<Candidate>, seen: &mut HashSet<String>, stage: I)
where
    I: IntoIterator<Item = Candidate>,
{
    for candidate in stage {
        if seen.insert(candidate.id.clone()) {
            collected.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorpusKind;
    use crate::strategy::StageKind;

    fn make_candidate(id: &str, title: &str, stage: StageKind) -> Candidate {
        Candidate {
            id: id.to_string(),
            corpus: "wiki".to_string(),
            corpus_kind: CorpusKind::Documents,
            title: title.to_string(),
            snippet: String::new(),
            kind: "page".to_string(),
            status: None,
            created_at: None,
            updated_at: None,
            url: None,
            stage,
            stage_weight: 1.0,
            declared_weight: 1.0,
        }
    }

    #[test]
    fn test_first_seen_wins() {
        let mut collected = Vec::new();
        let mut seen = HashSet::new();

        merge_candidates(
            &mut collected,
            &mut seen,
            vec![make_candidate("a", "first", StageKind::TitleExact)],
        );
        merge_candidates(
            &mut collected,
            &mut seen,
            vec![
                make_candidate("a", "second", StageKind::Strict),
                make_candidate("b", "new", StageKind::Strict),
            ],
        );

        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].title, "first");
        assert_eq!(collected[0].stage, StageKind::TitleExact);
        assert_eq!(collected[1].id, "b");
    }

    #[test]
    fn test_ids_unique_after_merge() {
        let mut collected = Vec::new();
        let mut seen = HashSet::new();
        for _ in 0..3 {
            merge_candidates(
                &mut collected,
                &mut seen,
                vec![
                    make_candidate("a", "x", StageKind::Relaxed),
                    make_candidate("b", "y", StageKind::Relaxed),
                ],
            );
        }
        let ids: HashSet<_> = collected.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), collected.len());
    }

    #[test]
    fn test_collection_order_preserved() {
        let mut collected = Vec::new();
        let mut seen = HashSet::new();
        merge_candidates(
            &mut collected,
            &mut seen,
            vec![
                make_candidate("c", "1", StageKind::TitleExact),
                make_candidate("a", "2", StageKind::TitleExact),
                make_candidate("b", "3", StageKind::TitleExact),
            ],
        );
        let ids: Vec<_> = collected.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
