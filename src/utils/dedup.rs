//! Deduplication of papers across providers.
//!
//! Identity is the `link` field alone. The merge policy is last-write-wins:
//! when several records share a link, the record appearing later in the
//! provider concatenation order replaces the earlier one wholesale, while
//! the earlier record's position in the output is kept. There is no
//! field-level merge and no preference between providers.

use std::collections::HashMap;

use crate::models::Paper;

/// Collapse `papers` to one record per `link`.
///
/// Records without a link carry no identity and are all retained.
pub fn dedupe_by_link(papers: Vec<Paper>) -> Vec<Paper> {
    let mut unique: Vec<Paper> = Vec::with_capacity(papers.len());
    let mut seen: HashMap<String, usize> = HashMap::new();

    for paper in papers {
        match paper.link.clone() {
            Some(link) => match seen.get(&link) {
                Some(&slot) => unique[slot] = paper,
                None => {
                    seen.insert(link, unique.len());
                    unique.push(paper);
                }
            },
            None => unique.push(paper),
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaperBuilder, SourceType};

    fn paper(source: SourceType, title: &str, link: Option<&str>) -> Paper {
        PaperBuilder::new(source)
            .title(Some(title.to_string()))
            .link(link.map(str::to_string))
            .build()
    }

    #[test]
    fn test_unique_input_unchanged() {
        let papers = vec![
            paper(SourceType::Arxiv, "A", Some("https://arxiv.org/abs/1")),
            paper(SourceType::Core, "B", Some("https://core.ac.uk/2")),
        ];
        let out = dedupe_by_link(papers.clone());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, papers[0].title);
        assert_eq!(out[1].title, papers[1].title);
    }

    #[test]
    fn test_idempotent() {
        let papers = vec![
            paper(SourceType::Arxiv, "A", Some("https://doi.org/10.1/x")),
            paper(SourceType::Core, "B", Some("https://doi.org/10.1/x")),
            paper(SourceType::CrossRef, "C", Some("https://doi.org/10.1/y")),
        ];
        let once = dedupe_by_link(papers);
        let twice = dedupe_by_link(once.clone());
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.title, b.title);
            assert_eq!(a.link, b.link);
        }
    }

    #[test]
    fn test_last_write_wins() {
        let papers = vec![
            paper(SourceType::Core, "CORE title", Some("https://doi.org/10.1/x")),
            paper(
                SourceType::CrossRef,
                "CrossRef title",
                Some("https://doi.org/10.1/x"),
            ),
        ];
        let out = dedupe_by_link(papers);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.as_deref(), Some("CrossRef title"));
        assert_eq!(out[0].source, SourceType::CrossRef);
    }

    #[test]
    fn test_winner_keeps_first_position() {
        let papers = vec![
            paper(SourceType::Arxiv, "first", Some("https://a/1")),
            paper(SourceType::Core, "dup-early", Some("https://a/2")),
            paper(SourceType::Core, "middle", Some("https://a/3")),
            paper(SourceType::CrossRef, "dup-late", Some("https://a/2")),
        ];
        let out = dedupe_by_link(papers);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].title.as_deref(), Some("dup-late"));
        assert_eq!(out[2].title.as_deref(), Some("middle"));
    }

    #[test]
    fn test_linkless_records_all_retained() {
        let papers = vec![
            paper(SourceType::Arxiv, "A", None),
            paper(SourceType::Core, "B", None),
        ];
        let out = dedupe_by_link(papers);
        assert_eq!(out.len(), 2);
    }
}
