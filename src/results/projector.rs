//! Projection of raw backend results

use super::types::{FieldValues, RawHit, RawResults, SearchHit, SearchResultPage};

/// Map a backend result set into a page.
///
/// Hit order and scores are kept as the backend produced them. Only the
/// field names of each hit are re-sorted.
pub fn project(raw: RawResults) -> SearchResultPage {
    SearchResultPage {
        total: raw.total,
        items: raw.hits.into_iter().map(project_hit).collect(),
    }
}

fn project_hit(hit: RawHit) -> SearchHit {
    let mut fields: Vec<FieldValues> = hit
        .fields
        .into_iter()
        .map(|(name, values)| FieldValues { name, values })
        .collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));

    SearchHit {
        id: hit.id,
        score: hit.score,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_sorted() {
        let raw = RawResults {
            total: 1,
            hits: vec![RawHit::new("1", 0.5)
                .with_value("z", "1")
                .with_value("a", "2")
                .with_value("m", "3")],
        };

        let page = project(raw);
        let names: Vec<&str> = page.items[0]
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "m", "z"]);
        assert_eq!(page.items[0].field("m"), Some(&["3".to_string()][..]));
    }

    #[test]
    fn test_hit_order_and_scores_kept() {
        let raw = RawResults {
            total: 7,
            hits: vec![RawHit::new("b", 2.5), RawHit::new("a", 1.25)],
        };

        let page = project(raw);
        assert_eq!(page.total, 7);
        let ids: Vec<&str> = page.items.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(page.items[0].score, 2.5);
        assert_eq!(page.items[1].score, 1.25);
    }

    #[test]
    fn test_multi_valued_field_order_kept() {
        let raw = RawResults {
            total: 1,
            hits: vec![RawHit::new("1", 1.0)
                .with_value("tags", "rust")
                .with_value("tags", "search")],
        };

        let page = project(raw);
        assert_eq!(
            page.items[0].fields,
            vec![FieldValues {
                name: "tags".to_string(),
                values: vec!["rust".to_string(), "search".to_string()],
            }]
        );
    }

    #[test]
    fn test_total_independent_of_items() {
        let page = project(RawResults {
            total: 42,
            hits: vec![],
        });
        assert_eq!(page.total, 42);
        assert!(page.is_empty());
    }
}
