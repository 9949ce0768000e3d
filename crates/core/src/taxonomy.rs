//! Parses merchant-category taxonomy files and derives the category hierarchy.
//!
//! The source format is one category per line, `<id> - Parent > Child > Leaf`,
//! with `#`-prefixed and blank lines ignored. Parsing is two-pass: the whole
//! table is built first, then descendants are linked, since a child line may
//! appear anywhere in the file relative to its ancestors.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Separator between path segments inside a category line.
pub const PATH_SEPARATOR: &str = " > ";
/// Separator between the id and the category path.
const ID_DELIMITER: &str = " - ";

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy source {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    /// Full category path, e.g. `"Apparel > Shoes > Boots"`.
    pub full_path: String,
    pub path_parts: Vec<String>,
    /// Depth in the tree; root categories are level 1.
    pub level: usize,
    /// Leaf label, the last path part.
    pub name: String,
    /// Ids of every category whose path starts with this one's, self included.
    pub subcategory_ids: Vec<String>,
}

/// Immutable category table built once from a taxonomy source.
#[derive(Debug, Default)]
pub struct Taxonomy {
    categories: BTreeMap<String, Category>,
}

impl Taxonomy {
    pub fn from_file(path: &Path) -> Result<Self, TaxonomyError> {
        let text = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Build the category table from taxonomy text. Malformed lines (missing
    /// the ` - ` delimiter) are skipped, not fatal.
    pub fn parse(source: &str) -> Self {
        let mut categories = BTreeMap::new();
        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((id_part, path_part)) = line.split_once(ID_DELIMITER) else {
                continue;
            };
            let id = id_part.trim().to_string();
            let full_path = path_part.trim().to_string();
            let path_parts: Vec<String> = full_path
                .split(PATH_SEPARATOR)
                .map(str::to_string)
                .collect();
            let name = path_parts.last().cloned().unwrap_or_default();
            categories.insert(
                id.clone(),
                Category {
                    id,
                    level: path_parts.len(),
                    name,
                    full_path,
                    path_parts,
                    subcategory_ids: Vec::new(),
                },
            );
        }
        let mut taxonomy = Self { categories };
        taxonomy.link_hierarchy();
        taxonomy
    }

    /// Register every path prefix of every category in a prefix -> ids map,
    /// then hand each category the ids filed under its own full path. Linear
    /// in the total number of path parts. A category registers under its own
    /// full path too; enrichment excludes it again.
    fn link_hierarchy(&mut self) {
        let mut path_to_ids: HashMap<String, Vec<String>> = HashMap::new();
        for category in self.categories.values() {
            for depth in 1..=category.path_parts.len() {
                let prefix = category.path_parts[..depth].join(PATH_SEPARATOR);
                path_to_ids.entry(prefix).or_default().push(category.id.clone());
            }
        }
        for category in self.categories.values_mut() {
            category.subcategory_ids = path_to_ids
                .get(&category.full_path)
                .cloned()
                .unwrap_or_default();
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    /// All categories, id-sorted.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Leaf names of every descendant of `id`, excluding the category itself.
    /// Unknown ids yield an empty list.
    pub fn subcategory_names(&self, id: &str) -> Vec<String> {
        let Some(category) = self.categories.get(id) else {
            return Vec::new();
        };
        category
            .subcategory_ids
            .iter()
            .filter(|sub_id| sub_id.as_str() != id)
            .filter_map(|sub_id| self.categories.get(sub_id))
            .map(|sub| sub.name.clone())
            .collect()
    }

    /// Embedding-ready text for a category: its full path followed by the
    /// names of everything beneath it. Returns `""` for unknown ids.
    pub fn rich_text(&self, id: &str) -> String {
        let Some(category) = self.categories.get(id) else {
            return String::new();
        };
        let mut text = category.full_path.clone();
        let names = self.subcategory_names(id);
        if !names.is_empty() {
            text.push(' ');
            text.push_str(&names.join(" "));
        }
        text
    }

    /// Every category with `level <= max_level`, id-sorted.
    pub fn categories_up_to_level(&self, max_level: usize) -> Vec<&Category> {
        self.categories
            .values()
            .filter(|c| c.level <= max_level)
            .collect()
    }

    /// `(id, rich_text)` pairs for every category up to `max_level`. This is
    /// the payload the embedding pipeline consumes; output is byte-identical
    /// across calls on the same table.
    pub fn rich_categories_for_embedding(&self, max_level: usize) -> Vec<(String, String)> {
        self.categories_up_to_level(max_level)
            .into_iter()
            .map(|c| (c.id.clone(), self.rich_text(&c.id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPAREL: &str = "\
100 - Apparel
101 - Apparel > Shoes
102 - Apparel > Shoes > Boots
";

    const ELECTRONICS: &str = "\
1 - Electronics
2 - Electronics > Phones
3 - Electronics > Phones > Smartphones
";

    #[test]
    fn parse_invariants_hold_for_every_category() {
        let taxonomy = Taxonomy::parse(APPAREL);
        assert_eq!(taxonomy.len(), 3);
        for category in taxonomy.categories() {
            assert_eq!(category.level, category.path_parts.len());
            assert_eq!(category.full_path, category.path_parts.join(PATH_SEPARATOR));
            assert_eq!(category.name, *category.path_parts.last().unwrap());
        }
    }

    #[test]
    fn ids_are_unique_after_parsing() {
        let taxonomy = Taxonomy::parse(APPAREL);
        let ids: Vec<&str> = taxonomy.categories().map(|c| c.id.as_str()).collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }

    #[test]
    fn descendants_exclude_self() {
        let taxonomy = Taxonomy::parse(APPAREL);
        let names = taxonomy.subcategory_names("100");
        assert_eq!(names, vec!["Shoes", "Boots"]);

        // Raw prefix map includes the category itself.
        let apparel = taxonomy.get("100").unwrap();
        assert!(apparel.subcategory_ids.contains(&"100".to_string()));
    }

    #[test]
    fn rich_text_contains_descendants_without_duplicating_own_name() {
        let taxonomy = Taxonomy::parse(APPAREL);
        let text = taxonomy.rich_text("100");
        assert!(text.contains("Shoes"));
        assert!(text.contains("Boots"));
        assert_eq!(text.matches("Apparel").count(), 1);
    }

    #[test]
    fn rich_text_for_unknown_id_is_empty() {
        let taxonomy = Taxonomy::parse(APPAREL);
        assert_eq!(taxonomy.rich_text("does-not-exist"), "");
        assert!(taxonomy.subcategory_names("does-not-exist").is_empty());
    }

    #[test]
    fn comments_and_blank_lines_yield_empty_table() {
        let taxonomy = Taxonomy::parse("# Google_Product_Taxonomy_Version: 2021-09-21\n\n# nothing else\n");
        assert!(taxonomy.is_empty());
        assert!(taxonomy.rich_categories_for_embedding(3).is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let source = "1 - Electronics\nthis line has no delimiter\n2 - Electronics > Phones\n";
        let taxonomy = Taxonomy::parse(source);
        assert_eq!(taxonomy.len(), 2);
    }

    #[test]
    fn descendants_link_regardless_of_line_order() {
        let shuffled = "3 - Electronics > Phones > Smartphones\n1 - Electronics\n2 - Electronics > Phones\n";
        let taxonomy = Taxonomy::parse(shuffled);
        assert_eq!(taxonomy.subcategory_names("1"), vec!["Phones", "Smartphones"]);
    }

    #[test]
    fn categories_up_to_level_filters_by_depth() {
        let taxonomy = Taxonomy::parse(ELECTRONICS);
        let ids: Vec<&str> = taxonomy
            .categories_up_to_level(2)
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn rich_categories_for_embedding_end_to_end() {
        let taxonomy = Taxonomy::parse(ELECTRONICS);
        let rich = taxonomy.rich_categories_for_embedding(2);
        assert_eq!(
            rich,
            vec![
                ("1".to_string(), "Electronics Phones Smartphones".to_string()),
                ("2".to_string(), "Electronics > Phones Smartphones".to_string()),
            ]
        );
    }

    #[test]
    fn rich_categories_for_embedding_is_deterministic() {
        let taxonomy = Taxonomy::parse(ELECTRONICS);
        assert_eq!(
            taxonomy.rich_categories_for_embedding(3),
            taxonomy.rich_categories_for_embedding(3)
        );

        // A second parse of the same source produces identical output too.
        let again = Taxonomy::parse(ELECTRONICS);
        assert_eq!(
            taxonomy.rich_categories_for_embedding(3),
            again.rich_categories_for_embedding(3)
        );
    }
}
