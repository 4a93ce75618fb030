//! Categories: the inner nodes of the catalog tree.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Product;

/// A folder grouping subcategories and/or products.
///
/// Categories form a strict tree rooted at the Sources folder. A scanned
/// category always has at least one child; empty folders are pruned by the
/// scanner before a `Category` is ever built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Folder name
    pub id: String,
    /// From name.txt, or the cleaned folder name
    pub name: String,
    /// Absolute folder path
    pub path: PathBuf,
    /// Child categories in directory listing order
    pub subcategories: Vec<Category>,
    /// Child products in directory listing order
    pub products: Vec<Product>,
    /// First existing thumbnail candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,
}

impl Category {
    /// Returns true when the category has neither subcategories nor products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subcategories.is_empty() && self.products.is_empty()
    }

    /// Returns true if `id` names a direct subcategory.
    #[must_use]
    pub fn has_subcategory(&self, id: &str) -> bool {
        self.subcategories.iter().any(|sub| sub.id == id)
    }

    /// Direct subcategory with the given id.
    #[must_use]
    pub fn child_category(&self, id: &str) -> Option<&Self> {
        self.subcategories.iter().find(|sub| sub.id == id)
    }

    /// Product listed directly in this category.
    #[must_use]
    pub fn child_product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Total number of products in this subtree.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
            + self
                .subcategories
                .iter()
                .map(Self::product_count)
                .sum::<usize>()
    }

    /// Depth-first search for a category by id, including `self`.
    #[must_use]
    pub fn find_category(&self, id: &str) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.subcategories
            .iter()
            .find_map(|sub| sub.find_category(id))
    }

    /// Depth-first search for a product by id in this subtree.
    ///
    /// Products directly in this category are checked before descending.
    #[must_use]
    pub fn find_product(&self, id: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .or_else(|| self.subcategories.iter().find_map(|sub| sub.find_product(id)))
    }
}

/// Searches a list of root categories for a category by id.
#[must_use]
pub fn find_category<'a>(roots: &'a [Category], id: &str) -> Option<&'a Category> {
    roots.iter().find_map(|root| root.find_category(id))
}

/// Searches a list of root categories for a product by id.
#[must_use]
pub fn find_product<'a>(roots: &'a [Category], id: &str) -> Option<&'a Product> {
    roots.iter().find_map(|root| root.find_product(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            path: PathBuf::from(id),
            media: vec![],
            description: None,
            ai_context: None,
            thumbnail: None,
        }
    }

    fn category(id: &str, subcategories: Vec<Category>, products: Vec<Product>) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_string(),
            path: PathBuf::from(id),
            subcategories,
            products,
            thumbnail: None,
        }
    }

    fn sample_tree() -> Vec<Category> {
        vec![
            category(
                "shoes",
                vec![category("running", vec![], vec![product("sprinter")])],
                vec![product("loafer")],
            ),
            category("bags", vec![], vec![product("tote")]),
        ]
    }

    #[test]
    fn test_is_empty() {
        assert!(category("x", vec![], vec![]).is_empty());
        assert!(!category("x", vec![], vec![product("p")]).is_empty());
    }

    #[test]
    fn test_has_subcategory_only_direct_children() {
        let tree = sample_tree();
        assert!(tree[0].has_subcategory("running"));
        assert!(!tree[0].has_subcategory("bags"));
        assert!(!tree[0].has_subcategory("shoes"));
    }

    #[test]
    fn test_product_count_is_recursive() {
        let tree = sample_tree();
        assert_eq!(tree[0].product_count(), 2);
        assert_eq!(tree[1].product_count(), 1);
    }

    #[test]
    fn test_find_category_and_product() {
        let tree = sample_tree();
        assert_eq!(find_category(&tree, "running").map(|c| c.id.as_str()), Some("running"));
        assert_eq!(find_product(&tree, "sprinter").map(|p| p.id.as_str()), Some("sprinter"));
        assert_eq!(find_product(&tree, "tote").map(|p| p.id.as_str()), Some("tote"));
        assert!(find_category(&tree, "missing").is_none());
        assert!(find_product(&tree, "missing").is_none());
    }
}
