//! Scan command: print the catalog a content root produces.

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::config::ClassificationRule;
use crate::models::Category;
use crate::services::{Catalog, CatalogService};
use clap::Args;
use std::fmt::Write;
use std::path::PathBuf;

/// Scan a content root and print its catalog
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Content root (folder holding Sources/). Defaults to the configured root
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Classification rule: either, media_subfolder or direct
    #[arg(long, value_name = "RULE")]
    pub rule: Option<String>,

    /// Output the full catalog as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    /// Execute the scan command
    pub fn execute(&self) -> CliResult<()> {
        let mut config = load_config(self.root.as_deref())?;
        if let Some(rule) = &self.rule {
            config.scan.rule =
                ClassificationRule::parse(rule).map_err(|e| CliError::validation(e.to_string()))?;
        }

        let sources = config.paths.sources_dir();
        if !sources.is_dir() {
            return Err(CliError::io(format!(
                "Sources folder not found: {}",
                sources.display()
            )));
        }

        let catalog = CatalogService::load(&config).catalog();

        if self.json {
            print_json(&*catalog)
        } else {
            print!("{}", render_tree(&catalog));
            Ok(())
        }
    }
}

/// Renders the catalog as an indented tree.
#[must_use]
pub fn render_tree(catalog: &Catalog) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} categories, {} products",
        catalog.categories.len(),
        catalog.product_count()
    );
    output.push('\n');

    for category in &catalog.categories {
        render_category(&mut output, category, 0);
    }

    if let Some(company) = &catalog.company {
        let _ = writeln!(
            output,
            "\nCompany: {} ({} media)",
            company.name,
            company.media.len()
        );
    }

    output
}

fn render_category(output: &mut String, category: &Category, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(output, "{indent}{}/ [{}]", category.name, category.id);
    for sub in &category.subcategories {
        render_category(output, sub, depth + 1);
    }
    for product in &category.products {
        let _ = writeln!(
            output,
            "{indent}  * {} [{}] ({} images, {} videos)",
            product.name,
            product.id,
            product.image_count(),
            product.video_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;

    #[test]
    fn test_render_tree() {
        let mut catalog = Catalog::empty(60);
        catalog.categories = vec![Category {
            id: "01_Shoes".to_string(),
            name: "Shoes".to_string(),
            path: PathBuf::from("/s"),
            subcategories: vec![],
            products: vec![Product {
                id: "Runner".to_string(),
                name: "Runner".to_string(),
                path: PathBuf::from("/s/r"),
                media: vec![],
                description: None,
                ai_context: None,
                thumbnail: None,
            }],
            thumbnail: None,
        }];

        let tree = render_tree(&catalog);
        assert!(tree.starts_with("1 categories, 1 products"));
        assert!(tree.contains("Shoes/ [01_Shoes]\n  * Runner [Runner] (0 images, 0 videos)"));
    }
}
