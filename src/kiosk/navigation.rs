//! Navigation state machine: breadcrumb, drill-down, back and home.
//!
//! The state is a plain value. [`NavigationState::reduce`] applies one
//! [`NavAction`] and returns the next state; the `&mut self` helpers do the
//! same in place.
//!
//! ```text
//!            select root category
//!   Home ─────────────────────────▶ CategoryOpen([c])
//!    ▲                                 │  select child    ▲
//!    │ home / breadcrumb(-1)           ▼                  │ back
//!    └──────────────────────────── CategoryOpen([c, d]) ──┘
//!                                      │ select product
//!                                      ▼
//!                                  ProductOpen(p)
//! ```

use serde::Serialize;
use std::path::PathBuf;

use crate::models::{Category, Product};

/// A user navigation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Open a category, drilling down when it is a child of the open one
    OpenCategory(Category),
    /// Show a product's gallery
    OpenProduct(Product),
    /// Pop one level
    Back,
    /// Clear everything
    Home,
    /// Jump to a breadcrumb level; negative means home
    Breadcrumb(i64),
    /// Flip the menu open or closed
    ToggleMenu,
    /// Close the menu
    CloseMenu,
}

/// Where the visitor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// No category open, no product selected
    Home,
    /// A category's children are listed
    CategoryOpen,
    /// A product gallery is shown
    ProductOpen,
}

/// Navigation state of the kiosk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    category_path: Vec<Category>,
    history: Vec<String>,
    selected_product: Option<Product>,
    is_menu_open: bool,
}

impl NavigationState {
    /// A fresh state at Home.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one action and returns the resulting state.
    #[must_use]
    pub fn reduce(mut self, action: NavAction) -> Self {
        self.apply(action);
        self
    }

    /// Applies one action in place.
    pub fn apply(&mut self, action: NavAction) {
        match action {
            NavAction::OpenCategory(category) => self.navigate_to_category(category),
            NavAction::OpenProduct(product) => self.navigate_to_product(product),
            NavAction::Back => self.go_back(),
            NavAction::Home => self.go_home(),
            NavAction::Breadcrumb(index) => self.navigate_to_breadcrumb_level(index),
            NavAction::ToggleMenu => self.toggle_menu(),
            NavAction::CloseMenu => self.close_menu(),
        }
    }

    /// Opens a category.
    ///
    /// A child of the open category is pushed onto the path. Reselecting the
    /// open category keeps the path as it is. Anything else starts a fresh
    /// path at `category`. The menu opens and any selected product is cleared.
    pub fn navigate_to_category(&mut self, category: Category) {
        match self.category_path.last() {
            Some(current) if current.id == category.id => {}
            Some(current) if current.has_subcategory(&category.id) => {
                let parent_id = current.id.clone();
                self.history.push(parent_id);
                self.category_path.push(category);
            }
            _ => {
                self.history.clear();
                self.category_path = vec![category];
            }
        }

        self.selected_product = None;
        self.is_menu_open = true;
    }

    /// Selects a product and closes the menu. The path is untouched.
    pub fn navigate_to_product(&mut self, product: Product) {
        self.selected_product = Some(product);
        self.is_menu_open = false;
    }

    /// Pops one level. Does nothing at Home.
    ///
    /// With a product open but no category path (e.g. the company product),
    /// back returns Home.
    pub fn go_back(&mut self) {
        if self.category_path.is_empty() {
            self.selected_product = None;
            return;
        }

        self.category_path.pop();
        self.history.pop();
        self.selected_product = None;
    }

    /// Clears the path, history and product, and closes the menu.
    pub fn go_home(&mut self) {
        self.category_path.clear();
        self.history.clear();
        self.selected_product = None;
        self.is_menu_open = false;
    }

    /// Truncates the path to `index + 1` entries and reopens the menu there.
    ///
    /// A negative index, or any index while nothing is open, is [`go_home`].
    /// An index past the end keeps the whole path.
    ///
    /// [`go_home`]: Self::go_home
    pub fn navigate_to_breadcrumb_level(&mut self, index: i64) {
        let Ok(index) = usize::try_from(index) else {
            self.go_home();
            return;
        };
        if self.category_path.is_empty() {
            self.go_home();
            return;
        }

        self.category_path.truncate(index.saturating_add(1));
        self.history = self.category_path[..self.category_path.len() - 1]
            .iter()
            .map(|c| c.id.clone())
            .collect();
        self.selected_product = None;
        self.is_menu_open = true;
    }

    /// Flips the menu.
    pub fn toggle_menu(&mut self) {
        self.is_menu_open = !self.is_menu_open;
    }

    /// Closes the menu.
    pub fn close_menu(&mut self) {
        self.is_menu_open = false;
    }

    /// Current screen.
    #[must_use]
    pub fn screen(&self) -> Screen {
        if self.selected_product.is_some() {
            Screen::ProductOpen
        } else if self.category_path.is_empty() {
            Screen::Home
        } else {
            Screen::CategoryOpen
        }
    }

    /// Display names from the root to the open category.
    #[must_use]
    pub fn breadcrumb(&self) -> Vec<String> {
        self.category_path.iter().map(|c| c.name.clone()).collect()
    }

    /// Category ids from the root to the open category.
    #[must_use]
    pub fn path(&self) -> Vec<String> {
        self.category_path.iter().map(|c| c.id.clone()).collect()
    }

    /// The categories from the root to the open one.
    #[must_use]
    pub fn category_path(&self) -> &[Category] {
        &self.category_path
    }

    /// Ids of the categories drilled down from, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The open category.
    #[must_use]
    pub fn current_category(&self) -> Option<&Category> {
        self.category_path.last()
    }

    /// The selected product.
    #[must_use]
    pub fn selected_product(&self) -> Option<&Product> {
        self.selected_product.as_ref()
    }

    /// Whether the menu is open.
    #[must_use]
    pub fn is_menu_open(&self) -> bool {
        self.is_menu_open
    }

    /// Render-ready description of what the menu area shows.
    #[must_use]
    pub fn view(&self, roots: &[Category]) -> MenuView {
        if let Some(product) = &self.selected_product {
            return MenuView::Product {
                id: product.id.clone(),
                name: product.name.clone(),
                media_count: product.media.len(),
            };
        }

        match self.current_category() {
            None => MenuView::Home {
                categories: roots.iter().map(CategoryCard::from).collect(),
            },
            Some(category) if category.is_empty() => MenuView::EmptyCategory {
                id: category.id.clone(),
                name: category.name.clone(),
            },
            Some(category) => MenuView::Category {
                id: category.id.clone(),
                name: category.name.clone(),
                subcategories: category.subcategories.iter().map(CategoryCard::from).collect(),
                products: category.products.iter().map(ProductCard::from).collect(),
            },
        }
    }
}

/// A category tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCard {
    /// Folder name
    pub id: String,
    /// Display name
    pub name: String,
    /// Tile image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,
    /// Products anywhere below this category
    pub product_count: usize,
}

impl From<&Category> for CategoryCard {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            thumbnail: category.thumbnail.clone(),
            product_count: category.product_count(),
        }
    }
}

/// A product tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    /// Folder name
    pub id: String,
    /// Display name
    pub name: String,
    /// Tile image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            thumbnail: product.thumbnail.clone(),
        }
    }
}

/// What the menu area should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum MenuView {
    /// Root categories
    Home {
        /// One tile per root category
        categories: Vec<CategoryCard>,
    },
    /// Children of the open category
    Category {
        /// Folder name of the open category
        id: String,
        /// Display name of the open category
        name: String,
        /// Child category tiles
        subcategories: Vec<CategoryCard>,
        /// Product tiles
        products: Vec<ProductCard>,
    },
    /// The open category has nothing to show
    EmptyCategory {
        /// Folder name of the open category
        id: String,
        /// Display name of the open category
        name: String,
    },
    /// A product gallery is open
    Product {
        /// Folder name of the product
        id: String,
        /// Display name of the product
        name: String,
        /// Number of gallery items
        #[serde(rename = "mediaCount")]
        media_count: usize,
    },
}
