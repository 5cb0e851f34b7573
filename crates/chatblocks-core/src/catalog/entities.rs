//! Catalog entities, read-only to the engine.
//!
//! Products and categories come from an external storage collaborator with
//! relationships already resolved, except discounts, which stay references
//! because their effect depends on the evaluation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CategoryId = i64;
pub type ProductId = i64;
pub type DiscountId = i64;
pub type StatusId = i64;

/// A product category; `parent == None` marks a top-level category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<CategoryId>,
    /// Media URLs; the first one serves as the category banner.
    #[serde(default)]
    pub media: Vec<String>,
}

/// Availability status shown on product cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub alias: String,
    pub label: String,
}

/// Marketing label attached to a product ("🔥HOT" and the like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub alias: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub size: u32,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub discount: Option<DiscountId>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

/// Time-windowed price reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: DiscountId,
    pub enabled: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub fixed_amount: Option<f64>,
}

impl Discount {
    /// Whether the discount applies at `now`.
    pub fn active_at(&self, now: DateTime<Utc>) -> bool {
        self.enabled && now >= self.start_date && now <= self.end_date
    }
}

/// One page of query results plus the page count for the whole match set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
        }
    }
}

/// `ceil(total_items / per_page)`, the pagination contract shared by the
/// engine and every storage implementation.
pub fn total_pages(total_items: usize, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    ((total_items as u64).div_ceil(per_page as u64)) as u32
}
