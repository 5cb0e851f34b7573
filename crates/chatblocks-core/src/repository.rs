//! Storage seam.
//!
//! The original system consumed a generic `find(collection, where, page,
//! limit)` query interface; here the same collaborator is expressed as a
//! typed repository trait so the engine cannot misspell a collection or a
//! filter. The pagination contract is unchanged: one page of items plus
//! `ceil(total / per_page)` total pages, sorted by name.

use anyhow::Result;
use async_trait::async_trait;

use crate::catalog::{Category, CategoryId, Discount, DiscountId, Paginated, Product, ProductId};

/// Read access to catalog collections.
///
/// Implementations must sort listings by name and honor the
/// [`Paginated`](crate::catalog::Paginated) contract for `products_page`.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Top-level categories (no parent).
    async fn root_categories(&self) -> Result<Vec<Category>>;

    /// Immediate children of `parent`.
    async fn subcategories(&self, parent: CategoryId) -> Result<Vec<Category>>;

    async fn category_by_id(&self, id: CategoryId) -> Result<Option<Category>>;

    /// One page of the products attached to `category`, sorted by name.
    /// `page` is 1-based.
    async fn products_page(
        &self,
        category: CategoryId,
        page: u32,
        per_page: u32,
    ) -> Result<Paginated<Product>>;

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    async fn discount_by_id(&self, id: DiscountId) -> Result<Option<Discount>>;
}
