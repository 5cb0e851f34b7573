//! In-memory catalog repository.
//!
//! Backs tests and demo setups; a real deployment plugs a database-backed
//! implementation into the same trait. Listings are sorted by name (then
//! ID for ties) to satisfy the repository contract.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use chatblocks_core::catalog::{
    Category, CategoryId, Discount, DiscountId, Paginated, Product, ProductId, total_pages,
};
use chatblocks_core::repository::CatalogRepository;

#[derive(Default)]
pub struct MemoryCatalogRepository {
    categories: RwLock<HashMap<CategoryId, Category>>,
    products: RwLock<HashMap<ProductId, Product>>,
    discounts: RwLock<HashMap<DiscountId, Discount>>,
}

impl MemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_category(&self, category: Category) {
        self.categories.write().await.insert(category.id, category);
    }

    pub async fn insert_product(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn insert_discount(&self, discount: Discount) {
        self.discounts.write().await.insert(discount.id, discount);
    }
}

fn sorted_by_name(mut categories: Vec<Category>) -> Vec<Category> {
    categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    categories
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn root_categories(&self) -> Result<Vec<Category>> {
        let categories = self.categories.read().await;
        Ok(sorted_by_name(
            categories
                .values()
                .filter(|c| c.parent.is_none())
                .cloned()
                .collect(),
        ))
    }

    async fn subcategories(&self, parent: CategoryId) -> Result<Vec<Category>> {
        let categories = self.categories.read().await;
        Ok(sorted_by_name(
            categories
                .values()
                .filter(|c| c.parent == Some(parent))
                .cloned()
                .collect(),
        ))
    }

    async fn category_by_id(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn products_page(
        &self,
        category: CategoryId,
        page: u32,
        per_page: u32,
    ) -> Result<Paginated<Product>> {
        let products = self.products.read().await;
        let mut matching: Vec<Product> = products
            .values()
            .filter(|p| p.category_ids.contains(&category))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let pages = total_pages(matching.len(), per_page);
        let start = page.saturating_sub(1) as usize * per_page as usize;
        let items = matching
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();
        Ok(Paginated {
            items,
            total_pages: pages,
        })
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn discount_by_id(&self, id: DiscountId) -> Result<Option<Discount>> {
        Ok(self.discounts.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: CategoryId, name: &str, parent: Option<CategoryId>) -> Category {
        Category {
            id,
            name: name.to_string(),
            description: None,
            parent,
            media: Vec::new(),
        }
    }

    fn product(id: ProductId, name: &str, category: CategoryId) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: None,
            price: 10.0,
            size: 1,
            status: None,
            labels: Vec::new(),
            images: Vec::new(),
            discount: None,
            category_ids: vec![category],
        }
    }

    async fn repo_with_products(count: usize) -> MemoryCatalogRepository {
        let repo = MemoryCatalogRepository::new();
        repo.insert_category(category(1, "Fruit", None)).await;
        for i in 0..count {
            repo.insert_product(product(i as ProductId + 1, &format!("P{:02}", i), 1))
                .await;
        }
        repo
    }

    #[tokio::test]
    async fn sequential_pages_cover_every_product_exactly_once() {
        let repo = repo_with_products(10).await;
        let per_page = 3;

        let first = repo.products_page(1, 1, per_page).await.unwrap();
        assert_eq!(first.total_pages, 4);

        let mut seen = Vec::new();
        for page in 1..=first.total_pages {
            let result = repo.products_page(1, page, per_page).await.unwrap();
            assert_eq!(result.total_pages, 4);
            seen.extend(result.items.into_iter().map(|p| p.name));
        }

        let expected: Vec<String> = (0..10).map(|i| format!("P{:02}", i)).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn page_beyond_range_is_empty_but_counts_pages() {
        let repo = repo_with_products(4).await;
        let result = repo.products_page(1, 5, 3).await.unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages, 2);
    }

    #[tokio::test]
    async fn root_and_subcategories_are_separated_and_sorted() {
        let repo = MemoryCatalogRepository::new();
        repo.insert_category(category(1, "Zoo", None)).await;
        repo.insert_category(category(2, "Aqua", None)).await;
        repo.insert_category(category(3, "Inner", Some(1))).await;

        let roots = repo.root_categories().await.unwrap();
        assert_eq!(
            roots.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Aqua", "Zoo"]
        );

        let children = repo.subcategories(1).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Inner");
        assert!(repo.subcategories(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn products_in_other_categories_are_excluded() {
        let repo = repo_with_products(2).await;
        repo.insert_category(category(2, "Veg", None)).await;
        repo.insert_product(product(99, "Elsewhere", 2)).await;

        let result = repo.products_page(1, 1, 10).await.unwrap();
        assert_eq!(result.items.len(), 2);
        assert!(result.items.iter().all(|p| p.name != "Elsewhere"));
    }
}
