//! Catalog domain: entities, pagination, and pricing.

mod entities;
mod pricing;

pub use entities::{
    Category, CategoryId, Discount, DiscountId, Label, Paginated, Product, ProductId, Status,
    StatusId, total_pages,
};
pub use pricing::{PriceQuote, effective_price, size_icon};
