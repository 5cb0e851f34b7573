//! Catalog browsing engine.
//!
//! A state machine over three screens: the category picker (top-level
//! categories), the category layout (banner + subcategories + first
//! product page), and subsequent category pages reached with Next/Back.
//! Page turns delete only the page-scoped messages so the banner and the
//! subcategory menu stay on screen; opening a product's details replaces
//! the whole screen.

use std::sync::Arc;

use chrono::Utc;

use chatblocks_core::block::{CatalogBlock, DisplayMode};
use chatblocks_core::callback::{CallbackPayload, DEFAULT_ITEMS_PER_PAGE};
use chatblocks_core::catalog::{
    Category, CategoryId, Paginated, PriceQuote, Product, ProductId, effective_price, size_icon,
};
use chatblocks_core::error::Result;
use chatblocks_core::repository::CatalogRepository;
use chatblocks_core::session::SessionState;
use chatblocks_core::transport::InlineKeyboard;

use crate::lifecycle;
use crate::outbound::OutboundChannel;

/// Prompt shown under the category picker when the block has none.
const DEFAULT_CATALOG_PROMPT: &str = "Please choose a category:";

/// Engine-level catalog settings.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Layout alias behind the Home shortcut and the page-1 Back button.
    pub home_layout_alias: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            home_layout_alias: "store_home_page".to_string(),
        }
    }
}

pub struct CatalogEngine {
    repository: Arc<dyn CatalogRepository>,
    config: CatalogConfig,
}

/// Category-picker keyboard: two categories per row.
fn category_keyboard(categories: &[Category], items_per_page: u32) -> InlineKeyboard {
    let mut keyboard = InlineKeyboard::new();
    for (index, category) in categories.iter().enumerate() {
        let payload = CallbackPayload::CatalogCategory {
            category_id: category.id,
            items_per_page,
        };
        keyboard = keyboard.text(category.name.clone(), payload.to_string());
        if (index + 1) % 2 == 0 {
            keyboard = keyboard.row();
        }
    }
    keyboard
}

/// Page navigation row: Back, Home, and Next while pages remain.
fn nav_keyboard(
    category_id: CategoryId,
    page: u32,
    total_pages: u32,
    items_per_page: u32,
    home_callback: &str,
) -> InlineKeyboard {
    let back = if page > 1 {
        CallbackPayload::CatalogBackPage {
            category_id,
            page: page - 1,
            items_per_page,
        }
        .to_string()
    } else {
        home_callback.to_string()
    };

    let mut keyboard = InlineKeyboard::new()
        .text("Back", back)
        .text("Home", home_callback);
    if page < total_pages {
        let next = CallbackPayload::CatalogLoadMore {
            category_id,
            page: page + 1,
            items_per_page,
        };
        keyboard = keyboard.text("Next", next.to_string());
    }
    keyboard
}

fn labels_line(product: &Product) -> String {
    product
        .labels
        .iter()
        .map(|label| label.label.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn status_line(product: &Product) -> &str {
    product
        .status
        .as_ref()
        .map(|status| status.label.as_str())
        .unwrap_or("N/A")
}

/// Short list-item view of a product.
fn snippet_text(product: &Product, quote: &PriceQuote) -> String {
    let mut text = format!("<b>{} — {}", product.name, size_icon(product.size));
    let labels = labels_line(product);
    if !labels.is_empty() {
        text.push_str(&format!(" | {labels}"));
    }
    text.push_str("</b>\n");
    text.push_str(&format!("<b>Price:</b> ${}\n", product.price));
    text.push_str(&format!("✅ {}", status_line(product)));
    if quote.discounted() {
        text.push_str(&format!(
            "\n<b>Old Price:</b> ${}\n<b>New Price:</b> ${:.2}",
            quote.original, quote.effective
        ));
    }
    text
}

/// Full single-item view of a product.
fn details_text(product: &Product, quote: &PriceQuote) -> String {
    let mut text = format!("<b>{}</b>\n", product.name);
    if quote.discounted() {
        text.push_str(&format!(
            "<b>Old Price:</b> ${}\n<b>New Price:</b> ${:.2}\n",
            quote.original, quote.effective
        ));
    } else {
        text.push_str(&format!("<b>Price:</b> ${}\n", product.price));
    }
    text.push_str(&format!("<b>Size:</b> {}\n", size_icon(product.size)));
    text.push_str(&format!("<b>Status:</b> {}\n\n", status_line(product)));
    text.push_str(&format!(
        "<b>Description:</b>\n{}\n\n",
        product.description.as_deref().unwrap_or("No description")
    ));
    text.push_str("Choose an action:");
    text
}

impl CatalogEngine {
    pub fn new(repository: Arc<dyn CatalogRepository>, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    pub fn home_layout_alias(&self) -> &str {
        &self.config.home_layout_alias
    }

    fn home_callback(&self) -> String {
        CallbackPayload::Layout {
            alias: self.config.home_layout_alias.clone(),
        }
        .to_string()
    }

    /// Renders the category picker for a catalog block.
    pub async fn render_root(
        &self,
        block: &CatalogBlock,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        let categories = self.repository.root_categories().await?;
        if categories.is_empty() {
            tracing::debug!("[CatalogEngine] no categories to display");
            let message_id = channel
                .send_text("There are no categories yet.", None)
                .await?;
            session.track(message_id);
            return Ok(());
        }

        // Remembered so the category callback can honor the block's mode.
        session.catalog_display_mode = block.display_mode;

        let keyboard = category_keyboard(&categories, block.items_per_page);
        let prompt = block
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(DEFAULT_CATALOG_PROMPT);

        let message_id = match &block.banner {
            Some(banner) if !banner.trim().is_empty() => {
                channel.send_photo(banner, prompt, Some(keyboard)).await?
            }
            _ => channel.send_text(prompt, Some(keyboard)).await?,
        };
        session.track(message_id);
        tracing::debug!(
            "[CatalogEngine] category picker rendered: {} categories in chat {}",
            categories.len(),
            session.chat_id
        );
        Ok(())
    }

    /// Opens a category fresh: the previous screen is fully cleared and the
    /// first page rendered.
    pub async fn open_category(
        &self,
        category_id: CategoryId,
        items_per_page: u32,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        lifecycle::clear_screen(session, channel).await;
        self.render_category(category_id, 1, items_per_page, session, channel)
            .await
    }

    /// Renders a category screen: banner, subcategory menu, one page of
    /// products, and the navigation row.
    pub async fn render_category(
        &self,
        category_id: CategoryId,
        page: u32,
        items_per_page: u32,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        let Some(category) = self.repository.category_by_id(category_id).await? else {
            tracing::warn!("[CatalogEngine] category {} not found", category_id);
            let message_id = channel.send_text("Category was not found.", None).await?;
            session.track(message_id);
            return Ok(());
        };

        let mode = session.catalog_display_mode;
        let subcategories = self.repository.subcategories(category_id).await?;
        let products = self
            .repository
            .products_page(category_id, page, items_per_page)
            .await?;

        if subcategories.is_empty() && products.items.is_empty() && products.total_pages == 0 {
            let message_id = channel.send_text("This category is empty.", None).await?;
            session.track(message_id);
            return Ok(());
        }

        let caption = format!(
            "<b>{}</b>\n{}",
            category.name,
            category.description.as_deref().unwrap_or_default()
        );
        let banner_id = match category.media.first() {
            Some(url) => channel.send_photo(url, &caption, None).await?,
            None => channel.send_text(&caption, None).await?,
        };
        session.track(banner_id);
        session.track_category_layout(banner_id);

        if mode != DisplayMode::Products && !subcategories.is_empty() {
            let keyboard = category_keyboard(&subcategories, items_per_page);
            let message_id = channel.send_text("Subcategories:", Some(keyboard)).await?;
            session.track(message_id);
            session.track_category_layout(message_id);
        }

        if mode != DisplayMode::Subcategories {
            self.render_product_page(category_id, page, items_per_page, &products, session, channel)
                .await?;
        }

        tracing::debug!(
            "[CatalogEngine] category {} rendered: page {} of {}",
            category_id,
            page,
            products.total_pages
        );
        Ok(())
    }

    /// Turns to another page within a category. Only the page-scoped
    /// messages are replaced; banner and subcategory menu stay.
    pub async fn turn_page(
        &self,
        category_id: CategoryId,
        page: u32,
        items_per_page: u32,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        lifecycle::clear_page_group(session, channel).await;

        let products = self
            .repository
            .products_page(category_id, page, items_per_page)
            .await?;
        if products.items.is_empty() {
            let message_id = channel.send_text("No more products.", None).await?;
            session.track(message_id);
            session.track_category_page(message_id);
            return Ok(());
        }

        self.render_product_page(category_id, page, items_per_page, &products, session, channel)
            .await
    }

    async fn render_product_page(
        &self,
        category_id: CategoryId,
        page: u32,
        items_per_page: u32,
        products: &Paginated<Product>,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        if products.items.is_empty() {
            let message_id = channel
                .send_text("No products in this category.", None)
                .await?;
            session.track(message_id);
            session.track_category_page(message_id);
            return Ok(());
        }

        for product in &products.items {
            self.render_snippet(product, session, channel).await?;
        }

        let keyboard = nav_keyboard(
            category_id,
            page,
            products.total_pages,
            items_per_page,
            &self.home_callback(),
        );
        let nav_text = format!("Page: {} of {}", page, products.total_pages);
        let message_id = channel.send_text(&nav_text, Some(keyboard)).await?;
        session.track(message_id);
        session.track_category_page(message_id);
        Ok(())
    }

    async fn quote_for(&self, product: &Product) -> PriceQuote {
        let discount = match product.discount {
            Some(discount_id) => match self.repository.discount_by_id(discount_id).await {
                Ok(discount) => discount,
                Err(err) => {
                    tracing::warn!(
                        "[CatalogEngine] discount {} lookup failed: {}",
                        discount_id,
                        err
                    );
                    None
                }
            },
            None => None,
        };
        effective_price(product.price, discount.as_ref(), Utc::now())
    }

    async fn render_snippet(
        &self,
        product: &Product,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        let quote = self.quote_for(product).await;
        let text = snippet_text(product, &quote);
        let keyboard = InlineKeyboard::new()
            .text(
                "Details",
                CallbackPayload::ProductDetails {
                    product_id: product.id,
                }
                .to_string(),
            )
            .text(
                "Order",
                CallbackPayload::Order {
                    product_id: product.id,
                }
                .to_string(),
            );

        let message_id = match product.images.first() {
            Some(url) => channel.send_photo(url, &text, Some(keyboard)).await?,
            None => channel.send_text(&text, Some(keyboard)).await?,
        };
        session.track(message_id);
        session.track_category_page(message_id);
        Ok(())
    }

    /// Shows the full product card, replacing the whole screen.
    pub async fn render_product_details(
        &self,
        product_id: ProductId,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        lifecycle::clear_screen(session, channel).await;

        let Some(product) = self.repository.product_by_id(product_id).await? else {
            let message_id = channel.send_text("Product was not found.", None).await?;
            session.track(message_id);
            return Ok(());
        };

        let quote = self.quote_for(&product).await;
        let text = details_text(&product, &quote);

        let back = match product.category_ids.first() {
            Some(&category_id) => CallbackPayload::CatalogCategory {
                category_id,
                items_per_page: DEFAULT_ITEMS_PER_PAGE,
            }
            .to_string(),
            None => self.home_callback(),
        };
        let keyboard = InlineKeyboard::new()
            .text(
                "Add to cart",
                CallbackPayload::AddToCart { product_id }.to_string(),
            )
            .text("Back", back)
            .row()
            .text("Order", CallbackPayload::Order { product_id }.to_string());

        let message_id = match product.images.first() {
            Some(url) => channel.send_photo(url, &text, Some(keyboard)).await?,
            None => channel.send_text(&text, Some(keyboard)).await?,
        };
        session.track(message_id);
        tracing::debug!("[CatalogEngine] product {} details rendered", product_id);
        Ok(())
    }

    /// Confirms an order request; actual order handling is external.
    pub async fn acknowledge_order(
        &self,
        product_id: ProductId,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        let Some(product) = self.repository.product_by_id(product_id).await? else {
            let message_id = channel.send_text("Product was not found.", None).await?;
            session.track(message_id);
            return Ok(());
        };
        let message_id = channel
            .send_text(
                &format!(
                    "Your order request for \"{}\" has been received. An operator will contact you shortly.",
                    product.name
                ),
                None,
            )
            .await?;
        session.track(message_id);
        Ok(())
    }

    /// Confirms a cart addition; the cart itself is external.
    pub async fn acknowledge_add_to_cart(
        &self,
        product_id: ProductId,
        session: &mut SessionState,
        channel: &OutboundChannel,
    ) -> Result<()> {
        let Some(product) = self.repository.product_by_id(product_id).await? else {
            let message_id = channel.send_text("Product was not found.", None).await?;
            session.track(message_id);
            return Ok(());
        };
        let message_id = channel
            .send_text(
                &format!("\"{}\" has been added to your cart.", product.name),
                None,
            )
            .await?;
        session.track(message_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatblocks_core::catalog::{Label, Status};
    use chatblocks_core::transport::ButtonAction;

    fn product(name: &str) -> Product {
        Product {
            id: 9,
            name: name.to_string(),
            description: None,
            price: 29.0,
            size: 2,
            status: Some(Status {
                id: 1,
                alias: "available".to_string(),
                label: "Available".to_string(),
            }),
            labels: vec![Label {
                id: 1,
                alias: "hot".to_string(),
                label: "🔥HOT".to_string(),
            }],
            images: Vec::new(),
            discount: None,
            category_ids: vec![4],
        }
    }

    #[test]
    fn snippet_shows_size_icon_labels_and_status() {
        let product = product("Juicy Pear");
        let quote = PriceQuote {
            original: 29.0,
            effective: 29.0,
        };
        let text = snippet_text(&product, &quote);
        assert_eq!(
            text,
            "<b>Juicy Pear — ② | 🔥HOT</b>\n<b>Price:</b> $29\n✅ Available"
        );
    }

    #[test]
    fn snippet_appends_discount_lines_when_active() {
        let product = product("Juicy Pear");
        let quote = PriceQuote {
            original: 29.0,
            effective: 26.1,
        };
        let text = snippet_text(&product, &quote);
        assert!(text.ends_with("<b>Old Price:</b> $29\n<b>New Price:</b> $26.10"));
    }

    #[test]
    fn nav_has_next_only_before_last_page() {
        let keyboard = nav_keyboard(4, 1, 3, 5, "layout|store_home_page");
        let rows: Vec<_> = keyboard.rows().collect();
        let labels: Vec<_> = rows[0].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["Back", "Home", "Next"]);
        assert_eq!(
            rows[0][2].action,
            ButtonAction::Callback("catalogLoadMore|4|2|5".to_string())
        );

        let keyboard = nav_keyboard(4, 3, 3, 5, "layout|store_home_page");
        let rows: Vec<_> = keyboard.rows().collect();
        let labels: Vec<_> = rows[0].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["Back", "Home"]);
    }

    #[test]
    fn back_targets_home_on_first_page_and_previous_page_after() {
        let keyboard = nav_keyboard(4, 1, 3, 5, "layout|store_home_page");
        let rows: Vec<_> = keyboard.rows().collect();
        assert_eq!(
            rows[0][0].action,
            ButtonAction::Callback("layout|store_home_page".to_string())
        );

        let keyboard = nav_keyboard(4, 2, 3, 5, "layout|store_home_page");
        let rows: Vec<_> = keyboard.rows().collect();
        assert_eq!(
            rows[0][0].action,
            ButtonAction::Callback("catalogBackPage|4|1|5".to_string())
        );
    }

    #[test]
    fn categories_lay_out_two_per_row() {
        let categories: Vec<Category> = (1..=5)
            .map(|id| Category {
                id,
                name: format!("C{id}"),
                description: None,
                parent: None,
                media: Vec::new(),
            })
            .collect();
        let keyboard = category_keyboard(&categories, 3);
        let rows: Vec<_> = keyboard.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[2].len(), 1);
        assert_eq!(
            rows[0][0].action,
            ButtonAction::Callback("catalogCategory|1|3".to_string())
        );
    }
}
