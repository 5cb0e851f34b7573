//! Callback payload grammar.
//!
//! Inline buttons carry an opaque pipe-delimited string; this module is the
//! single place that parses and produces it. Formats:
//!
//! - `layout|<alias>` and the reserved `layout|go_back_state`
//! - `message|<literalText>`
//! - `command|<commandName>`
//! - `catalogCategory|<categoryId>|<itemsPerPage>`
//! - `catalogLoadMore|<categoryId>|<nextPage>|<itemsPerPage>`
//! - `catalogBackPage|<categoryId>|<prevPage>|<itemsPerPage>`
//! - `productDetails|<productId>`, `order|<productId>`, `addToCart|<productId>`

use std::fmt;
use std::str::FromStr;

use crate::error::ChatBlocksError;

/// Reserved alias that triggers back-navigation instead of a layout switch.
pub const GO_BACK_STATE: &str = "go_back_state";

/// Default page size when a payload omits it.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 3;

/// A parsed callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackPayload {
    /// Switch to the layout with this alias.
    Layout { alias: String },
    /// Return to the previously visited layout.
    GoBack,
    /// Send the literal text back as a message.
    Message { text: String },
    /// Invoke a registered command block.
    Command { name: String },
    /// Open a category (first page).
    CatalogCategory { category_id: i64, items_per_page: u32 },
    /// Advance to the next catalog page.
    CatalogLoadMore {
        category_id: i64,
        page: u32,
        items_per_page: u32,
    },
    /// Return to the previous catalog page.
    CatalogBackPage {
        category_id: i64,
        page: u32,
        items_per_page: u32,
    },
    /// Show the full product card.
    ProductDetails { product_id: i64 },
    /// Start an order for the product.
    Order { product_id: i64 },
    /// Put the product in the cart.
    AddToCart { product_id: i64 },
}

fn parse_id(kind: &str, raw: Option<&str>) -> Result<i64, ChatBlocksError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            ChatBlocksError::internal(format!(
                "callback \"{kind}\": missing or non-numeric id \"{}\"",
                raw.unwrap_or_default()
            ))
        })
}

fn parse_u32_or(raw: Option<&str>, fallback: u32) -> u32 {
    raw.map(str::trim)
        .and_then(|s| s.parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(fallback)
}

impl FromStr for CallbackPayload {
    type Err = ChatBlocksError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split('|');
        let kind = parts.next().unwrap_or_default().trim();
        let second = parts.next();
        let third = parts.next();
        let fourth = parts.next();

        match kind {
            "layout" => {
                let alias = second.unwrap_or_default().trim();
                if alias == GO_BACK_STATE {
                    Ok(Self::GoBack)
                } else if alias.is_empty() {
                    Err(ChatBlocksError::internal("callback \"layout\": empty alias"))
                } else {
                    Ok(Self::Layout {
                        alias: alias.to_string(),
                    })
                }
            }
            "message" => Ok(Self::Message {
                text: second.unwrap_or_default().to_string(),
            }),
            "command" => {
                let name = second.unwrap_or_default().trim();
                if name == GO_BACK_STATE {
                    Ok(Self::GoBack)
                } else {
                    Ok(Self::Command {
                        name: name.to_string(),
                    })
                }
            }
            "catalogCategory" => Ok(Self::CatalogCategory {
                category_id: parse_id(kind, second)?,
                items_per_page: parse_u32_or(third, DEFAULT_ITEMS_PER_PAGE),
            }),
            "catalogLoadMore" | "catalogBackPage" => {
                let category_id = parse_id(kind, second)?;
                let page = parse_u32_or(third, 1);
                let items_per_page = parse_u32_or(fourth, DEFAULT_ITEMS_PER_PAGE);
                if kind == "catalogLoadMore" {
                    Ok(Self::CatalogLoadMore {
                        category_id,
                        page,
                        items_per_page,
                    })
                } else {
                    Ok(Self::CatalogBackPage {
                        category_id,
                        page,
                        items_per_page,
                    })
                }
            }
            "productDetails" => Ok(Self::ProductDetails {
                product_id: parse_id(kind, second)?,
            }),
            "order" => Ok(Self::Order {
                product_id: parse_id(kind, second)?,
            }),
            "addToCart" => Ok(Self::AddToCart {
                product_id: parse_id(kind, second)?,
            }),
            other => Err(ChatBlocksError::internal(format!(
                "unknown callback kind \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for CallbackPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout { alias } => write!(f, "layout|{alias}"),
            Self::GoBack => write!(f, "layout|{GO_BACK_STATE}"),
            Self::Message { text } => write!(f, "message|{text}"),
            Self::Command { name } => write!(f, "command|{name}"),
            Self::CatalogCategory {
                category_id,
                items_per_page,
            } => write!(f, "catalogCategory|{category_id}|{items_per_page}"),
            Self::CatalogLoadMore {
                category_id,
                page,
                items_per_page,
            } => write!(f, "catalogLoadMore|{category_id}|{page}|{items_per_page}"),
            Self::CatalogBackPage {
                category_id,
                page,
                items_per_page,
            } => write!(f, "catalogBackPage|{category_id}|{page}|{items_per_page}"),
            Self::ProductDetails { product_id } => write!(f, "productDetails|{product_id}"),
            Self::Order { product_id } => write!(f, "order|{product_id}"),
            Self::AddToCart { product_id } => write!(f, "addToCart|{product_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_more_round_trip() {
        let payload: CallbackPayload = "catalogLoadMore|42|3|5".parse().unwrap();
        assert_eq!(
            payload,
            CallbackPayload::CatalogLoadMore {
                category_id: 42,
                page: 3,
                items_per_page: 5
            }
        );
        assert_eq!(payload.to_string(), "catalogLoadMore|42|3|5");
    }

    #[test]
    fn every_format_round_trips() {
        let cases = [
            "layout|store_home_page",
            "layout|go_back_state",
            "message|Hello there",
            "command|help",
            "catalogCategory|7|4",
            "catalogLoadMore|42|3|5",
            "catalogBackPage|42|2|5",
            "productDetails|9",
            "order|9",
            "addToCart|9",
        ];
        for raw in cases {
            let payload: CallbackPayload = raw.parse().unwrap();
            assert_eq!(payload.to_string(), raw, "round trip for {raw}");
        }
    }

    #[test]
    fn go_back_via_command_kind() {
        let payload: CallbackPayload = "command|go_back_state".parse().unwrap();
        assert_eq!(payload, CallbackPayload::GoBack);
    }

    #[test]
    fn missing_page_size_defaults() {
        let payload: CallbackPayload = "catalogCategory|7".parse().unwrap();
        assert_eq!(
            payload,
            CallbackPayload::CatalogCategory {
                category_id: 7,
                items_per_page: DEFAULT_ITEMS_PER_PAGE
            }
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!("".parse::<CallbackPayload>().is_err());
        assert!("catalogCategory|not-a-number".parse::<CallbackPayload>().is_err());
        assert!("teleport|somewhere".parse::<CallbackPayload>().is_err());
        assert!("layout|".parse::<CallbackPayload>().is_err());
    }
}
