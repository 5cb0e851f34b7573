//! Block tree domain model.
//!
//! Admin configuration produces a nested tree of blocks; the engine walks
//! it read-only at render time. The tree is a tagged union discriminated by
//! `blockType`. The admin schema has used several spellings for the same
//! tag over time (`MessageBlock`, `message-blocks`, `messageblock`), so
//! deserialization normalizes the tag instead of matching it verbatim, and
//! folds unrecognized tags into [`Block::Unknown`] so rendering can fail
//! soft per block rather than rejecting the whole interface.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{ChatBlocksError, Result};

/// What pressing a button should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CallbackKind {
    /// Send a literal message back.
    Message,
    /// Open the layout named by the button data.
    Layout,
    /// Invoke a registered command.
    Command,
    /// Open an external URL (no callback round-trip).
    Link,
}

impl Default for CallbackKind {
    fn default() -> Self {
        Self::Layout
    }
}

/// A single inline button inside a [`ButtonBlock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonItem {
    pub text: String,
    #[serde(default)]
    pub callback_type: CallbackKind,
    /// Opaque payload for the callback, e.g. a layout alias or command name.
    #[serde(default, alias = "callback_data")]
    pub data: String,
    /// Target for `link` buttons.
    #[serde(default)]
    pub url: Option<String>,
    /// Closes the current keyboard row after this button.
    #[serde(default)]
    pub new_row: bool,
}

/// A group of inline buttons with an optional prompt text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonBlock {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub buttons: Vec<ButtonItem>,
}

/// Reference to an uploaded media asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
}

/// A plain outbound message, optionally with media and embedded buttons.
///
/// When `buttons` is non-empty it holds nested button-block instances; only
/// their button lists are used, flattened into one keyboard attached to
/// this message. Their descriptions are ignored in this context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBlock {
    pub text: String,
    #[serde(default)]
    pub media: Option<MediaRef>,
    #[serde(default)]
    pub buttons: Vec<ButtonBlock>,
}

/// How a registered command behaves when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    /// Reply with the block's response text.
    Command,
    /// Open the layout whose alias matches the command name.
    OpenLayout,
}

impl Default for CommandKind {
    fn default() -> Self {
        Self::Command
    }
}

/// A chat command registered once at bot setup.
///
/// Command blocks are never rendered while iterating a layout; they only
/// react when their command name is invoked directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandBlock {
    /// Command name, with or without the leading slash.
    pub command: String,
    #[serde(default)]
    pub command_type: CommandKind,
    #[serde(default)]
    pub response_text: Option<String>,
}

impl CommandBlock {
    /// Command name without the leading slash, for registry lookups.
    pub fn normalized_name(&self) -> &str {
        self.command.trim().trim_start_matches('/')
    }
}

/// Which levels of a catalog category screen to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DisplayMode {
    Subcategories,
    Products,
    All,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::All
    }
}

fn default_items_per_page() -> u32 {
    3
}

/// Entry point into catalog browsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBlock {
    pub name: String,
    pub alias: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
}

/// A named, aliased bundle of child blocks representing one screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBlock {
    pub name: String,
    /// Unique within a bot interface; the key callbacks navigate by.
    pub alias: String,
    #[serde(default)]
    pub clear_previous_messages: bool,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl LayoutBlock {
    /// Layouts must not nest. The admin schema cannot express this at the
    /// type level, so it is enforced here after loading.
    pub fn validate(&self) -> Result<()> {
        for block in &self.blocks {
            if let Block::Layout(nested) = block {
                return Err(ChatBlocksError::config(format!(
                    "layout \"{}\" contains nested layout \"{}\"",
                    self.alias, nested.alias
                )));
            }
        }
        Ok(())
    }
}

/// One node of the block tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "blockType")]
pub enum Block {
    Message(MessageBlock),
    Button(ButtonBlock),
    Command(CommandBlock),
    Catalog(CatalogBlock),
    Layout(LayoutBlock),
    /// Unrecognized admin tag, preserved for a visible fail-soft notice.
    Unknown { block_type: String },
}

/// Collapses the admin schema's tag spellings: case-insensitive, separator
/// agnostic, singular/plural agnostic.
fn normalize_tag(raw: &str) -> String {
    let mut tag: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    if tag.ends_with('s') {
        tag.pop();
    }
    tag
}

fn decode<T, E>(value: serde_json::Value) -> std::result::Result<T, E>
where
    T: serde::de::DeserializeOwned,
    E: DeError,
{
    serde_json::from_value(value).map_err(E::custom)
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let raw_tag = value
            .get("blockType")
            .and_then(|t| t.as_str())
            .ok_or_else(|| D::Error::missing_field("blockType"))?
            .to_string();

        match normalize_tag(&raw_tag).as_str() {
            "message" | "messageblock" => Ok(Block::Message(decode(value)?)),
            "button" | "buttonblock" => Ok(Block::Button(decode(value)?)),
            "command" | "commandblock" => Ok(Block::Command(decode(value)?)),
            "catalog" | "catalogblock" => Ok(Block::Catalog(decode(value)?)),
            "layout" | "layoutblock" => Ok(Block::Layout(decode(value)?)),
            _ => Ok(Block::Unknown {
                block_type: raw_tag,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_admin_schema_tag_spellings() {
        for tag in ["MessageBlock", "message-blocks", "messageblock"] {
            let json = format!(r#"{{ "blockType": "{tag}", "text": "hi" }}"#);
            let block: Block = serde_json::from_str(&json).unwrap();
            assert!(matches!(block, Block::Message(ref m) if m.text == "hi"), "tag {tag}");
        }
    }

    #[test]
    fn unknown_tag_is_preserved_not_rejected() {
        let block: Block =
            serde_json::from_str(r#"{ "blockType": "GalleryBlock", "items": [] }"#).unwrap();
        assert_eq!(
            block,
            Block::Unknown {
                block_type: "GalleryBlock".to_string()
            }
        );
    }

    #[test]
    fn layout_with_nested_layout_fails_validation() {
        let json = r#"{
            "blockType": "LayoutBlock",
            "name": "Home",
            "alias": "home",
            "blocks": [
                { "blockType": "LayoutBlock", "name": "Inner", "alias": "inner", "blocks": [] }
            ]
        }"#;
        let block: Block = serde_json::from_str(json).unwrap();
        let Block::Layout(layout) = block else {
            panic!("expected layout");
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn button_item_defaults() {
        let item: ButtonItem = serde_json::from_str(r#"{ "text": "Go" }"#).unwrap();
        assert_eq!(item.callback_type, CallbackKind::Layout);
        assert!(item.data.is_empty());
        assert!(!item.new_row);
    }

    #[test]
    fn message_block_accepts_embedded_button_blocks() {
        let json = r#"{
            "blockType": "message-blocks",
            "text": "Pick one",
            "buttons": [
                { "description": "ignored", "buttons": [ { "text": "A", "callbackType": "layout", "data": "a" } ] }
            ]
        }"#;
        let Block::Message(msg) = serde_json::from_str::<Block>(json).unwrap() else {
            panic!("expected message");
        };
        assert_eq!(msg.buttons.len(), 1);
        assert_eq!(msg.buttons[0].buttons[0].data, "a");
    }

    #[test]
    fn catalog_block_defaults_from_toml() {
        let toml_src = r#"
            blockType = "CatalogBlock"
            name = "Shop"
            alias = "shop"
        "#;
        let Block::Catalog(catalog) = toml::from_str::<Block>(toml_src).unwrap() else {
            panic!("expected catalog");
        };
        assert_eq!(catalog.items_per_page, 3);
        assert_eq!(catalog.display_mode, DisplayMode::All);
    }

    #[test]
    fn command_name_normalization() {
        let cmd = CommandBlock {
            command: "/help".to_string(),
            command_type: CommandKind::Command,
            response_text: Some("usage".to_string()),
        };
        assert_eq!(cmd.normalized_name(), "help");
    }
}
