//! Bot interface configuration loading.
//!
//! The interface arrives whole at startup as a TOML or JSON document; the
//! engine never reloads it mid-session.

use std::fs;
use std::path::Path;

use chatblocks_core::block::BotInterface;
use chatblocks_core::error::{ChatBlocksError, Result};

/// Parses an interface from TOML source and validates it.
pub fn interface_from_toml(source: &str) -> Result<BotInterface> {
    let interface: BotInterface =
        toml::from_str(source).map_err(|err| ChatBlocksError::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        })?;
    interface.validate()?;
    Ok(interface)
}

/// Parses an interface from JSON source and validates it.
pub fn interface_from_json(source: &str) -> Result<BotInterface> {
    let interface: BotInterface = serde_json::from_str(source)?;
    interface.validate()?;
    Ok(interface)
}

/// Loads an interface file, picking the format by extension.
pub fn load_interface(path: &Path) -> Result<BotInterface> {
    let source = fs::read_to_string(path).map_err(|err| {
        ChatBlocksError::config(format!("cannot read interface file {}: {err}", path.display()))
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let interface = match extension.as_str() {
        "toml" => interface_from_toml(&source)?,
        "json" => interface_from_json(&source)?,
        other => {
            return Err(ChatBlocksError::config(format!(
                "unsupported interface format \"{other}\" for {}",
                path.display()
            )));
        }
    };
    tracing::info!(
        "[InterfaceLoader] loaded interface with {} top-level block(s) from {}",
        interface.blocks.len(),
        path.display()
    );
    Ok(interface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOML_INTERFACE: &str = r#"
defaultStartLayout = "start"
defaultFirstVisitLayout = "welcome"

[[blocks]]
blockType = "LayoutBlock"
name = "Start"
alias = "start"
clearPreviousMessages = true

  [[blocks.blocks]]
  blockType = "MessageBlock"
  text = "Hello again"

[[blocks]]
blockType = "LayoutBlock"
name = "Welcome"
alias = "welcome"

  [[blocks.blocks]]
  blockType = "MessageBlock"
  text = "Welcome!"

[[blocks]]
blockType = "CommandBlock"
command = "/help"
commandType = "command"
responseText = "Try the buttons below."
"#;

    #[test]
    fn toml_interface_round_trips() {
        let interface = interface_from_toml(TOML_INTERFACE).unwrap();
        assert!(interface.find_layout("start").is_some());
        assert!(interface.find_layout("welcome").is_some());
        assert_eq!(interface.allowed_commands(), vec!["start", "help"]);
        assert_eq!(interface.start_layout_alias(1), "welcome");
    }

    #[test]
    fn json_interface_parses_admin_tags() {
        let json = r#"{
            "blocks": [
                { "blockType": "layout-blocks", "name": "Start", "alias": "start", "blocks": [] },
                { "blockType": "layout-blocks", "name": "First", "alias": "start_first_visit", "blocks": [] }
            ]
        }"#;
        let interface = interface_from_json(json).unwrap();
        assert!(interface.find_layout("start").is_some());
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interface.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(TOML_INTERFACE.as_bytes()).unwrap();

        let interface = load_interface(&path).unwrap();
        assert_eq!(interface.default_start_layout, "start");
    }

    #[test]
    fn unknown_extension_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interface.yaml");
        std::fs::write(&path, "blocks: []").unwrap();
        let err = load_interface(&path).unwrap_err();
        assert!(matches!(err, ChatBlocksError::Config(_)));
    }

    #[test]
    fn missing_start_layout_fails_validation() {
        let json = r#"{ "blocks": [] }"#;
        assert!(interface_from_json(json).is_err());
    }
}
