//! The HTML fragments the portal renders, held in one handlebars registry.
//!
//! Placeholders are written `{{name}}`. Values are HTML-escaped and a name
//! with no value renders empty.

use std::collections::BTreeMap;
use std::path::Path;

use handlebars::Handlebars;
use tracing::debug;

use crate::error::{PortalError, Result};

pub const TEAM_ITEM: &str = "teamItem";
pub const MESSAGE_ITEM: &str = "messageItem";
pub const HEADER: &str = "header";

const TEAM_ITEM_DEFAULT: &str = include_str!("../templates/teamItem.html");
const MESSAGE_ITEM_DEFAULT: &str = include_str!("../templates/messageItem.html");
const HEADER_DEFAULT: &str = include_str!("../templates/header.html");

pub type Values = BTreeMap<String, String>;

/// One template per list item, one for the status banner, and the page
/// header carrying the page-wide globals.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn builtin() -> Result<Self> {
        Self::from_sources(TEAM_ITEM_DEFAULT, MESSAGE_ITEM_DEFAULT)
    }

    pub fn from_sources(team_item: &str, message_item: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_template_string(TEAM_ITEM, team_item)?;
        registry.register_template_string(MESSAGE_ITEM, message_item)?;
        registry.register_template_string(HEADER, HEADER_DEFAULT)?;
        Ok(Self { registry })
    }

    /// Loads both item templates from `dir`, or uses the built-in ones.
    pub async fn load(dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = dir else {
            return Self::builtin();
        };

        let (team_item, message_item) = futures::future::try_join(
            read_template(dir, TEAM_ITEM),
            read_template(dir, MESSAGE_ITEM),
        )
        .await?;

        Self::from_sources(&team_item, &message_item)
    }

    pub fn render_team_item(&self, values: &Values) -> Result<String> {
        Ok(self.registry.render(TEAM_ITEM, values)?)
    }

    pub fn render_message(&self, values: &Values) -> Result<String> {
        Ok(self.registry.render(MESSAGE_ITEM, values)?)
    }

    pub fn render_header(&self, globals: &Values) -> Result<String> {
        Ok(self.registry.render(HEADER, globals)?)
    }
}

async fn read_template(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(format!("{name}.html"));
    debug!(path = %path.display(), "loading template");
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| PortalError::Template(path.display().to_string()))
}
