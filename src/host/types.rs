use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A structured query from the host. The host owns the trigger keyword and
/// splits the typed text before it reaches the plugin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginQuery {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub raw: String,
}

/// One display record in the launcher result list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub icon: ItemIcon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<ItemPreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub actions: Vec<ItemAction>,
}

impl ListItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            icon: ItemIcon::app(),
            preview: None,
            group: None,
            group_score: None,
            score: None,
            actions: Vec::new(),
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn icon(mut self, icon: ItemIcon) -> Self {
        self.icon = icon;
        self
    }

    pub fn preview(mut self, preview: ItemPreview) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn group(mut self, name: impl Into<String>, score: i64) -> Self {
        self.group = Some(name.into());
        self.group_score = Some(score);
        self
    }

    pub fn score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn action(mut self, action: ItemAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// Icon reference, either bundled with the plugin or fetched by the host.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemIcon {
    Relative { path: String },
    Url { url: String },
}

impl ItemIcon {
    /// The bundled application icon.
    pub fn app() -> Self {
        ItemIcon::Relative {
            path: "images/app.png".into(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        ItemIcon::Url { url: url.into() }
    }
}

/// Markdown preview panel with key/value properties.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPreview {
    pub markdown: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub properties: BTreeMap<String, String>,
}

/// A named action on a list item. Carries an explicit command object the
/// host echoes back through an `action` request when the user picks it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAction {
    pub name: String,
    pub command: ActionCommand,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub keep_visible: bool,
}

impl ItemAction {
    pub fn new(name: impl Into<String>, command: ActionCommand) -> Self {
        Self {
            name: name.into(),
            command,
            keep_visible: false,
        }
    }

    pub fn keep_visible(mut self) -> Self {
        self.keep_visible = true;
        self
    }
}

/// Everything an action can do, as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionCommand {
    Play { uri: String },
    Pause,
    Resume,
    Next,
    Previous,
    ActivateDevice { device_id: String, requery: String },
    BeginAuth,
}

/// Deep-link parameters delivered by the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeepLink {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub code: String,
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}
