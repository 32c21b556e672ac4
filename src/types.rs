//! LINE Messaging API wire types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub destination: String,
    pub events: Vec<WebhookEvent>,
}

/// Inbound event. Only the kinds the bot answers are modelled; follow,
/// join, unsend and friends all land in `Other`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message {
        #[serde(rename = "replyToken", default)]
        reply_token: Option<String>,
        message: EventMessage,
    },
    Postback {
        #[serde(rename = "replyToken", default)]
        reply_token: Option<String>,
        postback: Postback,
    },
    #[serde(other)]
    Other,
}

impl WebhookEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookEvent::Message { .. } => "message",
            WebhookEvent::Postback { .. } => "postback",
            WebhookEvent::Other => "other",
        }
    }

    pub fn reply_token(&self) -> Option<&str> {
        match self {
            WebhookEvent::Message { reply_token, .. }
            | WebhookEvent::Postback { reply_token, .. } => reply_token.as_deref(),
            WebhookEvent::Other => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postback {
    pub data: String,
}

/// Outbound message object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Text {
        text: String,
    },
    Template {
        #[serde(rename = "altText")]
        alt_text: String,
        template: Template,
    },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Template {
    Carousel { columns: Vec<CarouselColumn> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselColumn {
    #[serde(
        rename = "thumbnailImageUrl",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub thumbnail_image_url: Option<String>,
    pub title: String,
    pub text: String,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Uri { label: String, uri: String },
    Postback { label: String, data: String },
}

#[derive(Debug, Serialize)]
pub struct ReplyRequest {
    #[serde(rename = "replyToken")]
    pub reply_token: String,
    pub messages: Vec<Message>,
}

/// Rich-menu layout as read from `menu.json` and submitted on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichMenu {
    pub size: RichMenuSize,
    pub selected: bool,
    pub name: String,
    pub chat_bar_text: String,
    pub areas: Vec<RichMenuArea>,
    /// Any other layout keys, forwarded to the platform as written.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RichMenuSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichMenuArea {
    pub bounds: RichMenuBounds,
    /// Passed through untouched; the platform validates action objects.
    pub action: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RichMenuBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A rich menu as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichMenuResponse {
    pub rich_menu_id: String,
    #[serde(flatten)]
    pub menu: RichMenu,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichMenuList {
    pub richmenus: Vec<RichMenuResponse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichMenuIdResponse {
    pub rich_menu_id: String,
}
