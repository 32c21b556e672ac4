//! In-memory `LineApi` that records every call.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::LineApi;
use crate::error::{Error, Result};
use crate::types::{Message, RichMenu, RichMenuResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reply {
        token: String,
        messages: Vec<Message>,
    },
    List,
    Delete(String),
    Create(String),
    Upload {
        id: String,
        size: usize,
        content_type: String,
    },
    SetDefault(String),
}

#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<Call>>,
    menus: Vec<RichMenuResponse>,
    failing_tokens: HashSet<String>,
    failing_deletes: HashSet<String>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_menus(mut self, menus: Vec<RichMenuResponse>) -> Self {
        self.menus = menus;
        self
    }

    pub fn failing_reply(mut self, token: &str) -> Self {
        self.failing_tokens.insert(token.to_string());
        self
    }

    pub fn failing_delete(mut self, id: &str) -> Self {
        self.failing_deletes.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reply_tokens(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Reply { token, .. } => Some(token),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn menu(id: &str, name: &str) -> RichMenuResponse {
    RichMenuResponse {
        rich_menu_id: id.to_string(),
        menu: serde_json::from_value(json!({
            "size": {"width": 2500, "height": 843},
            "selected": false,
            "name": name,
            "chatBarText": "Menu",
            "areas": []
        }))
        .unwrap(),
    }
}

#[async_trait]
impl LineApi for RecordingApi {
    async fn reply_message(&self, reply_token: &str, messages: Vec<Message>) -> Result<Value> {
        self.record(Call::Reply {
            token: reply_token.to_string(),
            messages,
        });
        if self.failing_tokens.contains(reply_token) {
            return Err(Error::Api {
                status: 400,
                body: "Invalid reply token".to_string(),
            });
        }
        Ok(json!({}))
    }

    async fn get_rich_menu_list(&self) -> Result<Vec<RichMenuResponse>> {
        self.record(Call::List);
        Ok(self.menus.clone())
    }

    async fn delete_rich_menu(&self, rich_menu_id: &str) -> Result<()> {
        self.record(Call::Delete(rich_menu_id.to_string()));
        if self.failing_deletes.contains(rich_menu_id) {
            return Err(Error::Api {
                status: 404,
                body: "Not found".to_string(),
            });
        }
        Ok(())
    }

    async fn create_rich_menu(&self, menu: &RichMenu) -> Result<String> {
        self.record(Call::Create(menu.name.clone()));
        Ok(format!("richmenu-{}", menu.name))
    }

    async fn set_rich_menu_image(
        &self,
        rich_menu_id: &str,
        image: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.record(Call::Upload {
            id: rich_menu_id.to_string(),
            size: image.len(),
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    async fn set_default_rich_menu(&self, rich_menu_id: &str) -> Result<()> {
        self.record(Call::SetDefault(rich_menu_id.to_string()));
        Ok(())
    }
}
