//! LINE Messaging API client
//!
//! `LineApi` is the seam between the bot and the platform. The webhook
//! handler and the rich-menu provisioner only ever talk to the trait, and
//! `LineClient` is the reqwest-backed implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::{ApiEndpoints, ChannelToken};
use crate::error::{Error, Result};
use crate::types::{
    Message, ReplyRequest, RichMenu, RichMenuIdResponse, RichMenuList, RichMenuResponse,
};

#[async_trait]
pub trait LineApi: Send + Sync {
    /// Answers one event. Returns the platform's response body.
    async fn reply_message(&self, reply_token: &str, messages: Vec<Message>) -> Result<Value>;

    async fn get_rich_menu_list(&self) -> Result<Vec<RichMenuResponse>>;

    async fn delete_rich_menu(&self, rich_menu_id: &str) -> Result<()>;

    /// Returns the id the platform assigned to the new menu.
    async fn create_rich_menu(&self, menu: &RichMenu) -> Result<String>;

    async fn set_rich_menu_image(
        &self,
        rich_menu_id: &str,
        image: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    async fn set_default_rich_menu(&self, rich_menu_id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct LineClient {
    client: Client,
    token: ChannelToken,
    endpoints: ApiEndpoints,
}

impl LineClient {
    pub fn new(token: ChannelToken, endpoints: ApiEndpoints) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            token,
            endpoints,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoints.api_base.trim_end_matches('/'), path)
    }

    fn data_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoints.data_base.trim_end_matches('/'), path)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.bearer_auth(self.token.expose()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} failed: {} - {}", what, status, body);
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LineApi for LineClient {
    async fn reply_message(&self, reply_token: &str, messages: Vec<Message>) -> Result<Value> {
        if reply_token.trim().is_empty() {
            return Err(Error::MissingReplyToken);
        }

        let body = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages,
        };

        debug!("Replying with {} message(s)", body.messages.len());

        let response = self
            .send(
                self.client.post(self.api_url("/v2/bot/message/reply")).json(&body),
                "Reply message",
            )
            .await?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn get_rich_menu_list(&self) -> Result<Vec<RichMenuResponse>> {
        let response = self
            .send(
                self.client.get(self.api_url("/v2/bot/richmenu/list")),
                "Get rich menu list",
            )
            .await?;

        let list: RichMenuList = response.json().await?;
        Ok(list.richmenus)
    }

    async fn delete_rich_menu(&self, rich_menu_id: &str) -> Result<()> {
        let url = self.api_url(&format!("/v2/bot/richmenu/{}", rich_menu_id));
        self.send(self.client.delete(url), "Delete rich menu").await?;
        Ok(())
    }

    async fn create_rich_menu(&self, menu: &RichMenu) -> Result<String> {
        let response = self
            .send(
                self.client.post(self.api_url("/v2/bot/richmenu")).json(menu),
                "Create rich menu",
            )
            .await?;

        let created: RichMenuIdResponse = response.json().await?;
        Ok(created.rich_menu_id)
    }

    async fn set_rich_menu_image(
        &self,
        rich_menu_id: &str,
        image: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let url = self.data_url(&format!("/v2/bot/richmenu/{}/content", rich_menu_id));
        debug!("Uploading {} bytes ({}) to {}", image.len(), content_type, rich_menu_id);

        self.send(
            self.client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(image),
            "Upload rich menu image",
        )
        .await?;
        Ok(())
    }

    async fn set_default_rich_menu(&self, rich_menu_id: &str) -> Result<()> {
        let url = self.api_url(&format!("/v2/bot/user/all/richmenu/{}", rich_menu_id));
        self.send(self.client.post(url), "Set default rich menu").await?;
        Ok(())
    }
}
