//! Event classification and reply dispatch
//!
//! Every event in a webhook batch runs in its own task. Classification is a
//! pure function of the event and the configured triggers; the only side
//! effect is at most one reply call per event, keyed by that event's token.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::api::LineApi;
use crate::config::{BatchFailurePolicy, HandlerConfig};
use crate::error::{Error, Result};
use crate::products::{product_list_reply, welcome_reply, PRODUCT_POSTBACK};
use crate::types::{EventMessage, Message, WebhookEvent};

/// What happened to one event of a batch.
#[derive(Debug)]
pub enum EventOutcome {
    /// No reply rule matched.
    Skipped,
    /// Reply sent; holds the platform's response body.
    Replied(Value),
    Failed(Error),
}

impl EventOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, EventOutcome::Failed(_))
    }

    /// Entry of the webhook response array.
    pub fn to_json(&self) -> Value {
        match self {
            EventOutcome::Skipped => Value::Null,
            EventOutcome::Replied(body) => body.clone(),
            EventOutcome::Failed(e) => json!({ "error": e.to_string() }),
        }
    }
}

pub struct EventHandler {
    api: Arc<dyn LineApi>,
    config: HandlerConfig,
}

impl EventHandler {
    pub fn new(api: Arc<dyn LineApi>, config: HandlerConfig) -> Self {
        Self { api, config }
    }

    pub fn batch_policy(&self) -> BatchFailurePolicy {
        self.config.batch_policy
    }

    /// Reply for `event`, or `None` when the bot stays silent.
    pub fn reply_for(&self, event: &WebhookEvent) -> Option<Vec<Message>> {
        match event {
            WebhookEvent::Postback { postback, .. } => Some(reply_for_postback(&postback.data)),
            WebhookEvent::Message {
                message: EventMessage::Text { text },
                ..
            } => self.reply_for_text(text),
            WebhookEvent::Message { .. } | WebhookEvent::Other => None,
        }
    }

    fn reply_for_text(&self, text: &str) -> Option<Vec<Message>> {
        self.config
            .triggers
            .iter()
            .any(|trigger| text.contains(trigger.as_str()))
            .then(product_list_reply)
    }

    pub async fn handle_event(&self, event: &WebhookEvent) -> Result<Option<Value>> {
        let Some(messages) = self.reply_for(event) else {
            debug!("No reply for {} event", event.kind());
            return Ok(None);
        };

        let reply_token = event.reply_token().ok_or(Error::MissingReplyToken)?;
        let response = self.api.reply_message(reply_token, messages).await?;
        info!("Reply sent for {} event", event.kind());
        Ok(Some(response))
    }

    /// Runs every event concurrently and waits for all of them. The outcomes
    /// keep the order of `events`. Under `FailFast` the first failure (in
    /// event order) is returned instead.
    pub async fn handle_batch(self: &Arc<Self>, events: Vec<WebhookEvent>) -> Result<Vec<EventOutcome>> {
        let tasks: Vec<_> = events
            .into_iter()
            .map(|event| {
                let handler = Arc::clone(self);
                tokio::spawn(async move { handler.handle_event(&event).await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            let outcome = match task.await {
                Ok(Ok(Some(body))) => EventOutcome::Replied(body),
                Ok(Ok(None)) => EventOutcome::Skipped,
                Ok(Err(e)) => {
                    error!("Error handling event: {}", e);
                    EventOutcome::Failed(e)
                }
                Err(e) => {
                    error!("Event task did not complete: {}", e);
                    EventOutcome::Failed(Error::Task(e.to_string()))
                }
            };
            outcomes.push(outcome);
        }

        if self.config.batch_policy == BatchFailurePolicy::FailFast {
            if let Some(index) = outcomes.iter().position(EventOutcome::is_failed) {
                if let EventOutcome::Failed(e) = outcomes.swap_remove(index) {
                    return Err(e);
                }
            }
        }

        Ok(outcomes)
    }
}

fn reply_for_postback(data: &str) -> Vec<Message> {
    debug!("Postback data: {}", data);
    if data == PRODUCT_POSTBACK {
        product_list_reply()
    } else {
        welcome_reply()
    }
}
