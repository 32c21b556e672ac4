//! Error types shared by the webhook service and the rich-menu provisioner

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LINE API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing x-line-signature header")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Event has no reply token")]
    MissingReplyToken,

    #[error("Missing {}", .0.display())]
    MissingLayout(PathBuf),

    #[error("Missing image file (image.png|image.jpg|image.jpeg) in {}", .0.display())]
    MissingImage(PathBuf),

    #[error("Image too large: {size} bytes (> 1MB) at {}. Please compress below 1MB.", path.display())]
    ImageTooLarge { path: PathBuf, size: u64 },

    #[error("Event task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;
