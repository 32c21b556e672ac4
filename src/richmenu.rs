//! Rich-menu provisioning
//!
//! Deploy layout: one subdirectory per menu, each holding `menu.json` and a
//! single `image.png` / `image.jpg` / `image.jpeg`. Every step runs strictly
//! in sequence and the first failure aborts the run; menus created before
//! the failure are left on the platform.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info};

use crate::api::LineApi;
use crate::error::{Error, Result};
use crate::types::{RichMenu, RichMenuResponse};

pub const LAYOUT_FILE: &str = "menu.json";

/// Checked in this order; the first one present wins.
pub const IMAGE_CANDIDATES: [&str; 3] = ["image.png", "image.jpg", "image.jpeg"];

pub const MAX_IMAGE_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMenu {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Default)]
pub struct DeployReport {
    pub created: Vec<CreatedMenu>,
    pub default: Option<CreatedMenu>,
}

pub struct Provisioner {
    api: Arc<dyn LineApi>,
}

impl Provisioner {
    pub fn new(api: Arc<dyn LineApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<RichMenuResponse>> {
        self.api.get_rich_menu_list().await
    }

    /// Deletes every menu one at a time. Returns how many were deleted.
    pub async fn delete_all(&self) -> Result<usize> {
        let menus = self.api.get_rich_menu_list().await?;
        for menu in &menus {
            self.api.delete_rich_menu(&menu.rich_menu_id).await?;
            info!("Deleted {} {}", menu.menu.name, menu.rich_menu_id);
        }
        Ok(menus.len())
    }

    pub async fn deploy(&self, root: &Path, default_name: Option<&str>) -> Result<DeployReport> {
        let mut report = DeployReport::default();

        for dir in menu_dirs(root).await? {
            let created = self.create_from_dir(&dir).await?;
            report.created.push(created);
        }

        if let Some(default) = select_default(&report.created, default_name) {
            self.api.set_default_rich_menu(&default.id).await?;
            info!("Set default rich menu: {} {}", default.name, default.id);
            report.default = Some(default.clone());
        }

        Ok(report)
    }

    async fn create_from_dir(&self, dir: &Path) -> Result<CreatedMenu> {
        let layout_path = dir.join(LAYOUT_FILE);
        if !is_file(&layout_path).await {
            return Err(Error::MissingLayout(layout_path));
        }
        let image_path = find_image(dir)
            .await
            .ok_or_else(|| Error::MissingImage(dir.to_path_buf()))?;

        let menu: RichMenu = serde_json::from_slice(&fs::read(&layout_path).await?)?;
        let id = self.api.create_rich_menu(&menu).await?;
        info!("Created rich menu {} {}", menu.name, id);

        let size = fs::metadata(&image_path).await?.len();
        if size > MAX_IMAGE_BYTES {
            return Err(Error::ImageTooLarge {
                path: image_path,
                size,
            });
        }

        let content_type = content_type_for(&image_path);
        let image = fs::read(&image_path).await?;
        self.api
            .set_rich_menu_image(&id, image, content_type)
            .await?;
        info!("Uploaded image for {}", id);

        Ok(CreatedMenu {
            name: menu.name,
            id,
        })
    }
}

/// Immediate subdirectories of `root`, sorted by name.
async fn menu_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(root).await?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    debug!("Found {} menu directories in {}", dirs.len(), root.display());
    Ok(dirs)
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

pub async fn find_image(dir: &Path) -> Option<PathBuf> {
    for name in IMAGE_CANDIDATES {
        let path = dir.join(name);
        if is_file(&path).await {
            return Some(path);
        }
    }
    None
}

pub fn content_type_for(path: &Path) -> &'static str {
    let lower = path.to_string_lossy().to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Menu named `name`, or the first created one.
pub fn select_default<'a>(created: &'a [CreatedMenu], name: Option<&str>) -> Option<&'a CreatedMenu> {
    name.and_then(|name| created.iter().find(|c| c.name == name))
        .or_else(|| created.first())
}
