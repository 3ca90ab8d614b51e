use super::access::AccessLists;
use crate::session::UserId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// Load/save hook for the persisted access lists.
pub trait AccessListStore: Send + Sync {
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<AccessLists>> + Send + '_>>;

    fn save<'a>(
        &'a self,
        lists: &'a AccessLists,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// On-disk shape. Older files use the singular
/// field names and may hold `null` for an empty list.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AccessFile {
    #[serde(
        rename = "adminTelegramIDs",
        alias = "AdminTelegramID",
        alias = "admin_telegram_ids",
        default
    )]
    admins: Option<Vec<UserId>>,
    #[serde(
        rename = "allowedTelegramIDs",
        alias = "AllowedTelegramID",
        alias = "allowed_telegram_ids",
        default
    )]
    allowed: Option<Vec<UserId>>,
}

impl From<AccessFile> for AccessLists {
    fn from(file: AccessFile) -> Self {
        Self {
            admins: file.admins.unwrap_or_default().into_iter().collect(),
            allowed: file.allowed.unwrap_or_default().into_iter().collect(),
        }
    }
}

impl From<&AccessLists> for AccessFile {
    fn from(lists: &AccessLists) -> Self {
        Self {
            admins: Some(lists.admins.iter().copied().collect()),
            allowed: Some(lists.allowed.iter().copied().collect()),
        }
    }
}

/// JSON file holding `{"adminTelegramIDs": [...], "allowedTelegramIDs": [...]}`.
pub struct JsonAccessFile {
    path: PathBuf,
}

impl JsonAccessFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "access".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read(&self) -> Result<AccessLists> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "access file not found; starting with empty lists (open access)"
                );
                return Ok(AccessLists::default());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        if contents.trim().is_empty() {
            return Ok(AccessLists::default());
        }

        let file: AccessFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(file.into())
    }

    async fn write(&self, lists: &AccessLists) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&AccessFile::from(lists))
            .context("Failed to serialize access lists")?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .with_context(|| format!("Failed to write {}", temp.display()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl AccessListStore for JsonAccessFile {
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<AccessLists>> + Send + '_>> {
        Box::pin(self.read())
    }

    fn save<'a>(
        &'a self,
        lists: &'a AccessLists,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.write(lists))
    }
}
