//! Magnet and torrent management.
//!
//! # Status codes
//!
//! | `statusCode` | [`MagnetState`] |
//! |--------------|-----------------|
//! | 0 | `Queued` |
//! | 1 | `Downloading` |
//! | 2 | `Compressing` |
//! | 3 | `Uploading` |
//! | 4 | `Ready` |
//! | 11 | `Expired` |
//! | 5-10, 12-15 | `Error` |
//!
//! # Examples
//!
//! ```ignore
//! use alldebrid::{AllDebrid, ClientOptions};
//! use alldebrid::resources::MagnetStatusFilter;
//!
//! let api = AllDebrid::new(ClientOptions::new("my-api-key"))?;
//! for magnet in api.magnets().list(Some(MagnetStatusFilter::Ready)).await? {
//!     println!("{} {:?}", magnet.filename, magnet.state());
//! }
//! ```

use crate::client::{DebridClient, FormData, RequestOptions};
use crate::error::{classify_validation_failure, configuration_error, Result, ValidationIssue};
use crate::protocol::ErrorBody;
use crate::resources::serde_helpers::{epoch_seconds, list_or_map, one_or_first};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage derived from a magnet's `statusCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MagnetState {
    Queued,
    Downloading,
    Compressing,
    Uploading,
    Ready,
    Expired,
    Error,
}

impl MagnetState {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => MagnetState::Queued,
            1 => MagnetState::Downloading,
            2 => MagnetState::Compressing,
            3 => MagnetState::Uploading,
            4 => MagnetState::Ready,
            11 => MagnetState::Expired,
            _ => MagnetState::Error,
        }
    }

    /// Still moving towards `Ready`.
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            MagnetState::Queued | MagnetState::Downloading | MagnetState::Compressing | MagnetState::Uploading
        )
    }
}

/// Server-side filter for [`MagnetResource::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagnetStatusFilter {
    Active,
    Ready,
    Expired,
    Error,
}

impl MagnetStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            MagnetStatusFilter::Active => "active",
            MagnetStatusFilter::Ready => "ready",
            MagnetStatusFilter::Expired => "expired",
            MagnetStatusFilter::Error => "error",
        }
    }
}

impl fmt::Display for MagnetStatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MagnetStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(MagnetStatusFilter::Active),
            "ready" => Ok(MagnetStatusFilter::Ready),
            "expired" => Ok(MagnetStatusFilter::Expired),
            "error" => Ok(MagnetStatusFilter::Error),
            other => Err(format!(
                "unknown magnet status '{other}' (expected active, ready, expired or error)"
            )),
        }
    }
}

/// A file inside a ready magnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnetFile {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "s")]
    pub size: u64,
    #[serde(rename = "l")]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnetDir {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "e")]
    pub entries: Vec<MagnetEntry>,
}

/// Node of a magnet's file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MagnetEntry {
    File(MagnetFile),
    Dir(MagnetDir),
}

impl MagnetEntry {
    /// All files below this entry, depth first.
    pub fn files(&self) -> Vec<&MagnetFile> {
        match self {
            MagnetEntry::File(file) => vec![file],
            MagnetEntry::Dir(dir) => dir.entries.iter().flat_map(MagnetEntry::files).collect(),
        }
    }
}

/// A magnet as reported by `v4.1/magnet/status`.
///
/// Fields that only exist in some states are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Magnet {
    pub id: u64,
    pub filename: String,
    pub hash: String,
    pub status: String,
    pub status_code: u32,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, with = "epoch_seconds")]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default, with = "epoch_seconds")]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_links: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeders: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_speed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_speed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_perc: Option<u32>,
    /// File tree; only present on a ready magnet fetched by id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<MagnetEntry>>,
}

impl Magnet {
    pub fn state(&self) -> MagnetState {
        MagnetState::from_code(self.status_code)
    }
}

/// A magnet accepted by `v4/magnet/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMagnetInfo {
    pub magnet: String,
    pub name: String,
    pub id: u64,
    pub hash: String,
    pub size: u64,
    pub ready: bool,
}

/// Per-item outcome of a magnet upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadedMagnet {
    Uploaded(UploadedMagnetInfo),
    Rejected { magnet: String, error: ErrorBody },
}

/// A torrent file accepted by `v4/magnet/upload/file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFileInfo {
    pub file: String,
    pub name: String,
    pub id: u64,
    pub hash: String,
    pub size: u64,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadedFile {
    Uploaded(UploadedFileInfo),
    Rejected { file: String, error: ErrorBody },
}

/// A `.torrent` file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentFile {
    pub file_name: String,
    pub content: Bytes,
}

impl TorrentFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        TorrentFile {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnetMessage {
    pub message: String,
}

/// Per-id outcome of a batch restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RestartOutcome {
    Restarted { magnet: String, message: String },
    Failed { magnet: String, error: ErrorBody },
}

#[derive(Deserialize)]
struct MagnetListData {
    #[serde(deserialize_with = "list_or_map")]
    magnets: Vec<Magnet>,
}

#[derive(Deserialize)]
struct MagnetData {
    #[serde(deserialize_with = "one_or_first")]
    magnets: Magnet,
}

#[derive(Deserialize)]
struct UploadMagnetsData {
    magnets: Vec<UploadedMagnet>,
}

#[derive(Deserialize)]
struct UploadFilesData {
    files: Vec<UploadedFile>,
}

#[derive(Deserialize)]
struct RestartManyData {
    magnets: Vec<RestartOutcome>,
}

#[derive(Clone)]
pub struct MagnetResource {
    client: DebridClient,
}

impl MagnetResource {
    pub(crate) fn new(client: DebridClient) -> Self {
        MagnetResource { client }
    }

    /// List magnets, optionally filtered server-side.
    pub async fn list(&self, status: Option<MagnetStatusFilter>) -> Result<Vec<Magnet>> {
        let mut options = RequestOptions::new();
        if let Some(status) = status {
            options = options.with_form(FormData::new().text("status", status.as_str()));
        }
        let response = self
            .client
            .post::<MagnetListData>("v4.1/magnet/status", options)
            .await?;
        Ok(response.data.magnets)
    }

    pub async fn get(&self, id: u64) -> Result<Magnet> {
        let response = self
            .client
            .post::<MagnetData>("v4.1/magnet/status", RequestOptions::new().with_query("id", id))
            .await?;
        Ok(response.data.magnets)
    }

    /// Upload magnet URIs or info hashes.
    ///
    /// The call succeeds as long as the API accepted the request; each item
    /// carries its own outcome.
    pub async fn upload<I, S>(&self, magnets: I) -> Result<Vec<UploadedMagnet>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let form = FormData::new().text_list("magnets", magnets);
        if form.is_empty() {
            return Err(configuration_error("at least one magnet is required").into());
        }
        let response = self
            .client
            .post::<UploadMagnetsData>("v4/magnet/upload", RequestOptions::new().with_form(form))
            .await?;
        non_empty(response.data.magnets, "data.magnets")
    }

    pub async fn upload_files(&self, files: Vec<TorrentFile>) -> Result<Vec<UploadedFile>> {
        if files.is_empty() {
            return Err(configuration_error("at least one torrent file is required").into());
        }
        let form = files
            .into_iter()
            .enumerate()
            .fold(FormData::new(), |form, (i, file)| {
                form.file(format!("files[{i}]"), file.file_name, file.content)
            });
        let response = self
            .client
            .post::<UploadFilesData>("v4/magnet/upload/file", RequestOptions::new().with_form(form))
            .await?;
        non_empty(response.data.files, "data.files")
    }

    pub async fn delete(&self, id: u64) -> Result<MagnetMessage> {
        let form = FormData::new().text("id", id.to_string());
        let response = self
            .client
            .post::<MagnetMessage>("v4/magnet/delete", RequestOptions::new().with_form(form))
            .await?;
        Ok(response.data)
    }

    /// Restart a failed magnet.
    pub async fn restart(&self, id: u64) -> Result<MagnetMessage> {
        let form = FormData::new().text("id", id.to_string());
        let response = self
            .client
            .post::<MagnetMessage>("v4/magnet/restart", RequestOptions::new().with_form(form))
            .await?;
        Ok(response.data)
    }

    pub async fn restart_many(&self, ids: &[u64]) -> Result<Vec<RestartOutcome>> {
        let form = FormData::new().text_list("ids", ids.iter().map(u64::to_string));
        let response = self
            .client
            .post::<RestartManyData>("v4/magnet/restart", RequestOptions::new().with_form(form))
            .await?;
        Ok(response.data.magnets)
    }
}

fn non_empty<T>(items: Vec<T>, path: &str) -> Result<Vec<T>> {
    if items.is_empty() {
        let issue = ValidationIssue::new(path, "expected at least one entry");
        return Err(classify_validation_failure(vec![issue]).into());
    }
    Ok(items)
}
