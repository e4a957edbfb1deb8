//! Hoster link information and unlocking.

use crate::client::{DebridClient, FormData, RequestOptions};
use crate::error::{classify_validation_failure, Result, ValidationIssue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfo {
    pub link: String,
    pub filename: String,
    pub size: u64,
    pub host: String,
    pub host_domain: String,
}

/// Stream quality label, textual ("1080p") or numeric (1080).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quality {
    Label(String),
    Height(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamQuality {
    pub id: String,
    pub ext: String,
    pub quality: Quality,
    pub filesize: u64,
    pub proto: String,
    pub name: String,
}

/// A hoster link turned into a direct download link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedLink {
    pub link: String,
    pub filename: String,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<Vec<StreamQuality>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paws: Option<bool>,
    pub filesize: u64,
    pub id: String,
    pub host_domain: String,
    /// Set when the link is generated asynchronously; poll with this id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delayed: Option<i64>,
}

#[derive(Deserialize)]
struct InfosData {
    infos: Vec<LinkInfo>,
}

#[derive(Clone)]
pub struct LinkResource {
    client: DebridClient,
}

impl LinkResource {
    pub(crate) fn new(client: DebridClient) -> Self {
        LinkResource { client }
    }

    /// Look up file name, size and host for each link.
    ///
    /// # Errors
    ///
    /// A successful response with no entries is reported as a validation
    /// error.
    pub async fn info<I, S>(&self, links: I, password: Option<&str>) -> Result<Vec<LinkInfo>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut form = FormData::new().text_list("link", links);
        if let Some(password) = password {
            form = form.text("password", password);
        }
        let response = self
            .client
            .post::<InfosData>("v4/link/infos", RequestOptions::new().with_form(form))
            .await?;

        let infos = response.data.infos;
        if infos.is_empty() {
            let issue = ValidationIssue::new("data.infos", "expected at least one link info");
            return Err(classify_validation_failure(vec![issue]).into());
        }
        Ok(infos)
    }

    pub async fn unlock(&self, link: &str, password: Option<&str>) -> Result<UnlockedLink> {
        let mut form = FormData::new().text("link", link);
        if let Some(password) = password {
            form = form.text("password", password);
        }
        let response = self
            .client
            .post::<UnlockedLink>("v4/link/unlock", RequestOptions::new().with_form(form))
            .await?;
        Ok(response.data)
    }
}
