//! Account information, verification and saved links.

use crate::client::{DebridClient, FormData, RequestOptions};
use crate::error::Result;
use crate::resources::hosts::Host;
use crate::resources::serde_helpers::epoch_seconds;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

static SAVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)succ?essfully saved$").expect("invalid saved regex"));
static DELETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)succ?essfully deleted$").expect("invalid deleted regex"));
static PURGED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)successfully purged$").expect("invalid purged regex"));

const NOTIFICATION_CLEARED: &str = "Notification was cleared";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub email: String,
    pub is_premium: bool,
    pub is_subscribed: bool,
    pub is_trial: bool,
    /// `None` when the account has no premium period.
    #[serde(default, with = "epoch_seconds")]
    pub premium_until: Option<DateTime<Utc>>,
    pub lang: String,
    pub prefered_domain: String,
    pub fidelity_points: i64,
    #[serde(default)]
    pub limited_hosters_quotas: HashMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_trial_quota: Option<i64>,
    #[serde(default)]
    pub notifications: Vec<String>,
}

/// A host as seen by the current account, with its quotas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHost {
    #[serde(flatten)]
    pub host: Host,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_simu_dl: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    Waiting,
    Allowed,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStatus {
    pub verif: Verification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resendable: Option<bool>,
    /// Issued once the verification is allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLink {
    pub link: String,
    pub filename: String,
    #[serde(default, with = "epoch_seconds")]
    pub date: Option<DateTime<Utc>>,
    pub size: u64,
    pub host: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResent {
    pub sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationCleared {
    pub code: String,
    pub cleared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinksSaved {
    pub saved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinksDeleted {
    pub deleted: bool,
}

#[derive(Deserialize)]
struct UserData {
    user: User,
}

#[derive(Deserialize)]
struct UserHostsData {
    hosts: HashMap<String, UserHost>,
}

#[derive(Deserialize)]
struct LinksData {
    links: Vec<SavedLink>,
}

#[derive(Deserialize)]
struct MessageData {
    message: String,
}

/// Endpoints scoped to the authenticated account.
#[derive(Clone)]
pub struct UserResource {
    client: DebridClient,
}

impl UserResource {
    pub(crate) fn new(client: DebridClient) -> Self {
        UserResource { client }
    }

    pub async fn get(&self) -> Result<User> {
        let response = self.client.get::<UserData>("v4/user", RequestOptions::new()).await?;
        Ok(response.data.user)
    }

    pub async fn hosts(&self) -> Result<HashMap<String, UserHost>> {
        let response = self
            .client
            .get::<UserHostsData>("v4.1/user/hosts", RequestOptions::new())
            .await?;
        Ok(response.data.hosts)
    }

    pub async fn check_verification(&self, token: &str) -> Result<VerificationStatus> {
        let form = FormData::new().text("token", token);
        let response = self
            .client
            .post::<VerificationStatus>("v4/user/verif", RequestOptions::new().with_form(form))
            .await?;
        Ok(response.data)
    }

    pub async fn resend_verification(&self, token: &str) -> Result<VerificationResent> {
        let form = FormData::new().text("token", token);
        let response = self
            .client
            .post::<VerificationResent>("v4/user/verif/resend", RequestOptions::new().with_form(form))
            .await?;
        Ok(response.data)
    }

    pub async fn clear_notification(&self, code: &str) -> Result<NotificationCleared> {
        let form = FormData::new().text("code", code);
        let response = self
            .client
            .post::<MessageData>("v4/user/notification/clear", RequestOptions::new().with_form(form))
            .await?;
        Ok(NotificationCleared {
            code: code.to_string(),
            cleared: response.data.message == NOTIFICATION_CLEARED,
        })
    }

    pub async fn saved_links(&self) -> Result<Vec<SavedLink>> {
        let response = self.client.get::<LinksData>("v4/user/links", RequestOptions::new()).await?;
        Ok(response.data.links)
    }

    pub async fn save_links<I, S>(&self, links: I) -> Result<LinksSaved>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let message = self.post_links("v4/user/links/save", links).await?;
        Ok(LinksSaved {
            saved: SAVED.is_match(&message),
        })
    }

    pub async fn delete_links<I, S>(&self, links: I) -> Result<LinksDeleted>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let message = self.post_links("v4/user/links/delete", links).await?;
        Ok(LinksDeleted {
            deleted: DELETED.is_match(&message),
        })
    }

    /// Links unlocked recently (history), when enabled on the account.
    pub async fn recent_links(&self) -> Result<Vec<SavedLink>> {
        let response = self.client.get::<LinksData>("v4/user/history", RequestOptions::new()).await?;
        Ok(response.data.links)
    }

    pub async fn purge_recent_links(&self) -> Result<LinksDeleted> {
        let response = self
            .client
            .post::<MessageData>("v4/user/history/delete", RequestOptions::new())
            .await?;
        Ok(LinksDeleted {
            deleted: PURGED.is_match(&response.data.message),
        })
    }

    async fn post_links<I, S>(&self, path: &str, links: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let form = FormData::new().text_list("links", links);
        let response = self
            .client
            .post::<MessageData>(path, RequestOptions::new().with_form(form))
            .await?;
        Ok(response.data.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{scripted_client, success, ScriptedTransport};
    use crate::client::{FormPart, HttpMethod, RequestBody};
    use crate::error::ErrorKind;
    use serde_json::json;

    fn user_json(premium_until: i64) -> serde_json::Value {
        json!({
            "user": {
                "username": "alice",
                "email": "alice@example.com",
                "isPremium": premium_until > 0,
                "isSubscribed": false,
                "isTrial": false,
                "premiumUntil": premium_until,
                "lang": "en",
                "preferedDomain": "com",
                "fidelityPoints": 12,
                "limitedHostersQuotas": { "uptobox": 1000 },
                "notifications": [],
            }
        })
    }

    fn form_fields(body: &RequestBody) -> Vec<(String, String)> {
        let RequestBody::Multipart(form) = body else {
            panic!("expected a form body, got {body:?}");
        };
        form.parts()
            .iter()
            .filter_map(|part| match part {
                FormPart::Text { name, value } => Some((name.clone(), value.clone())),
                FormPart::File { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_get_user() {
        let transport = ScriptedTransport::always(success(user_json(1_767_225_600)));
        let users = UserResource::new(scripted_client(&transport));

        let user = users.get().await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.is_premium);
        assert_eq!(user.premium_until.map(|d| d.timestamp()), Some(1_767_225_600));
        assert_eq!(user.limited_hosters_quotas["uptobox"], 1000);
        assert_eq!(transport.requests()[0].method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn test_premium_until_zero_is_none() {
        let transport = ScriptedTransport::always(success(user_json(0)));
        let users = UserResource::new(scripted_client(&transport));

        assert!(users.get().await.unwrap().premium_until.is_none());
    }

    #[tokio::test]
    async fn test_user_hosts_flatten_host_fields() {
        let transport = ScriptedTransport::always(success(json!({
            "hosts": {
                "uptobox": {
                    "name": "uptobox",
                    "type": "premium",
                    "domains": ["uptobox.com"],
                    "regexps": [],
                    "regexp": [],
                    "quota": 10,
                    "quotaMax": 100,
                    "quotaType": "traffic",
                }
            }
        })));
        let users = UserResource::new(scripted_client(&transport));

        let hosts = users.hosts().await.unwrap();
        let uptobox = &hosts["uptobox"];
        assert_eq!(uptobox.host.domains, vec!["uptobox.com"]);
        assert_eq!(uptobox.quota_max, Some(100));
        assert!(uptobox.limit_simu_dl.is_none());
        assert_eq!(transport.requests()[0].url.path(), "/v4.1/user/hosts");
    }

    #[tokio::test]
    async fn test_check_verification_sends_token() {
        let transport = ScriptedTransport::always(success(json!({ "verif": "allowed", "apikey": "new-key" })));
        let users = UserResource::new(scripted_client(&transport));

        let status = users.check_verification("tok").await.unwrap();
        assert_eq!(status.verif, Verification::Allowed);
        assert_eq!(status.apikey.as_deref(), Some("new-key"));
        assert_eq!(
            form_fields(&transport.requests()[0].body),
            vec![("token".to_string(), "tok".to_string())]
        );
    }

    #[tokio::test]
    async fn test_clear_notification() {
        let transport = ScriptedTransport::always(success(json!({ "message": "Notification was cleared" })));
        let users = UserResource::new(scripted_client(&transport));

        let result = users.clear_notification("NOTIF_1").await.unwrap();
        assert_eq!(
            result,
            NotificationCleared {
                code: "NOTIF_1".to_string(),
                cleared: true
            }
        );
    }

    #[tokio::test]
    async fn test_save_links_matches_message() {
        let transport = ScriptedTransport::always(success(json!({ "message": "Link(s) sucessfully saved" })));
        let users = UserResource::new(scripted_client(&transport));

        let result = users.save_links(["https://a.example/1", "https://a.example/2"]).await.unwrap();
        assert!(result.saved);

        let sent = &transport.requests()[0];
        assert_eq!(sent.url.path(), "/v4/user/links/save");
        assert_eq!(
            form_fields(&sent.body),
            vec![
                ("links[]".to_string(), "https://a.example/1".to_string()),
                ("links[]".to_string(), "https://a.example/2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_links_unexpected_message() {
        let transport = ScriptedTransport::always(success(json!({ "message": "Nothing happened" })));
        let users = UserResource::new(scripted_client(&transport));

        assert!(!users.delete_links(["https://a.example/1"]).await.unwrap().deleted);
    }

    #[tokio::test]
    async fn test_purge_recent_links_has_no_body() {
        let transport = ScriptedTransport::always(success(json!({ "message": "History SUCCESSFULLY PURGED" })));
        let users = UserResource::new(scripted_client(&transport));

        assert!(users.purge_recent_links().await.unwrap().deleted);
        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.body, RequestBody::None);
    }

    #[tokio::test]
    async fn test_saved_links_parse_dates() {
        let transport = ScriptedTransport::always(success(json!({
            "links": [
                { "link": "https://a.example/1", "filename": "a.bin", "date": 1_700_000_000, "size": 42, "host": "a" },
                { "link": "https://a.example/2", "filename": "b.bin", "date": 0, "size": 1, "host": "a" },
            ]
        })));
        let users = UserResource::new(scripted_client(&transport));

        let links = users.saved_links().await.unwrap();
        assert_eq!(links.len(), 2);
        assert!(links[0].date.is_some());
        assert!(links[1].date.is_none());
    }

    #[tokio::test]
    async fn test_missing_user_field_is_validation_error() {
        let transport = ScriptedTransport::always(success(json!({ "user": { "username": "bob" } })));
        let users = UserResource::new(scripted_client(&transport));

        let err = users.get().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
