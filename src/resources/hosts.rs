//! Supported hosts, streaming sites and redirectors.
//!
//! All three endpoints are public: no API key is sent.

use crate::client::{DebridClient, RequestOptions};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a host requires a premium account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostType {
    Premium,
    Free,
}

/// A single pattern or a list of patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HostType,
    pub domains: Vec<String>,
    pub regexps: Vec<String>,
    pub regexp: OneOrMany,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

/// `GET v4/hosts`, keyed by host name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostList {
    pub hosts: HashMap<String, Host>,
    pub streams: HashMap<String, Host>,
    pub redirectors: HashMap<String, Host>,
}

/// `GET v4/hosts/domains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainList {
    pub hosts: Vec<String>,
    pub streams: Vec<String>,
    pub redirectors: Vec<String>,
}

#[derive(Deserialize)]
struct PriorityData {
    hosts: HashMap<String, i64>,
}

/// Host endpoints.
#[derive(Clone)]
pub struct HostResource {
    client: DebridClient,
}

impl HostResource {
    pub(crate) fn new(client: DebridClient) -> Self {
        HostResource { client }
    }

    pub async fn list(&self) -> Result<HostList> {
        let response = self
            .client
            .get::<HostList>("v4/hosts", RequestOptions::new().public_endpoint())
            .await?;
        Ok(response.data)
    }

    pub async fn domains(&self) -> Result<DomainList> {
        let response = self
            .client
            .get::<DomainList>("v4/hosts/domains", RequestOptions::new().public_endpoint())
            .await?;
        Ok(response.data)
    }

    /// Host name to priority; lower values are tried first.
    pub async fn priorities(&self) -> Result<HashMap<String, i64>> {
        let response = self
            .client
            .get::<PriorityData>("v4/hosts/priority", RequestOptions::new().public_endpoint())
            .await?;
        Ok(response.data.hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{scripted_client, success, ScriptedTransport};
    use http::header::AUTHORIZATION;
    use serde_json::json;

    fn host(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "type": "premium",
            "domains": [format!("{name}.com")],
            "regexps": [],
            "regexp": format!("{name}\\.com/.+"),
        })
    }

    #[tokio::test]
    async fn test_list_hosts_is_public() {
        let transport = ScriptedTransport::always(success(json!({
            "hosts": { "rapidgator": host("rapidgator") },
            "streams": {},
            "redirectors": { "linkprotect": host("linkprotect") },
        })));
        let hosts = HostResource::new(scripted_client(&transport));

        let list = hosts.list().await.unwrap();
        assert_eq!(list.hosts["rapidgator"].kind, HostType::Premium);
        assert_eq!(list.hosts["rapidgator"].regexp.to_vec(), vec!["rapidgator\\.com/.+"]);
        assert!(list.streams.is_empty());

        let sent = &transport.requests()[0];
        assert_eq!(sent.url.path(), "/v4/hosts");
        assert!(sent.headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_domains() {
        let transport = ScriptedTransport::always(success(json!({
            "hosts": ["rapidgator.net"],
            "streams": ["youtube.com"],
            "redirectors": [],
        })));
        let hosts = HostResource::new(scripted_client(&transport));

        let domains = hosts.domains().await.unwrap();
        assert_eq!(domains.streams, vec!["youtube.com"]);
    }

    #[tokio::test]
    async fn test_priorities_unwraps_hosts() {
        let transport = ScriptedTransport::always(success(json!({ "hosts": { "1fichier": 1, "uptobox": 2 } })));
        let hosts = HostResource::new(scripted_client(&transport));

        let priorities = hosts.priorities().await.unwrap();
        assert_eq!(priorities["uptobox"], 2);
        assert_eq!(transport.requests()[0].url.path(), "/v4/hosts/priority");
    }

    #[tokio::test]
    async fn test_bad_host_type_is_validation_error() {
        let mut bad = host("x");
        bad["type"] = json!("gold");
        let transport = ScriptedTransport::always(success(json!({
            "hosts": { "x": bad },
            "streams": {},
            "redirectors": {},
        })));
        let hosts = HostResource::new(scripted_client(&transport));

        let err = hosts.list().await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }
}
