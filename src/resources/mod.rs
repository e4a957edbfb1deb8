//! Typed callers for the AllDebrid endpoints.
//!
//! Each resource wraps a shared [`DebridClient`] and turns one endpoint
//! into one async method returning the unwrapped `data` payload.
//!
//! | Resource | Endpoints |
//! |----------|-----------|
//! | [`HostResource`] | `v4/hosts*` (public) |
//! | [`UserResource`] | `v4/user*`, `v4.1/user/hosts` |
//! | [`LinkResource`] | `v4/link/infos`, `v4/link/unlock` |
//! | [`MagnetResource`] | `v4/magnet/*`, `v4.1/magnet/status` |
//!
//! # Examples
//!
//! ```ignore
//! use alldebrid::{AllDebrid, ClientOptions};
//!
//! #[tokio::main]
//! async fn main() -> alldebrid::Result<()> {
//!     let api = AllDebrid::new(ClientOptions::new("my-api-key"))?;
//!     let user = api.users().get().await?;
//!     println!("{} premium={}", user.username, user.is_premium);
//!     Ok(())
//! }
//! ```

pub mod hosts;
pub mod links;
pub mod magnets;
mod serde_helpers;
pub mod users;

pub use hosts::{DomainList, Host, HostList, HostResource, HostType};
pub use links::{LinkInfo, LinkResource, Quality, StreamQuality, UnlockedLink};
pub use magnets::{
    Magnet, MagnetEntry, MagnetFile, MagnetMessage, MagnetResource, MagnetState, MagnetStatusFilter,
    RestartOutcome, TorrentFile, UploadedFile, UploadedMagnet,
};
pub use users::{
    LinksDeleted, LinksSaved, NotificationCleared, SavedLink, User, UserHost, UserResource, Verification,
    VerificationResent, VerificationStatus,
};

use crate::client::{ClientOptions, DebridClient};
use crate::error::Result;

/// Entry point grouping every resource over one configured client.
#[derive(Clone)]
pub struct AllDebrid {
    client: DebridClient,
}

impl AllDebrid {
    /// Configure a reqwest-backed client from `options`.
    pub fn new(options: ClientOptions) -> Result<Self> {
        Ok(Self::from_client(DebridClient::with_options(options)?))
    }

    /// Wrap an existing client, for instance one with a custom transport.
    pub fn from_client(client: DebridClient) -> Self {
        AllDebrid { client }
    }

    pub fn client(&self) -> &DebridClient {
        &self.client
    }

    pub fn hosts(&self) -> HostResource {
        HostResource::new(self.client.clone())
    }

    pub fn users(&self) -> UserResource {
        UserResource::new(self.client.clone())
    }

    pub fn links(&self) -> LinkResource {
        LinkResource::new(self.client.clone())
    }

    pub fn magnets(&self) -> MagnetResource {
        MagnetResource::new(self.client.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{scripted_client, success, ScriptedTransport};
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_new_validates_options() {
        let err = AllDebrid::new(ClientOptions::new("")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_resources_share_client() {
        let transport = ScriptedTransport::always(success(json!({ "message": "Magnet was successfully deleted" })));
        let api = AllDebrid::from_client(scripted_client(&transport));

        api.magnets().delete(1).await.unwrap();
        api.magnets().delete(2).await.unwrap();
        assert_eq!(transport.calls(), 2);
        assert!(api.client().is_configured());
    }
}
