//! User configuration lookup against the PBX admin API

use pbx_core::{PbxError, Result};
use pbx_soap_sdk::{envelope, AdminService, FindUserQuery};
use std::sync::Arc;

use crate::user_config::{self, UserConfigDocument, UserConfigSource};

/// Finds users and fetches their configuration documents
#[derive(Clone)]
pub struct ConfigLookupService {
    client: Option<Arc<dyn AdminService>>,
}

impl ConfigLookupService {
    /// `None` means no endpoint is configured; every remote operation then
    /// fails with `ServiceUnavailable`.
    pub fn new(client: Option<Arc<dyn AdminService>>) -> Self {
        Self { client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&Arc<dyn AdminService>> {
        self.client.as_ref().ok_or_else(|| {
            PbxError::ServiceUnavailable(
                "SOAP client is not configured. Check the soap settings".to_string(),
            )
        })
    }

    /// Fail early with `ServiceUnavailable` when there is no client
    pub fn ensure_configured(&self) -> Result<()> {
        self.client().map(|_| ())
    }

    /// Search by any of common name, H.323 alias or E.164 number and fetch
    /// the matching user's configuration.
    ///
    /// Every candidate is fetched in turn and the last document wins.
    pub async fn find_user_config(
        &self,
        cn: Option<&str>,
        h323: Option<&str>,
        e164: Option<&str>,
    ) -> Result<UserConfigDocument> {
        let client = self.client()?;
        let query = FindUserQuery::detailed(cn, h323, e164);

        let users = client.find_user(&query).await?;
        if users.len() > 1 {
            tracing::warn!(
                criteria = %query.describe(),
                matches = users.len(),
                "FindUser returned several users, keeping the last"
            );
        }

        let mut payload = None;
        for user in &users {
            tracing::debug!(cn = %user.cn, "Fetching user configuration");
            let command = envelope::show_user_command(&user.cn)?;
            payload = Some(client.admin(&command).await?);
        }

        let payload = payload.ok_or_else(|| PbxError::UserNotFound(query.describe()))?;
        UserConfigDocument::parse(&payload)
    }

    /// Group names of a configuration, parsed first when given as XML text
    pub fn get_user_groups<'a>(&self, config: impl Into<UserConfigSource<'a>>) -> Result<Vec<String>> {
        user_config::user_groups(config)
    }

    /// Submit an admin command and return the raw response
    pub async fn admin(&self, command: &str) -> Result<String> {
        Ok(self.client()?.admin(command).await?)
    }
}
