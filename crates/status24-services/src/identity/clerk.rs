use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use status24_core::models::{Organization, OrganizationMembership};

use super::{IdentityError, IdentityProvider, NewUser};

/// List envelope used by the provider's collection endpoints.
#[derive(Debug, Deserialize)]
struct DataList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Identity provider backed by the Clerk backend REST API.
#[derive(Clone, Debug)]
pub struct ClerkIdentityProvider {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ClerkIdentityProvider {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, IdentityError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Sends an authorized request and returns the raw success response.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, IdentityError> {
        let response = request.bearer_auth(&self.api_key).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = status.as_u16(), "Identity provider request failed");
            return Err(IdentityError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, IdentityError> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| IdentityError::Decode(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentityProvider {
    #[tracing::instrument(skip(self))]
    async fn memberships(&self, user_id: &str) -> Result<Vec<OrganizationMembership>, IdentityError> {
        let url = self.build_url(&format!("/users/{}/organization_memberships", user_id));
        let list: DataList<OrganizationMembership> = self.send_json(self.client.get(url)).await?;
        Ok(list.data)
    }

    #[tracing::instrument(skip(self))]
    async fn organization(&self, org_id: &str) -> Result<Option<Organization>, IdentityError> {
        let url = self.build_url(&format!("/organizations/{}", org_id));
        match self.send_json(self.client.get(url)).await {
            Ok(org) => Ok(Some(org)),
            Err(IdentityError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, IdentityError> {
        let url = self.build_url("/organizations");
        let list: DataList<Organization> = self.send_json(self.client.get(url)).await?;
        Ok(list.data)
    }

    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: &NewUser) -> Result<serde_json::Value, IdentityError> {
        let url = self.build_url("/users");
        self.send_json(self.client.post(url).json(user)).await
    }

    #[tracing::instrument(skip(self))]
    async fn create_organization(&self, name: &str) -> Result<serde_json::Value, IdentityError> {
        let url = self.build_url("/organizations");
        self.send_json(
            self.client
                .post(url)
                .json(&serde_json::json!({ "name": name })),
        )
        .await
    }

    #[tracing::instrument(skip(self, full_name))]
    async fn add_member(
        &self,
        org_id: &str,
        email: &str,
        full_name: &str,
    ) -> Result<serde_json::Value, IdentityError> {
        let url = self.build_url("/organization_memberships");
        let body = serde_json::json!({
            "email_address": email,
            "organization_id": org_id,
            "public_metadata": { "full_name": full_name },
        });
        self.send_json(self.client.post(url).json(&body)).await
    }
}
