//! Typed wrapper over the REST endpoints.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use portico_core::{
    Cluster, ClusterPatch, Connection, Contact, ContactPatch, NetworkData, NewCluster,
    NewConnection, NewContact,
};

use crate::error::{ClientError, Result};

/// Counts reported by `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub clusters: usize,
    pub contacts: usize,
    pub connections: usize,
    pub nodes: usize,
    pub links: usize,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct PorticoClient {
    http: Client,
    base: String,
}

impl PorticoClient {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        Self { http, base }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}{}", method, self.base, path);
        self.http.request(method, format!("{}{}", self.base, path))
    }

    /// Turn a non-success response into `ClientError::Api`.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Clusters
    // ---------------------------------------------------------------

    pub async fn clusters(&self) -> Result<Vec<Cluster>> {
        self.fetch(self.request(Method::GET, "/api/clusters")).await
    }

    pub async fn cluster(&self, id: i64) -> Result<Cluster> {
        self.fetch(self.request(Method::GET, &format!("/api/clusters/{id}")))
            .await
    }

    pub async fn create_cluster(&self, input: &NewCluster) -> Result<Cluster> {
        self.fetch(self.request(Method::POST, "/api/clusters").json(input))
            .await
    }

    pub async fn update_cluster(&self, id: i64, patch: &ClusterPatch) -> Result<Cluster> {
        self.fetch(
            self.request(Method::PATCH, &format!("/api/clusters/{id}"))
                .json(patch),
        )
        .await
    }

    pub async fn delete_cluster(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/clusters/{id}")))
            .await
    }

    // ---------------------------------------------------------------
    // Contacts
    // ---------------------------------------------------------------

    /// All contacts, or only those of `cluster_id`.
    pub async fn contacts(&self, cluster_id: Option<i64>) -> Result<Vec<Contact>> {
        let mut builder = self.request(Method::GET, "/api/contacts");
        if let Some(id) = cluster_id {
            builder = builder.query(&[("clusterId", id)]);
        }
        self.fetch(builder).await
    }

    pub async fn contact(&self, id: i64) -> Result<Contact> {
        self.fetch(self.request(Method::GET, &format!("/api/contacts/{id}")))
            .await
    }

    pub async fn create_contact(&self, input: &NewContact) -> Result<Contact> {
        self.fetch(self.request(Method::POST, "/api/contacts").json(input))
            .await
    }

    pub async fn update_contact(&self, id: i64, patch: &ContactPatch) -> Result<Contact> {
        self.fetch(
            self.request(Method::PATCH, &format!("/api/contacts/{id}"))
                .json(patch),
        )
        .await
    }

    pub async fn delete_contact(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/contacts/{id}")))
            .await
    }

    // ---------------------------------------------------------------
    // Connections, projection, stats
    // ---------------------------------------------------------------

    pub async fn connections(&self) -> Result<Vec<Connection>> {
        self.fetch(self.request(Method::GET, "/api/connections"))
            .await
    }

    pub async fn create_connection(&self, input: &NewConnection) -> Result<Connection> {
        self.fetch(self.request(Method::POST, "/api/connections").json(input))
            .await
    }

    pub async fn delete_connection(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/connections/{id}")))
            .await
    }

    pub async fn network(&self) -> Result<NetworkData> {
        self.fetch(self.request(Method::GET, "/api/network")).await
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.fetch(self.request(Method::GET, "/api/stats")).await
    }
}
