//! The network page's data: latest projection, cluster list, filter and
//! the session flags shared with the graph view.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use portico_core::{
    Cluster, ClusterPatch, Connection, Contact, ContactPatch, NetworkData, NewCluster,
    NewConnection, NewContact,
};
use portico_layout::{LayoutStorage, NetworkFilter, PositionCache, SessionFlags};

use crate::cache::{QueryCache, CLUSTERS_KEY, NETWORK_KEY};
use crate::client::PorticoClient;
use crate::config::ClientConfig;
use crate::error::Result;

/// What subscribers of the poller receive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub network: Option<NetworkData>,
    pub clusters: Vec<Cluster>,
}

pub struct NetworkSession {
    client: PorticoClient,
    cache: Mutex<QueryCache>,
    network: RwLock<Option<NetworkData>>,
    clusters: RwLock<Vec<Cluster>>,
    filter: RwLock<NetworkFilter>,
    flags: Arc<SessionFlags>,
    positions: Option<PositionCache>,
}

impl NetworkSession {
    pub fn new(client: PorticoClient, config: &ClientConfig) -> Self {
        Self {
            client,
            cache: Mutex::new(QueryCache::new(config.stale_time)),
            network: RwLock::new(None),
            clusters: RwLock::new(Vec::new()),
            filter: RwLock::new(NetworkFilter::new()),
            flags: Arc::new(SessionFlags::new()),
            positions: None,
        }
    }

    /// Share the graph view's layout storage so saved positions of deleted
    /// nodes are pruned whenever a fresh network arrives.
    pub fn with_layout_storage(mut self, storage: Arc<dyn LayoutStorage>) -> Self {
        self.positions = Some(PositionCache::new(storage));
        self
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(PorticoClient::new(config.api_url.clone()), config)
    }

    pub fn client(&self) -> &PorticoClient {
        &self.client
    }

    /// Flags to hand to `GraphView::mount`.
    pub fn flags(&self) -> &Arc<SessionFlags> {
        &self.flags
    }

    pub fn network(&self) -> Option<NetworkData> {
        self.network.read().clone()
    }

    pub fn clusters(&self) -> Vec<Cluster> {
        self.clusters.read().clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            network: self.network(),
            clusters: self.clusters(),
        }
    }

    // ---------------------------------------------------------------
    // Refresh
    // ---------------------------------------------------------------

    /// Refetch whichever of network and clusters is stale.
    /// Returns whether anything was fetched.
    pub async fn refresh_if_stale(&self) -> Result<bool> {
        let (network_stale, clusters_stale) = {
            let cache = self.cache.lock();
            (cache.is_stale(NETWORK_KEY), cache.is_stale(CLUSTERS_KEY))
        };

        if network_stale {
            let data = self.client.network().await?;
            debug!(
                "Fetched network: {} nodes, {} links",
                data.nodes.len(),
                data.links.len()
            );
            self.prune_positions(&data);
            *self.network.write() = Some(data);
            self.cache.lock().mark_fresh(NETWORK_KEY);
        }
        if clusters_stale {
            let clusters = self.client.clusters().await?;
            self.filter
                .write()
                .sync_clusters(clusters.iter().map(|c| c.id));
            *self.clusters.write() = clusters;
            self.cache.lock().mark_fresh(CLUSTERS_KEY);
        }
        Ok(network_stale || clusters_stale)
    }

    fn prune_positions(&self, data: &NetworkData) {
        let Some(cache) = &self.positions else {
            return;
        };
        match cache.retain_known(data.nodes.iter().map(|n| n.id.as_str())) {
            Ok(0) => {}
            Ok(dropped) => debug!("Pruned {} saved positions of deleted nodes", dropped),
            Err(e) => warn!("Failed to prune saved positions: {}", e),
        }
    }

    /// Drop freshness for both queries; the next refresh refetches them.
    pub fn invalidate_all(&self) {
        self.cache.lock().invalidate_all();
    }

    /// After a write: invalidate, let the next mount frame the view again,
    /// and refetch right away. A failed refetch is retried by the poller.
    async fn after_mutation(&self) {
        {
            let mut cache = self.cache.lock();
            cache.invalidate(NETWORK_KEY);
            cache.invalidate(CLUSTERS_KEY);
        }
        self.flags.reset_initial_zoom();
        if let Err(e) = self.refresh_if_stale().await {
            warn!("Refetch after mutation failed: {}", e);
        }
    }

    // ---------------------------------------------------------------
    // Filter
    // ---------------------------------------------------------------

    pub fn toggle_cluster(&self, cluster_id: i64) -> bool {
        self.filter.write().toggle(cluster_id)
    }

    pub fn set_search(&self, term: &str) {
        self.filter.write().set_search(term);
    }

    pub fn filter(&self) -> NetworkFilter {
        self.filter.read().clone()
    }

    /// The latest network narrowed by the current filter.
    pub fn visible_network(&self) -> Option<NetworkData> {
        let filter = self.filter.read();
        self.network.read().as_ref().map(|data| filter.apply(data))
    }

    // ---------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------

    pub async fn create_cluster(&self, input: &NewCluster) -> Result<Cluster> {
        let cluster = self.client.create_cluster(input).await?;
        self.after_mutation().await;
        Ok(cluster)
    }

    pub async fn update_cluster(&self, id: i64, patch: &ClusterPatch) -> Result<Cluster> {
        let cluster = self.client.update_cluster(id, patch).await?;
        self.after_mutation().await;
        Ok(cluster)
    }

    pub async fn delete_cluster(&self, id: i64) -> Result<()> {
        self.client.delete_cluster(id).await?;
        self.after_mutation().await;
        Ok(())
    }

    pub async fn create_contact(&self, input: &NewContact) -> Result<Contact> {
        let contact = self.client.create_contact(input).await?;
        self.after_mutation().await;
        Ok(contact)
    }

    pub async fn update_contact(&self, id: i64, patch: &ContactPatch) -> Result<Contact> {
        let contact = self.client.update_contact(id, patch).await?;
        self.after_mutation().await;
        Ok(contact)
    }

    pub async fn delete_contact(&self, id: i64) -> Result<()> {
        self.client.delete_contact(id).await?;
        self.after_mutation().await;
        Ok(())
    }

    pub async fn create_connection(&self, input: &NewConnection) -> Result<Connection> {
        let connection = self.client.create_connection(input).await?;
        self.after_mutation().await;
        Ok(connection)
    }

    pub async fn delete_connection(&self, id: i64) -> Result<()> {
        self.client.delete_connection(id).await?;
        self.after_mutation().await;
        Ok(())
    }
}
