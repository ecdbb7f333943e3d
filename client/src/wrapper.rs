//! Async facade over the sans-IO core.
//!
//! # Design
//! Each call builds an operation, signs it with a fresh timestamp, hands the
//! request to the transport and maps the answer. A remote API error is
//! delivered to the error subscribers and the call returns `Ok(None)`. Invalid
//! arguments, network failures and malformed bodies come back as `Err`.

use catalog_core::operation;
use catalog_core::response::map_response;
use catalog_core::{
    ApiError, BrowseNodeLookupResponse, CartCreateResponse, CartItem, CatalogClient, ErrorResponse, HttpResponse,
    ItemResponse, Operation, ResponseGroup, Result, SearchIndex,
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::observer::Observers;
use crate::transport::{ReqwestTransport, Transport};

/// Catalog API client that performs its own I/O.
///
/// Calls take `&self`; share one wrapper behind an `Arc` across tasks.
/// Register notification subscribers before sharing it.
#[derive(Debug)]
pub struct CatalogWrapper<T = ReqwestTransport> {
    core: CatalogClient,
    transport: T,
    observers: Observers,
}

impl CatalogWrapper<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> CatalogWrapper<T> {
    /// Uses `transport` instead of building one. `config.timeout` is ignored.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let mut core = CatalogClient::new(config.credential, config.endpoint)?;
        if let Some(user_agent) = config.user_agent {
            core = core.with_user_agent(user_agent);
        }
        Ok(Self {
            core,
            transport,
            observers: Observers::default(),
        })
    }

    /// Subscribes to every raw body the server sends back.
    pub fn on_xml_received(&mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> &mut Self {
        self.observers.on_xml_received(callback);
        self
    }

    /// Subscribes to remote API error documents.
    pub fn on_error_received(&mut self, callback: impl Fn(&ErrorResponse) + Send + Sync + 'static) -> &mut Self {
        self.observers.on_error_received(callback);
        self
    }

    pub fn core(&self) -> &CatalogClient {
        &self.core
    }

    pub async fn lookup(&self, item_id: &str, response_group: ResponseGroup) -> Result<Option<ItemResponse>> {
        self.lookup_many(&[item_id], response_group).await
    }

    /// Looks up to ten ASINs, or up to ten EANs, in one request.
    pub async fn lookup_many<S: AsRef<str> + Sync>(
        &self,
        item_ids: &[S],
        response_group: ResponseGroup,
    ) -> Result<Option<ItemResponse>> {
        let op = operation::item_lookup(item_ids, response_group)?;
        self.execute(&op).await
    }

    pub async fn search(
        &self,
        keywords: &str,
        search_index: SearchIndex,
        response_group: ResponseGroup,
    ) -> Result<Option<ItemResponse>> {
        self.search_page(keywords, search_index, response_group, None).await
    }

    pub async fn search_page(
        &self,
        keywords: &str,
        search_index: SearchIndex,
        response_group: ResponseGroup,
        item_page: Option<u8>,
    ) -> Result<Option<ItemResponse>> {
        let op = operation::item_search_page(keywords, search_index, response_group, item_page)?;
        self.execute(&op).await
    }

    /// Callers normally pass `ResponseGroup::BrowseNodeInfo`. The
    /// `ResponseGroup` default, `Large`, is meant for item calls.
    pub async fn browse_node_lookup(
        &self,
        browse_node_id: u64,
        response_group: ResponseGroup,
    ) -> Result<Option<BrowseNodeLookupResponse>> {
        self.execute(&operation::browse_node_lookup(browse_node_id, response_group))
            .await
    }

    pub async fn cart_create(&self, items: &[CartItem]) -> Result<Option<CartCreateResponse>> {
        let op = operation::cart_create(items)?;
        self.execute(&op).await
    }

    /// Signs and sends `operation` and returns the server's answer untouched.
    ///
    /// Raw-body subscribers see the body. The status is not interpreted.
    #[instrument(skip_all, fields(operation = %operation.name()))]
    pub async fn request(&self, operation: &Operation) -> Result<HttpResponse> {
        let request = self.core.build_request(operation);
        let response = self.transport.send(&request).await.into_response()?;
        debug!(status = response.status, body_len = response.body.len(), "response received");
        self.observers.xml_received(&response.body);
        Ok(response)
    }

    async fn execute<R: DeserializeOwned>(&self, operation: &Operation) -> Result<Option<R>> {
        let response = self.request(operation).await?;
        match map_response(operation.name(), &response) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(ApiError::Remote { status, error }) => {
                warn!(operation = %operation.name(), status, %error, "remote API error");
                self.observers.error_received(&error);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
