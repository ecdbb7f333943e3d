//! Async client for the product-catalog API.
//!
//! # Overview
//! `CatalogWrapper` performs the HTTP exchange that `catalog_core` leaves to
//! its caller. It signs every call, sends it through a `Transport` and maps
//! the answer. Remote API errors go to per-instance subscribers.
//!
//! ```no_run
//! use catalog_client::{CatalogWrapper, ClientConfig, ResponseGroup};
//!
//! # async fn run() -> catalog_client::Result<()> {
//! let mut catalog = CatalogWrapper::new(ClientConfig::from_env()?)?;
//! catalog.on_error_received(|e| eprintln!("catalog error: {e}"));
//! if let Some(found) = catalog.lookup("B00005N5PF", ResponseGroup::Large).await? {
//!     println!("{:?}", found.items.item.first().and_then(|i| i.title()));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod observer;
pub mod transport;
pub mod wrapper;

pub use catalog_core::{
    ApiError, BrowseNode, BrowseNodeLookupResponse, Cart, CartCreateResponse, CartItem, CartLine, Credential,
    Endpoint, ErrorDetail, ErrorResponse, Exchange, HttpRequest, HttpResponse, Item, ItemAttributes, ItemResponse,
    Items, Operation, OperationName, Price, Region, ResponseGroup, Result, SearchIndex,
};
pub use config::ClientConfig;
pub use transport::{ReqwestTransport, Transport};
pub use wrapper::CatalogWrapper;

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<CatalogWrapper>;
    let _ = assert_send_sync::<ClientConfig>;
};
