//! Sans-IO client core for the product-catalog API.
//!
//! # Overview
//! Builds signed `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. The caller executes the HTTP round-trip, which keeps
//! the core deterministic and testable.
//!
//! # Design
//! - `operation` builds unsigned call descriptions and validates arguments.
//! - `sign` is a pure function from operation, credential, endpoint and
//!   timestamp to the request URI.
//! - `response` maps XML bodies to typed results, remote error documents and
//!   malformed bodies each to their own outcome.
//! - `CatalogClient` ties them together per operation as `build_*`/`parse_*`.

pub mod client;
pub mod clock;
pub mod error;
pub mod http;
pub mod operation;
pub mod response;
pub mod sign;
pub mod types;

pub use client::{CatalogClient, DEFAULT_USER_AGENT};
pub use error::{ApiError, Result};
pub use http::{Exchange, HttpMethod, HttpRequest, HttpResponse};
pub use operation::{Operation, OperationName};
pub use response::{
    BrowseNode, BrowseNodeLookupResponse, Cart, CartCreateResponse, CartLine, ErrorDetail, ErrorResponse, Item,
    ItemAttributes, ItemResponse, Items, Price,
};
pub use types::{CartItem, Credential, Endpoint, Region, ResponseGroup, SearchIndex};

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<CatalogClient>;
    let _ = assert_send_sync::<ApiError>;
};
