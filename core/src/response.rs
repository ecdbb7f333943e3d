//! Typed views of the catalog API's XML responses and the mapping from
//! `HttpResponse` to them.
//!
//! # Design
//! The structs model the subset of the remote schema callers actually read;
//! unknown elements are ignored so schema additions on the remote side do not
//! break parsing. Every document is checked for the expected root element
//! before deserializing, because the deserializer itself does not look at
//! the root name and would otherwise accept one operation's response as
//! another's.

use std::fmt;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;
use crate::operation::OperationName;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// One `(code, message)` pair reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

/// The remote API's error document (`<Operation>ErrorResponse`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "Error", default)]
    pub errors: Vec<ErrorDetail>,
    #[serde(rename = "RequestId")]
    pub request_id: Option<String>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.code, e.message)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationRequest {
    #[serde(rename = "RequestId")]
    pub request_id: Option<String>,
    #[serde(rename = "RequestProcessingTime")]
    pub request_processing_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Errors {
    #[serde(rename = "Error", default)]
    pub error: Vec<ErrorDetail>,
}

/// Echo of the request inside a success document. Request-level problems,
/// such as an unknown item id, are reported here with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Request {
    #[serde(rename = "IsValid")]
    pub is_valid: String,
    #[serde(rename = "Errors")]
    pub errors: Option<Errors>,
}

impl Request {
    pub fn is_valid(&self) -> bool {
        self.is_valid.eq_ignore_ascii_case("true")
    }

    pub fn errors(&self) -> &[ErrorDetail] {
        self.errors.as_ref().map(|e| e.error.as_slice()).unwrap_or_default()
    }
}

/// Monetary amount; `amount` is in the currency's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Price {
    #[serde(rename = "Amount")]
    pub amount: Option<u64>,
    #[serde(rename = "CurrencyCode")]
    pub currency_code: Option<String>,
    #[serde(rename = "FormattedPrice")]
    pub formatted_price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dimension {
    #[serde(rename = "@Units")]
    pub units: Option<String>,
    #[serde(rename = "$text")]
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Image {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Height")]
    pub height: Option<Dimension>,
    #[serde(rename = "Width")]
    pub width: Option<Dimension>,
}

// ---------------------------------------------------------------------------
// Item lookup / item search
// ---------------------------------------------------------------------------

/// Success document of both `ItemLookup` and `ItemSearch`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemResponse {
    #[serde(rename = "OperationRequest")]
    pub operation_request: Option<OperationRequest>,
    #[serde(rename = "Items")]
    pub items: Items,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Items {
    #[serde(rename = "Request")]
    pub request: Option<Request>,
    #[serde(rename = "TotalResults")]
    pub total_results: Option<u32>,
    #[serde(rename = "TotalPages")]
    pub total_pages: Option<u32>,
    #[serde(rename = "MoreSearchResultsUrl")]
    pub more_search_results_url: Option<String>,
    #[serde(rename = "Item", default)]
    pub item: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    #[serde(rename = "ASIN")]
    pub asin: String,
    #[serde(rename = "ParentASIN")]
    pub parent_asin: Option<String>,
    #[serde(rename = "DetailPageURL")]
    pub detail_page_url: Option<String>,
    #[serde(rename = "SalesRank")]
    pub sales_rank: Option<u32>,
    #[serde(rename = "SmallImage")]
    pub small_image: Option<Image>,
    #[serde(rename = "MediumImage")]
    pub medium_image: Option<Image>,
    #[serde(rename = "LargeImage")]
    pub large_image: Option<Image>,
    #[serde(rename = "ItemAttributes")]
    pub item_attributes: Option<ItemAttributes>,
    #[serde(rename = "OfferSummary")]
    pub offer_summary: Option<OfferSummary>,
    #[serde(rename = "BrowseNodes")]
    pub browse_nodes: Option<BrowseNodeList>,
}

impl Item {
    pub fn title(&self) -> Option<&str> {
        self.item_attributes.as_ref()?.title.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemAttributes {
    #[serde(rename = "Author", default)]
    pub author: Vec<String>,
    #[serde(rename = "Binding")]
    pub binding: Option<String>,
    #[serde(rename = "Brand")]
    pub brand: Option<String>,
    #[serde(rename = "EAN")]
    pub ean: Option<String>,
    #[serde(rename = "ISBN")]
    pub isbn: Option<String>,
    #[serde(rename = "Manufacturer")]
    pub manufacturer: Option<String>,
    #[serde(rename = "ProductGroup")]
    pub product_group: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Feature", default)]
    pub feature: Vec<String>,
    #[serde(rename = "ListPrice")]
    pub list_price: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OfferSummary {
    #[serde(rename = "LowestNewPrice")]
    pub lowest_new_price: Option<Price>,
    #[serde(rename = "LowestUsedPrice")]
    pub lowest_used_price: Option<Price>,
    #[serde(rename = "TotalNew")]
    pub total_new: Option<u32>,
    #[serde(rename = "TotalUsed")]
    pub total_used: Option<u32>,
}

// ---------------------------------------------------------------------------
// Browse nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BrowseNodeLookupResponse {
    #[serde(rename = "OperationRequest")]
    pub operation_request: Option<OperationRequest>,
    #[serde(rename = "BrowseNodes")]
    pub browse_nodes: BrowseNodes,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrowseNodes {
    #[serde(rename = "Request")]
    pub request: Option<Request>,
    #[serde(rename = "BrowseNode", default)]
    pub browse_node: Vec<BrowseNode>,
}

/// A `<BrowseNode>` list nested under `Children`, `Ancestors` or an item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrowseNodeList {
    #[serde(rename = "BrowseNode", default)]
    pub browse_node: Vec<BrowseNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrowseNode {
    #[serde(rename = "BrowseNodeId")]
    pub browse_node_id: u64,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "IsCategoryRoot")]
    pub is_category_root: Option<u8>,
    #[serde(rename = "Children")]
    pub children: Option<BrowseNodeList>,
    #[serde(rename = "Ancestors")]
    pub ancestors: Option<BrowseNodeList>,
}

impl BrowseNode {
    pub fn is_category_root(&self) -> bool {
        self.is_category_root == Some(1)
    }

    pub fn children(&self) -> &[BrowseNode] {
        self.children.as_ref().map(|c| c.browse_node.as_slice()).unwrap_or_default()
    }

    pub fn ancestors(&self) -> &[BrowseNode] {
        self.ancestors.as_ref().map(|a| a.browse_node.as_slice()).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartCreateResponse {
    #[serde(rename = "OperationRequest")]
    pub operation_request: Option<OperationRequest>,
    #[serde(rename = "Cart")]
    pub cart: Cart,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Cart {
    #[serde(rename = "Request")]
    pub request: Option<Request>,
    #[serde(rename = "CartId")]
    pub cart_id: Option<String>,
    #[serde(rename = "HMAC")]
    pub hmac: Option<String>,
    #[serde(rename = "URLEncodedHMAC")]
    pub url_encoded_hmac: Option<String>,
    #[serde(rename = "PurchaseURL")]
    pub purchase_url: Option<String>,
    #[serde(rename = "SubTotal")]
    pub sub_total: Option<Price>,
    #[serde(rename = "CartItems")]
    pub cart_items: Option<CartItems>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        self.cart_items.as_ref().map(|c| c.cart_item.as_slice()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartItems {
    #[serde(rename = "SubTotal")]
    pub sub_total: Option<Price>,
    #[serde(rename = "CartItem", default)]
    pub cart_item: Vec<CartLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartLine {
    #[serde(rename = "CartItemId")]
    pub cart_item_id: String,
    #[serde(rename = "ASIN")]
    pub asin: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Price")]
    pub price: Option<Price>,
    #[serde(rename = "ItemTotal")]
    pub item_total: Option<Price>,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Maps a completed exchange for `operation` to its typed success document.
///
/// 2xx bodies must be `<Operation>Response` documents. Any other status must
/// carry an error document, which comes back as `ApiError::Remote`. Bodies
/// that fit neither are `ApiError::MalformedResponse`.
pub fn map_response<T: DeserializeOwned>(operation: &OperationName, response: &HttpResponse) -> Result<T> {
    if !(200..300).contains(&response.status) {
        return Err(map_error(response));
    }
    let expected = format!("{operation}Response");
    let root = root_element(&response.body).map_err(|reason| malformed(response, reason))?;
    if root != expected {
        return Err(malformed(response, format!("expected <{expected}>, found <{root}>")));
    }
    quick_xml::de::from_str(&response.body).map_err(|e| malformed(response, format!("<{expected}>: {e}")))
}

/// Interprets a non-success body as the remote error document.
fn map_error(response: &HttpResponse) -> ApiError {
    let root = match root_element(&response.body) {
        Ok(root) => root,
        Err(reason) => return malformed(response, reason),
    };
    if !root.ends_with("ErrorResponse") {
        return malformed(response, format!("expected an error document, found <{root}>"));
    }
    match quick_xml::de::from_str::<ErrorResponse>(&response.body) {
        Ok(error) if error.errors.is_empty() => malformed(response, format!("<{root}> lists no errors")),
        Ok(error) => ApiError::Remote {
            status: response.status,
            error,
        },
        Err(e) => malformed(response, format!("<{root}>: {e}")),
    }
}

fn malformed(response: &HttpResponse, reason: impl Into<String>) -> ApiError {
    ApiError::MalformedResponse {
        status: response.status,
        reason: reason.into(),
    }
}

/// Local name of the document's root element.
fn root_element(body: &str) -> std::result::Result<String, String> {
    let mut reader = Reader::from_str(body);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err("body contains no XML element".to_string()),
            Ok(Event::Text(t)) if !t.iter().all(u8::is_ascii_whitespace) => {
                return Err("body is not an XML document".to_string());
            }
            Ok(_) => {}
            Err(e) => return Err(format!("invalid XML: {e}")),
        }
    }
}
