//! In-process stand-in for the product-catalog API.
//!
//! Verifies request signatures with its own implementation of the signing
//! scheme, then answers `ItemLookup`, `ItemSearch`, `BrowseNodeLookup` and
//! `CartCreate` from a small fixed catalog with XML shaped like the real
//! service's. `/maintenance/onca/xml` always answers 503 with an HTML page.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use quick_xml::escape::escape;
use sha2::Sha256;
use tokio::net::TcpListener;
use uuid::Uuid;

pub const ACCESS_KEY: &str = "MOCKACCESSKEYID";
pub const SECRET_KEY: &str = "mock-secret-key";

const NAMESPACE: &str = "http://webservices.amazon.com/AWSECommerceService/2013-08-01";
const RESULTS_PER_PAGE: usize = 10;
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Keys the server accepts.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub access_key: String,
    pub secret_key: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            access_key: ACCESS_KEY.to_string(),
            secret_key: SECRET_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub asin: &'static str,
    pub ean: &'static str,
    pub title: &'static str,
    pub manufacturer: &'static str,
    pub search_index: &'static str,
    pub price_cents: u64,
}

pub const CATALOG: &[Product] = &[
    Product {
        asin: "B00005N5PF",
        ean: "4006381333931",
        title: "Mechanical Pencil Set",
        manufacturer: "Staedtler",
        search_index: "OfficeProducts",
        price_cents: 899,
    },
    Product {
        asin: "0679722769",
        ean: "9780679722762",
        title: "Ulysses",
        manufacturer: "Vintage",
        search_index: "Books",
        price_cents: 1695,
    },
    Product {
        asin: "B01N5IB20Q",
        ean: "0885909950805",
        title: "Wireless Mouse",
        manufacturer: "Logitech",
        search_index: "Electronics",
        price_cents: 2499,
    },
    Product {
        asin: "1593278284",
        ean: "9781593278281",
        title: "The Rust Programming Language",
        manufacturer: "No Starch Press",
        search_index: "Books",
        price_cents: 3995,
    },
];

struct Node {
    id: u64,
    name: &'static str,
    children: &'static [(u64, &'static str)],
    ancestors: &'static [(u64, &'static str)],
}

const BROWSE_NODES: &[Node] = &[
    Node {
        id: 283155,
        name: "Books",
        children: &[(1, "Arts & Photography"), (2, "Biographies & Memoirs"), (3, "Computers & Technology")],
        ancestors: &[(1000, "Subjects")],
    },
    Node {
        id: 3,
        name: "Computers & Technology",
        children: &[(3508, "Programming")],
        ancestors: &[(283155, "Books")],
    },
];

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    Router::new()
        .route("/onca/xml", get(handle))
        .route("/maintenance/onca/xml", get(maintenance))
        .with_state(Arc::new(config))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Canonical query and base64 signature for `params`, computed the way the
/// server verifies them. Tests use it to build valid requests.
pub fn sign_params(secret: &str, host: &str, path: &str, params: &[(String, String)]) -> (String, String) {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .filter(|(k, _)| k != "Signature")
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, UNRESERVED).to_string(),
                utf8_percent_encode(v, UNRESERVED).to_string(),
            )
        })
        .collect();
    pairs.sort();
    let canonical = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
    };
    mac.update(format!("GET\n{host}\n{path}\n{canonical}").as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());
    (canonical, signature)
}

/// Full request target (`path?query&Signature=...`) for `params`.
pub fn signed_target(secret: &str, host: &str, path: &str, params: &[(String, String)]) -> String {
    let (canonical, signature) = sign_params(secret, host, path, params);
    format!(
        "{path}?{canonical}&Signature={}",
        utf8_percent_encode(&signature, UNRESERVED)
    )
}

fn parse_query(query: &str) -> Option<Vec<(String, String)>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let k = percent_decode_str(k).decode_utf8().ok()?.into_owned();
            let v = percent_decode_str(v).decode_utf8().ok()?.into_owned();
            Some((k, v))
        })
        .collect()
}

fn xml(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/xml;charset=UTF-8")], body).into_response()
}

fn error_document(status: StatusCode, root: &str, code: &str, message: &str) -> Response {
    tracing::info!(status = status.as_u16(), code, "answering with error document");
    let body = format!(
        r#"<?xml version="1.0"?>
<{root} xmlns="{NAMESPACE}"><Error><Code>{}</Code><Message>{}</Message></Error><RequestId>{}</RequestId></{root}>"#,
        escape(code),
        escape(message),
        Uuid::new_v4()
    );
    xml(status, body)
}

async fn maintenance() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body><h1>Service Unavailable</h1></body></html>",
    )
        .into_response()
}

async fn handle(
    State(config): State<Arc<MockConfig>>,
    headers: HeaderMap,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> Response {
    let Some(pairs) = parse_query(query.as_deref().unwrap_or_default()) else {
        return error_document(StatusCode::BAD_REQUEST, "ErrorResponse", "AWS.InvalidParameterValue", "Query is not valid UTF-8.");
    };
    let params: BTreeMap<&str, &str> = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let Some(&operation) = params.get("Operation") else {
        return error_document(StatusCode::BAD_REQUEST, "ErrorResponse", "AWS.MissingParameters", "Your request is missing the Operation parameter.");
    };
    let root = format!("{operation}ErrorResponse");

    for required in ["AWSAccessKeyId", "Timestamp", "Signature"] {
        if !params.contains_key(required) {
            return error_document(
                StatusCode::BAD_REQUEST,
                &root,
                "MissingParameter",
                &format!("The request must contain the parameter {required}."),
            );
        }
    }
    if params["AWSAccessKeyId"] != config.access_key {
        return error_document(
            StatusCode::FORBIDDEN,
            &root,
            "InvalidClientTokenId",
            "The AWS Access Key Id you provided does not exist in our records.",
        );
    }
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok()).unwrap_or_default();
    let (_, expected) = sign_params(&config.secret_key, host, uri.path(), &pairs);
    if params["Signature"] != expected {
        return error_document(
            StatusCode::FORBIDDEN,
            &root,
            "SignatureDoesNotMatch",
            "The request signature we calculated does not match the signature you provided.",
        );
    }

    let body = match operation {
        "ItemLookup" => item_lookup(&params),
        "ItemSearch" => item_search(&params),
        "BrowseNodeLookup" => browse_node_lookup(&params),
        "CartCreate" => cart_create(&params, &config.secret_key),
        other => {
            return error_document(
                StatusCode::BAD_REQUEST,
                &root,
                "AWS.InvalidOperationParameter",
                &format!("The Operation parameter is invalid. {other} is not a valid operation."),
            );
        }
    };
    match body {
        Ok(body) => xml(StatusCode::OK, body),
        Err(message) => error_document(StatusCode::BAD_REQUEST, &root, "AWS.MissingParameters", &message),
    }
}

fn envelope(operation: &str, inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" ?>
<{operation}Response xmlns="{NAMESPACE}"><OperationRequest><RequestId>{}</RequestId><RequestProcessingTime>0.0042</RequestProcessingTime></OperationRequest>{inner}</{operation}Response>"#,
        Uuid::new_v4()
    )
}

fn request_block(errors: &[String]) -> String {
    let mut out = String::from("<Request><IsValid>True</IsValid>");
    if !errors.is_empty() {
        out.push_str("<Errors>");
        for message in errors {
            let _ = write!(
                out,
                "<Error><Code>AWS.InvalidParameterValue</Code><Message>{}</Message></Error>",
                escape(message.as_str())
            );
        }
        out.push_str("</Errors>");
    }
    out.push_str("</Request>");
    out
}

fn price(cents: u64) -> String {
    format!(
        "<Amount>{cents}</Amount><CurrencyCode>USD</CurrencyCode><FormattedPrice>${}.{:02}</FormattedPrice>",
        cents / 100,
        cents % 100
    )
}

fn item_xml(product: &Product) -> String {
    format!(
        "<Item><ASIN>{asin}</ASIN><DetailPageURL>https://www.amazon.com/dp/{asin}</DetailPageURL>\
         <ItemAttributes><EAN>{ean}</EAN><Manufacturer>{manufacturer}</Manufacturer>\
         <ListPrice>{price}</ListPrice><Title>{title}</Title></ItemAttributes>\
         <OfferSummary><LowestNewPrice>{price}</LowestNewPrice><TotalNew>1</TotalNew></OfferSummary></Item>",
        asin = product.asin,
        ean = product.ean,
        manufacturer = escape(product.manufacturer),
        title = escape(product.title),
        price = price(product.price_cents),
    )
}

fn item_lookup(params: &BTreeMap<&str, &str>) -> Result<String, String> {
    let ids = params
        .get("ItemId")
        .ok_or("Your request is missing required parameters. Required parameters include ItemId.")?;
    let by_ean = params.get("IdType") == Some(&"EAN");

    let mut errors = Vec::new();
    let mut items = String::new();
    for id in ids.split(',') {
        let found = CATALOG
            .iter()
            .find(|p| if by_ean { p.ean == id } else { p.asin == id });
        match found {
            Some(product) => items.push_str(&item_xml(product)),
            None => errors.push(format!(
                "{id} is not a valid value for ItemId. Please change this value and retry your request."
            )),
        }
    }
    Ok(envelope("ItemLookup", &format!("<Items>{}{items}</Items>", request_block(&errors))))
}

fn item_search(params: &BTreeMap<&str, &str>) -> Result<String, String> {
    let keywords = params
        .get("Keywords")
        .ok_or("Your request is missing required parameters. Required parameters include Keywords.")?
        .to_lowercase();
    let index = params.get("SearchIndex").copied().unwrap_or("All");
    let page: usize = params.get("ItemPage").and_then(|p| p.parse().ok()).unwrap_or(1);

    let hits: Vec<&Product> = CATALOG
        .iter()
        .filter(|p| index == "All" || p.search_index == index)
        .filter(|p| p.title.to_lowercase().contains(&keywords))
        .collect();
    let total_pages = hits.len().div_ceil(RESULTS_PER_PAGE);
    let items: String = hits
        .iter()
        .skip((page.max(1) - 1) * RESULTS_PER_PAGE)
        .take(RESULTS_PER_PAGE)
        .map(|p| item_xml(p))
        .collect();
    Ok(envelope(
        "ItemSearch",
        &format!(
            "<Items>{}<TotalResults>{}</TotalResults><TotalPages>{total_pages}</TotalPages>{items}</Items>",
            request_block(&[]),
            hits.len()
        ),
    ))
}

fn node_list(tag: &str, nodes: &[(u64, &str)]) -> String {
    if nodes.is_empty() {
        return String::new();
    }
    let inner: String = nodes
        .iter()
        .map(|(id, name)| format!("<BrowseNode><BrowseNodeId>{id}</BrowseNodeId><Name>{}</Name></BrowseNode>", escape(*name)))
        .collect();
    format!("<{tag}>{inner}</{tag}>")
}

fn browse_node_lookup(params: &BTreeMap<&str, &str>) -> Result<String, String> {
    let id = params
        .get("BrowseNodeId")
        .ok_or("Your request is missing required parameters. Required parameters include BrowseNodeId.")?;
    let node = id.parse::<u64>().ok().and_then(|id| BROWSE_NODES.iter().find(|n| n.id == id));
    let inner = match node {
        Some(node) => format!(
            "{}<BrowseNode><BrowseNodeId>{}</BrowseNodeId><Name>{}</Name>{}{}</BrowseNode>",
            request_block(&[]),
            node.id,
            escape(node.name),
            node_list("Children", node.children),
            node_list("Ancestors", node.ancestors),
        ),
        None => request_block(&[format!("{id} is not a valid value for BrowseNodeId. Please change this value and retry your request.")]),
    };
    Ok(envelope("BrowseNodeLookup", &format!("<BrowseNodes>{inner}</BrowseNodes>")))
}

fn cart_create(params: &BTreeMap<&str, &str>, secret: &str) -> Result<String, String> {
    let mut errors = Vec::new();
    let mut lines = String::new();
    let mut total = 0;
    let mut n = 1;
    while let Some(asin) = params.get(format!("Item.{n}.ASIN").as_str()) {
        let quantity: u32 = match params.get(format!("Item.{n}.Quantity").as_str()) {
            None => 1,
            Some(q) => match q.parse() {
                Ok(q) => q,
                Err(_) => {
                    errors.push(format!("{q} is not a valid value for Item.{n}.Quantity."));
                    n += 1;
                    continue;
                }
            },
        };
        match CATALOG.iter().find(|p| p.asin == *asin) {
            Some(product) => {
                let line_total = product.price_cents * u64::from(quantity);
                total += line_total;
                let _ = write!(
                    lines,
                    "<CartItem><CartItemId>C{n:04}</CartItemId><ASIN>{}</ASIN><Quantity>{quantity}</Quantity>\
                     <Title>{}</Title><Price>{}</Price><ItemTotal>{}</ItemTotal></CartItem>",
                    product.asin,
                    escape(product.title),
                    price(product.price_cents),
                    price(line_total),
                );
            }
            None => errors.push(format!("Item {asin} is not eligible to be added to the cart.")),
        }
        n += 1;
    }
    if n == 1 {
        return Err("Your request is missing required parameters. Required parameters include Items.".to_string());
    }

    let mut inner = request_block(&errors);
    if !lines.is_empty() {
        let cart_id = Uuid::new_v4().to_string();
        let (_, hmac) = sign_params(secret, "cart", "/", &[("CartId".to_string(), cart_id.clone())]);
        let _ = write!(
            inner,
            "<CartId>{cart_id}</CartId><HMAC>{hmac}</HMAC><URLEncodedHMAC>{}</URLEncodedHMAC>\
             <PurchaseURL>https://www.amazon.com/gp/cart/aws-merge.html?cart-id={cart_id}</PurchaseURL>\
             <SubTotal>{}</SubTotal><CartItems><SubTotal>{}</SubTotal>{lines}</CartItems>",
            utf8_percent_encode(&hmac, UNRESERVED),
            price(total),
            price(total),
        );
    }
    Ok(envelope("CartCreate", &format!("<Cart>{inner}</Cart>")))
}
