//! Operation descriptions and their builders.
//!
//! An `Operation` is the unsigned form of one API call: the operation name
//! plus its call-specific parameters. Builders validate their arguments and
//! never touch configuration; the signer adds credentials and the timestamp.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ApiError, Result};
use crate::types::{CartItem, ResponseGroup, SearchIndex};

/// Most identifiers a single item lookup accepts.
pub const MAX_LOOKUP_IDS: usize = 10;

/// Highest result page an item search can request.
pub const MAX_ITEM_PAGE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationName {
    ItemLookup,
    ItemSearch,
    BrowseNodeLookup,
    CartCreate,
    /// Any other operation the remote API offers.
    Other(String),
}

impl OperationName {
    pub fn as_str(&self) -> &str {
        match self {
            OperationName::ItemLookup => "ItemLookup",
            OperationName::ItemSearch => "ItemSearch",
            OperationName::BrowseNodeLookup => "BrowseNodeLookup",
            OperationName::CartCreate => "CartCreate",
            OperationName::Other(name) => name,
        }
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One API call before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: OperationName,
    params: BTreeMap<String, String>,
}

impl Operation {
    pub fn new<K, V>(name: OperationName, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name,
            params: params.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn name(&self) -> &OperationName {
        &self.name
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Identifier families accepted by item lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdKind {
    /// ASINs, and anything not shaped like a barcode. Books share the
    /// ISBN-10 as their ASIN.
    Asin,
    /// 8, 12, 13 or 14 digits: EAN-8, UPC, EAN-13/ISBN-13, GTIN-14.
    Ean,
}

fn classify(id: &str) -> IdKind {
    match id.len() {
        8 | 12 | 13 | 14 if id.bytes().all(|b| b.is_ascii_digit()) => IdKind::Ean,
        _ => IdKind::Asin,
    }
}

/// Drops surrounding whitespace and the hyphens printed in ISBNs.
fn normalize_id(id: &str) -> String {
    id.trim().chars().filter(|&c| c != '-').collect()
}

/// Builds an `ItemLookup` for one or more article identifiers.
pub fn item_lookup<S: AsRef<str>>(ids: &[S], response_group: ResponseGroup) -> Result<Operation> {
    if ids.is_empty() {
        return Err(ApiError::invalid_argument("item lookup needs at least one identifier"));
    }
    if ids.len() > MAX_LOOKUP_IDS {
        return Err(ApiError::invalid_argument(format!(
            "item lookup accepts at most {MAX_LOOKUP_IDS} identifiers, got {}",
            ids.len()
        )));
    }

    let mut kind = None;
    let mut trimmed = Vec::with_capacity(ids.len());
    for id in ids {
        let id = normalize_id(id.as_ref());
        if id.is_empty() {
            return Err(ApiError::invalid_argument("item identifier is blank"));
        }
        let this = classify(&id);
        match kind {
            None => kind = Some(this),
            Some(k) if k != this => {
                return Err(ApiError::invalid_argument(
                    "item lookup cannot mix ASINs and EANs in one request",
                ));
            }
            Some(_) => {}
        }
        trimmed.push(id);
    }

    let mut params = vec![
        ("ItemId", trimmed.join(",")),
        ("ResponseGroup", response_group.as_str().to_string()),
    ];
    if kind == Some(IdKind::Ean) {
        params.push(("IdType", "EAN".to_string()));
        params.push(("SearchIndex", SearchIndex::All.as_str().to_string()));
    }
    Ok(Operation::new(OperationName::ItemLookup, params))
}

/// Builds an `ItemSearch` for the first result page.
pub fn item_search(
    keywords: &str,
    search_index: SearchIndex,
    response_group: ResponseGroup,
) -> Result<Operation> {
    item_search_page(keywords, search_index, response_group, None)
}

/// Builds an `ItemSearch`, optionally for a specific result page.
pub fn item_search_page(
    keywords: &str,
    search_index: SearchIndex,
    response_group: ResponseGroup,
    item_page: Option<u8>,
) -> Result<Operation> {
    let keywords = keywords.trim();
    if keywords.is_empty() {
        return Err(ApiError::invalid_argument("search keywords are blank"));
    }
    let mut params = vec![
        ("Keywords", keywords.to_string()),
        ("SearchIndex", search_index.as_str().to_string()),
        ("ResponseGroup", response_group.as_str().to_string()),
    ];
    if let Some(page) = item_page {
        if page == 0 || page > MAX_ITEM_PAGE {
            return Err(ApiError::invalid_argument(format!(
                "item page must be within 1..={MAX_ITEM_PAGE}, got {page}"
            )));
        }
        params.push(("ItemPage", page.to_string()));
    }
    Ok(Operation::new(OperationName::ItemSearch, params))
}

/// Builds a `BrowseNodeLookup` for one node. `ResponseGroup::BrowseNodeInfo`
/// is the usual group here.
pub fn browse_node_lookup(browse_node_id: u64, response_group: ResponseGroup) -> Operation {
    Operation::new(
        OperationName::BrowseNodeLookup,
        [
            ("BrowseNodeId", browse_node_id.to_string()),
            ("ResponseGroup", response_group.as_str().to_string()),
        ],
    )
}

/// Builds a `CartCreate`. Lines are numbered from 1 in the given order.
pub fn cart_create(items: &[CartItem]) -> Result<Operation> {
    if items.is_empty() {
        return Err(ApiError::invalid_argument("cart needs at least one item"));
    }
    let mut params = Vec::with_capacity(items.len() * 2);
    for (index, item) in items.iter().enumerate() {
        let n = index + 1;
        let asin = item.asin.trim();
        if asin.is_empty() {
            return Err(ApiError::invalid_argument(format!("cart item {n} has a blank identifier")));
        }
        if item.quantity == 0 {
            return Err(ApiError::invalid_argument(format!("cart item {n} ({asin}) has quantity 0")));
        }
        params.push((format!("Item.{n}.ASIN"), asin.to_string()));
        params.push((format!("Item.{n}.Quantity"), item.quantity.to_string()));
    }
    Ok(Operation::new(OperationName::CartCreate, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_joins_identifiers_with_comma() {
        let op = item_lookup(&["B00005N5PF", "0679722769", "B01N5IB20Q"], ResponseGroup::Small).unwrap();
        assert_eq!(op.name(), &OperationName::ItemLookup);
        assert_eq!(op.param("ItemId"), Some("B00005N5PF,0679722769,B01N5IB20Q"));
        assert_eq!(op.param("ResponseGroup"), Some("Small"));
        assert_eq!(op.param("IdType"), None);
        assert_eq!(op.params().len(), 2);
    }

    #[test]
    fn lookup_by_ean_sets_id_type_and_index() {
        let op = item_lookup(&["4006381333931"], ResponseGroup::Large).unwrap();
        assert_eq!(op.param("IdType"), Some("EAN"));
        assert_eq!(op.param("SearchIndex"), Some("All"));
    }

    #[test]
    fn lookup_rejects_empty_list() {
        let ids: [&str; 0] = [];
        let err = item_lookup(&ids, ResponseGroup::Large).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn lookup_rejects_too_many_identifiers() {
        let ids = vec!["B00005N5PF"; MAX_LOOKUP_IDS + 1];
        assert!(matches!(
            item_lookup(&ids, ResponseGroup::Large),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn lookup_rejects_mixed_and_blank_identifiers() {
        assert!(item_lookup(&["B00005N5PF", "4006381333931"], ResponseGroup::Large).is_err());
        assert!(item_lookup(&["   "], ResponseGroup::Large).is_err());
        assert!(item_lookup(&["--"], ResponseGroup::Large).is_err());
    }

    #[test]
    fn lookup_accepts_every_barcode_length() {
        for (id, expected) in [
            ("00012345678905", "00012345678905"),
            ("96385074", "96385074"),
            ("978-0-679-72276-2", "9780679722762"),
            ("885909950805", "885909950805"),
        ] {
            let op = item_lookup(&[id], ResponseGroup::Large).unwrap();
            assert_eq!(op.param("ItemId"), Some(expected), "{id}");
            assert_eq!(op.param("IdType"), Some("EAN"), "{id}");
        }
    }

    #[test]
    fn lookup_passes_other_shapes_through_as_asin() {
        let op = item_lookup(&["0-679-72276-9", "B0DEVICE01X"], ResponseGroup::Small).unwrap();
        assert_eq!(op.param("ItemId"), Some("0679722769,B0DEVICE01X"));
        assert_eq!(op.param("IdType"), None);
    }

    #[test]
    fn search_sets_keywords_index_and_group() {
        let op = item_search("rust programming", SearchIndex::Books, ResponseGroup::Medium).unwrap();
        assert_eq!(op.name(), &OperationName::ItemSearch);
        assert_eq!(op.param("Keywords"), Some("rust programming"));
        assert_eq!(op.param("SearchIndex"), Some("Books"));
        assert_eq!(op.param("ResponseGroup"), Some("Medium"));
        assert_eq!(op.param("ItemPage"), None);
    }

    #[test]
    fn search_page_bounds() {
        let op = item_search_page("lamp", SearchIndex::All, ResponseGroup::Small, Some(3)).unwrap();
        assert_eq!(op.param("ItemPage"), Some("3"));
        assert!(item_search_page("lamp", SearchIndex::All, ResponseGroup::Small, Some(0)).is_err());
        assert!(item_search_page("lamp", SearchIndex::All, ResponseGroup::Small, Some(11)).is_err());
    }

    #[test]
    fn search_rejects_blank_keywords() {
        let err = item_search("  ", SearchIndex::All, ResponseGroup::Large).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn browse_node_lookup_params() {
        let op = browse_node_lookup(283155, ResponseGroup::BrowseNodeInfo);
        assert_eq!(op.name(), &OperationName::BrowseNodeLookup);
        assert_eq!(op.param("BrowseNodeId"), Some("283155"));
        assert_eq!(op.param("ResponseGroup"), Some("BrowseNodeInfo"));
    }

    #[test]
    fn cart_create_numbers_lines_from_one() {
        let op = cart_create(&[CartItem::new("B00005N5PF", 2), CartItem::new("0679722769", 1)]).unwrap();
        assert_eq!(op.name(), &OperationName::CartCreate);
        assert_eq!(op.param("Item.1.ASIN"), Some("B00005N5PF"));
        assert_eq!(op.param("Item.1.Quantity"), Some("2"));
        assert_eq!(op.param("Item.2.ASIN"), Some("0679722769"));
        assert_eq!(op.param("Item.2.Quantity"), Some("1"));
        assert_eq!(op.params().len(), 4);
    }

    #[test]
    fn cart_create_rejects_empty_and_zero_quantity() {
        assert!(cart_create(&[]).is_err());
        assert!(cart_create(&[CartItem::new("B00005N5PF", 0)]).is_err());
        assert!(cart_create(&[CartItem::new(" ", 1)]).is_err());
    }

    #[test]
    fn builders_are_idempotent() {
        let a = item_lookup(&["B00005N5PF", "0679722769"], ResponseGroup::Large).unwrap();
        let b = item_lookup(&["B00005N5PF", "0679722769"], ResponseGroup::Large).unwrap();
        assert_eq!(a, b);
        let a = cart_create(&[CartItem::new("B00005N5PF", 1)]).unwrap();
        let b = cart_create(&[CartItem::new("B00005N5PF", 1)]).unwrap();
        assert_eq!(a.params(), b.params());
    }

    #[test]
    fn other_operation_names_pass_through() {
        let op = Operation::new(OperationName::Other("SimilarityLookup".to_string()), [("ItemId", "B00005N5PF")]);
        assert_eq!(op.name().as_str(), "SimilarityLookup");
    }
}
