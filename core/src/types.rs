//! Configuration and argument types for the catalog API.
//!
//! # Design
//! `Credential` and `Endpoint` are fixed at client construction and never
//! change afterwards. The enums mirror the remote API's vocabulary; their
//! `as_str` output is exactly what goes on the wire.

use std::fmt;

use url::Url;

use crate::error::{ApiError, Result};

/// Request path of the catalog service on every regional host.
pub const SERVICE_PATH: &str = "/onca/xml";

/// Access key pair used to sign requests.
///
/// The associate tag is optional here, but the live API rejects requests
/// without one.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_key: String,
    secret_key: String,
    associate_tag: Option<String>,
}

impl Credential {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            associate_tag: None,
        }
    }

    #[must_use]
    pub fn with_associate_tag(mut self, tag: impl Into<String>) -> Self {
        self.associate_tag = Some(tag.into());
        self
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn associate_tag(&self) -> Option<&str> {
        self.associate_tag.as_deref()
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.access_key.trim().is_empty() {
            return Err(ApiError::InvalidConfiguration("access key is empty".to_string()));
        }
        if self.secret_key.is_empty() {
            return Err(ApiError::InvalidConfiguration("secret key is empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("associate_tag", &self.associate_tag)
            .finish()
    }
}

/// Regional marketplaces served by the catalog API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Us,
    Uk,
    De,
    Fr,
    Jp,
    Ca,
    It,
    Es,
    In,
    Br,
    Mx,
    Cn,
    Au,
}

impl Region {
    pub fn host(&self) -> &'static str {
        match self {
            Region::Us => "webservices.amazon.com",
            Region::Uk => "webservices.amazon.co.uk",
            Region::De => "webservices.amazon.de",
            Region::Fr => "webservices.amazon.fr",
            Region::Jp => "webservices.amazon.co.jp",
            Region::Ca => "webservices.amazon.ca",
            Region::It => "webservices.amazon.it",
            Region::Es => "webservices.amazon.es",
            Region::In => "webservices.amazon.in",
            Region::Br => "webservices.amazon.com.br",
            Region::Mx => "webservices.amazon.com.mx",
            Region::Cn => "webservices.amazon.cn",
            Region::Au => "webservices.amazon.com.au",
        }
    }

    /// Looks up a region by its two-letter code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        let region = match code.to_ascii_lowercase().as_str() {
            "us" => Region::Us,
            "uk" | "gb" => Region::Uk,
            "de" => Region::De,
            "fr" => Region::Fr,
            "jp" => Region::Jp,
            "ca" => Region::Ca,
            "it" => Region::It,
            "es" => Region::Es,
            "in" => Region::In,
            "br" => Region::Br,
            "mx" => Region::Mx,
            "cn" => Region::Cn,
            "au" => Region::Au,
            _ => return None,
        };
        Some(region)
    }
}

/// Where signed requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    path: String,
}

impl Endpoint {
    pub fn region(region: Region) -> Self {
        Self {
            scheme: "https".to_string(),
            host: region.host().to_string(),
            path: SERVICE_PATH.to_string(),
        }
    }

    /// Parses a base URL such as `http://127.0.0.1:3000` or
    /// `https://proxy.internal/catalog`. The service path is appended to the
    /// base path.
    pub fn parse(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidConfiguration(format!("endpoint {base_url:?}: {e}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ApiError::InvalidConfiguration(format!(
                "endpoint {base_url:?}: unsupported scheme {}",
                url.scheme()
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ApiError::InvalidConfiguration(format!(
                "endpoint {base_url:?}: must not carry a query or fragment"
            )));
        }
        let host = url.host_str().ok_or_else(|| {
            ApiError::InvalidConfiguration(format!("endpoint {base_url:?}: missing host"))
        })?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let path = format!("{}{SERVICE_PATH}", url.path().trim_end_matches('/'));
        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            path,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host as it appears in the `Host` header, port included when explicit.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl From<Region> for Endpoint {
    fn from(region: Region) -> Self {
        Endpoint::region(region)
    }
}

/// How much data the remote API includes in a success response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseGroup {
    Accessories,
    BrowseNodeInfo,
    BrowseNodes,
    Cart,
    CartSimilarities,
    EditorialReview,
    Images,
    ItemAttributes,
    ItemIds,
    #[default]
    Large,
    Medium,
    MostGifted,
    MostWishedFor,
    NewReleases,
    OfferFull,
    OfferSummary,
    Offers,
    Request,
    Reviews,
    SalesRank,
    Similarities,
    Small,
    TopSellers,
    Tracks,
    VariationSummary,
    Variations,
}

impl ResponseGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseGroup::Accessories => "Accessories",
            ResponseGroup::BrowseNodeInfo => "BrowseNodeInfo",
            ResponseGroup::BrowseNodes => "BrowseNodes",
            ResponseGroup::Cart => "Cart",
            ResponseGroup::CartSimilarities => "CartSimilarities",
            ResponseGroup::EditorialReview => "EditorialReview",
            ResponseGroup::Images => "Images",
            ResponseGroup::ItemAttributes => "ItemAttributes",
            ResponseGroup::ItemIds => "ItemIds",
            ResponseGroup::Large => "Large",
            ResponseGroup::Medium => "Medium",
            ResponseGroup::MostGifted => "MostGifted",
            ResponseGroup::MostWishedFor => "MostWishedFor",
            ResponseGroup::NewReleases => "NewReleases",
            ResponseGroup::OfferFull => "OfferFull",
            ResponseGroup::OfferSummary => "OfferSummary",
            ResponseGroup::Offers => "Offers",
            ResponseGroup::Request => "Request",
            ResponseGroup::Reviews => "Reviews",
            ResponseGroup::SalesRank => "SalesRank",
            ResponseGroup::Similarities => "Similarities",
            ResponseGroup::Small => "Small",
            ResponseGroup::TopSellers => "TopSellers",
            ResponseGroup::Tracks => "Tracks",
            ResponseGroup::VariationSummary => "VariationSummary",
            ResponseGroup::Variations => "Variations",
        }
    }
}

impl fmt::Display for ResponseGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product category an item search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchIndex {
    #[default]
    All,
    Apparel,
    Appliances,
    Automotive,
    Baby,
    Beauty,
    Blended,
    Books,
    Classical,
    Dvd,
    Electronics,
    ForeignBooks,
    GiftCards,
    Grocery,
    HealthPersonalCare,
    Jewelry,
    KindleStore,
    Kitchen,
    Music,
    MusicalInstruments,
    OfficeProducts,
    PcHardware,
    PetSupplies,
    Shoes,
    Software,
    SportingGoods,
    Tools,
    Toys,
    VideoGames,
    Watches,
}

impl SearchIndex {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchIndex::All => "All",
            SearchIndex::Apparel => "Apparel",
            SearchIndex::Appliances => "Appliances",
            SearchIndex::Automotive => "Automotive",
            SearchIndex::Baby => "Baby",
            SearchIndex::Beauty => "Beauty",
            SearchIndex::Blended => "Blended",
            SearchIndex::Books => "Books",
            SearchIndex::Classical => "Classical",
            SearchIndex::Dvd => "DVD",
            SearchIndex::Electronics => "Electronics",
            SearchIndex::ForeignBooks => "ForeignBooks",
            SearchIndex::GiftCards => "GiftCards",
            SearchIndex::Grocery => "Grocery",
            SearchIndex::HealthPersonalCare => "HealthPersonalCare",
            SearchIndex::Jewelry => "Jewelry",
            SearchIndex::KindleStore => "KindleStore",
            SearchIndex::Kitchen => "Kitchen",
            SearchIndex::Music => "Music",
            SearchIndex::MusicalInstruments => "MusicalInstruments",
            SearchIndex::OfficeProducts => "OfficeProducts",
            SearchIndex::PcHardware => "PCHardware",
            SearchIndex::PetSupplies => "PetSupplies",
            SearchIndex::Shoes => "Shoes",
            SearchIndex::Software => "Software",
            SearchIndex::SportingGoods => "SportingGoods",
            SearchIndex::Tools => "Tools",
            SearchIndex::Toys => "Toys",
            SearchIndex::VideoGames => "VideoGames",
            SearchIndex::Watches => "Watches",
        }
    }
}

impl fmt::Display for SearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a cart to create: item identifier and quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub asin: String,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(asin: impl Into<String>, quantity: u32) -> Self {
        Self {
            asin: asin.into(),
            quantity,
        }
    }
}
