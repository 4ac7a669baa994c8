use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Whether a listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingCategory {
    Sale,
    Rent,
}

impl std::fmt::Display for ListingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingCategory::Sale => write!(f, "sale"),
            ListingCategory::Rent => write!(f, "rent"),
        }
    }
}

/// Resolved coordinate pair, either geocoded or taken from manual input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Persisted listing document
///
/// Created once by the submission flow and immutable afterwards.
/// `image_urls` preserves the order in which images were submitted,
/// and `discounted_price` is only stored when the listing is an offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub category: ListingCategory,
    pub name: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub parking: bool,
    pub furnished: bool,
    pub address: String,
    pub description: String,
    pub offer: bool,
    pub regular_price: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<u64>,
    pub image_urls: Vec<String>,
    pub geolocation: GeoPoint,
    pub owner_id: String,
    pub created_at: Option<String>,
}
