use crate::model::listing::ListingCategory;
use serde::{Deserialize, Serialize};

use validator::Validate;

/// One image file received through the multipart form boundary
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
    pub size: usize,
}

/// In-memory draft of a listing, collected from the form and not yet persisted
#[derive(Debug, Clone)]
pub struct ListingDraft {
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
    pub discounted_price: u64,
    /// Manual coordinates, used only when geocoding is disabled
    pub latitude: f64,
    pub longitude: f64,
    pub images: Vec<ImageFile>,
}

// --- Validated DTOs for request validation ---

/// JSON part of the create-listing multipart request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub category: ListingCategory,

    #[validate(length(min = 10, max = 32))]
    pub name: String,

    #[validate(range(min = 1, max = 50))]
    pub bedrooms: u32,

    #[validate(range(min = 1, max = 50))]
    pub bathrooms: u32,

    pub parking: bool,

    pub furnished: bool,

    #[validate(length(min = 1))]
    pub address: String,

    #[validate(length(min = 1))]
    pub description: String,

    pub offer: bool,

    #[validate(range(min = 50, max = 400000000))]
    pub regular_price: u64,

    #[serde(default)]
    pub discounted_price: u64,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: f64,
}

impl CreateListingRequest {
    pub fn into_draft(self, images: Vec<ImageFile>) -> ListingDraft {
        ListingDraft {
            category: self.category,
            name: self.name,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            parking: self.parking,
            furnished: self.furnished,
            address: self.address,
            description: self.description,
            offer: self.offer,
            regular_price: self.regular_price,
            discounted_price: self.discounted_price,
            latitude: self.latitude,
            longitude: self.longitude,
            images,
        }
    }
}

/// Navigation target returned once a submission succeeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingTarget {
    pub category: ListingCategory,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_request() -> CreateListingRequest {
        CreateListingRequest {
            category: ListingCategory::Rent,
            name: "Sunny downtown flat".to_string(),
            bedrooms: 2,
            bathrooms: 1,
            parking: false,
            furnished: true,
            address: "1 Main St".to_string(),
            description: "A flat".to_string(),
            offer: false,
            regular_price: 1000,
            discounted_price: 0,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_short_name_rejected() {
        let mut req = valid_request();
        req.name = "Flat".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_price_below_minimum_rejected() {
        let mut req = valid_request();
        req.regular_price = 10;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let mut req = valid_request();
        req.latitude = 91.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let req = valid_request();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["category"], "rent");
    }
}
