use axum::extract::{Multipart, Path, Query, State};
use axum::{response::IntoResponse, Extension, Json};
use bson::oid::ObjectId;
use bytes::BytesMut;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::dto::listing_dto::{CreateListingRequest, ImageFile};
use crate::middlewares::auth_middleware::OwnerId;
use crate::model::listing::ListingCategory;
use crate::service::listing_service::ListingService;
use crate::util::error::HandlerError;

use validator::Validate;

/// Content types accepted through the image form boundary
const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// POST /listings
///
/// Multipart request: one "json" part carrying the draft fields and up to
/// six image parts. Runs the full submission flow and returns the
/// navigation target of the created listing.
pub async fn create_listing_handler(
    State(service): State<Arc<dyn ListingService>>,
    Extension(owner): Extension<OwnerId>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[create_listing_handler] Handler called");
    let mut json_data: Option<CreateListingRequest> = None;
    let mut images: Vec<ImageFile> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("[create_listing_handler] Error getting next field: {}", e);
        HandlerError::bad_request(format!("Failed to get next field: {}", e))
    })? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        debug!("[create_listing_handler] Processing field: {}", name);

        if name == "json" {
            let data = field.bytes().await.map_err(|e| {
                error!("[create_listing_handler] Failed to read json field: {}", e);
                HandlerError::bad_request(format!("Failed to read json field: {}", e))
            })?;
            let request: CreateListingRequest = serde_json::from_slice(&data).map_err(|e| {
                error!("[create_listing_handler] Invalid JSON: {}", e);
                HandlerError::bad_request(format!("Invalid JSON: {}", e))
            })?;
            json_data = Some(request);
        } else if name.starts_with("image") {
            let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_default();

            if !ACCEPTED_IMAGE_TYPES.contains(&content_type.as_str()) {
                error!(
                    "[create_listing_handler] Rejected image content type: {}",
                    content_type
                );
                return Err(HandlerError::bad_request(format!(
                    "Unsupported image type '{}', accepted: jpg, jpeg, png",
                    content_type
                )));
            }

            let mut buf = BytesMut::new();
            let mut stream = field;
            while let Some(chunk) = stream.chunk().await.map_err(|e| {
                error!("[create_listing_handler] Error reading image chunk: {}", e);
                HandlerError::bad_request(format!("Failed to read image chunk: {}", e))
            })? {
                buf.extend_from_slice(&chunk);
            }
            info!(
                "[create_listing_handler] Received image: {} ({} bytes)",
                filename,
                buf.len()
            );
            images.push(ImageFile {
                filename,
                content_type,
                size: buf.len(),
                content: buf.to_vec(),
            });
        }
    }

    let request = json_data.ok_or_else(|| {
        error!("[create_listing_handler] Missing listing JSON data");
        HandlerError::bad_request("Missing listing JSON data")
    })?;

    if let Err(e) = request.validate() {
        return Err(HandlerError::validation(format!("Validation error: {}", e)));
    }

    let target = service
        .submit_listing(&owner.0, request.into_draft(images))
        .await?;

    Ok(Json(target))
}

/// GET /listings/{id}
pub async fn get_listing_handler(
    State(service): State<Arc<dyn ListingService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = ObjectId::parse_str(&id)
        .map_err(|_| HandlerError::bad_request("Invalid listing id"))?;
    let listing = service.get_listing(id).await?;
    Ok(Json(listing))
}

/// GET /listings?category=rent&page=1&limit=20
pub async fn list_listings_handler(
    State(service): State<Arc<dyn ListingService>>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let category = match params.get("category").map(|s| s.as_str()) {
        Some("sale") | None => ListingCategory::Sale,
        Some("rent") => ListingCategory::Rent,
        Some(other) => {
            return Err(HandlerError::bad_request(format!(
                "Unknown category '{}'",
                other
            )))
        }
    };
    let page = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let limit = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(20);

    let listings = service.list_listings(category, page, limit).await?;
    Ok(Json(listings))
}
