use crate::dto::listing_dto::{ImageFile, ListingDraft, ListingTarget};
use crate::model::listing::{GeoPoint, Listing, ListingCategory};
use crate::repository::listing_repo::ListingRepository;
use crate::repository::repository_error::RepositoryError;
use crate::util::geocode::{GeocodeError, Geocoder};
use crate::util::minio::{ImageStore, MinioError};
use crate::util::single_flight::SubmissionGate;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use async_trait::async_trait;

/// Maximum number of images one listing may carry
pub const MAX_IMAGES: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("Regular price should be larger than discounted price")]
    Price,

    #[error("Maximum {MAX_IMAGES} images are allowed, got {0}")]
    ImageCount(usize),

    #[error("Invalid location, please input correct address: {0}")]
    Location(#[from] GeocodeError),

    #[error("Images not uploaded: {0}")]
    Upload(MinioError),

    #[error("Failed to persist listing: {0}")]
    Store(#[from] RepositoryError),

    #[error("A submission is already in progress for this user")]
    AlreadySubmitting,

    #[error("Not Found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait ListingService: Send + Sync {
    /// Run the full submission flow for one draft and return the
    /// navigation target of the created listing.
    async fn submit_listing(
        &self,
        owner_id: &str,
        draft: ListingDraft,
    ) -> Result<ListingTarget, ListingError>;

    async fn get_listing(&self, id: ObjectId) -> Result<Listing, ListingError>;

    async fn list_listings(
        &self,
        category: ListingCategory,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Listing>, ListingError>;
}

pub struct ListingServiceImpl {
    repo: Arc<dyn ListingRepository>,
    store: Arc<dyn ImageStore>,
    geocoder: Arc<dyn Geocoder>,
    geocoding_enabled: bool,
    gate: SubmissionGate,
}

impl ListingServiceImpl {
    pub fn new(
        repo: Arc<dyn ListingRepository>,
        store: Arc<dyn ImageStore>,
        geocoder: Arc<dyn Geocoder>,
        geocoding_enabled: bool,
    ) -> Self {
        ListingServiceImpl {
            repo,
            store,
            geocoder,
            geocoding_enabled,
            gate: SubmissionGate::new(),
        }
    }

    /// Check draft invariants. A failed check stops the flow before any
    /// upload or write happens.
    fn validate(draft: &ListingDraft) -> Result<(), ListingError> {
        if draft.offer && draft.discounted_price >= draft.regular_price {
            return Err(ListingError::Price);
        }
        if draft.images.len() > MAX_IMAGES {
            return Err(ListingError::ImageCount(draft.images.len()));
        }
        Ok(())
    }

    /// Resolve the listing coordinate.
    ///
    /// With geocoding disabled the manual latitude/longitude are returned
    /// verbatim; when enabled the address is resolved through the API and
    /// manual input is ignored.
    async fn resolve_location(&self, draft: &ListingDraft) -> Result<GeoPoint, ListingError> {
        if !self.geocoding_enabled {
            debug!("Geocoding disabled, using manual coordinates");
            return Ok(GeoPoint {
                lat: draft.latitude,
                lng: draft.longitude,
            });
        }

        let point = self.geocoder.geocode(&draft.address).await?;
        info!(lat = point.lat, lng = point.lng, "Address resolved");
        Ok(point)
    }

    /// Upload all images concurrently and return their download URLs in
    /// submission order.
    ///
    /// Every upload gets a collision-free object name built from the
    /// uploader, the original filename and a random suffix. The gather
    /// waits for all uploads to settle; if any failed, objects that did
    /// make it are removed best-effort and the first error is returned.
    async fn upload_images(
        &self,
        owner_id: &str,
        images: &[ImageFile],
    ) -> Result<Vec<String>, ListingError> {
        let uploads = images.iter().enumerate().map(|(index, image)| {
            let store = Arc::clone(&self.store);
            let object_name = format!("{}-{}-{}", owner_id, image.filename, Uuid::new_v4());
            async move {
                debug!(
                    index,
                    object_name = %object_name,
                    total_bytes = image.size,
                    "Uploading listing image"
                );
                store
                    .put_object(&object_name, image.content.clone(), Some(&image.content_type))
                    .await?;
                Ok::<String, MinioError>(object_name)
            }
        });

        // Index-preserving gather: join_all keeps input order
        let results = futures::future::join_all(uploads).await;

        let mut object_names = Vec::with_capacity(results.len());
        let mut first_error: Option<MinioError> = None;
        for result in results {
            match result {
                Ok(name) => object_names.push(name),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(err) = first_error {
            error!("Image upload failed: {}", err);
            self.cleanup_partial_uploads(&object_names).await;
            return Err(ListingError::Upload(err));
        }

        Ok(object_names
            .iter()
            .map(|name| self.store.download_link(name))
            .collect())
    }

    /// Compensating deletion for a partially failed upload set. Cleanup
    /// failures are only logged; the submission error already stands.
    async fn cleanup_partial_uploads(&self, object_names: &[String]) {
        if object_names.is_empty() {
            return;
        }
        warn!(
            "Cleaning up {} uploaded images after failed submission",
            object_names.len()
        );
        for name in object_names {
            if let Err(e) = self.store.remove_object(name).await {
                warn!("Failed to remove orphaned object '{}': {}", name, e);
            }
        }
    }
}

#[async_trait]
impl ListingService for ListingServiceImpl {
    #[instrument(skip(self, draft), fields(owner_id = %owner_id, category = %draft.category, images = draft.images.len()))]
    async fn submit_listing(
        &self,
        owner_id: &str,
        draft: ListingDraft,
    ) -> Result<ListingTarget, ListingError> {
        // Single-flight guard; the permit settles the session on drop,
        // whether the flow succeeds or fails.
        let _permit = self
            .gate
            .begin(owner_id)
            .ok_or(ListingError::AlreadySubmitting)?;

        info!("Submitting listing");

        Self::validate(&draft)?;
        let geolocation = self.resolve_location(&draft).await?;
        let image_urls = self.upload_images(owner_id, &draft.images).await?;

        let listing = Listing {
            id: None,
            category: draft.category,
            name: draft.name,
            bedrooms: draft.bedrooms,
            bathrooms: draft.bathrooms,
            parking: draft.parking,
            furnished: draft.furnished,
            address: draft.address,
            description: draft.description,
            offer: draft.offer,
            regular_price: draft.regular_price,
            discounted_price: draft.offer.then_some(draft.discounted_price),
            image_urls,
            geolocation,
            owner_id: owner_id.to_string(),
            created_at: None,
        };

        let created = self.repo.create(listing).await?;
        let id = created.id.ok_or_else(|| {
            ListingError::Store(RepositoryError::database("inserted listing has no id"))
        })?;

        info!(listing_id = %id, "Listing posted");
        Ok(ListingTarget {
            category: created.category,
            id: id.to_hex(),
        })
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_listing(&self, id: ObjectId) -> Result<Listing, ListingError> {
        self.repo.get_by_id(id).await.map_err(|e| match e {
            RepositoryError::NotFound(msg) => ListingError::NotFound(msg),
            other => ListingError::Store(other),
        })
    }

    #[instrument(skip(self), fields(category = %category, page = page, limit = limit))]
    async fn list_listings(
        &self,
        category: ListingCategory,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Listing>, ListingError> {
        let listings = self.repo.list_by_category(category, page, limit).await?;
        info!("Fetched {} listings", listings.len());
        Ok(listings)
    }
}
