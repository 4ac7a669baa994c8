use async_trait::async_trait;
use bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use realtor_backend::dto::listing_dto::{ImageFile, ListingDraft};
use realtor_backend::model::listing::{GeoPoint, Listing, ListingCategory};
use realtor_backend::repository::listing_repo::ListingRepository;
use realtor_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use realtor_backend::service::listing_service::{ListingError, ListingService, ListingServiceImpl};
use realtor_backend::util::geocode::{GeocodeError, Geocoder};
use realtor_backend::util::minio::{ImageStore, MinioError};

// --- In-memory fakes ---

#[derive(Default)]
struct InMemoryRepo {
    listings: Mutex<Vec<Listing>>,
}

#[async_trait]
impl ListingRepository for InMemoryRepo {
    async fn create(&self, listing: Listing) -> RepositoryResult<Listing> {
        let mut new_listing = listing;
        new_listing.id = Some(ObjectId::new());
        new_listing.created_at = Some(chrono::Utc::now().to_rfc3339());
        self.listings.lock().unwrap().push(new_listing.clone());
        Ok(new_listing)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Listing> {
        self.listings
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Listing not found for ID: {}", id)))
    }

    async fn list_by_category(
        &self,
        category: ListingCategory,
        _page: u32,
        _limit: u32,
    ) -> RepositoryResult<Vec<Listing>> {
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.category == category)
            .cloned()
            .collect())
    }
}

/// Fake blob store: per-filename latency, optional failure injection,
/// records every put and remove.
#[derive(Default)]
struct FakeStore {
    puts: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    latencies_ms: HashMap<String, u64>,
    fail_on: Option<String>,
}

#[async_trait]
impl ImageStore for FakeStore {
    async fn put_object(
        &self,
        object_name: &str,
        _data: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), MinioError> {
        for (needle, ms) in &self.latencies_ms {
            if object_name.contains(needle.as_str()) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
        }
        if let Some(ref needle) = self.fail_on {
            if object_name.contains(needle.as_str()) {
                return Err(MinioError::OperationError("injected upload failure".into()));
            }
        }
        self.puts.lock().unwrap().push(object_name.to_string());
        Ok(())
    }

    async fn remove_object(&self, object_name: &str) -> Result<(), MinioError> {
        self.removed.lock().unwrap().push(object_name.to_string());
        Ok(())
    }

    fn download_link(&self, object_name: &str) -> String {
        format!("http://store.local/listing-images/{}", object_name)
    }
}

struct FakeGeocoder {
    /// None simulates a ZERO_RESULTS response
    result: Option<GeoPoint>,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, _address: &str) -> Result<GeoPoint, GeocodeError> {
        self.result.ok_or(GeocodeError::ZeroResults)
    }
}

// --- Helpers ---

fn image(name: &str) -> ImageFile {
    ImageFile {
        filename: name.to_string(),
        content_type: "image/jpeg".to_string(),
        content: vec![0u8; 16],
        size: 16,
    }
}

fn draft(images: Vec<ImageFile>) -> ListingDraft {
    ListingDraft {
        category: ListingCategory::Rent,
        name: "Flat".to_string(),
        bedrooms: 2,
        bathrooms: 1,
        parking: false,
        furnished: false,
        address: "1 Main St".to_string(),
        description: "A flat".to_string(),
        offer: false,
        regular_price: 1000,
        discounted_price: 0,
        latitude: 1.0,
        longitude: 2.0,
        images,
    }
}

struct Harness {
    repo: Arc<InMemoryRepo>,
    store: Arc<FakeStore>,
    service: Arc<ListingServiceImpl>,
}

fn harness(store: FakeStore, geocoder: FakeGeocoder, geocoding_enabled: bool) -> Harness {
    let repo = Arc::new(InMemoryRepo::default());
    let store = Arc::new(store);
    let service = Arc::new(ListingServiceImpl::new(
        repo.clone(),
        store.clone(),
        Arc::new(geocoder),
        geocoding_enabled,
    ));
    Harness {
        repo,
        store,
        service,
    }
}

fn default_harness() -> Harness {
    harness(FakeStore::default(), FakeGeocoder { result: None }, false)
}

// --- Tests ---

#[tokio::test]
async fn price_violation_fails_before_any_upload_or_write() {
    let h = default_harness();
    let mut d = draft(vec![image("a.jpg")]);
    d.offer = true;
    d.regular_price = 100;
    d.discounted_price = 100;

    let result = h.service.submit_listing("user-1", d).await;
    assert!(matches!(result, Err(ListingError::Price)));
    assert!(h.store.puts.lock().unwrap().is_empty());
    assert!(h.repo.listings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn too_many_images_fails_before_any_upload_or_write() {
    let h = default_harness();
    let images = (0..7).map(|i| image(&format!("{}.jpg", i))).collect();

    let result = h.service.submit_listing("user-1", draft(images)).await;
    assert!(matches!(result, Err(ListingError::ImageCount(7))));
    assert!(h.store.puts.lock().unwrap().is_empty());
    assert!(h.repo.listings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn price_check_short_circuits_image_count_check() {
    let h = default_harness();
    let images = (0..7).map(|i| image(&format!("{}.jpg", i))).collect();
    let mut d = draft(images);
    d.offer = true;
    d.discounted_price = d.regular_price;

    let result = h.service.submit_listing("user-1", d).await;
    assert!(matches!(result, Err(ListingError::Price)));
}

#[tokio::test]
async fn manual_coordinates_used_verbatim_when_geocoding_disabled() {
    let h = default_harness();
    let d = draft(vec![image("a.jpg"), image("b.jpg")]);

    let target = h.service.submit_listing("user-1", d).await.unwrap();
    assert_eq!(target.category, ListingCategory::Rent);
    assert_eq!(target.id.len(), 24); // ObjectId hex

    let listings = h.repo.listings.lock().unwrap();
    assert_eq!(listings.len(), 1);
    let stored = &listings[0];
    assert_eq!(stored.geolocation, GeoPoint { lat: 1.0, lng: 2.0 });
    assert_eq!(stored.image_urls.len(), 2);
    assert_eq!(stored.owner_id, "user-1");
    assert!(stored.created_at.is_some());
}

#[tokio::test]
async fn zero_results_from_geocoder_fails_submission() {
    let h = harness(FakeStore::default(), FakeGeocoder { result: None }, true);
    let d = draft(vec![image("a.jpg")]);

    let result = h.service.submit_listing("user-1", d).await;
    assert!(matches!(
        result,
        Err(ListingError::Location(GeocodeError::ZeroResults))
    ));
    // Location resolution precedes uploads and the document write
    assert!(h.store.puts.lock().unwrap().is_empty());
    assert!(h.repo.listings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn geocoded_point_overrides_manual_coordinates() {
    let h = harness(
        FakeStore::default(),
        FakeGeocoder {
            result: Some(GeoPoint {
                lat: 59.32,
                lng: 18.06,
            }),
        },
        true,
    );
    let d = draft(vec![image("a.jpg")]);

    h.service.submit_listing("user-1", d).await.unwrap();
    let listings = h.repo.listings.lock().unwrap();
    assert_eq!(
        listings[0].geolocation,
        GeoPoint {
            lat: 59.32,
            lng: 18.06
        }
    );
}

#[tokio::test]
async fn upload_urls_preserve_submission_order() {
    // Latencies chosen so completion order (c, a, b) differs from
    // submission order (a, b, c)
    let mut store = FakeStore::default();
    store.latencies_ms.insert("a.jpg".to_string(), 80);
    store.latencies_ms.insert("b.jpg".to_string(), 120);
    store.latencies_ms.insert("c.jpg".to_string(), 5);

    let h = harness(store, FakeGeocoder { result: None }, false);
    let d = draft(vec![image("a.jpg"), image("b.jpg"), image("c.jpg")]);

    h.service.submit_listing("user-1", d).await.unwrap();
    let listings = h.repo.listings.lock().unwrap();
    let urls = &listings[0].image_urls;
    assert_eq!(urls.len(), 3);
    assert!(urls[0].contains("a.jpg"));
    assert!(urls[1].contains("b.jpg"));
    assert!(urls[2].contains("c.jpg"));
}

#[tokio::test]
async fn failed_upload_writes_nothing_and_removes_stored_objects() {
    let mut store = FakeStore::default();
    store.fail_on = Some("b.jpg".to_string());

    let h = harness(store, FakeGeocoder { result: None }, false);
    let d = draft(vec![image("a.jpg"), image("b.jpg"), image("c.jpg")]);

    let result = h.service.submit_listing("user-1", d).await;
    assert!(matches!(result, Err(ListingError::Upload(_))));
    assert!(h.repo.listings.lock().unwrap().is_empty());

    // The objects that did make it are compensated away
    let removed = h.store.removed.lock().unwrap();
    assert_eq!(removed.len(), 2);
    assert!(removed.iter().any(|n| n.contains("a.jpg")));
    assert!(removed.iter().any(|n| n.contains("c.jpg")));
}

#[tokio::test]
async fn object_names_include_owner_filename_and_unique_suffix() {
    let h = default_harness();
    let d = draft(vec![image("a.jpg"), image("a.jpg")]);

    h.service.submit_listing("user-1", d).await.unwrap();
    let puts = h.store.puts.lock().unwrap();
    assert_eq!(puts.len(), 2);
    for name in puts.iter() {
        assert!(name.starts_with("user-1-a.jpg-"));
    }
    // Same filename twice still yields distinct keys
    assert_ne!(puts[0], puts[1]);
}

#[tokio::test]
async fn discounted_price_not_stored_without_offer() {
    let h = default_harness();
    let mut d = draft(vec![image("a.jpg")]);
    d.offer = false;
    d.discounted_price = 999;

    h.service.submit_listing("user-1", d).await.unwrap();
    let listings = h.repo.listings.lock().unwrap();
    assert_eq!(listings[0].discounted_price, None);
}

#[tokio::test]
async fn concurrent_submission_by_same_owner_is_rejected() {
    let mut store = FakeStore::default();
    store.latencies_ms.insert("slow.jpg".to_string(), 400);

    let h = harness(store, FakeGeocoder { result: None }, false);

    let service = h.service.clone();
    let first = tokio::spawn(async move {
        service
            .submit_listing("user-1", draft(vec![image("slow.jpg")]))
            .await
    });

    // Let the first submission reach its uploads
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = h
        .service
        .submit_listing("user-1", draft(vec![image("fast.jpg")]))
        .await;
    assert!(matches!(second, Err(ListingError::AlreadySubmitting)));

    // A different owner is not blocked
    let other = h
        .service
        .submit_listing("user-2", draft(vec![image("fast.jpg")]))
        .await;
    assert!(other.is_ok());

    assert!(first.await.unwrap().is_ok());

    // Once settled, the same owner may submit again
    let retry = h
        .service
        .submit_listing("user-1", draft(vec![image("fast.jpg")]))
        .await;
    assert!(retry.is_ok());
}

#[tokio::test]
async fn get_listing_returns_not_found_for_unknown_id() {
    let h = default_harness();
    let result = h.service.get_listing(ObjectId::new()).await;
    assert!(matches!(result, Err(ListingError::NotFound(_))));
}
