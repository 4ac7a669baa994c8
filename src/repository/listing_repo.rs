use crate::config::mongo_conf::MongoConfig;
use crate::model::listing::{Listing, ListingCategory};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use tracing::{error, info};

/// Hard cap on how many listings one page may request
const MAX_PAGE_SIZE: u32 = 100;

/// Translate 1-based paging into a Mongo skip/limit window.
///
/// Widens to u64 before multiplying so hostile page/limit query values
/// cannot overflow; page 0 is treated as page 1.
fn page_window(page: u32, limit: u32) -> (u64, i64) {
    let limit = limit.min(MAX_PAGE_SIZE);
    let skip = (page.max(1) as u64 - 1) * limit as u64;
    (skip, limit as i64)
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert a new listing. The document id and creation timestamp are
    /// assigned here, never taken from the caller.
    async fn create(&self, listing: Listing) -> RepositoryResult<Listing>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Listing>;
    async fn list_by_category(
        &self,
        category: ListingCategory,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Listing>>;
}

pub struct MongoListingRepository {
    collection: mongodb::Collection<Listing>,
}

impl MongoListingRepository {
    /// Create a new MongoListingRepository using MongoConfig
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        use mongodb::{
            options::{ClientOptions, Credential},
            Client,
        };

        let mut client_options = ClientOptions::parse(&config.uri).await?;
        client_options.app_name = Some("RealtorBackend".to_string());
        client_options.max_pool_size = Some(config.pool_size);
        client_options.connect_timeout = Some(std::time::Duration::from_secs(
            config.connection_timeout_secs,
        ));

        if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
            client_options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(password.clone())
                    .build(),
            );
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database);
        let collection_name = config.listing_collection.as_deref().unwrap_or("listings");
        let collection = db.collection::<Listing>(collection_name);
        Ok(MongoListingRepository { collection })
    }
}

#[async_trait]
impl ListingRepository for MongoListingRepository {
    #[tracing::instrument(skip(self, listing), fields(owner_id = %listing.owner_id))]
    async fn create(&self, listing: Listing) -> RepositoryResult<Listing> {
        info!("Creating new listing");
        let mut new_listing = listing;
        new_listing.id = Some(ObjectId::new());
        new_listing.created_at = Some(chrono::Utc::now().to_rfc3339());

        match self.collection.insert_one(new_listing.clone(), None).await {
            Ok(_) => {
                info!("Listing created successfully");
                Ok(new_listing)
            }
            Err(e) => {
                error!("Failed to create listing: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to create listing: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Listing> {
        info!("Fetching listing by ID: {}", id);
        let filter = doc! { "_id": id };
        match self.collection.find_one(filter, None).await {
            Ok(Some(listing)) => Ok(listing),
            Ok(None) => {
                error!("Listing not found for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "Listing not found for ID: {}",
                    id
                )))
            }
            Err(e) => {
                error!("Failed to fetch listing by ID: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to fetch listing by ID: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(category = %category, page = page, limit = limit))]
    async fn list_by_category(
        &self,
        category: ListingCategory,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Listing>> {
        info!("Listing listings for category: {}", category);
        let filter = doc! { "category": category.to_string() };
        let (skip, limit) = page_window(page, limit);
        let mut options = mongodb::options::FindOptions::default();
        options.skip = Some(skip);
        options.limit = Some(limit);
        options.sort = Some(doc! { "createdAt": -1 });

        let cursor = self.collection.find(filter, options).await;
        match cursor {
            Ok(mut cursor) => {
                let mut listings = Vec::new();
                while let Some(listing) = cursor.next().await {
                    match listing {
                        Ok(l) => listings.push(l),
                        Err(e) => {
                            error!("Failed to deserialize listing: {}", e);
                            return Err(RepositoryError::serialization(format!(
                                "Failed to deserialize listing: {}",
                                e
                            )));
                        }
                    }
                }
                info!("Fetched {} listings", listings.len());
                Ok(listings)
            }
            Err(e) => {
                error!("Failed to list listings: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to list listings: {}",
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_first_page() {
        assert_eq!(page_window(1, 20), (0, 20));
    }

    #[test]
    fn test_page_window_zero_page_treated_as_first() {
        assert_eq!(page_window(0, 20), (0, 20));
    }

    #[test]
    fn test_page_window_skips_previous_pages() {
        assert_eq!(page_window(3, 20), (40, 20));
    }

    #[test]
    fn test_page_window_caps_limit() {
        assert_eq!(page_window(2, 10000), (100, 100));
    }

    #[test]
    fn test_page_window_survives_maximum_query_values() {
        let (skip, limit) = page_window(u32::MAX, u32::MAX);
        assert_eq!(limit, MAX_PAGE_SIZE as i64);
        assert_eq!(skip, (u32::MAX as u64 - 1) * MAX_PAGE_SIZE as u64);
    }
}
