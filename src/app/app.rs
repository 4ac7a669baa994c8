use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::app_conf::AppConfig;
use crate::config::{GeocodingConfig, JwtConfig, MinioConfig, MongoConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::repository::listing_repo::{ListingRepository, MongoListingRepository};
use crate::router::listing_router::listing_router;
use crate::service::listing_service::{ListingService, ListingServiceImpl};
use crate::util::geocode::{Geocoder, HttpGeocoder};
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::minio::{ImageStore, MinioImageStore};

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env().expect("App config error");

        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");
        let minio_config = MinioConfig::from_env().expect("Minio config error");
        let geocoding_config = GeocodingConfig::from_env().expect("Geocoding config error");

        let repo: Arc<dyn ListingRepository> = Arc::new(
            MongoListingRepository::new(&mongo_config)
                .await
                .expect("Listing repo error"),
        );
        let store: Arc<dyn ImageStore> = Arc::new(
            MinioImageStore::new(minio_config)
                .await
                .expect("Image store error"),
        );
        let geocoder: Arc<dyn Geocoder> = Arc::new(
            HttpGeocoder::new(geocoding_config.clone()).expect("Geocoder error"),
        );

        let service: Arc<dyn ListingService> = Arc::new(ListingServiceImpl::new(
            repo,
            store,
            geocoder,
            geocoding_config.enabled,
        ));

        let auth_state = Arc::new(AuthState {
            jwt_utils: Arc::new(JwtTokenUtilsImpl::new(jwt_config)),
        });

        let router = listing_router(service, auth_state).route("/health", get(|| async { "OK" }));

        App { config, router }
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(
            self.config.host.parse().expect("Invalid host"),
            self.config.port,
        );
        info!("Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Failed to start server");
    }
}
