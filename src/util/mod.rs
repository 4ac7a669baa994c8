pub mod error;
pub mod geocode;
pub mod jwt;
pub mod logger;
pub mod minio;
pub mod single_flight;
