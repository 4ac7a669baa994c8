pub mod listing_repo;
pub mod repository_error;
