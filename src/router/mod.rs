pub mod listing_router;
