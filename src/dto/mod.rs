pub mod listing_dto;
