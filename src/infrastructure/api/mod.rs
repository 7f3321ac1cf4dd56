pub mod dto;
pub mod http_client;
pub mod mapper;

pub use dto::ApiOccurrence;
pub use http_client::{ApiError, HttpOccurrenceApi};
pub use mapper::map_api_occurrence;
