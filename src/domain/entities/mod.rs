pub mod occurrence;
pub mod offline;

pub use occurrence::{
    Coordinates, LocationInput, NewOccurrence, Occurrence, OccurrenceCategory, OccurrenceStatus,
    StatusHistoryEntry, UrgencyLevel,
};
