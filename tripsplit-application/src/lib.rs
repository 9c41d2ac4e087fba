#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod trip_service;

pub use error::{RepositoryError, TripError};
pub use model::{
    ArchivedTrip, PersonBalance, STATE_VERSION, SettlementResult, Theme, Trip, TripId, TripState,
};
pub use ports::TripRepository;
pub use trip_service::TripService;
