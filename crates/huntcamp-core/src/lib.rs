//! Occupancy and activity logic for the hunting camp dashboard.
//!
//! This crate ties the store together into [`Camp`], the API the HTTP layer
//! calls: stand check-in and check-out with the one-hunter-per-stand and
//! one-stand-per-hunter invariants, the append-only activity log, admin
//! operations, and a cross-process lock that serializes every
//! load-mutate-commit cycle.

pub mod activity;
pub mod admin;
pub mod camp;
pub mod concurrency;
pub mod occupancy;
pub mod state;

pub use activity::{ActivityLog, Event, RECENT_LIMIT};
pub use admin::{NewHunter, DEFAULT_PIN};
pub use camp::Camp;
pub use concurrency::CampLock;
pub use occupancy::{CheckIn, CheckOut, UNKNOWN_STAND};
pub use state::CampState;

use huntcamp_store::{HunterId, StandId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("stand not found: {0}")]
    StandNotFound(StandId),
    #[error("hunter not found: {0}")]
    HunterNotFound(HunterId),
    #[error("stand '{stand}' is already occupied")]
    StandOccupied { stand: String },
    #[error("hunter {0} is not checked in")]
    NotCheckedIn(HunterId),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("store error: {0}")]
    Store(#[from] huntcamp_store::StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`CoreError`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Unauthorized,
    Storage,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::StandNotFound(_) | CoreError::HunterNotFound(_) => ErrorKind::NotFound,
            CoreError::StandOccupied { .. } => ErrorKind::Conflict,
            CoreError::NotCheckedIn(_) | CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::InvalidCredentials => ErrorKind::Unauthorized,
            CoreError::Store(_) | CoreError::Io(_) => ErrorKind::Storage,
        }
    }
}
