//! `roomescape` - Escape-room reservation backend
//!
//! This library provides members, themes, bookable time slots and
//! reservations stored in `SQLite`, the business rules that guard them, and
//! a JSON HTTP API on top.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod dao;
pub mod domain;
pub mod error;
pub mod logging;
pub mod service;
pub mod storage;

pub use api::AppState;
pub use config::Config;
pub use domain::{Member, Reservation, ReservationFilter, ReservationTime, Role, Theme};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::{Database, DatabaseStats};
