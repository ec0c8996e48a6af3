//! Client-side state core for a personal finance tracker.
//!
//! Server resources (accounts, categories, transactions) are mirrored in
//! [`resource`] stores. [`effects`] runners call the [`gateway`] and feed the
//! outcome back into the stores; [`selectors`] derive views from store
//! snapshots. The auth [`session`] holds tokens and the current user.

pub mod app;
pub mod cli;
pub mod config;
pub mod effects;
pub mod events;
pub mod format;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod resource;
pub mod selectors;
pub mod session;
pub mod store;
pub mod validation;

pub use app::{App, AppError, Gateways};
