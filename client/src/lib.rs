//! Kålgården scheduler client library
//!
//! Typed access to the scheduling API plus the day-editing workflow built on
//! top of it: a cached query layer, undo for inline edits, filters and
//! selection for the day view.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod page;
pub mod query;
pub mod services;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod transport;
pub mod undo;
