//! Cache-and-invalidate layer
//!
//! `Queries` wraps the resource API: reads are cached per `QueryKey`,
//! mutations invalidate the scopes listed in the static invalidation table.

pub mod cache;
pub mod hooks;
pub mod invalidation;
pub mod keys;

pub use cache::QueryCache;
pub use hooks::Queries;
pub use invalidation::{affected_scopes, MutationKind};
pub use keys::{QueryKey, Scope, WeekReport};
