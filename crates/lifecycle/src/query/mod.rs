//! Filters and query composition.
//!
//! - [`Filter`] - A backend-neutral filter expression over JSON documents
//! - [`QueryBehavior`] - A filter contributed to every query of a type
//! - [`QueryComposer`] - Builds the effective filter for a query

pub mod composer;
pub mod filter;

pub use composer::{QueryBehavior, QueryComposer};
pub use filter::Filter;
