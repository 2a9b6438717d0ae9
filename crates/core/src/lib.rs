//! Paste Shop Core - Shared types library.
//!
//! This crate provides the types shared by every Paste Shop component:
//! - `sync` - Live list/category feeds and mutations against the document store
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no store
//! access, no async runtime. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, categories, palettes, lists, items, validation
//! - [`grouping`] - Partition of list items into category buckets

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod grouping;
pub mod types;

pub use grouping::{GroupKey, ItemGroup, ItemGroups, UNCATEGORIZED, group_items};
pub use types::*;
