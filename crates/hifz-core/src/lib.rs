//! Core types and services for the Hifz study-plan engine.
//!
//! A study-plan configuration is a tenant-owned schema tree
//! (groups → sub-groups → fields). Fields flagged as recall identifiers key a
//! flat database of historical records, which is filled by hand or by bulk
//! import and queried to pre-fill data-entry forms.
//!
//! This crate is free of HTTP and database dependencies. Storage is reached
//! through the [`kv::KeyValueStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod editor;
pub mod error;
pub mod import;
pub mod kv;
pub mod lesson;
pub mod people;
pub mod recall;
pub mod record;
pub mod repo;
pub mod schema;
pub mod template;

pub use error::{Error, Result};
