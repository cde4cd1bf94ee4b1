//! Infrastructure Storage Layer
//!
//! HTTP adapter implementing [`core_kernel::ObjectStore`] on the hosted
//! Supabase storage API. Vehicle photos and client identity documents both
//! go through it; the buckets are chosen by the callers.

pub mod error;
pub mod supabase;

pub use error::StorageError;
pub use supabase::{StorageConfig, SupabaseObjectStore};
