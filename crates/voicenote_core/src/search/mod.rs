//! Note search entry points.
//!
//! # Responsibility
//! - Provide the stateless filter applied to the store's current list.
//! - Keep search pure: no storage access, no mutation.

pub mod filter;
