/// State management module
///
/// This module handles the catalog data, including:
/// - Shared data structures and sort keys (data.rs)
/// - The shared, lock-protected record list (store.rs)

pub mod data;
pub mod store;
