// Product catalog
pub mod catalog;
pub mod group_sync;
pub mod variants;

// Lookup tables and ranking
pub mod reference;
pub mod reorder;

// Back office
pub mod customers;
pub mod showroom;
