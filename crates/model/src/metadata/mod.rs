//! Entity metadata: which fields a collection has, and which of them are
//! references to another collection.

pub mod entity;
pub mod error;
pub mod provider;
pub mod registry;
