//! Shared data model: scalar values, entity metadata and fixture records.

pub mod core;
pub mod metadata;
pub mod records;
