//! HikePal Annotations
//!
//! Read-mostly cache of the facilities and hazard zones shown on the map.
//!
//! This crate provides:
//! - Source rows as delivered by the external annotation source
//! - Permissive mapping of source `type` strings onto typed annotations
//! - A snapshot store that is replaced wholesale on every successful load
//!   and left untouched by failed ones

#![warn(missing_docs)]

pub mod error;
pub mod source;
pub mod store;

pub use error::LoadError;
pub use source::{
    AnnotationSource, FacilityRow, HazardRow, JsonFileSource, RowId, SourceSnapshot,
    StaticSource, UnconfiguredSource,
};
pub use store::{AnnotationSet, AnnotationStore};
