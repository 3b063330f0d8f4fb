//! Declarative selection over converted clinical records.
//!
//! Records are schemaless `serde_json::Value` trees. A [`Query`] walks the tree
//! from its root; a [`ListFilter`] narrows an already selected list of nodes.
//! Absent members never raise errors, they simply select nothing.

pub mod count;
pub mod definitions;
pub mod error;
pub mod path;

pub use count::{count, count_document};
pub use definitions::{
    CATEGORY_LABORATORY, CATEGORY_VITAL_SIGNS, CategoryQuery, LOINC_SYSTEM, category_query,
    codified_filter, lab_query, vital_query,
};
pub use error::{QueryError, Result};
pub use path::{ListFilter, Path, Predicate, Query, Step};
