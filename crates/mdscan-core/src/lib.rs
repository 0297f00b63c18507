//! mdscan Core
//!
//! This crate provides the data model shared by the mdscan scanner and
//! renderer.
//!
//! # Overview
//!
//! The core crate contains:
//! - [`Position`], [`Span`], [`LineIndex`] - Source location types
//! - [`Mark`], [`MarkKind`], [`Alignment`] - The recognized syntactic spans
//! - [`MarkList`] - The ordered scanner output
//! - [`ReferenceTable`] - Reference-style link definitions
//! - [`ScanOptions`] - Scanner feature switches
//! - [`MdscanError`] - Error types

pub mod enums;
pub mod error;
pub mod mark;
pub mod marks;
pub mod options;
pub mod references;
pub mod types;

pub use enums::Alignment;
pub use error::{MdscanError, Result};
pub use mark::{Mark, MarkKind};
pub use marks::MarkList;
pub use options::ScanOptions;
pub use references::{normalize_label, LinkTarget, ReferenceTable};
pub use types::{LineIndex, Position, Span};
