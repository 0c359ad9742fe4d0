//! Tools for SNOMED CT expression files.
//!
//! - [`deconstruct`]: expand each row's target code into authoring-form columns.
//! - [`strip`]: normalize post-coordinated expressions into bare code strings.
//! - [`validate`]: check expressions against a `$validate-code` endpoint.

pub mod common;
pub mod constants;
pub mod deconstruct;
pub mod error;
pub mod flatten;
pub mod normalize;
pub mod schema;
pub mod sink;
pub mod strip;
pub mod table;
pub mod transport;
pub mod validate;

pub use error::{LookupError, PipelineError, TransportError};
pub use normalize::NormalizeMode;
