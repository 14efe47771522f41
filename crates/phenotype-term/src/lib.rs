//! Phenotype Term Identities
//!
//! Canonical identifiers for phenotype and gene terms used by the pedigree
//! legend.
//!
//! # Overview
//!
//! - **TermId**: canonical cache key (`HP:0001251`)
//! - **RawTermId**: identifier as the caller supplied it
//! - **IdNormalizer**: pure raw → canonical mapping, [`HpoNormalizer`] by default
//!
//! # Example
//!
//! ```rust
//! use phenotype_term::{HpoNormalizer, IdNormalizer, RawTermId, TermType};
//!
//! let id = HpoNormalizer
//!     .normalize(TermType::Phenotype, &RawTermId::from(1251u32))
//!     .unwrap();
//! assert_eq!(id.as_str(), "HP:0001251");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod id;
pub mod normalize;

// Re-exports
pub use error::{TermError, TermResult};
pub use id::{NodeId, RawTermId, TermId, TermType};
pub use normalize::{HpoNormalizer, IdNormalizer, MAX_HPO_ACCESSION};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for term identities
    pub use crate::{HpoNormalizer, IdNormalizer, NodeId, RawTermId, TermError, TermId, TermType};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
