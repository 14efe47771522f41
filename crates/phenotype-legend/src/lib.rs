//! Phenotype Legend
//!
//! Tracks which phenotype terms are attached to individuals of a pedigree
//! and keeps a color-coded, named legend of them in sync while term names
//! arrive asynchronously.
//!
//! # Architecture
//!
//! ```text
//! add_case / term ──► TermCache ──(ResolutionToken)──► ResolutionQueue
//!        │               ▲                                   │
//!        ▼               │ resolve(token, name)              ▼
//!     Legend ──rows──► RenderSink ◄── LegendSync ◄── ResolutionWorker ──► TermResolver
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use phenotype_legend::prelude::*;
//!
//! # async fn example(surface: std::sync::Arc<dyn RenderSink>) -> LegendResult<()> {
//! let (legend, queue) = PhenotypeLegend::new(LegendConfig::new(), surface)?;
//! let legend = std::sync::Arc::new(legend);
//!
//! let terminology = StaticTerminology::new().with_term("HP:0001251".parse()?, "Ataxia");
//! tokio::spawn(ResolutionWorker::new(std::sync::Arc::new(terminology), queue).run(legend.clone()));
//!
//! legend.add_case("HP:0001251".parse()?, None, NodeId(7))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod cache;
pub mod color;
pub mod config;
pub mod error;
pub mod legend;
pub mod phenotype;
pub mod resolver;
pub mod sync;

// Re-exports for convenience
pub use cache::{CacheStats, ResolutionToken, Term, TermCache};
pub use color::{Color, ColorScheme, PaletteColor, UniformColor, DEFAULT_COLOR};
pub use config::LegendConfig;
pub use error::{ConfigError, LegendError, LegendResult, ResolveError};
pub use legend::{Legend, OccurrenceTracker};
pub use phenotype::PhenotypeLegend;
pub use resolver::{
    ResolutionQueue, ResolutionSink, ResolutionWorker, StaticTerminology, TermResolver, WorkerStats,
};
pub use sync::{ElementKey, ElementRef, LegendSync, RenderSink};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the phenotype legend
    pub use crate::{
        Color, ElementKey, ElementRef, LegendConfig, LegendError, LegendResult, PhenotypeLegend,
        RenderSink, ResolutionQueue, ResolutionSink, ResolutionWorker, StaticTerminology, Term,
        TermCache, TermResolver,
    };
    pub use phenotype_term::{NodeId, RawTermId, TermError, TermId, TermType};
}
