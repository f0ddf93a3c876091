//! Title matching engine
//!
//! A listing title flows through the normalizer and extractor into an
//! attribute record, the cascade builder turns that into ordered catalog
//! predicates, the resolver runs them against a catalog store, and the applier
//! writes results back to a listing store.

pub mod applier;
pub mod cascade;
pub mod conditions;
pub mod extractor;
pub mod normalizer;
pub mod resolver;
pub mod types;

pub use applier::{BatchApplier, BatchOptions, BatchReport};
pub use cascade::{CascadeBuilder, MatchPredicate};
pub use conditions::{Condition, SqlParam};
pub use extractor::Extractor;
pub use normalizer::clean;
pub use resolver::Resolver;
pub use types::{AttributeRecord, CascadeLevel, EducationLevel, Resolution, ResolutionResult};
