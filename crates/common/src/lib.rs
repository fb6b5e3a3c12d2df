//! Shared types and utilities for typebridge
//!
//! This crate contains the pieces used both by the conversion engine in
//! `typebridge-core` and by the collaborators that feed it:
//! - `facts`: the declaration-fact data model handed over by source ingest
//! - `casing`: identifier casing transformer (normalize, parse, render)
//! - `literal`: narrow constant-expression evaluator for initializers

pub mod casing;
pub mod facts;
pub mod literal;

// Re-export commonly used types
pub use casing::{Casing, NamePosition, WordToken};
pub use facts::{DeclarationFact, FactBody, PrimitiveKind, PropertyFact, TypeDescription};
pub use literal::{ConstValue, LiteralError};
