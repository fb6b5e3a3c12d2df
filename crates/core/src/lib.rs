//! Structural type converter: declaration facts in, C# declarations out.
//!
//! ## Module Structure
//!
//! - `config`: converter options (namespace, casing, class unions, ...)
//! - `factory`: declaration facts -> IR nodes
//! - `ir`: node arena types shared by every stage
//! - `registry`: identity keys, consolidation, pruning, emission order
//! - `csharp`: C# AST, code generation and emission
//! - `convert`: the end-to-end pipeline
//! - `diagnostics` / `error`: non-fatal findings and fatal errors

pub mod config;
pub mod convert;
pub mod csharp;
pub mod diagnostics;
pub mod error;
pub mod factory;
pub mod ir;
pub mod registry;

pub use config::ConverterConfig;
pub use convert::{convert, convert_json, ConversionOutput, Converter};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::ConvertError;
pub use registry::TypeRegistry;
