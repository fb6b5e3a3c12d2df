//! C# target: AST, code generation and emission.
//!
//! ## Module Structure
//!
//! - `types`: C# declaration AST (`CsType`, `CsClass`, `CsEnum`, `CsFile`, ...)
//! - `codegen`: registry → AST lowering (`codegen_file`)
//! - `emit`: AST → source text (`Emit` trait)
//! - `utils`: identifier sanitizing, string escaping, doc comments

pub mod codegen;
pub mod emit;
pub mod types;
pub mod utils;

pub use codegen::codegen_file;
pub use emit::Emit;
