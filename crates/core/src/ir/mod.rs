//! Intermediate representation shared by the factory, registry and emitter.
//!
//! - `node`: arena node types (`IrNode`, `Structure`, `TypeUse`)

mod node;

pub use node::{
    Constant, DeclarationKind, EnumMember, GenericParam, IrNode, NodeFlags, NodeId, Property,
    Structure, TokenType, TypeRef, TypeUse,
};
