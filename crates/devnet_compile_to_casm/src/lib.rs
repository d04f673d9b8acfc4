//! A lib for compiling Sierra into CASM with an external compiler, on behalf of class
//! declarations.
pub mod args;
pub mod cache;
pub mod compiler;
pub mod declarer;
pub mod metrics;
pub mod resolver;

pub use crate::cache::ArtifactCache;
pub use crate::compiler::SierraToCasmCompiler;
pub use crate::declarer::{
    create_class_declarer,
    ClassDeclarer,
    ClassHashCalculator,
    StarknetKeccakClassHasher,
};
pub use crate::resolver::resolve_backend;
