//! Surface syntax
//!
//! The grammar lives in `grammar.pest`; [`parser`] turns source text into
//! linked node trees and [`codegen`] turns any node back into source text.
//! The two are inverses up to whitespace: generated text reparses to a
//! structurally equal tree.

pub mod codegen;
pub mod parser;

pub use codegen::generate;
pub use parser::parse;
