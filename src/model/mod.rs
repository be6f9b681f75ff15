pub mod typing;

mod environment;
mod free_variable;
mod hash;
mod node;
mod substitution;
mod walk;

pub use environment::Environment;
pub use free_variable::{occurs, FreeVariable};
pub use hash::NodeHash;
pub use node::{BinaryOp, Block, Builtin, FunDef, Literal, Node, Program, StructDef};
pub use substitution::{Substitute, Substitution};
pub use walk::terminal_expressions;
