//! Static type inference for a small expression language with closures, tuples, structs and coroutines.
//!
//! [`infer`] generates equality constraints over a fully transformed [`Program`], solves them by
//! unification, resolves one concrete [`Type`] per node and validates operator categories.

pub mod model;
pub mod type_inference;

pub use model::typing::Type;
pub use model::{BinaryOp, Builtin, FunDef, Literal, Node, Program, StructDef};
pub use type_inference::{Result, TypeError, TypeErrorKind, TypeTable};

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Options {
    /// Function whose return type is forced to `int`.
    pub entry_point: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            entry_point: "main".to_owned(),
        }
    }
}

impl Options {
    pub fn with_entry_point(entry_point: impl Into<String>) -> Self {
        Self {
            entry_point: entry_point.into(),
        }
    }
}

pub fn infer(program: &Program, options: &Options) -> Result<TypeTable> {
    type_inference::infer_types(program, &options.entry_point)
}
