pub mod constraint;
pub mod generator;
pub mod resolver;
pub mod unification;
pub mod validator;

pub use constraint::{Constraint, Worklist};
pub use generator::{FunLookup, Generated, Generator};
pub use resolver::Resolver;
pub use unification::Unifier;
pub use validator::{validate, Category};

use crate::model::typing::{Constrainable, Type};
use crate::model::{Environment, Node, NodeHash};
use log::debug;
use std::collections::{hash_map, HashMap};
use thiserror::Error;

#[derive(PartialEq, Clone, Error, Debug)]
pub enum TypeErrorKind {
    #[error("type mismatch: {0} is not {1}")]
    TypeMismatch(Constrainable, Constrainable),
    #[error("argument count mismatch: {0} against {1}")]
    ArityMismatch(usize, usize),
    #[error("cannot unify {0} with {1}")]
    ShapeMismatch(Constrainable, Constrainable),
    #[error("{}", describe_field(.0, .1))]
    UnresolvedField(String, Vec<String>),
    #[error("type of '{0}' could not be inferred")]
    UnderConstrained(String),
    #[error("{0}")]
    CategoryViolation(String),
    #[error("function '{0}' is not defined")]
    UnknownFunction(String),
}

fn describe_field(field: &str, candidates: &[String]) -> String {
    match candidates {
        [] => format!("no struct declares field '{field}'"),
        _ => format!("field '{field}' is ambiguous between {}", candidates.join(", ")),
    }
}

#[derive(PartialEq, Clone, Error, Debug)]
#[error("{kind}{}", .node.as_ref().map(|n| format!(" in '{n}'")).unwrap_or_default())]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub node: Option<Node>,
}

pub type Result<T> = std::result::Result<T, TypeError>;

impl From<TypeErrorKind> for TypeError {
    fn from(kind: TypeErrorKind) -> Self {
        Self { kind, node: None }
    }
}

impl TypeErrorKind {
    pub fn at(self, node: &Node) -> TypeError {
        TypeError {
            kind: self,
            node: Some(node.clone()),
        }
    }
}

impl TypeError {
    pub fn or_at(self, node: Option<&Node>) -> Self {
        Self {
            node: self.node.or_else(|| node.cloned()),
            ..self
        }
    }
}

#[derive(Default, PartialEq, Clone, Debug)]
pub struct TypeTable {
    nodes: HashMap<NodeHash, Type>,
    functions: Environment<Type>,
}

impl TypeTable {
    pub(crate) fn new(nodes: HashMap<NodeHash, Type>, functions: Environment<Type>) -> Self {
        Self { nodes, functions }
    }

    pub fn get(&self, node: &Node) -> Option<&Type> {
        self.nodes.get(&NodeHash::of(node))
    }

    pub fn function(&self, name: &str) -> Option<&Type> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> &Environment<Type> {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, NodeHash, Type> {
        self.nodes.iter()
    }
}

pub fn infer_types(program: &crate::model::Program, entry_point: &str) -> Result<TypeTable> {
    let mut generated = Generator::new(program, entry_point).generate()?;
    debug!("generated {} constraints for {} nodes", generated.constraints.len(), generated.roster.len());
    let mut supply = std::mem::take(&mut generated.supply);
    let subst = Unifier::new(program, &generated, &mut supply).solve()?;
    debug!("solved: {subst}");
    let table = Resolver::new(program, &generated, &subst).resolve_all()?;
    validate(program, &table)?;
    Ok(table)
}
