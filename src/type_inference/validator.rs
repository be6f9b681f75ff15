use super::{Result, TypeErrorKind, TypeTable};
use crate::model::typing::Type;
use crate::model::{BinaryOp, Builtin, Node, Program};
use log::debug;
use std::fmt::Display;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Category {
    Addable,
    Number,
    Natural,
    Sliceable,
    Index,
    Conditional,
    Iterable,
    DotAccess,
    Invocable,
    Nullable,
    Ordered,
    Lenable,
}

impl Category {
    pub fn contains(self, ty: &Type) -> bool {
        use Type::*;
        match self {
            Self::Addable => matches!(ty, String | Byte | Int | Float),
            Self::Number => matches!(ty, Byte | Int | Float),
            Self::Natural => matches!(ty, Int | Byte),
            Self::Sliceable => matches!(ty, Tuple(_) | Array(_) | String),
            Self::Index => matches!(ty, Int),
            Self::Conditional => matches!(ty, Bool),
            Self::Iterable => matches!(ty, Array(_) | Coroutine { .. }),
            Self::DotAccess => matches!(ty, Struct(_) | Array(_)),
            Self::Invocable => matches!(ty, Function(..)),
            Self::Nullable => matches!(ty, Coroutine { .. } | Function(..) | Struct(_) | Tuple(_) | Void | Array(_) | Any),
            Self::Ordered => matches!(ty, Int | Bool | Float | Byte),
            Self::Lenable => matches!(ty, String | Array(_) | Tuple(_)),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Addable => "addable",
            Self::Number => "a number",
            Self::Natural => "a natural number",
            Self::Sliceable => "sliceable",
            Self::Index => "a valid index",
            Self::Conditional => "a valid conditional",
            Self::Iterable => "iterable",
            Self::DotAccess => "accessible by field",
            Self::Invocable => "invocable",
            Self::Nullable => "nullable",
            Self::Ordered => "ordered",
            Self::Lenable => "measurable by len",
        }
        .fmt(f)
    }
}

fn violation(node: &Node, message: impl Into<String>) -> super::TypeError {
    TypeErrorKind::CategoryViolation(message.into()).at(node)
}

struct Validator<'a> {
    table: &'a TypeTable,
}

/// Checks every function body of `program` against the resolved `table`, failing on the first violation.
pub fn validate(program: &Program, table: &TypeTable) -> Result<()> {
    for def in &program.structs {
        if let Some((name, _)) = def.members.iter().find(|(_, ty)| ty.is_void()) {
            let message = format!("member '{name}' of struct '{}' is void", def.name);
            return Err(TypeErrorKind::CategoryViolation(message).into());
        }
    }
    let validator = Validator { table };
    for fun in &program.funcs {
        debug!("validating '{}'", fun.name);
        for line in &fun.body {
            let mut nodes = Vec::new();
            line.walk(&mut |n| nodes.push(n));
            nodes.into_iter().try_for_each(|node| validator.check(node))?;
        }
    }
    Ok(())
}

impl Validator<'_> {
    fn ty(&self, node: &Node) -> Type {
        self.table.get(node).cloned().unwrap_or(Type::Any)
    }

    fn require(&self, node: &Node, category: Category) -> Result<()> {
        let ty = self.ty(node);
        if !category.contains(&ty) {
            return Err(violation(node, format!("type '{ty}' is not {category}")));
        }
        Ok(())
    }

    fn not_void<'n>(&self, nodes: impl IntoIterator<Item = &'n Node>) -> Result<()> {
        for node in nodes {
            if self.ty(node).is_void() {
                return Err(violation(node, "void type used as value"));
            }
        }
        Ok(())
    }

    fn coroutine(&self, node: &Node, builtin: Builtin, target: Option<&Node>) -> Result<()> {
        match target.map(|t| self.ty(t)) {
            Some(Type::Coroutine { .. }) => Ok(()),
            _ => Err(violation(node, format!("argument to {builtin} must be a coroutine"))),
        }
    }

    fn check(&self, node: &Node) -> Result<()> {
        match node {
            Node::Assign { target, value } => {
                self.not_void([value.as_ref()])?;
                if !matches!(target.as_ref(), Node::Ident(_) | Node::Access { .. } | Node::Index { .. }) {
                    return Err(violation(node, "target is not assignable"));
                }
                Ok(())
            }
            Node::Binary { op, left, right } => {
                self.not_void([left.as_ref(), right.as_ref()])?;
                let category = match op {
                    BinaryOp::Add => Category::Addable,
                    BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => Category::Number,
                    BinaryOp::Mod => Category::Natural,
                    BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => Category::Ordered,
                    BinaryOp::Eq | BinaryOp::Ne => return Ok(()),
                };
                self.require(left, category)?;
                self.require(right, category)
            }
            Node::Index { target, index } => {
                self.not_void([target.as_ref(), index.as_ref()])?;
                self.require(target, Category::Sliceable)?;
                self.require(index, Category::Index)
            }
            Node::ForIter { item, iter, .. } => {
                self.not_void([iter.as_ref(), item.as_ref()])?;
                self.require(iter, Category::Iterable)
            }
            Node::If { cond, .. } | Node::While { cond, .. } => {
                self.not_void([cond.as_ref()])?;
                self.require(cond, Category::Conditional)
            }
            Node::Access { target, .. } => {
                self.not_void([target.as_ref()])?;
                self.require(target, Category::DotAccess)
            }
            Node::Call { callee, args } => {
                self.not_void(std::iter::once(callee.as_ref()).chain(args))?;
                self.require(callee, Category::Invocable)
            }
            Node::Null => self.require(node, Category::Nullable),
            Node::Array(elems) => {
                self.not_void(elems)?;
                let Some(first) = elems.first().map(|e| self.ty(e)) else {
                    return Ok(());
                };
                match elems.iter().find(|e| self.ty(e) != first) {
                    Some(odd) => Err(violation(odd, "array elements must be of the same type")),
                    None => Ok(()),
                }
            }
            Node::Builtin { builtin, args } => {
                self.not_void(args)?;
                match builtin {
                    Builtin::Next | Builtin::Send | Builtin::Done => self.coroutine(node, *builtin, args.first()),
                    Builtin::Len => match args.first() {
                        Some(arg) => self.require(arg, Category::Lenable),
                        None => Ok(()),
                    },
                    Builtin::Any => Ok(()),
                }
            }
            Node::Yield(value) => self.not_void([value.as_ref()]),
            Node::Tuple(elems) => self.not_void(elems),
            Node::Lit(_)
            | Node::Ident(_)
            | Node::Paren(_)
            | Node::Return(_)
            | Node::Closure { .. }
            | Node::TupleAccess { .. } => Ok(()),
        }
    }
}
