use super::typing::Type;
use super::Environment;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

#[derive(Clone, Debug)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Byte(u8),
}

#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub enum Builtin {
    Next,
    Send,
    Done,
    Len,
    Any,
}

pub type Block = Vec<Node>;

#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub enum Node {
    Lit(Literal),
    Null,
    Ident(String),
    Paren(Box<Node>),
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Assign {
        target: Box<Node>,
        value: Box<Node>,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    Closure {
        target: String,
        captured: Box<Node>,
    },
    Array(Vec<Node>),
    Tuple(Vec<Node>),
    Index {
        target: Box<Node>,
        index: Box<Node>,
    },
    TupleAccess {
        tuple: Box<Node>,
        index: usize,
    },
    Access {
        target: Box<Node>,
        field: String,
    },
    Yield(Box<Node>),
    Return(Box<Node>),
    Builtin {
        builtin: Builtin,
        args: Vec<Node>,
    },
    If {
        cond: Box<Node>,
        body: Block,
    },
    While {
        cond: Box<Node>,
        body: Block,
    },
    ForIter {
        item: Box<Node>,
        iter: Box<Node>,
        body: Block,
    },
}

#[derive(Clone, Debug)]
pub struct FunDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
    pub hint: Option<Type>,
    pub is_coroutine: bool,
}

#[derive(Clone, Debug)]
pub struct StructDef {
    pub name: String,
    pub members: Vec<(String, Type)>,
    pub methods: Vec<(String, String)>,
}

#[derive(Default, Clone, Debug)]
pub struct Program {
    pub funcs: Vec<FunDef>,
    pub structs: Vec<StructDef>,
    pub hints: Environment<Type>,
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Int(n) => n.hash(state),
            Self::Float(x) => x.to_bits().hash(state),
            Self::Bool(b) => b.hash(state),
            Self::Str(s) => s.hash(state),
            Self::Byte(b) => b.hash(state),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => n.fmt(f),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Bool(b) => b.fmt(f),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Byte(b) => write!(f, "'{}'", *b as char),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
        .fmt(f)
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Next => "next",
            Self::Send => "send",
            Self::Done => "done",
            Self::Len => "len",
            Self::Any => "any",
        }
        .fmt(f)
    }
}

fn join(nodes: &[Node]) -> String {
    nodes.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn block(body: &[Node]) -> String {
    body.iter().map(|n| format!("{n}; ")).collect()
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lit(lit) => lit.fmt(f),
            Self::Null => "null".fmt(f),
            Self::Ident(name) => name.fmt(f),
            Self::Paren(inner) => write!(f, "({inner})"),
            Self::Binary { op, left, right } => write!(f, "{left} {op} {right}"),
            Self::Assign { target, value } => write!(f, "{target} = {value}"),
            Self::Call { callee, args } => write!(f, "{callee}({})", join(args)),
            Self::Closure { target, .. } => write!(f, "<closure of '{target}'>"),
            Self::Array(elems) => write!(f, "[{}]", join(elems)),
            Self::Tuple(elems) => write!(f, "({})", join(elems)),
            Self::Index { target, index } => write!(f, "{target}[{index}]"),
            Self::TupleAccess { tuple, index } => write!(f, "{tuple}.{index}"),
            Self::Access { target, field } => write!(f, "{target}.{field}"),
            Self::Yield(value) => write!(f, "yield {value}"),
            Self::Return(value) => write!(f, "return {value}"),
            Self::Builtin { builtin, args } => write!(f, "{builtin}({})", join(args)),
            Self::If { cond, body } => write!(f, "if {cond} {{ {}}}", block(body)),
            Self::While { cond, body } => write!(f, "while {cond} {{ {}}}", block(body)),
            Self::ForIter { item, iter, body } => write!(f, "for {item} in {iter} {{ {}}}", block(body)),
        }
    }
}

impl Display for FunDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = f({}) {{ {}}}", self.name, self.params.join(", "), block(&self.body))
    }
}

impl From<Literal> for Node {
    fn from(value: Literal) -> Self {
        Self::Lit(value)
    }
}

impl Node {
    pub fn int(n: i64) -> Self {
        Self::Lit(Literal::Int(n))
    }

    pub fn float(x: f64) -> Self {
        Self::Lit(Literal::Float(x))
    }

    pub fn bool(b: bool) -> Self {
        Self::Lit(Literal::Bool(b))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Self::Lit(Literal::Str(s.into()))
    }

    pub fn byte(b: u8) -> Self {
        Self::Lit(Literal::Byte(b))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn binary(op: BinaryOp, left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::Binary {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    pub fn add(left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Add, left, right)
    }

    pub fn sub(left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Sub, left, right)
    }

    pub fn assign(target: impl Into<Self>, value: impl Into<Self>) -> Self {
        Self::Assign {
            target: Box::new(target.into()),
            value: Box::new(value.into()),
        }
    }

    pub fn call(callee: impl Into<Self>, args: impl IntoIterator<Item = Self>) -> Self {
        Self::Call {
            callee: Box::new(callee.into()),
            args: args.into_iter().collect(),
        }
    }

    pub fn closure(target: impl Into<String>, captured: impl Into<Self>) -> Self {
        Self::Closure {
            target: target.into(),
            captured: Box::new(captured.into()),
        }
    }

    pub fn index(target: impl Into<Self>, index: impl Into<Self>) -> Self {
        Self::Index {
            target: Box::new(target.into()),
            index: Box::new(index.into()),
        }
    }

    pub fn tuple_access(tuple: impl Into<Self>, index: usize) -> Self {
        Self::TupleAccess {
            tuple: Box::new(tuple.into()),
            index,
        }
    }

    pub fn access(target: impl Into<Self>, field: impl Into<String>) -> Self {
        Self::Access {
            target: Box::new(target.into()),
            field: field.into(),
        }
    }

    pub fn ret(value: impl Into<Self>) -> Self {
        Self::Return(Box::new(value.into()))
    }

    pub fn yield_(value: impl Into<Self>) -> Self {
        Self::Yield(Box::new(value.into()))
    }

    pub fn builtin(builtin: Builtin, args: impl IntoIterator<Item = Self>) -> Self {
        Self::Builtin {
            builtin,
            args: args.into_iter().collect(),
        }
    }

    pub fn if_(cond: impl Into<Self>, body: Block) -> Self {
        Self::If {
            cond: Box::new(cond.into()),
            body,
        }
    }

    pub fn while_(cond: impl Into<Self>, body: Block) -> Self {
        Self::While {
            cond: Box::new(cond.into()),
            body,
        }
    }

    pub fn for_iter(item: impl Into<Self>, iter: impl Into<Self>, body: Block) -> Self {
        Self::ForIter {
            item: Box::new(item.into()),
            iter: Box::new(iter.into()),
            body,
        }
    }
}

impl Builtin {
    pub fn arity(self) -> usize {
        match self {
            Self::Send => 2,
            _ => 1,
        }
    }
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        use BinaryOp::*;
        matches!(self, Lt | Gt | Le | Ge | Eq | Ne)
    }
}

impl FunDef {
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = impl Into<String>>, body: Block) -> Self {
        let body_has_yield = body.iter().any(Node::contains_yield);
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            body,
            hint: None,
            is_coroutine: body_has_yield,
        }
    }

    pub fn with_hint(mut self, hint: Type) -> Self {
        self.hint = Some(hint);
        self
    }
}

impl StructDef {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = (impl Into<String>, Type)>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(|(n, t)| (n.into(), t)).collect(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, name: impl Into<String>, function: impl Into<String>) -> Self {
        self.methods.push((name.into(), function.into()));
        self
    }

    pub fn member_type(&self, field: &str) -> Option<&Type> {
        (self.members.iter()).find(|(name, _)| name == field).map(|(_, t)| t)
    }

    pub fn method(&self, name: &str) -> Option<&str> {
        (self.methods.iter()).find(|(m, _)| m == name).map(|(_, f)| f.as_str())
    }

    pub fn declares(&self, name: &str) -> bool {
        self.member_type(name).is_some() || self.method(name).is_some()
    }

    /// Constructor function signature produced by struct lowering.
    pub fn constructor_type(&self) -> Type {
        Type::function(self.members.iter().map(|(_, t)| t.clone()), Type::Struct(self.name.clone()))
    }
}

impl Program {
    pub fn new(funcs: impl IntoIterator<Item = FunDef>) -> Self {
        Self {
            funcs: funcs.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_struct(mut self, def: StructDef) -> Self {
        self.structs.push(def);
        self
    }

    pub fn with_hint(mut self, name: impl Into<String>, hint: Type) -> Self {
        self.hints += (name.into(), hint);
        self
    }

    pub fn function(&self, name: &str) -> Option<&FunDef> {
        self.funcs.iter().find(|f| f.name == name)
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.structs.iter().find(|s| s.name == name)
    }
}
