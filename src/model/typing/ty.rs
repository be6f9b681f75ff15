use std::fmt::Display;

#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Byte,
    Void,
    Any,
    Struct(String),
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Function(Vec<Type>, Box<Type>),
    Coroutine { yields: Box<Type>, reads: Box<Type> },
    Unconstrained,
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => "int".fmt(f),
            Self::Float => "float".fmt(f),
            Self::Bool => "bool".fmt(f),
            Self::String => "string".fmt(f),
            Self::Byte => "byte".fmt(f),
            Self::Void => "void".fmt(f),
            Self::Any => "any".fmt(f),
            Self::Struct(name) => name.fmt(f),
            Self::Array(t) => write!(f, "[]{t}"),
            Self::Tuple(ts) => {
                let ts = ts.iter().map(ToString::to_string).collect::<Vec<_>>();
                write!(f, "({})", ts.join(", "))
            }
            Self::Function(args, ret) => {
                let args = args.iter().map(ToString::to_string).collect::<Vec<_>>();
                write!(f, "f({}) {ret}", args.join(", "))
            }
            Self::Coroutine { yields, reads } => write!(f, "<coroutine {reads} -> {yields}>"),
            Self::Unconstrained => "?".fmt(f),
        }
    }
}

impl Type {
    pub fn array(element: impl Into<Self>) -> Self {
        Self::Array(Box::new(element.into()))
    }

    pub fn function(args: impl IntoIterator<Item = Self>, ret: impl Into<Self>) -> Self {
        Self::Function(args.into_iter().collect(), Box::new(ret.into()))
    }

    pub fn coroutine(yields: impl Into<Self>, reads: impl Into<Self>) -> Self {
        Self::Coroutine {
            yields: Box::new(yields.into()),
            reads: Box::new(reads.into()),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }
}
