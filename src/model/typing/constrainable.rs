use super::{PlaceholderId, Type, TypeVar};
use std::fmt::Display;

/// A term in the unification vocabulary: a variable, a concrete base type or a structural shape.
#[derive(PartialEq, Clone, Debug)]
pub enum Constrainable {
    Var(TypeVar),
    Base(Type),
    Shape(Shape),
}

#[derive(PartialEq, Clone, Debug)]
pub enum Shape {
    Nominal(Nominal),
    Placeholder(Placeholder),
}

/// Shapes that must survive unification intact.
#[derive(PartialEq, Clone, Debug)]
pub enum Nominal {
    Fun(Vec<Constrainable>, Box<Constrainable>),
    Tup(Vec<Constrainable>),
    Coroutine {
        yields: Box<Constrainable>,
        reads: Box<Constrainable>,
    },
}

/// Shapes that stand in for information not known yet and may be replaced wholesale.
#[derive(PartialEq, Clone, Debug)]
pub enum Placeholder {
    Container(Container),
    StructOptions(StructOptions),
    Indexer(Indexer),
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Backing {
    Array,
    Unresolved,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Slot {
    At(usize),
    Wildcard,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Container {
    pub backing: Backing,
    pub element: Box<Constrainable>,
    pub index: Slot,
    pub id: PlaceholderId,
}

#[derive(PartialEq, Clone, Debug)]
pub struct StructOptions {
    pub candidates: Vec<String>,
    pub obligations: Vec<(TypeVar, String)>,
    pub id: PlaceholderId,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Indexer {
    pub index: usize,
    pub element: Box<Constrainable>,
    pub id: PlaceholderId,
}

impl From<TypeVar> for Constrainable {
    fn from(value: TypeVar) -> Self {
        Self::Var(value)
    }
}

impl From<Type> for Constrainable {
    fn from(value: Type) -> Self {
        Self::Base(value)
    }
}

impl From<Shape> for Constrainable {
    fn from(value: Shape) -> Self {
        Self::Shape(value)
    }
}

impl From<Nominal> for Constrainable {
    fn from(value: Nominal) -> Self {
        Self::Shape(Shape::Nominal(value))
    }
}

impl From<Placeholder> for Constrainable {
    fn from(value: Placeholder) -> Self {
        Self::Shape(Shape::Placeholder(value))
    }
}

impl From<Container> for Constrainable {
    fn from(value: Container) -> Self {
        Placeholder::Container(value).into()
    }
}

impl From<StructOptions> for Constrainable {
    fn from(value: StructOptions) -> Self {
        Placeholder::StructOptions(value).into()
    }
}

impl From<Indexer> for Constrainable {
    fn from(value: Indexer) -> Self {
        Placeholder::Indexer(value).into()
    }
}

fn join(items: &[Constrainable]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl Display for Constrainable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Var(v) => v.fmt(f),
            Self::Base(t) => t.fmt(f),
            Self::Shape(Shape::Nominal(n)) => n.fmt(f),
            Self::Shape(Shape::Placeholder(p)) => p.fmt(f),
        }
    }
}

impl Display for Nominal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fun(args, ret) => write!(f, "({} -> {ret})", join(args)),
            Self::Tup(subtypes) => write!(f, "({})", join(subtypes)),
            Self::Coroutine { yields, reads } => write!(f, "<coroutine({reads}) -> {yields}>"),
        }
    }
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Container(c) => {
                let backing = match c.backing {
                    Backing::Array => "array",
                    Backing::Unresolved => "?",
                };
                let index = match c.index {
                    Slot::At(n) => n.to_string(),
                    Slot::Wildcard => "_".to_owned(),
                };
                write!(f, "container<{backing}>[{}]#{index}{}", c.element, c.id)
            }
            Self::StructOptions(o) => {
                let obligations = (o.obligations.iter())
                    .map(|(v, field)| format!("{v}: {field}"))
                    .collect::<Vec<_>>();
                write!(
                    f,
                    "struct-options[{}]<{}>{}",
                    o.candidates.join(", "),
                    obligations.join(", "),
                    o.id
                )
            }
            Self::Indexer(i) => write!(f, "indexer[{}].{}{}", i.element, i.index, i.id),
        }
    }
}

impl Constrainable {
    pub fn fun(args: impl IntoIterator<Item = impl Into<Self>>, ret: impl Into<Self>) -> Self {
        Nominal::Fun(args.into_iter().map(Into::into).collect(), Box::new(ret.into())).into()
    }

    pub fn tup(subtypes: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Nominal::Tup(subtypes.into_iter().map(Into::into).collect()).into()
    }

    pub fn coroutine(yields: impl Into<Self>, reads: impl Into<Self>) -> Self {
        Nominal::Coroutine {
            yields: Box::new(yields.into()),
            reads: Box::new(reads.into()),
        }
        .into()
    }

    pub fn container(backing: Backing, element: impl Into<Self>, index: Slot, id: PlaceholderId) -> Self {
        Container {
            backing,
            element: Box::new(element.into()),
            index,
            id,
        }
        .into()
    }

    pub fn indexer(index: usize, element: impl Into<Self>, id: PlaceholderId) -> Self {
        Indexer {
            index,
            element: Box::new(element.into()),
            id,
        }
        .into()
    }

    pub fn traverse(&mut self, f: &mut impl FnMut(&mut Self)) {
        f(self);
        match self {
            Self::Var(_) | Self::Base(_) => {}
            Self::Shape(Shape::Nominal(Nominal::Fun(args, ret))) => {
                args.iter_mut().for_each(|arg| arg.traverse(f));
                ret.traverse(f);
            }
            Self::Shape(Shape::Nominal(Nominal::Tup(subtypes))) => {
                subtypes.iter_mut().for_each(|sub| sub.traverse(f));
            }
            Self::Shape(Shape::Nominal(Nominal::Coroutine { yields, reads })) => {
                yields.traverse(f);
                reads.traverse(f);
            }
            Self::Shape(Shape::Placeholder(Placeholder::Container(c))) => c.element.traverse(f),
            Self::Shape(Shape::Placeholder(Placeholder::Indexer(i))) => i.element.traverse(f),
            Self::Shape(Shape::Placeholder(Placeholder::StructOptions(_))) => {}
        }
    }

    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Var(_) | Self::Base(_) => Vec::new(),
            Self::Shape(Shape::Nominal(Nominal::Fun(args, ret))) => {
                args.iter().chain(std::iter::once(ret.as_ref())).collect()
            }
            Self::Shape(Shape::Nominal(Nominal::Tup(subtypes))) => subtypes.iter().collect(),
            Self::Shape(Shape::Nominal(Nominal::Coroutine { yields, reads })) => vec![yields.as_ref(), reads.as_ref()],
            Self::Shape(Shape::Placeholder(Placeholder::Container(c))) => vec![c.element.as_ref()],
            Self::Shape(Shape::Placeholder(Placeholder::Indexer(i))) => vec![i.element.as_ref()],
            Self::Shape(Shape::Placeholder(Placeholder::StructOptions(_))) => Vec::new(),
        }
    }
}

impl Placeholder {
    pub fn id(&self) -> PlaceholderId {
        match self {
            Self::Container(c) => c.id,
            Self::StructOptions(o) => o.id,
            Self::Indexer(i) => i.id,
        }
    }
}

impl StructOptions {
    pub fn new(candidates: Vec<String>, obligation: (TypeVar, String), id: PlaceholderId) -> Self {
        Self {
            candidates,
            obligations: vec![obligation],
            id,
        }
    }
}
