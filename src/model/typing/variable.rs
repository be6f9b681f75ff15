use std::fmt::Display;

#[derive(Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct TypeVar(usize);

#[derive(Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct PlaceholderId(usize);

impl From<usize> for TypeVar {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl From<usize> for PlaceholderId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl Display for TypeVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "τ{}", self.0)
    }
}

impl Display for PlaceholderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default, Debug)]
pub struct VarSupply {
    next_var: usize,
    next_id: usize,
}

impl VarSupply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> TypeVar {
        self.next_var += 1;
        TypeVar(self.next_var)
    }

    pub fn fresh_id(&mut self) -> PlaceholderId {
        self.next_id += 1;
        PlaceholderId(self.next_id)
    }
}
