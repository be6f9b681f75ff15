use super::typing::{Constrainable, PlaceholderId, Shape, TypeVar};
use std::collections::{hash_map, HashMap};
use std::fmt::Display;

/// Monotonic map from variables, and from replaced placeholders, to what they stand for.
///
/// Values are kept fully rewritten: no value mentions a bound variable or a replaced placeholder.
#[derive(Default, PartialEq, Clone, Debug)]
pub struct Substitution {
    vars: HashMap<TypeVar, Constrainable>,
    placeholders: HashMap<PlaceholderId, Constrainable>,
}

pub trait Substitute {
    fn substitute_mut(&mut self, subst: &Substitution);

    fn substitute(mut self, subst: &Substitution) -> Self
    where
        Self: Sized,
    {
        self.substitute_mut(subst);
        self
    }
}

impl FromIterator<(TypeVar, Constrainable)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (TypeVar, Constrainable)>>(iter: I) -> Self {
        Self {
            vars: HashMap::from_iter(iter),
            placeholders: HashMap::new(),
        }
    }
}

impl Display for Substitution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut vars = self.vars.iter().collect::<Vec<_>>();
        vars.sort_by_key(|(v, _)| **v);
        let mut placeholders = self.placeholders.iter().collect::<Vec<_>>();
        placeholders.sort_by_key(|(id, _)| **id);
        let mappings = (vars.into_iter())
            .map(|(v, x)| format!("{v} -> {x}"))
            .chain(placeholders.into_iter().map(|(id, x)| format!("{id} -> {x}")))
            .collect::<Vec<_>>();
        write!(f, "{{{}}}", mappings.join(", "))
    }
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn var(var: TypeVar, value: impl Into<Constrainable>) -> Self {
        [(var, value.into())].into_iter().collect()
    }

    pub fn placeholder(id: PlaceholderId, value: impl Into<Constrainable>) -> Self {
        Self {
            vars: HashMap::new(),
            placeholders: [(id, value.into())].into(),
        }
    }

    pub fn get(&self, var: TypeVar) -> Option<&Constrainable> {
        self.vars.get(&var)
    }

    pub fn replacement(&self, id: PlaceholderId) -> Option<&Constrainable> {
        self.placeholders.get(&id)
    }

    pub fn is_bound(&self, var: TypeVar) -> bool {
        self.vars.contains_key(&var)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.placeholders.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, TypeVar, Constrainable> {
        self.vars.iter()
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut Constrainable> {
        self.vars.values_mut().chain(self.placeholders.values_mut())
    }

    /// Folds `other` into `self`, rewriting existing values through it.
    ///
    /// Panics if `other` rebinds a key to a different value.
    pub fn combine_mut(&mut self, other: &Self) {
        self.values_mut().for_each(|x| x.substitute_mut(other));
        for (v, x) in &other.vars {
            let previous = self.vars.insert(*v, x.clone());
            assert!(previous.map_or(true, |p| &p == x), "{v} rebound to {x}");
        }
        for (id, x) in &other.placeholders {
            let previous = self.placeholders.insert(*id, x.clone());
            assert!(previous.map_or(true, |p| &p == x), "{id} replaced twice");
        }
    }

    pub fn combine(mut self, other: &Self) -> Self {
        self.combine_mut(other);
        self
    }
}

impl Substitute for Constrainable {
    fn substitute_mut(&mut self, subst: &Substitution) {
        self.traverse(&mut |c1| match c1 {
            Self::Var(v) => {
                if let Some(c2) = subst.vars.get(v) {
                    *c1 = c2.clone();
                }
            }
            Self::Shape(Shape::Placeholder(p)) => {
                if let Some(c2) = subst.placeholders.get(&p.id()) {
                    *c1 = c2.clone();
                }
            }
            _ => {}
        });
    }
}

impl<S: Substitute> Substitute for Vec<S> {
    fn substitute_mut(&mut self, subst: &Substitution) {
        self.iter_mut().for_each(|x| x.substitute_mut(subst));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::typing::{Backing, Slot, Type};

    fn var(n: usize) -> TypeVar {
        n.into()
    }

    #[test]
    fn substitute_reaches_nested_positions() {
        let s = Substitution::var(var(1), Type::Int);
        let c = Constrainable::fun([var(1), var(2)], Constrainable::tup([var(1)]));
        assert_eq!(
            c.substitute(&s),
            Constrainable::fun([Constrainable::from(Type::Int), var(2).into()], Constrainable::tup([Type::Int]))
        );
    }

    #[test]
    fn combine_rewrites_existing_values() {
        let s = Substitution::var(var(1), Constrainable::tup([var(2)])).combine(&Substitution::var(var(2), Type::Bool));
        assert_eq!(s.get(var(1)), Some(&Constrainable::tup([Type::Bool])));
        assert_eq!(s.get(var(2)), Some(&Constrainable::from(Type::Bool)));
    }

    #[test]
    fn replaced_placeholders_are_rewritten_by_id() {
        let id = 7.into();
        let container = Constrainable::container(Backing::Unresolved, var(1), Slot::At(0), id);
        let s = Substitution::var(var(3), Constrainable::tup([container.clone()]));
        let s = s.combine(&Substitution::placeholder(id, Constrainable::tup([Type::Int])));
        assert_eq!(s.get(var(3)), Some(&Constrainable::tup([Constrainable::tup([Type::Int])])));
        assert_eq!(container.substitute(&s), Constrainable::tup([Type::Int]));
    }

    #[test]
    fn rederiving_a_binding_is_a_no_op() {
        let mut s = Substitution::var(var(1), Type::Int);
        s.combine_mut(&Substitution::var(var(1), Type::Int));
        assert_eq!(s.len(), 1);
    }

    #[test]
    #[should_panic]
    fn conflicting_rebind_panics() {
        let mut s = Substitution::var(var(1), Type::Int);
        s.combine_mut(&Substitution::var(var(1), Type::Float));
    }
}
