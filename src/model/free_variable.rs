use super::typing::{Constrainable, TypeVar};
use super::Substitution;
use std::collections::HashSet;

pub trait FreeVariable<V> {
    fn free_vars(&self) -> HashSet<&V>;
}

/// Variables in structural position. Pending field obligations are not structure and are skipped.
impl FreeVariable<TypeVar> for Constrainable {
    fn free_vars(&self) -> HashSet<&TypeVar> {
        match self {
            Self::Var(v) => [v].into(),
            c => (c.children().into_iter()).flat_map(|c| c.free_vars()).collect(),
        }
    }
}

/// Whether `var` can be reached from `term`, following bindings in `subst`.
pub fn occurs(var: TypeVar, term: &Constrainable, subst: &Substitution) -> bool {
    let mut visited = HashSet::new();
    let mut pending = vec![term];
    while let Some(term) = pending.pop() {
        for v in term.free_vars() {
            if *v == var {
                return true;
            }
            if visited.insert(*v) {
                pending.extend(subst.get(*v));
            }
        }
    }
    false
}
