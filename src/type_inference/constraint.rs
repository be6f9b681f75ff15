use crate::model::typing::{Constrainable, TypeVar};
use crate::model::{FreeVariable, NodeHash, Substitute, Substitution};
use std::collections::{HashSet, VecDeque};
use std::fmt::Display;

/// Two sides that must denote the same type, tagged with the node whose rule produced them.
#[derive(PartialEq, Clone, Debug)]
pub struct Constraint {
    pub left: Constrainable,
    pub right: Constrainable,
    pub origin: Option<NodeHash>,
}

impl Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ≡ {}", self.left, self.right)
    }
}

impl Constraint {
    pub fn new(left: impl Into<Constrainable>, right: impl Into<Constrainable>, origin: Option<NodeHash>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            origin,
        }
    }

    pub fn derive(&self, left: impl Into<Constrainable>, right: impl Into<Constrainable>) -> Self {
        Self::new(left, right, self.origin)
    }
}

impl Substitute for Constraint {
    fn substitute_mut(&mut self, subst: &Substitution) {
        self.left.substitute_mut(subst);
        self.right.substitute_mut(subst);
    }
}

impl FreeVariable<TypeVar> for Constraint {
    fn free_vars(&self) -> HashSet<&TypeVar> {
        self.left.free_vars().union(&self.right.free_vars()).copied().collect()
    }
}

#[derive(Default, Debug)]
pub struct Worklist {
    queue: VecDeque<Constraint>,
    deferred: Vec<Constraint>,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.queue.push_back(constraint);
    }

    pub fn pop(&mut self) -> Option<Constraint> {
        self.queue.pop_front()
    }

    pub fn defer(&mut self, constraint: Constraint) {
        self.deferred.push(constraint);
    }

    pub fn deferred(&self) -> &[Constraint] {
        &self.deferred
    }

    pub fn requeue_deferred(&mut self) {
        self.queue.extend(self.deferred.drain(..));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Substitute for Worklist {
    fn substitute_mut(&mut self, subst: &Substitution) {
        self.queue.iter_mut().for_each(|c| c.substitute_mut(subst));
        self.deferred.substitute_mut(subst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::typing::Type;

    #[test]
    fn rewriting_reaches_deferred_constraints() {
        let mut worklist = Worklist::new();
        worklist.push(Constraint::new(TypeVar::from(1), Type::Int, None));
        worklist.defer(Constraint::new(TypeVar::from(2), TypeVar::from(1), None));
        worklist.substitute_mut(&Substitution::var(1.into(), Type::Bool));
        assert_eq!(worklist.pop(), Some(Constraint::new(Type::Bool, Type::Int, None)));
        assert_eq!(worklist.deferred(), [Constraint::new(TypeVar::from(2), Type::Bool, None)]);
    }

    #[test]
    fn requeued_constraints_follow_pending_ones() {
        let mut worklist = Worklist::new();
        worklist.defer(Constraint::new(TypeVar::from(1), Type::Int, None));
        worklist.push(Constraint::new(TypeVar::from(2), Type::Int, None));
        worklist.requeue_deferred();
        assert_eq!(worklist.len(), 2);
        assert_eq!(worklist.pop().map(|c| c.left), Some(Constrainable::from(TypeVar::from(2))));
        assert!(worklist.deferred().is_empty());
    }
}
