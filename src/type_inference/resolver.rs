use super::generator::Generated;
use super::{Result, TypeErrorKind, TypeTable};
use crate::model::typing::{Backing, Constrainable, Nominal, Placeholder, PlaceholderId, Shape, Type};
use crate::model::{Environment, Node, NodeHash, Program, Substitution};
use log::debug;
use std::collections::{HashMap, HashSet};

pub struct Resolver<'a> {
    program: &'a Program,
    generated: &'a Generated,
    subst: &'a Substitution,
    memo: HashMap<NodeHash, Type>,
}

impl<'a> Resolver<'a> {
    pub fn new(program: &'a Program, generated: &'a Generated, subst: &'a Substitution) -> Self {
        Self {
            program,
            generated,
            subst,
            memo: HashMap::new(),
        }
    }

    pub fn resolve_all(mut self) -> Result<TypeTable> {
        let generated = self.generated;
        for hash in &generated.roster {
            if let Some(node) = generated.node(*hash) {
                self.resolve_node(node)?;
            }
        }
        let functions = (self.program.funcs.iter())
            .filter_map(|fun| generated.functions.get(&fun.name).map(|lookup| (fun.name.clone(), lookup.shape())))
            .map(|(name, shape)| (name, self.resolve(&shape)))
            .collect::<Environment<_>>();
        debug!("resolved {} nodes and {} functions", self.memo.len(), functions.len());
        Ok(TypeTable::new(self.memo, functions))
    }

    pub fn resolve_node(&mut self, node: &Node) -> Result<Type> {
        let hash = NodeHash::of(node);
        if let Some(ty) = self.memo.get(&hash) {
            return Ok(ty.clone());
        }
        let ty = if node.is_statement() {
            Type::Void
        } else {
            match self.generated.vars.get(&hash) {
                Some(var) => self.resolve(&Constrainable::Var(*var)),
                None => Type::Any,
            }
        };
        if ty == Type::Unconstrained && !matches!(node, Node::Array(elems) if elems.is_empty()) {
            return Err(TypeErrorKind::UnderConstrained(node.to_string()).at(node));
        }
        self.memo.insert(hash, ty.clone());
        Ok(ty)
    }

    pub fn resolve(&self, c: &Constrainable) -> Type {
        self.resolve_within(c, &mut HashSet::new())
    }

    fn resolve_within(&self, c: &Constrainable, visiting: &mut HashSet<PlaceholderId>) -> Type {
        match c {
            Constrainable::Var(v) => match self.subst.get(*v) {
                Some(bound) => self.resolve_within(bound, visiting),
                None => Type::Any,
            },
            Constrainable::Base(ty) => ty.clone(),
            Constrainable::Shape(Shape::Nominal(Nominal::Fun(args, ret))) => {
                let args = args.iter().map(|arg| self.resolve_within(arg, visiting)).collect::<Vec<_>>();
                Type::function(args, self.resolve_within(ret, visiting))
            }
            Constrainable::Shape(Shape::Nominal(Nominal::Tup(subtypes))) => {
                Type::Tuple(subtypes.iter().map(|sub| self.resolve_within(sub, visiting)).collect())
            }
            Constrainable::Shape(Shape::Nominal(Nominal::Coroutine { yields, reads })) => {
                let yields = self.resolve_within(yields, visiting);
                Type::coroutine(yields, self.resolve_within(reads, visiting))
            }
            Constrainable::Shape(Shape::Placeholder(p)) => self.resolve_placeholder(p, visiting),
        }
    }

    fn resolve_placeholder(&self, p: &Placeholder, visiting: &mut HashSet<PlaceholderId>) -> Type {
        if let Some(replacement) = self.subst.replacement(p.id()) {
            if !visiting.insert(p.id()) {
                return Type::Unconstrained;
            }
            let ty = self.resolve_within(replacement, visiting);
            visiting.remove(&p.id());
            return ty;
        }
        match p {
            Placeholder::Container(c) if c.backing == Backing::Array => Type::array(self.resolve_within(&c.element, visiting)),
            Placeholder::StructOptions(o) if o.candidates.len() == 1 => Type::Struct(o.candidates[0].clone()),
            _ => Type::Unconstrained,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::typing::{Slot, TypeVar, VarSupply};

    fn generated() -> Generated {
        Generated {
            constraints: Vec::new(),
            roster: Vec::new(),
            nodes: HashMap::new(),
            vars: HashMap::new(),
            functions: Environment::new(),
            supply: VarSupply::new(),
        }
    }

    #[test]
    fn unbound_variables_resolve_to_any() {
        let (program, generated, subst) = (Program::default(), generated(), Substitution::new());
        let resolver = Resolver::new(&program, &generated, &subst);
        assert_eq!(resolver.resolve(&TypeVar::from(1).into()), Type::Any);
    }

    #[test]
    fn arrays_resolve_through_their_element() {
        let (program, generated) = (Program::default(), generated());
        let subst = Substitution::var(1.into(), Type::Float);
        let resolver = Resolver::new(&program, &generated, &subst);
        let array = Constrainable::container(Backing::Array, TypeVar::from(1), Slot::Wildcard, 1.into());
        assert_eq!(resolver.resolve(&array), Type::array(Type::Float));
    }

    #[test]
    fn unresolved_containers_follow_their_replacement() {
        let (program, generated) = (Program::default(), generated());
        let subst = Substitution::placeholder(3.into(), Constrainable::tup([Type::Int, Type::Bool]));
        let resolver = Resolver::new(&program, &generated, &subst);
        let replaced = Constrainable::container(Backing::Unresolved, TypeVar::from(1), Slot::At(0), 3.into());
        let pending = Constrainable::container(Backing::Unresolved, TypeVar::from(1), Slot::At(0), 4.into());
        assert_eq!(resolver.resolve(&replaced), Type::Tuple(vec![Type::Int, Type::Bool]));
        assert_eq!(resolver.resolve(&pending), Type::Unconstrained);
    }

    #[test]
    fn statements_resolve_to_void() {
        let (program, generated, subst) = (Program::default(), generated(), Substitution::new());
        let mut resolver = Resolver::new(&program, &generated, &subst);
        let assign = Node::assign(Node::ident("x"), Node::int(1));
        assert_eq!(resolver.resolve_node(&assign), Ok(Type::Void));
    }

    #[test]
    fn resolving_twice_is_stable() {
        let (program, mut generated) = (Program::default(), generated());
        let node = Node::ident("x");
        generated.vars.insert(NodeHash::of(&node), 1.into());
        let subst = Substitution::var(1.into(), Type::String);
        let mut resolver = Resolver::new(&program, &generated, &subst);
        let first = resolver.resolve_node(&node);
        assert_eq!(first, Ok(Type::String));
        assert_eq!(resolver.resolve_node(&node), first);
    }
}
