use super::constraint::{Constraint, Worklist};
use super::generator::{expand, Generated};
use super::{Result, TypeError, TypeErrorKind};
use crate::model::typing::{
    Backing, Constrainable, Container, Nominal, Placeholder, PlaceholderId, Shape, Slot, StructOptions, Type, TypeVar,
    VarSupply,
};
use crate::model::{occurs, FreeVariable, NodeHash, Program, Substitute, Substitution};
use log::{debug, trace};

pub struct Unifier<'a> {
    program: &'a Program,
    generated: &'a Generated,
    supply: &'a mut VarSupply,
    subst: Substitution,
    worklist: Worklist,
    steps: usize,
}

impl<'a> Unifier<'a> {
    pub fn new(program: &'a Program, generated: &'a Generated, supply: &'a mut VarSupply) -> Self {
        Self {
            program,
            generated,
            supply,
            subst: Substitution::new(),
            worklist: Worklist::new(),
            steps: 0,
        }
    }

    pub fn solve(self) -> Result<Substitution> {
        let constraints = self.generated.constraints.clone();
        self.solve_constraints(constraints)
    }

    pub fn solve_constraints(mut self, constraints: Vec<Constraint>) -> Result<Substitution> {
        constraints.into_iter().for_each(|c| self.push(c));
        let mut progress = None;
        loop {
            while let Some(c) = self.worklist.pop() {
                let origin = c.origin;
                self.unify(c).map_err(|e| self.blame(e, origin))?;
            }
            if self.worklist.deferred().is_empty() || progress == Some(self.steps) {
                break;
            }
            progress = Some(self.steps);
            debug!("retrying {} deferred constraints", self.worklist.deferred().len());
            self.worklist.requeue_deferred();
        }
        for c in self.worklist.deferred() {
            let vars = c.free_vars().into_iter().map(ToString::to_string).collect::<Vec<_>>();
            debug!("left undecided: {c} over [{}]", vars.join(", "));
        }
        self.check_ambiguity()?;
        Ok(self.subst)
    }

    fn blame(&self, error: TypeError, origin: Option<NodeHash>) -> TypeError {
        error.or_at(origin.and_then(|h| self.generated.node(h)))
    }

    fn push(&mut self, constraint: Constraint) {
        self.worklist.push(constraint.substitute(&self.subst));
    }

    fn record(&mut self, step: Substitution) {
        trace!("record {step}");
        self.subst.combine_mut(&step);
        self.worklist.substitute_mut(&step);
        self.steps += 1;
    }

    fn replace(&mut self, id: PlaceholderId, value: impl Into<Constrainable>) {
        self.record(Substitution::placeholder(id, value));
    }

    fn unify(&mut self, c: Constraint) -> Result<()> {
        trace!("unify {c}");
        match (c.left.clone(), c.right.clone()) {
            (left, right) if left == right => Ok(()),
            (Constrainable::Var(v), other) | (other, Constrainable::Var(v)) => self.bind(&c, v, other),
            (Constrainable::Base(a), Constrainable::Base(b)) => Err(TypeErrorKind::TypeMismatch(a.into(), b.into()).into()),
            (Constrainable::Base(base), Constrainable::Shape(shape))
            | (Constrainable::Shape(shape), Constrainable::Base(base)) => self.base_against_shape(&c, base, shape),
            (Constrainable::Shape(a), Constrainable::Shape(b)) => self.shapes(&c, a, b),
        }
    }

    fn bind(&mut self, c: &Constraint, var: TypeVar, value: Constrainable) -> Result<()> {
        let value = match value {
            Constrainable::Shape(Shape::Placeholder(Placeholder::StructOptions(options)))
                if options.candidates.len() == 1 =>
            {
                let name = options.candidates[0].clone();
                self.settle(c, &options, &name)?
            }
            value => value,
        };
        if matches!(value, Constrainable::Shape(_)) && occurs(var, &value, &self.subst) {
            debug!("occurs check: not binding {var} to {value}");
            return Ok(());
        }
        self.record(Substitution::var(var, value));
        Ok(())
    }

    fn base_against_shape(&mut self, c: &Constraint, base: Type, shape: Shape) -> Result<()> {
        match shape {
            Shape::Placeholder(Placeholder::StructOptions(options)) => match &base {
                Type::Struct(name) => self.settle(c, &options, name).map(|_| ()),
                _ => Err(unresolved(&options, Vec::new())),
            },
            Shape::Placeholder(Placeholder::Container(container))
                if container.backing == Backing::Unresolved && base == Type::String =>
            {
                self.push(c.derive(*container.element, Type::Byte));
                self.replace(container.id, base);
                Ok(())
            }
            shape => Err(TypeErrorKind::TypeMismatch(base.into(), shape.into()).into()),
        }
    }

    fn shapes(&mut self, c: &Constraint, a: Shape, b: Shape) -> Result<()> {
        match (a, b) {
            (Shape::Nominal(a), Shape::Nominal(b)) => self.nominals(c, a, b),
            (Shape::Placeholder(p), other) | (other, Shape::Placeholder(p)) => self.placeholder(c, p, other),
        }
    }

    fn nominals(&mut self, c: &Constraint, a: Nominal, b: Nominal) -> Result<()> {
        match (a, b) {
            (Nominal::Fun(args1, ret1), Nominal::Fun(args2, ret2)) => {
                if args1.len() != args2.len() {
                    return Err(TypeErrorKind::ArityMismatch(args1.len(), args2.len()).into());
                }
                for (a1, a2) in args1.into_iter().zip(args2) {
                    self.push(c.derive(a1, a2));
                }
                self.push(c.derive(*ret1, *ret2));
                Ok(())
            }
            (Nominal::Tup(subtypes1), Nominal::Tup(subtypes2)) => {
                if subtypes1.len() != subtypes2.len() {
                    let (left, right) = (Constrainable::tup(subtypes1), Constrainable::tup(subtypes2));
                    return Err(TypeErrorKind::TypeMismatch(left, right).into());
                }
                for (s1, s2) in subtypes1.into_iter().zip(subtypes2) {
                    self.push(c.derive(s1, s2));
                }
                Ok(())
            }
            (Nominal::Coroutine { yields: y1, reads: r1 }, Nominal::Coroutine { yields: y2, reads: r2 }) => {
                self.push(c.derive(*y1, *y2));
                self.push(c.derive(*r1, *r2));
                Ok(())
            }
            (a, b) => Err(TypeErrorKind::ShapeMismatch(a.into(), b.into()).into()),
        }
    }

    fn placeholder(&mut self, c: &Constraint, p: Placeholder, other: Shape) -> Result<()> {
        use Placeholder::{Container as Cont, Indexer as Idx, StructOptions as Opts};
        match (p, other) {
            (Cont(container), Shape::Nominal(Nominal::Tup(subtypes))) if container.backing == Backing::Unresolved => {
                let Slot::At(index) = container.index else {
                    return Err(TypeErrorKind::ShapeMismatch(container.into(), Nominal::Tup(subtypes).into()).into());
                };
                self.select(c, index, *container.element, container.id, subtypes)
            }
            (Cont(container), Shape::Nominal(coroutine @ Nominal::Coroutine { .. }))
                if container.backing == Backing::Unresolved =>
            {
                if let Nominal::Coroutine { yields, .. } = &coroutine {
                    self.push(c.derive(*container.element, yields.as_ref().clone()));
                }
                self.replace(container.id, coroutine);
                Ok(())
            }
            (Cont(a), Shape::Placeholder(Cont(b))) => self.containers(c, a, b),
            (Idx(indexer), Shape::Nominal(Nominal::Tup(subtypes))) => {
                self.select(c, indexer.index, *indexer.element, indexer.id, subtypes)
            }
            (Idx(a), Shape::Placeholder(Idx(b))) if a.index == b.index => {
                self.push(c.derive(*a.element.clone(), *b.element));
                self.replace(b.id, a);
                Ok(())
            }
            (p @ Idx(_), Shape::Placeholder(q @ Idx(_))) => {
                self.defer(c, p, q);
                Ok(())
            }
            (p @ Idx(_), Shape::Placeholder(q @ Cont(Container { backing: Backing::Unresolved, .. })))
            | (p @ Cont(Container { backing: Backing::Unresolved, .. }), Shape::Placeholder(q @ Idx(_))) => {
                self.defer(c, p, q);
                Ok(())
            }
            (Opts(a), Shape::Placeholder(Opts(b))) => self.merge_options(c, a, b),
            (p, other) => Err(TypeErrorKind::ShapeMismatch(p.into(), other.into()).into()),
        }
    }

    fn defer(&mut self, c: &Constraint, p: Placeholder, q: Placeholder) {
        trace!("deferring {p} ≡ {q}");
        self.worklist.defer(c.derive(p, q));
    }

    fn select(
        &mut self,
        c: &Constraint,
        index: usize,
        element: Constrainable,
        id: PlaceholderId,
        subtypes: Vec<Constrainable>,
    ) -> Result<()> {
        let Some(slot) = subtypes.get(index).cloned() else {
            let found = Constrainable::tup(subtypes);
            return Err(TypeErrorKind::TypeMismatch(found, Constrainable::indexer(index, element, id)).into());
        };
        self.push(c.derive(element, slot));
        self.replace(id, Constrainable::tup(subtypes));
        Ok(())
    }

    fn containers(&mut self, c: &Constraint, a: Container, b: Container) -> Result<()> {
        if let (Backing::Unresolved, Backing::Unresolved, Slot::At(i), Slot::At(j)) = (a.backing, b.backing, a.index, b.index) {
            if i != j {
                self.defer(c, Placeholder::Container(a), Placeholder::Container(b));
                return Ok(());
            }
        }
        self.push(c.derive(*a.element.clone(), *b.element.clone()));
        let a_first = match (a.backing, b.backing) {
            (Backing::Array, _) => true,
            (_, Backing::Array) => false,
            _ => a.index != Slot::Wildcard || b.index == Slot::Wildcard,
        };
        let (kept, merged) = if a_first { (a, b) } else { (b, a) };
        self.replace(merged.id, kept);
        Ok(())
    }

    /// Narrows field-access candidates to `name`, discharging every pending obligation.
    fn settle(&mut self, c: &Constraint, options: &StructOptions, name: &str) -> Result<Constrainable> {
        if !options.candidates.iter().any(|candidate| candidate == name) {
            return Err(unresolved(options, vec![name.to_owned()]));
        }
        let (program, generated) = (self.program, self.generated);
        let Some(def) = program.struct_def(name) else {
            return Err(unresolved(options, Vec::new()));
        };
        let receiver = Constrainable::from(Type::Struct(name.to_owned()));
        for (var, field) in &options.obligations {
            let ty = match (def.member_type(field), def.method(field)) {
                (Some(member), _) => expand(member, &mut *self.supply),
                (None, Some(function)) => {
                    let lookup = (generated.functions.get(function))
                        .ok_or_else(|| TypeErrorKind::UnknownFunction(function.to_owned()))?;
                    if let Some(first) = lookup.args.first() {
                        self.push(c.derive(*first, receiver.clone()));
                    }
                    lookup.without_first_arg()
                }
                (None, None) => return Err(unresolved(options, vec![name.to_owned()])),
            };
            debug!("{name}.{field} narrowed to {ty}");
            self.push(c.derive(*var, ty));
        }
        self.replace(options.id, receiver.clone());
        Ok(receiver)
    }

    fn merge_options(&mut self, c: &Constraint, a: StructOptions, b: StructOptions) -> Result<()> {
        let candidates = (a.candidates.iter())
            .filter(|candidate| b.candidates.contains(*candidate))
            .cloned()
            .collect::<Vec<_>>();
        let obligations = a.obligations.iter().chain(&b.obligations).cloned().collect();
        if candidates.is_empty() {
            return Err(unresolved(&a, Vec::new()));
        }
        let merged = StructOptions {
            candidates,
            obligations,
            id: a.id,
        };
        if let [name] = merged.candidates.as_slice() {
            let name = name.clone();
            let resolved = self.settle(c, &merged, &name)?;
            self.replace(b.id, resolved);
            return Ok(());
        }
        let merged = StructOptions {
            id: self.supply.fresh_id(),
            ..merged
        };
        self.replace(a.id, merged.clone());
        self.replace(b.id, merged);
        Ok(())
    }

    fn check_ambiguity(&self) -> Result<()> {
        let mut bindings = self.subst.iter().collect::<Vec<_>>();
        bindings.sort_by_key(|(v, _)| **v);
        let Some(options) = bindings.into_iter().find_map(|(_, value)| pending_options(value)) else {
            return Ok(());
        };
        let error = unresolved(options, options.candidates.clone());
        let node = (options.obligations.first()).and_then(|(v, _)| self.generated.node_of_var(*v));
        Err(error.or_at(node))
    }
}

fn unresolved(options: &StructOptions, candidates: Vec<String>) -> TypeError {
    let field = (options.obligations.first()).map_or_else(String::new, |(_, f)| f.clone());
    TypeErrorKind::UnresolvedField(field, candidates).into()
}

fn pending_options(c: &Constrainable) -> Option<&StructOptions> {
    match c {
        Constrainable::Shape(Shape::Placeholder(Placeholder::StructOptions(options))) if options.candidates.len() > 1 => {
            Some(options)
        }
        c => c.children().into_iter().find_map(pending_options),
    }
}
