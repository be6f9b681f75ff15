use super::constraint::Constraint;
use super::{Result, TypeErrorKind};
use crate::model::typing::{Backing, Constrainable, Slot, StructOptions, Type, TypeVar, VarSupply};
use crate::model::{terminal_expressions, BinaryOp, Builtin, Environment, FunDef, Literal, Node, NodeHash, Program};
use log::{debug, trace};
use std::collections::HashMap;

/// Cached signature of a top-level function, allocated before any body is walked.
#[derive(PartialEq, Clone, Debug)]
pub struct FunLookup {
    pub args: Vec<TypeVar>,
    pub ret: TypeVar,
}

impl FunLookup {
    pub fn shape(&self) -> Constrainable {
        Constrainable::fun(self.args.iter().copied(), self.ret)
    }

    pub fn without_first_arg(&self) -> Constrainable {
        Constrainable::fun(self.args.iter().skip(1).copied(), self.ret)
    }
}

#[derive(Debug)]
pub struct Generated {
    pub constraints: Vec<Constraint>,
    pub roster: Vec<NodeHash>,
    pub nodes: HashMap<NodeHash, Node>,
    pub vars: HashMap<NodeHash, TypeVar>,
    pub functions: Environment<FunLookup>,
    pub supply: VarSupply,
}

impl Generated {
    pub fn node(&self, hash: NodeHash) -> Option<&Node> {
        self.nodes.get(&hash)
    }

    pub fn var(&self, node: &Node) -> Option<TypeVar> {
        self.vars.get(&NodeHash::of(node)).copied()
    }

    pub fn node_of_var(&self, var: TypeVar) -> Option<&Node> {
        (self.vars.iter())
            .find(|(_, v)| **v == var)
            .and_then(|(hash, _)| self.nodes.get(hash))
    }
}

/// Turns a declared type into the unification vocabulary. `Unconstrained` positions become fresh variables.
pub fn expand(ty: &Type, supply: &mut VarSupply) -> Constrainable {
    match ty {
        Type::Unconstrained => supply.fresh().into(),
        Type::Array(element) => {
            let element = expand(element, supply);
            Constrainable::container(Backing::Array, element, Slot::Wildcard, supply.fresh_id())
        }
        Type::Tuple(subtypes) => Constrainable::tup(subtypes.iter().map(|t| expand(t, supply)).collect::<Vec<_>>()),
        Type::Function(args, ret) => {
            let args = args.iter().map(|t| expand(t, supply)).collect::<Vec<_>>();
            Constrainable::fun(args, expand(ret, supply))
        }
        Type::Coroutine { yields, reads } => {
            let yields = expand(yields, supply);
            Constrainable::coroutine(yields, expand(reads, supply))
        }
        base => base.clone().into(),
    }
}

fn literal_type(lit: &Literal) -> Type {
    match lit {
        Literal::Int(_) => Type::Int,
        Literal::Float(_) => Type::Float,
        Literal::Bool(_) => Type::Bool,
        Literal::Str(_) => Type::String,
        Literal::Byte(_) => Type::Byte,
    }
}

pub struct Generator<'a> {
    program: &'a Program,
    entry_point: &'a str,
    supply: VarSupply,
    vars: HashMap<NodeHash, TypeVar>,
    nodes: HashMap<NodeHash, Node>,
    roster: Vec<NodeHash>,
    functions: Environment<FunLookup>,
    constraints: Vec<Constraint>,
    origin: Option<NodeHash>,
}

impl<'a> Generator<'a> {
    pub fn new(program: &'a Program, entry_point: &'a str) -> Self {
        Self {
            program,
            entry_point,
            supply: VarSupply::new(),
            vars: HashMap::new(),
            nodes: HashMap::new(),
            roster: Vec::new(),
            functions: Environment::new(),
            constraints: Vec::new(),
            origin: None,
        }
    }

    pub fn generate(mut self) -> Result<Generated> {
        let program = self.program;
        for fun in &program.funcs {
            let lookup = FunLookup {
                args: fun.params.iter().map(|_| self.supply.fresh()).collect(),
                ret: self.supply.fresh(),
            };
            self.functions += (fun.name.clone(), lookup);
        }
        for def in &program.structs {
            let constructor = self.var_of(&Node::ident(&def.name));
            let shape = expand(&def.constructor_type(), &mut self.supply);
            self.push(constructor, shape);
        }
        for fun in &program.funcs {
            self.function(fun)?;
        }
        Ok(Generated {
            constraints: self.constraints,
            roster: self.roster,
            nodes: self.nodes,
            vars: self.vars,
            functions: self.functions,
            supply: self.supply,
        })
    }

    fn var_of(&mut self, node: &Node) -> TypeVar {
        let supply = &mut self.supply;
        *self.vars.entry(NodeHash::of(node)).or_insert_with(|| supply.fresh())
    }

    fn lookup(&self, name: &str) -> Result<FunLookup> {
        (self.functions.get(name).cloned()).ok_or_else(|| TypeErrorKind::UnknownFunction(name.to_owned()).into())
    }

    fn push(&mut self, left: impl Into<Constrainable>, right: impl Into<Constrainable>) {
        let constraint = Constraint::new(left, right, self.origin);
        trace!("constraint {constraint}");
        self.constraints.push(constraint);
    }

    fn function(&mut self, fun: &FunDef) -> Result<()> {
        debug!("generating constraints for '{}'", fun.name);
        let lookup = self.lookup(&fun.name)?;
        self.origin = None;

        let name = self.var_of(&Node::ident(&fun.name));
        self.push(name, lookup.shape());
        for (param, arg) in fun.params.iter().zip(&lookup.args) {
            let param = self.var_of(&Node::ident(param));
            self.push(param, *arg);
        }
        if let Some(hint) = &fun.hint {
            let hint = expand(hint, &mut self.supply);
            self.push(lookup.shape(), hint);
        }

        for line in &fun.body {
            let mut nodes = Vec::new();
            line.walk(&mut |n| nodes.push(n));
            for node in nodes {
                self.visit(node, &lookup)?;
            }
        }

        if !fun.is_coroutine {
            let terminals = terminal_expressions(&fun.body);
            for terminal in &terminals {
                self.origin = Some(NodeHash::of(terminal));
                let var = self.var_of(terminal);
                self.push(lookup.ret, var);
            }
            self.origin = None;
            if terminals.is_empty() && fun.name != self.entry_point {
                self.push(lookup.ret, Type::Void);
            }
        }
        if fun.name == self.entry_point {
            self.push(lookup.ret, Type::Int);
        }
        Ok(())
    }

    fn visit(&mut self, node: &Node, enclosing: &FunLookup) -> Result<()> {
        let hash = NodeHash::of(node);
        self.origin = Some(hash);
        if let Node::Yield(value) = node {
            let value = self.var_of(value);
            let reads = self.supply.fresh();
            self.push(Constrainable::coroutine(value, reads), enclosing.ret);
        }
        if self.nodes.contains_key(&hash) {
            return Ok(());
        }
        self.nodes.insert(hash, node.clone());
        self.roster.push(hash);
        self.rule(node)
    }

    fn rule(&mut self, node: &Node) -> Result<()> {
        let var = self.var_of(node);
        match node {
            Node::Lit(lit) => self.push(var, literal_type(lit)),
            Node::Null | Node::Yield(_) | Node::Return(_) => {}
            Node::Ident(name) => {
                if let Some(hint) = self.program.hints.get(name) {
                    let hint = expand(hint, &mut self.supply);
                    self.push(var, hint);
                }
            }
            Node::Paren(inner) => {
                let inner = self.var_of(inner);
                self.push(var, inner);
            }
            Node::Binary { op, left, right } => {
                let left = self.var_of(left);
                let right = self.var_of(right);
                self.push(left, right);
                match op {
                    BinaryOp::Mod => self.push(var, left),
                    op if op.is_comparison() => self.push(var, Type::Bool),
                    _ => self.push(var, right),
                }
            }
            Node::Assign { target, value } => {
                let target = self.var_of(target);
                let value = self.var_of(value);
                self.push(target, value);
                self.push(var, Type::Void);
            }
            Node::Call { callee, args } => {
                let ret = self.supply.fresh();
                let args = args.iter().map(|arg| self.var_of(arg)).collect::<Vec<_>>();
                let shape = Constrainable::fun(args, ret);
                let callee_var = self.var_of(callee);
                self.push(shape.clone(), callee_var);
                self.push(var, ret);
                if let Node::Ident(name) = callee.as_ref() {
                    if let Some(lookup) = self.functions.get(name) {
                        let known = lookup.shape();
                        self.push(known, shape);
                    }
                }
            }
            Node::Closure { target, captured } => {
                let base = self.lookup(target).map_err(|e| e.kind.at(node))?;
                let Some(first) = base.args.first().copied() else {
                    return Err(TypeErrorKind::ArityMismatch(0, 1).at(node));
                };
                let captured = self.var_of(captured);
                self.push(var, base.without_first_arg());
                self.push(first, captured);
            }
            Node::Array(elems) => {
                let element = self.supply.fresh();
                for elem in elems {
                    let elem = self.var_of(elem);
                    self.push(elem, element);
                }
                let id = self.supply.fresh_id();
                self.push(var, Constrainable::container(Backing::Array, element, Slot::Wildcard, id));
            }
            Node::Tuple(elems) => {
                let elems = elems.iter().map(|elem| self.var_of(elem)).collect::<Vec<_>>();
                self.push(var, Constrainable::tup(elems));
            }
            Node::Index { target, index } => {
                let element = self.supply.fresh();
                let slot = index.literal_index().map_or(Slot::Wildcard, Slot::At);
                let target = self.var_of(target);
                let id = self.supply.fresh_id();
                self.push(target, Constrainable::container(Backing::Unresolved, element, slot, id));
                self.push(var, element);
            }
            Node::TupleAccess { tuple, index } => {
                let tuple = self.var_of(tuple);
                let id = self.supply.fresh_id();
                self.push(tuple, Constrainable::indexer(*index, var, id));
            }
            Node::Access { target, field } => {
                let candidates = (self.program.structs.iter())
                    .filter(|def| def.declares(field))
                    .map(|def| def.name.clone())
                    .collect::<Vec<_>>();
                if candidates.is_empty() {
                    return Err(TypeErrorKind::UnresolvedField(field.clone(), candidates).at(node));
                }
                let target = self.var_of(target);
                let id = self.supply.fresh_id();
                self.push(target, StructOptions::new(candidates, (var, field.clone()), id));
            }
            Node::Builtin { builtin, args } => self.builtin(node, *builtin, args, var)?,
            Node::If { cond, .. } | Node::While { cond, .. } => {
                let cond = self.var_of(cond);
                self.push(cond, Type::Bool);
            }
            Node::ForIter { item, iter, .. } => {
                let item = self.var_of(item);
                let iter = self.var_of(iter);
                let id = self.supply.fresh_id();
                self.push(iter, Constrainable::container(Backing::Unresolved, item, Slot::Wildcard, id));
            }
        }
        Ok(())
    }

    fn builtin(&mut self, node: &Node, builtin: Builtin, args: &[Node], var: TypeVar) -> Result<()> {
        match (builtin, args) {
            (Builtin::Next, [target]) => {
                let target = self.var_of(target);
                let reads = self.supply.fresh();
                self.push(Constrainable::coroutine(var, reads), target);
            }
            (Builtin::Send, [target, value]) => {
                let target = self.var_of(target);
                let value = self.var_of(value);
                let yields = self.supply.fresh();
                self.push(Constrainable::coroutine(yields, value), target);
                self.push(var, Type::Void);
            }
            (Builtin::Done, [target]) => {
                let target = self.var_of(target);
                let (yields, reads) = (self.supply.fresh(), self.supply.fresh());
                self.push(Constrainable::coroutine(yields, reads), target);
                self.push(var, Type::Bool);
            }
            (Builtin::Len, [_]) => self.push(var, Type::Int),
            (Builtin::Any, [_]) => self.push(var, Type::Any),
            (builtin, args) => return Err(TypeErrorKind::ArityMismatch(args.len(), builtin.arity()).at(node)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::typing::{Nominal, Placeholder, Shape};
    use crate::model::StructDef;

    fn generate(program: &Program) -> Generated {
        Generator::new(program, "main").generate().expect("generation failed")
    }

    #[test]
    fn repeated_expressions_share_a_variable() {
        let body = vec![Node::add(Node::ident("a"), Node::ident("a")), Node::add(Node::ident("a"), Node::ident("a"))];
        let generated = generate(&Program::new([FunDef::new("f", ["a"], body)]));
        let sum = Node::add(Node::ident("a"), Node::ident("a"));
        assert_eq!(generated.roster.iter().filter(|h| **h == NodeHash::of(&sum)).count(), 1);
        assert!(generated.var(&sum).is_some());
    }

    #[test]
    fn functions_are_cached_before_bodies() {
        let caller = FunDef::new("main", Vec::<String>::new(), vec![Node::ret(Node::call(Node::ident("g"), [Node::int(1)]))]);
        let callee = FunDef::new("g", ["x"], vec![Node::ret(Node::ident("x"))]);
        let generated = generate(&Program::new([caller, callee]));
        assert_eq!(generated.functions.get("g").map(|l| l.args.len()), Some(1));
    }

    #[test]
    fn literal_indices_are_recorded() {
        let body = vec![Node::ret(Node::index(Node::ident("t"), Node::int(1)))];
        let generated = generate(&Program::new([FunDef::new("f", ["t"], body)]));
        let container = generated.constraints.iter().find_map(|c| match &c.right {
            Constrainable::Shape(Shape::Placeholder(Placeholder::Container(c))) => Some(c.index),
            _ => None,
        });
        assert_eq!(container, Some(Slot::At(1)));
    }

    #[test]
    fn access_without_candidates_fails_immediately() {
        let body = vec![Node::ret(Node::access(Node::ident("p"), "z"))];
        let program = Program::new([FunDef::new("f", ["p"], body)]).with_struct(StructDef::new("P", [("x", Type::Int)]));
        let error = Generator::new(&program, "main").generate().unwrap_err();
        assert_eq!(error.kind, TypeErrorKind::UnresolvedField("z".into(), Vec::new()));
    }

    #[test]
    fn closure_of_unknown_function_is_reported() {
        let body = vec![Node::ret(Node::closure("missing", Node::Tuple(vec![])))];
        let program = Program::new([FunDef::new("main", Vec::<String>::new(), body)]);
        let error = Generator::new(&program, "main").generate().unwrap_err();
        assert_eq!(error.kind, TypeErrorKind::UnknownFunction("missing".into()));
        assert!(error.node.is_some());
    }

    #[test]
    fn yields_constrain_every_occurrence() {
        let body = vec![Node::yield_(Node::int(1)), Node::yield_(Node::int(1))];
        let generated = generate(&Program::new([FunDef::new("gen", Vec::<String>::new(), body)]));
        let yields = (generated.constraints.iter())
            .filter(|c| matches!(&c.left, Constrainable::Shape(Shape::Nominal(Nominal::Coroutine { .. }))))
            .count();
        assert_eq!(yields, 2);
    }
}
