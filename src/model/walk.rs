use super::Node;

impl Node {
    pub fn children(&self) -> Vec<&Node> {
        use Node::*;
        match self {
            Lit(_) | Null | Ident(_) => Vec::new(),
            Paren(inner) | Yield(inner) | Return(inner) => vec![inner.as_ref()],
            Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Assign { target, value } => vec![target.as_ref(), value.as_ref()],
            Call { callee, args } => std::iter::once(callee.as_ref()).chain(args).collect(),
            Closure { captured, .. } => vec![captured.as_ref()],
            Array(elems) | Tuple(elems) => elems.iter().collect(),
            Index { target, index } => vec![target.as_ref(), index.as_ref()],
            TupleAccess { tuple, .. } => vec![tuple.as_ref()],
            Access { target, .. } => vec![target.as_ref()],
            Builtin { args, .. } => args.iter().collect(),
            If { cond, body } | While { cond, body } => std::iter::once(cond.as_ref()).chain(body).collect(),
            ForIter { item, iter, body } => [item.as_ref(), iter.as_ref()].into_iter().chain(body).collect(),
        }
    }

    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        self.children().into_iter().for_each(|child| child.walk(f));
        f(self);
    }

    pub fn is_statement(&self) -> bool {
        use Node::*;
        matches!(
            self,
            Assign { .. } | Return(_) | Yield(_) | If { .. } | While { .. } | ForIter { .. }
        )
    }

    pub fn contains_yield(&self) -> bool {
        let mut found = false;
        self.walk(&mut |n| found |= matches!(n, Node::Yield(_)));
        found
    }

    pub fn literal_index(&self) -> Option<usize> {
        match self {
            Node::Lit(super::Literal::Int(n)) => usize::try_from(*n).ok(),
            Node::Paren(inner) => inner.literal_index(),
            _ => None,
        }
    }
}

/// Expressions whose value a function returns: every `return` target plus a trailing expression line.
pub fn terminal_expressions(body: &[Node]) -> Vec<&Node> {
    let mut terminals = Vec::new();
    for line in body {
        line.walk(&mut |n| {
            if let Node::Return(value) = n {
                terminals.push(value.as_ref());
            }
        });
    }
    if let Some(last) = body.last().filter(|n| !n.is_statement()) {
        terminals.push(last);
    }
    terminals
}
