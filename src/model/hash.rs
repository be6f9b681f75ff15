use super::Node;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use xxhash_rust::xxh3::Xxh3;

#[derive(Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct NodeHash(u64);

impl NodeHash {
    pub fn of(node: &Node) -> Self {
        let mut hasher = Xxh3::new();
        node.hash(&mut hasher);
        Self(hasher.finish())
    }
}

impl From<&Node> for NodeHash {
    fn from(value: &Node) -> Self {
        Self::of(value)
    }
}

impl Display for NodeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_content_shares_identity() {
        let a = Node::add(Node::ident("a"), Node::int(1));
        let b = Node::add(Node::ident("a"), Node::int(1));
        assert_eq!(NodeHash::of(&a), NodeHash::of(&b));
        assert_ne!(NodeHash::of(&a), NodeHash::of(&Node::add(Node::ident("a"), Node::int(2))));
    }

    #[test]
    fn literal_kinds_are_distinguished() {
        assert_ne!(NodeHash::of(&Node::int(1)), NodeHash::of(&Node::byte(1)));
        assert_ne!(NodeHash::of(&Node::float(0.0)), NodeHash::of(&Node::float(-0.0)));
    }
}
