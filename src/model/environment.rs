use std::collections::{btree_map, BTreeMap};
use std::fmt::Display;
use std::ops::{Add, AddAssign};

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Environment<T> {
    map: BTreeMap<String, T>,
}

impl<T> Default for Environment<T> {
    fn default() -> Self {
        Self { map: BTreeMap::new() }
    }
}

impl<T> IntoIterator for Environment<T> {
    type Item = (String, T);
    type IntoIter = btree_map::IntoIter<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Environment<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl<T, N: Into<String>> FromIterator<(N, T)> for Environment<T> {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(n, x)| (n.into(), x)).collect(),
        }
    }
}

impl<T, U: Into<T>> AddAssign<(String, U)> for Environment<T> {
    fn add_assign(&mut self, (name, x): (String, U)) {
        self.map.insert(name, x.into());
    }
}

impl<T, U: Into<T>> Add<(String, U)> for Environment<T> {
    type Output = Self;

    fn add(mut self, rhs: (String, U)) -> Self::Output {
        self += rhs;
        self
    }
}

impl<T: Display> Display for Environment<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = (self.iter())
            .map(|(n, x)| format!("{n}: {x}"))
            .collect::<Vec<_>>();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

impl<T> Environment<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, T> {
        self.map.iter()
    }
}
