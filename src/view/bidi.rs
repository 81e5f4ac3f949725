//! Bidirectional map composed from two unidirectional `HashMap`s.
//!
//! The tree view uses this to tie a model row to its rendered
//! representation; both directions are O(1) lookups.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct BidiMap<A, B> {
    a_to_b: HashMap<A, B>,
    b_to_a: HashMap<B, A>,
}

impl<A, B> BidiMap<A, B>
where
    A: Clone + Eq + Hash,
    B: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            a_to_b: HashMap::new(),
            b_to_a: HashMap::new(),
        }
    }

    /// Insert a pair. A re-inserted key on either side unlinks its stale
    /// partner so the two directions never disagree.
    pub fn insert(&mut self, a: A, b: B) {
        if let Some(old_b) = self.a_to_b.insert(a.clone(), b.clone()) {
            self.b_to_a.remove(&old_b);
        }
        if let Some(old_a) = self.b_to_a.insert(b, a) {
            self.a_to_b.remove(&old_a);
        }
    }

    pub fn get_by_a(&self, a: &A) -> Option<&B> {
        self.a_to_b.get(a)
    }

    pub fn get_by_b(&self, b: &B) -> Option<&A> {
        self.b_to_a.get(b)
    }

    pub fn clear(&mut self) {
        self.a_to_b.clear();
        self.b_to_a.clear();
    }

    pub fn len(&self) -> usize {
        self.a_to_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a_to_b.is_empty()
    }
}

impl<A, B> Default for BidiMap<A, B>
where
    A: Clone + Eq + Hash,
    B: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
