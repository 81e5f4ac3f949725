//! Operation tree model: interned operator descriptors plus the execution
//! tree aggregated over them.
//!
//! Both types are immutable once built. `OpNode::sort` returns a structural
//! copy instead of reordering in place, so a caller can hold on to the
//! pristine trace ordering and swap back to it at any time.

use std::cmp::Ordering;
use std::rc::Rc;

/// An interned operation descriptor. Created exactly once per distinct
/// handle during a decode session and shared by reference thereafter.
#[derive(Debug, PartialEq, Eq)]
pub struct Op {
    pub handle: u16,
    pub name: String,
    pub schema: Option<String>,
}

/// One node of the execution tree: an operator plus aggregated counters
/// and ordered children (trace order unless explicitly sorted).
#[derive(Debug)]
pub struct OpNode {
    pub op: Rc<Op>,
    pub invocation_count: u32,
    pub cuml_total_duration_ns: u64,
    pub children: Vec<Rc<OpNode>>,
}

impl OpNode {
    /// Copy the tree with every level's children reordered by `comparer`.
    /// The source tree is left untouched; `Op`s stay shared, not cloned.
    pub fn sort(&self, comparer: &dyn Fn(&OpNode, &OpNode) -> Ordering) -> Rc<OpNode> {
        let mut children: Vec<Rc<OpNode>> =
            self.children.iter().map(|child| child.sort(comparer)).collect();
        children.sort_by(|a, b| comparer(a.as_ref(), b.as_ref()));

        Rc::new(OpNode {
            op: Rc::clone(&self.op),
            invocation_count: self.invocation_count,
            cuml_total_duration_ns: self.cuml_total_duration_ns,
            children,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::node;
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Rc<OpNode> {
        node(
            0,
            "root",
            1,
            9_000,
            vec![
                node(1, "b", 2, 3_000, vec![node(3, "b1", 1, 1_000, vec![])]),
                node(2, "a", 5, 6_000, vec![node(4, "a1", 9, 2_000, vec![])]),
            ],
        )
    }

    fn names(n: &OpNode) -> Vec<&str> {
        n.children.iter().map(|c| c.op.name.as_str()).collect()
    }

    #[test]
    fn sort_reorders_every_level_without_touching_source() {
        let root = sample();
        let by_count_desc =
            |a: &OpNode, b: &OpNode| b.invocation_count.cmp(&a.invocation_count);

        let sorted = root.sort(&by_count_desc);

        assert_eq!(names(&sorted), vec!["a", "b"]);
        // Source ordering is untouched.
        assert_eq!(names(&root), vec!["b", "a"]);
        // Ops are shared between the two trees, not cloned.
        assert!(Rc::ptr_eq(&root.children[0].op, &sorted.children[1].op));
    }

    #[test]
    fn sort_is_idempotent() {
        let root = sample();
        let by_duration =
            |a: &OpNode, b: &OpNode| a.cuml_total_duration_ns.cmp(&b.cuml_total_duration_ns);

        let once = root.sort(&by_duration);
        let twice = once.sort(&by_duration);

        assert_eq!(names(&once), names(&twice));
        assert_eq!(
            once.children[0].cuml_total_duration_ns,
            twice.children[0].cuml_total_duration_ns
        );
    }

    #[test]
    fn equal_keys_keep_trace_order() {
        let root = node(
            0,
            "root",
            1,
            0,
            vec![
                node(1, "first", 3, 0, vec![]),
                node(2, "second", 3, 0, vec![]),
            ],
        );
        let by_count = |a: &OpNode, b: &OpNode| a.invocation_count.cmp(&b.invocation_count);

        // Vec::sort_by is stable, so ties preserve the original order.
        assert_eq!(names(&root.sort(&by_count)), vec!["first", "second"]);
    }
}
