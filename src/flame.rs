//! Shape the decoded operator tree for an external flame-graph chart.
//!
//! The chart consumes a plain `{name, value, children}` tree; this module
//! only builds that structure plus the tooltip labels. Drawing is the
//! chart's business.

use crate::fmt::{format_duration, format_scaled};
use crate::model::OpNode;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlameNode {
    pub name: String,
    pub value: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FlameNode>,
    pub tooltip: String,
}

/// Pre-order walk mirroring the tree shape; `value` is the cumulative
/// duration in nanoseconds.
pub fn to_flame_graph(node: &OpNode) -> FlameNode {
    FlameNode {
        name: node.op.name.clone(),
        value: node.cuml_total_duration_ns,
        children: node.children.iter().map(|c| to_flame_graph(c)).collect(),
        tooltip: tooltip_label(node),
    }
}

/// Tooltip text: the schema when one exists, otherwise the name, plus the
/// humanized duration. A zero duration leaves just the name.
pub fn tooltip_label(node: &OpNode) -> String {
    let Some((value, unit)) = format_duration(node.cuml_total_duration_ns) else {
        return node.op.name.clone();
    };
    let label = node.op.schema.as_deref().unwrap_or(&node.op.name);
    format!("{}: {}{}", label, format_scaled(value), unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::node;
    use crate::model::Op;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn flame_tree_mirrors_op_tree() {
        let root = node(
            0,
            "root",
            1,
            9_000,
            vec![node(1, "leaf", 3, 4_000, vec![])],
        );

        let flame = to_flame_graph(&root);

        assert_eq!(flame.name, "root");
        assert_eq!(flame.value, 9_000);
        assert_eq!(flame.children.len(), 1);
        assert_eq!(flame.children[0].name, "leaf");
        assert_eq!(flame.children[0].value, 4_000);
        assert_eq!(flame.children[0].children.len(), 0);
    }

    #[test]
    fn tooltip_prefers_schema_over_name() {
        let with_schema = Rc::new(crate::model::OpNode {
            op: Rc::new(Op {
                handle: 1,
                name: "conv".to_string(),
                schema: Some("conv(x) -> y".to_string()),
            }),
            invocation_count: 1,
            cuml_total_duration_ns: 1_500_000,
            children: vec![],
        });

        assert_eq!(tooltip_label(&with_schema), "conv(x) -> y: 1.5ms");
        assert_eq!(tooltip_label(&node(2, "bare", 1, 5_000, vec![])), "bare: 5µs");
    }

    #[test]
    fn zero_duration_tooltip_is_just_the_name() {
        assert_eq!(tooltip_label(&node(3, "idle", 1, 0, vec![])), "idle");
    }

    #[test]
    fn leaves_serialize_without_children_key() {
        let flame = to_flame_graph(&node(0, "leaf", 1, 1_000, vec![]));
        let json = serde_json::to_string(&flame).unwrap();

        assert!(!json.contains("children"));
        assert!(json.contains("\"value\":1000"));
    }
}
