//! Binds the operation tree model to the generic tree view.
//!
//! Row identity is reference identity on the shared node pointer, so the
//! same `OpNode` revisited through the model maps back to the same
//! rendered representation. Sorting swaps the served root between the
//! pristine decode result and a structurally sorted copy.

use crate::fmt::{format_duration, format_scaled, group_thousands};
use crate::model::OpNode;
use crate::view::tree::{
    CellContent, SortOrder, Span, TreeViewColumn, TreeViewError, TreeViewModel,
};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Shared node pointer with pointer-identity equality and hashing.
#[derive(Debug, Clone)]
pub struct NodeRef(pub Rc<OpNode>);

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

/// The four fixed columns of the operator table.
pub fn op_node_columns() -> Vec<TreeViewColumn> {
    vec![
        TreeViewColumn {
            id: "name",
            title: "Name",
            holds_expander: true,
            is_sortable: false,
        },
        TreeViewColumn {
            id: "count",
            title: "Count",
            holds_expander: false,
            is_sortable: true,
        },
        TreeViewColumn {
            id: "duration",
            title: "Duration",
            holds_expander: false,
            is_sortable: true,
        },
        TreeViewColumn {
            id: "schema",
            title: "Operator Schema",
            holds_expander: false,
            is_sortable: false,
        },
    ]
}

pub struct OpNodeTreeModel {
    unsorted_root: Rc<OpNode>,
    root: Rc<OpNode>,
}

impl OpNodeTreeModel {
    pub fn new(root: Rc<OpNode>) -> Self {
        Self {
            unsorted_root: Rc::clone(&root),
            root,
        }
    }

    pub fn root(&self) -> &Rc<OpNode> {
        &self.root
    }

    fn parent_node<'a>(&'a self, parent: Option<&'a NodeRef>) -> &'a OpNode {
        match parent {
            Some(node) => node.0.as_ref(),
            None => self.root.as_ref(),
        }
    }
}

impl TreeViewModel for OpNodeTreeModel {
    type Row = NodeRef;

    fn child_count(&self, parent: Option<&Self::Row>) -> usize {
        self.parent_node(parent).children.len()
    }

    fn child_at(&self, index: usize, parent: Option<&Self::Row>) -> Option<Self::Row> {
        self.parent_node(parent)
            .children
            .get(index)
            .cloned()
            .map(NodeRef)
    }

    fn cell_content(
        &self,
        row: &Self::Row,
        column: &TreeViewColumn,
    ) -> Result<CellContent, TreeViewError> {
        let node = &row.0;
        match column.id {
            "name" => Ok(CellContent::Text(node.op.name.clone())),
            "count" => Ok(CellContent::Text(group_thousands(u64::from(
                node.invocation_count,
            )))),
            "duration" => {
                let spans = match format_duration(node.cuml_total_duration_ns) {
                    Some((value, unit)) => vec![
                        Span {
                            class: "value",
                            text: format_scaled(value),
                        },
                        Span {
                            class: "unit",
                            text: unit.to_string(),
                        },
                    ],
                    None => vec![],
                };
                Ok(CellContent::Composite(spans))
            }
            "schema" => Ok(CellContent::Composite(vec![Span {
                class: "schema",
                text: node.op.schema.clone().unwrap_or_default(),
            }])),
            other => Err(TreeViewError::UnboundColumn(other.to_string())),
        }
    }

    fn supports_sort(&self) -> bool {
        true
    }

    fn sort(&mut self, column: &TreeViewColumn, order: Option<SortOrder>) {
        let Some(order) = order else {
            // Unordered restores the pristine decode-order tree.
            self.root = Rc::clone(&self.unsorted_root);
            return;
        };

        let column_id = column.id;
        self.root = self.unsorted_root.sort(&move |a: &OpNode, b: &OpNode| {
            let cmp = match column_id {
                "count" => a.invocation_count.cmp(&b.invocation_count),
                "duration" => a.cuml_total_duration_ns.cmp(&b.cuml_total_duration_ns),
                _ => Ordering::Equal,
            };
            match order {
                SortOrder::Descending => cmp.reverse(),
                SortOrder::Ascending => cmp,
            }
        });
    }
}
