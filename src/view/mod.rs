//! View layer: the generic tree list-view engine and the operator-tree
//! adapter that feeds it.

pub mod bidi;
pub mod opnode;
pub mod tree;

pub use opnode::{NodeRef, OpNodeTreeModel, op_node_columns};
pub use tree::{CellContent, SortOrder, Span, TreeView, TreeViewColumn, TreeViewError, TreeViewModel};
