//! Generic lazy-expanding tree list view.
//!
//! Renders any tree-shaped row source as a flat, indented list, one
//! representation per materialized row. Rows are materialized the first
//! time their parent is expanded and never re-created afterwards: a
//! bidirectional row/representation map keeps identity stable across
//! expand/collapse cycles. Sorting reorders the underlying model and then
//! rebuilds the list from scratch, since a re-sorted model hands out
//! different child identities at every level.

use crate::view::bidi::BidiMap;
use std::hash::Hash;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TreeViewError {
    #[error("unbound column id {0}")]
    UnboundColumn(String),
}

/// Column definition, supplied once at construction.
#[derive(Debug, Clone)]
pub struct TreeViewColumn {
    pub id: &'static str,
    pub title: &'static str,
    /// The column carrying the expander affordance and indentation.
    pub holds_expander: bool,
    pub is_sortable: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A renderable cell value: plain text or a composite of classed spans,
/// consumed uniformly by renderers.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Composite(Vec<Span>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub class: &'static str,
    pub text: String,
}

impl CellContent {
    pub fn plain_text(&self) -> String {
        match self {
            CellContent::Text(text) => text.clone(),
            CellContent::Composite(spans) => {
                spans.iter().map(|s| s.text.as_str()).collect()
            }
        }
    }
}

/// The row-model contract a tree-shaped data source implements to be
/// rendered by [`TreeView`]. `Row` is an opaque identity: equal rows map
/// to the same rendered representation.
pub trait TreeViewModel {
    type Row: Clone + Eq + Hash;

    /// Count of direct children; the root level when `parent` is `None`.
    fn child_count(&self, parent: Option<&Self::Row>) -> usize;

    /// Child at `index`, or `None` for a hole (skipped silently).
    fn child_at(&self, index: usize, parent: Option<&Self::Row>) -> Option<Self::Row>;

    /// Renderable content for one row/column pair. Unrecognized column ids
    /// are a programming error surfaced as [`TreeViewError::UnboundColumn`].
    fn cell_content(
        &self,
        row: &Self::Row,
        column: &TreeViewColumn,
    ) -> Result<CellContent, TreeViewError>;

    /// Whether [`TreeViewModel::sort`] does anything; `false` disables the
    /// sorting UI entirely.
    fn supports_sort(&self) -> bool {
        false
    }

    /// Reorder the underlying source for subsequent reads. `None` restores
    /// the unsorted order.
    fn sort(&mut self, _column: &TreeViewColumn, _order: Option<SortOrder>) {}
}

/// Identifier of a materialized representation, valid until the next reload.
pub type RepId = usize;

/// Rendered counterpart of one model row.
#[derive(Debug)]
pub struct RowRep {
    pub depth: usize,
    pub expandable: bool,
    pub expanded: bool,
    /// Hidden by a collapsed ancestor; still materialized.
    pub hidden: bool,
    pub cells: Vec<CellContent>,
}

#[derive(Copy, Clone, PartialEq)]
enum Action {
    Expand,
    Collapse,
}

#[derive(Debug)]
pub struct TreeView<M: TreeViewModel> {
    model: M,
    columns: Vec<TreeViewColumn>,
    /// Per-column sort state, parallel to `columns`. `None` is unordered.
    sort_state: Vec<Option<SortOrder>>,
    reps: Vec<RowRep>,
    /// Display order of materialized representations (hidden ones included).
    order: Vec<RepId>,
    rows: BidiMap<M::Row, RepId>,
}

impl<M: TreeViewModel> TreeView<M> {
    pub fn new(model: M, columns: Vec<TreeViewColumn>) -> Result<Self, TreeViewError> {
        let sort_state = vec![None; columns.len()];
        let mut view = Self {
            model,
            columns,
            sort_state,
            reps: Vec::new(),
            order: Vec::new(),
            rows: BidiMap::new(),
        };
        view.reload()?;
        Ok(view)
    }

    pub fn columns(&self) -> &[TreeViewColumn] {
        &self.columns
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn sort_order(&self, column_id: &str) -> Option<SortOrder> {
        self.columns
            .iter()
            .position(|c| c.id == column_id)
            .and_then(|i| self.sort_state[i])
    }

    /// Representation for a materialized row, if any.
    pub fn rep_of(&self, row: &M::Row) -> Option<RepId> {
        self.rows.get_by_a(row).copied()
    }

    pub fn rep(&self, id: RepId) -> Option<&RowRep> {
        self.reps.get(id)
    }

    /// Count of materialized representations, hidden ones included.
    pub fn rep_count(&self) -> usize {
        self.reps.len()
    }

    /// Currently visible rows in display order.
    pub fn visible(&self) -> Vec<(M::Row, &RowRep)> {
        self.order
            .iter()
            .filter_map(|&id| {
                let rep = &self.reps[id];
                if rep.hidden {
                    return None;
                }
                let row = self.rows.get_by_b(&id)?;
                Some((row.clone(), rep))
            })
            .collect()
    }

    /// Drop every representation and materialize the root level afresh.
    pub fn reload(&mut self) -> Result<(), TreeViewError> {
        self.reps.clear();
        self.order.clear();
        self.rows.clear();

        for i in 0..self.model.child_count(None) {
            let Some(row) = self.model.child_at(i, None) else {
                continue;
            };
            let id = self.materialize(&row, 0)?;
            self.order.push(id);
        }
        Ok(())
    }

    fn materialize(&mut self, row: &M::Row, depth: usize) -> Result<RepId, TreeViewError> {
        let mut cells = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            cells.push(self.model.cell_content(row, column)?);
        }

        let id = self.reps.len();
        self.reps.push(RowRep {
            depth,
            expandable: self.model.child_count(Some(row)) > 0,
            expanded: false,
            hidden: false,
            cells,
        });
        self.rows.insert(row.clone(), id);
        Ok(id)
    }

    /// Flip a row's expanded state. Expanding reveals direct children,
    /// reusing any representation that already exists; collapsing hides the
    /// whole subtree and closes every descendant.
    pub fn toggle(&mut self, row: &M::Row) -> Result<(), TreeViewError> {
        let Some(id) = self.rep_of(row) else {
            return Ok(());
        };
        if !self.reps[id].expandable {
            return Ok(());
        }

        self.reps[id].expanded = !self.reps[id].expanded;
        let action = if self.reps[id].expanded {
            Action::Expand
        } else {
            Action::Collapse
        };
        self.apply_children(row, id, action)?;
        Ok(())
    }

    /// Walk a row's children applying `action`, returning the last-touched
    /// representation so the caller keeps inserting after the right spot.
    fn apply_children(
        &mut self,
        row: &M::Row,
        rep: RepId,
        action: Action,
    ) -> Result<RepId, TreeViewError> {
        let child_depth = self.reps[rep].depth + 1;
        let mut insert_after = rep;

        for i in 0..self.model.child_count(Some(row)) {
            let Some(child) = self.model.child_at(i, Some(row)) else {
                continue;
            };

            let child_rep = match self.rep_of(&child) {
                Some(existing) => existing,
                None => {
                    let id = self.materialize(&child, child_depth)?;
                    // insert_after is always materialized, so it is in order.
                    let pos = self.order.iter().position(|&r| r == insert_after).unwrap();
                    self.order.insert(pos + 1, id);
                    id
                }
            };
            insert_after = child_rep;

            match action {
                Action::Expand => {
                    self.reps[child_rep].hidden = false;
                }
                Action::Collapse => {
                    self.reps[child_rep].hidden = true;
                    self.reps[child_rep].expanded = false;
                    insert_after = self.apply_children(&child, child_rep, Action::Collapse)?;
                }
            }
        }

        Ok(insert_after)
    }

    /// Cycle a sortable column through unordered -> descending ->
    /// ascending -> unordered, reset every other column, re-sort the model
    /// and rebuild. Expansions are intentionally dropped: after a re-sort
    /// the model hands out different child identities at every level.
    pub fn toggle_sort(&mut self, column_id: &str) -> Result<(), TreeViewError> {
        if !self.model.supports_sort() {
            return Ok(());
        }
        let idx = self
            .columns
            .iter()
            .position(|c| c.id == column_id)
            .ok_or_else(|| TreeViewError::UnboundColumn(column_id.to_string()))?;
        if !self.columns[idx].is_sortable {
            return Ok(());
        }

        for (i, state) in self.sort_state.iter_mut().enumerate() {
            if i != idx {
                *state = None;
            }
        }
        self.sort_state[idx] = match self.sort_state[idx] {
            None => Some(SortOrder::Descending),
            Some(SortOrder::Descending) => Some(SortOrder::Ascending),
            Some(SortOrder::Ascending) => None,
        };

        let column = self.columns[idx].clone();
        self.model.sort(&column, self.sort_state[idx]);
        self.reload()
    }
}
