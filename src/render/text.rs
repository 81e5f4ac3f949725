//! Plain-text table rendering driven through the tree view engine.

use crate::view::tree::{TreeView, TreeViewError, TreeViewModel};

const INDENT: &str = "  ";

/// Expand the view down to `max_depth` (root rows are depth 0; `None`
/// expands everything), then lay the visible rows out as an aligned table.
pub fn render_tree_text<M: TreeViewModel>(
    view: &mut TreeView<M>,
    max_depth: Option<usize>,
) -> Result<String, TreeViewError> {
    expand_to_depth(view, max_depth)?;

    let columns = view.columns().to_vec();
    let expander_idx = columns.iter().position(|c| c.holds_expander).unwrap_or(0);

    let mut table: Vec<Vec<String>> = Vec::new();
    table.push(columns.iter().map(|c| c.title.to_string()).collect());

    for (_, rep) in view.visible() {
        let mut cells: Vec<String> = rep.cells.iter().map(|c| c.plain_text()).collect();
        cells[expander_idx] =
            format!("{}{}", INDENT.repeat(rep.depth), cells[expander_idx]);
        table.push(cells);
    }

    let mut widths = vec![0usize; columns.len()];
    for row in &table {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &table {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            let pad = widths[i] - cell.chars().count();
            line.extend(std::iter::repeat_n(' ', pad));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    Ok(out)
}

fn expand_to_depth<M: TreeViewModel>(
    view: &mut TreeView<M>,
    max_depth: Option<usize>,
) -> Result<(), TreeViewError> {
    loop {
        let to_expand: Vec<M::Row> = view
            .visible()
            .into_iter()
            .filter(|(_, rep)| {
                rep.expandable
                    && !rep.expanded
                    && max_depth.is_none_or(|limit| rep.depth < limit)
            })
            .map(|(row, _)| row)
            .collect();
        if to_expand.is_empty() {
            return Ok(());
        }
        for row in to_expand {
            view.toggle(&row)?;
        }
    }
}
