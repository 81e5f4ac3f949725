//! Self-contained HTML report: flame graph plus expandable operator table.
//!
//! The decoded tree is embedded as JSON and the page's script does the
//! interactive parts; the numbers are formatted here so the page and the
//! terminal output agree.
//!
//! Important: we avoid `format!()` because the HTML contains many `{}` from
//! JS template literals (e.g., `${x}`), which would conflict with Rust
//! formatting.

use crate::flame::{FlameNode, to_flame_graph};
use crate::fmt::{format_duration, format_scaled, group_thousands};
use crate::model::OpNode;
use serde::Serialize;

#[derive(Serialize)]
struct ProfileJson {
    title: String,
    tree: TreeJson,
    flame: FlameNode,
}

/// One table row worth of data: display strings precomputed, raw values
/// kept for client-side sorting.
#[derive(Serialize)]
struct TreeJson {
    name: String,
    schema: Option<String>,
    count: u32,
    count_text: String,
    duration_ns: u64,
    duration_text: String,
    children: Vec<TreeJson>,
}

fn to_tree_json(node: &OpNode) -> TreeJson {
    let duration_text = match format_duration(node.cuml_total_duration_ns) {
        Some((value, unit)) => {
            let mut s = format_scaled(value);
            s.push_str(unit);
            s
        }
        None => String::new(),
    };
    TreeJson {
        name: node.op.name.clone(),
        schema: node.op.schema.clone(),
        count: node.invocation_count,
        count_text: group_thousands(u64::from(node.invocation_count)),
        duration_ns: node.cuml_total_duration_ns,
        duration_text,
        children: node.children.iter().map(|c| to_tree_json(c)).collect(),
    }
}

pub fn render_html_report(root: &OpNode) -> anyhow::Result<String> {
    let data = ProfileJson {
        title: root.op.name.clone(),
        tree: to_tree_json(root),
        flame: to_flame_graph(root),
    };
    let json = serde_json::to_string(&data)?; // embedded as JS object literal

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Operator Trace Profile</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  .main { padding: 12px 16px; }

  #flame { position: relative; margin: 8px 0 16px 0; }
  .frame { position: absolute; height: 16px; overflow: hidden; white-space: nowrap;
           font-size: 11px; line-height: 16px; padding-left: 2px; box-sizing: border-box;
           border: 1px solid rgba(255,255,255,0.6); border-radius: 2px; cursor: default; }

  table { border-collapse: collapse; width: 100%; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { position: sticky; top: 0; background: white; border-bottom: 1px solid #ddd; }
  th.sortable { cursor: pointer; user-select: none; }
  th.sort-desc::after { content: " \25BE"; }
  th.sort-asc::after { content: " \25B4"; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
  .indent { display: inline-block; width: 16px; }
  .toggle { display: inline-block; width: 16px; text-align: center; color: #666; cursor: pointer; }
  .unit { color: #777; margin-left: 2px; }
  code { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; }
</style>
</head>
<body>
<header><h1 id="title"></h1></header>

<div class="main">
  <div id="flame"></div>

  <table>
    <thead>
      <tr>
        <th>Name</th>
        <th class="num sortable" data-col="count">Count</th>
        <th class="num sortable" data-col="duration">Duration</th>
        <th>Operator Schema</th>
      </tr>
    </thead>
    <tbody id="rows"></tbody>
  </table>
</div>

<script>
// Embedded profile data (JSON object literal)
const DATA = __DATA__;

const state = {
  expanded: new Set(),
  sortCol: null,
  sortOrder: null
};

document.getElementById("title").textContent = DATA.title;

function frameColor(name) {
  let h = 0;
  for (const ch of name) h = (h * 31 + ch.codePointAt(0)) >>> 0;
  return `hsl(${h % 50 + 10}, 80%, ${60 + h % 20}%)`;
}

function renderFlame() {
  const container = document.getElementById("flame");
  container.innerHTML = "";
  const rowH = 17;
  let maxDepth = 0;

  function frame(node, left, width, depth) {
    maxDepth = Math.max(maxDepth, depth);
    const div = document.createElement("div");
    div.className = "frame";
    div.style.left = left + "%";
    div.style.width = width + "%";
    div.style.top = (depth * rowH) + "px";
    div.style.background = frameColor(node.name);
    div.textContent = node.name;
    div.title = node.tooltip;
    container.appendChild(div);

    let childLeft = left;
    for (const child of node.children || []) {
      const childWidth = node.value > 0 ? width * child.value / node.value : 0;
      frame(child, childLeft, childWidth, depth + 1);
      childLeft += childWidth;
    }
  }

  frame(DATA.flame, 0, 100, 0);
  container.style.height = ((maxDepth + 1) * rowH) + "px";
}

function sortedChildren(node) {
  if (!state.sortCol || !state.sortOrder) return node.children;
  const key = state.sortCol === "count"
    ? (n => n.count)
    : (n => n.duration_ns);
  const sign = state.sortOrder === "desc" ? -1 : 1;
  return [...node.children].sort((a, b) => sign * (key(a) - key(b)));
}

function renderTable() {
  const body = document.getElementById("rows");
  body.innerHTML = "";

  function renderSubtree(node, id, depth) {
    const hasKids = node.children && node.children.length > 0;
    const isExpanded = state.expanded.has(id);

    const tr = document.createElement("tr");

    const nameTd = document.createElement("td");
    for (let d = 0; d < depth; d++) {
      const span = document.createElement("span");
      span.className = "indent";
      nameTd.appendChild(span);
    }
    const toggle = document.createElement("span");
    toggle.className = "toggle";
    toggle.textContent = hasKids ? (isExpanded ? "▾" : "▸") : " ";
    toggle.onclick = () => {
      if (!hasKids) return;
      if (isExpanded) state.expanded.delete(id);
      else state.expanded.add(id);
      renderTable();
    };
    nameTd.appendChild(toggle);
    nameTd.appendChild(document.createTextNode(node.name));
    tr.appendChild(nameTd);

    const countTd = document.createElement("td");
    countTd.className = "num";
    countTd.textContent = node.count_text;
    tr.appendChild(countTd);

    const durationTd = document.createElement("td");
    durationTd.className = "num";
    durationTd.textContent = node.duration_text;
    tr.appendChild(durationTd);

    const schemaTd = document.createElement("td");
    if (node.schema) {
      const code = document.createElement("code");
      code.textContent = node.schema;
      schemaTd.appendChild(code);
    }
    tr.appendChild(schemaTd);

    body.appendChild(tr);

    if (hasKids && isExpanded) {
      sortedChildren(node).forEach((child, i) => {
        renderSubtree(child, id + "." + i, depth + 1);
      });
    }
  }

  sortedChildren(DATA.tree).forEach((child, i) => renderSubtree(child, "r" + i, 0));
}

for (const th of document.querySelectorAll("th.sortable")) {
  th.onclick = () => {
    const col = th.dataset.col;
    if (state.sortCol !== col) {
      state.sortCol = col;
      state.sortOrder = "desc";
    } else if (state.sortOrder === "desc") {
      state.sortOrder = "asc";
    } else {
      state.sortCol = null;
      state.sortOrder = null;
    }
    for (const other of document.querySelectorAll("th.sortable")) {
      other.classList.remove("sort-desc", "sort-asc");
    }
    if (state.sortOrder) th.classList.add("sort-" + state.sortOrder);
    // Sorting reorders every level; stale expansions are dropped.
    state.expanded.clear();
    renderTable();
  };
}

renderFlame();
renderTable();
</script>
</body>
</html>
"#;

    Ok(TEMPLATE.replace("__DATA__", &json))
}
