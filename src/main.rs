use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

mod decode;
mod flame;
mod fmt;
mod model;
mod render;
mod view;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "optree-profile-viz")]
#[command(about = "Operator trace profile visualizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a binary profile and write a self-contained HTML report.
    Report {
        #[arg(long)]
        profile: String,

        #[arg(short = 'o', long)]
        out: String,
    },

    /// Decode a binary profile and print the operator tree as a table.
    Tree {
        #[arg(long)]
        profile: String,

        /// Sort rows by this column at every tree level.
        #[arg(long)]
        sort: Option<SortColumn>,

        #[arg(long, default_value = "desc")]
        order: Order,

        /// Deepest level to reveal (root rows are level 0). Default: all.
        #[arg(long)]
        depth: Option<usize>,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum SortColumn {
    Count,
    Duration,
}

impl SortColumn {
    fn id(self) -> &'static str {
        match self {
            SortColumn::Count => "count",
            SortColumn::Duration => "duration",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Order {
    Desc,
    Asc,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report { profile, out } => {
            let bytes = std::fs::read(&profile)
                .with_context(|| format!("read profile file {}", profile))?;
            let root = decode::decode_profile(&bytes)
                .with_context(|| format!("decode profile {}", profile))?;

            let html = render::render_html_report(&root)?;
            std::fs::write(&out, html)?;
            println!("Wrote {}", out);
        }

        Commands::Tree {
            profile,
            sort,
            order,
            depth,
        } => {
            let bytes = std::fs::read(&profile)
                .with_context(|| format!("read profile file {}", profile))?;
            let root = decode::decode_profile(&bytes)
                .with_context(|| format!("decode profile {}", profile))?;

            let model = view::OpNodeTreeModel::new(root);
            let mut tree = view::TreeView::new(model, view::op_node_columns())?;

            if let Some(col) = sort {
                // One toggle lands on descending, a second on ascending.
                tree.toggle_sort(col.id())?;
                if order == Order::Asc {
                    tree.toggle_sort(col.id())?;
                }
            }

            let text = render::render_tree_text(&mut tree, depth)?;
            print!("{}", text);
        }
    }

    Ok(())
}
