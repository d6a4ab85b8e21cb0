//! CLI for the Take-Grant `can_share` analyzer.
//!
//! Pipeline: load graph document -> build protection graph -> decide -> report.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use takegrant_analyzer::{
    check_path, initially_spans, terminally_spans, DeciderConfig, ShareDecider, ShareReport,
};
use takegrant_loader::{chain, ChainLink, GraphDocument, GraphSource, JsonFileSource};

#[derive(Parser, Debug)]
#[command(name = "takegrant", version, about = "Take-Grant protection model analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide whether `from` can acquire `right` over `to`.
    Check {
        #[arg(short, long, env = "TAKEGRANT_GRAPH")]
        graph: PathBuf,

        #[arg(short, long)]
        right: String,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(long, default_value_t = false)]
        json: bool,

        /// Threads for the bridge search; defaults to one per core.
        #[arg(short, long, env = "TAKEGRANT_WORKERS")]
        workers: Option<usize>,
    },

    /// Print the initial span of a node, or the terminal span of a node set.
    Spans {
        #[arg(short, long, env = "TAKEGRANT_GRAPH")]
        graph: PathBuf,

        #[arg(short, long, required = true, num_args = 1..)]
        node: Vec<String>,

        #[arg(long, default_value_t = false)]
        terminal: bool,
    },

    /// Check an explicit path given as `from,to,edge` steps.
    Path {
        #[arg(short, long, env = "TAKEGRANT_GRAPH")]
        graph: PathBuf,

        #[arg(short, long = "step", required = true, num_args = 1..)]
        steps: Vec<String>,
    },

    /// Write a graph made of `length` linked copies of a document.
    Chain {
        #[arg(short, long, env = "TAKEGRANT_GRAPH")]
        graph: PathBuf,

        #[arg(short, long)]
        length: usize,

        #[arg(long, default_value = "7")]
        link_from: String,

        #[arg(long, default_value = "1")]
        link_to: String,

        /// Output file; stdout when absent.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            graph,
            right,
            from,
            to,
            json,
            workers,
        } => {
            let decider = ShareDecider::new(DeciderConfig { workers })?;
            let graph = JsonFileSource::new(graph).load()?;

            tracing::info!(%right, %from, %to, workers = decider.workers(), "checking");
            let t0 = Instant::now();
            let decision = decider.decide(&graph, &right, &from, &to)?;
            let elapsed = t0.elapsed();
            tracing::info!(
                outcome = %decision.outcome,
                verdict = ?decision.verdict,
                elapsed_us = elapsed.as_micros(),
                "decided"
            );

            let report = ShareReport::build(&graph, &right, &from, &to, &decision, elapsed);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }

        Commands::Spans {
            graph,
            node,
            terminal,
        } => {
            let graph = JsonFileSource::new(graph).load()?;
            let span = if terminal {
                terminally_spans(&graph, node.iter().map(String::as_str))?
            } else {
                let [x] = node.as_slice() else {
                    return Err("initial span takes exactly one --node".into());
                };
                initially_spans(&graph, x)?
            };
            let members: Vec<&str> = span.iter().map(|id| id.as_str()).collect();
            println!("{}", members.join(" "));
        }

        Commands::Path { graph, steps } => {
            let graph = JsonFileSource::new(graph).load()?;
            let parsed = steps
                .iter()
                .map(|raw| match raw.split(',').collect::<Vec<_>>().as_slice() {
                    [from, to, edge] => Ok((*from, *to, *edge)),
                    _ => Err(format!("step must be from,to,edge: {raw}")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", check_path(&graph, &parsed)?);
        }

        Commands::Chain {
            graph,
            length,
            link_from,
            link_to,
            out,
        } => {
            let base = GraphDocument::from_path(&graph)?;
            let link = ChainLink {
                from: link_from,
                to: link_to,
            };
            let doc = chain(&base, length, &link)?;
            tracing::info!(
                length,
                nodes = doc.graph.nodes.len(),
                edges = doc.graph.edges.len(),
                "chain built"
            );

            match out {
                Some(path) => {
                    let file = std::fs::File::create(&path)?;
                    doc.to_writer_pretty(std::io::BufWriter::new(file))?;
                    tracing::info!(path = %path.display(), "chain written");
                }
                None => {
                    doc.to_writer_pretty(std::io::stdout().lock())?;
                    println!();
                }
            }
        }
    }

    Ok(())
}
