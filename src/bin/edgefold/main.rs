//! Edgefold CLI - mesh simplification command-line tool.
//!
//! Usage: edgefold <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `edgefold --help` for available commands. Set `RUST_LOG` (or pass
//! `--verbose`) to see what the engine is doing.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use edgefold::algo::decimate::{self, MissingPlacement};
use edgefold::algo::Progress;
use edgefold::io;
use edgefold::mesh::HalfEdgeMesh;

#[derive(Parser)]
#[command(name = "edgefold")]
#[command(author, version, about = "Edge-collapse mesh simplification", long_about = None)]
struct Cli {
    /// Log engine decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Simplify a mesh by collapsing edges
    Simplify {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Target number of edges
        #[arg(short, long, conflicts_with = "ratio")]
        edges: Option<usize>,

        /// Target ratio of edges to keep (0.0 to 1.0)
        #[arg(short, long, default_value = "0.5")]
        ratio: f64,

        /// Keep every border vertex in place
        #[arg(long)]
        preserve_boundary: bool,

        /// Never collapse edges whose squared length exceeds this value
        #[arg(long)]
        max_cost: Option<f64>,

        /// Collapse edges without a placement, keeping the source vertex where it is
        #[arg(long)]
        keep_source_on_missing_placement: bool,

        /// Print per-edge statistics of the run
        #[arg(long)]
        stats: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Simplify {
            input,
            output,
            edges,
            ratio,
            preserve_boundary,
            max_cost,
            keep_source_on_missing_placement,
            stats,
        } => {
            let mut options = match edges {
                Some(target) => decimate::DecimateOptions::with_target_edges(target),
                None => decimate::DecimateOptions::with_target_ratio(ratio),
            }
            .with_preserve_boundary(preserve_boundary);
            if let Some(max_cost) = max_cost {
                options = options.with_max_cost(max_cost);
            }
            if keep_source_on_missing_placement {
                options = options.with_missing_placement(MissingPlacement::KeepSource);
            }

            cmd_simplify(&input, &output, &options, stats)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only redraw when the bar advances.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }
        let percent = raw_percent.max(previous);

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {:<20}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            message
        );
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Surface area: {:.6}", mesh.surface_area());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    let edge_count = mesh.num_edges().max(1) as f64;
    let avg_edge: f64 = mesh
        .edge_ids()
        .map(|e| mesh.edge_length(e.halfedge(0)))
        .sum::<f64>()
        / edge_count;
    println!("Average edge length: {:.6}", avg_edge);

    let boundary_verts = mesh
        .vertex_ids()
        .filter(|&v| mesh.is_boundary_vertex(v))
        .count();
    if boundary_verts == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary vertices)", boundary_verts);
    }
    println!("Euler characteristic: {}", mesh.euler_characteristic());
    println!("Valid: {}", mesh.is_valid());

    Ok(())
}

fn cmd_simplify(
    input: &PathBuf,
    output: &PathBuf,
    options: &decimate::DecimateOptions,
    show_stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: HalfEdgeMesh = io::load(input)?;

    println!(
        "Loaded: {} vertices, {} edges, {} faces",
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_faces()
    );
    println!(
        "Simplifying to {} edges...",
        options.compute_target(mesh.num_edges())
    );

    let progress = create_progress();

    let start = Instant::now();
    let result = decimate::decimate_with_progress(&mut mesh, options, &progress)?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} vertices, {} edges, {} faces ({} edges removed, {:?})",
        mesh.num_vertices(),
        result.final_edges,
        mesh.num_faces(),
        result.removed_edges,
        result.state
    );
    println!("Valid: {}", mesh.is_valid());
    if show_stats {
        println!("{}", result.stats);
    }

    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
