//! arap2d CLI - deform 2D rigs from the command line.
//!
//! Usage: arap2d <COMMAND> [OPTIONS]
//!
//! Run `arap2d --help` for available commands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use nalgebra::{Point2, Rotation2};
use tracing::info;
use tracing_subscriber::EnvFilter;

use arap2d::algo::arap::{ArapOptions, ArapSolver, LinearSolver};
use arap2d::io::{self, Animation, Rig};
use arap2d::mesh::{generators, Topology};

#[derive(Parser)]
#[command(name = "arap2d")]
#[command(author, version, about = "As-rigid-as-possible 2D deformation CLI", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display rig information
    Info {
        /// Input rig file
        input: PathBuf,
    },

    /// Solve every frame of a rig and write the animation
    Deform {
        /// Input rig file
        input: PathBuf,

        /// Output animation file
        output: PathBuf,

        /// Weight of the pin constraints
        #[arg(short = 'w', long, default_value = "1000.0")]
        pin_weight: f64,

        /// Use conjugate gradient instead of a Cholesky factorization
        #[arg(long)]
        iterative: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Write a demo rig: a grid whose top bends over its fixed bottom
    Demo {
        /// Output rig file
        output: PathBuf,

        /// Number of cells along x
        #[arg(long, default_value = "8")]
        nx: usize,

        /// Number of cells along y
        #[arg(long, default_value = "16")]
        ny: usize,

        /// Number of animation frames
        #[arg(short, long, default_value = "30")]
        frames: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Deform {
            input,
            output,
            pin_weight,
            iterative,
            sequential,
        } => {
            cmd_deform(&input, &output, pin_weight, iterative, sequential)?;
        }

        Commands::Demo {
            output,
            nx,
            ny,
            frames,
        } => {
            cmd_demo(&output, nx, ny, frames)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rig = io::load_rig(input)?;
    let mesh = rig.mesh()?;
    let topology = Topology::new(&mesh);

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Triangles: {}", mesh.num_triangles());
    println!("Directed edges: {}", topology.num_edges());
    println!("Boundary edges: {}", topology.boundary_edge_count());
    println!("Pins: {}", rig.pins.len());
    println!("Frames: {}", rig.num_frames());

    if let Some((lo, hi)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}) to ({:.3}, {:.3})",
            lo.x, lo.y, hi.x, hi.y
        );
    }

    let centroid = mesh.centroid();
    println!("Centroid: ({:.3}, {:.3})", centroid.x, centroid.y);

    let area: f64 = (0..mesh.num_triangles()).map(|t| mesh.triangle_area(t)).sum();
    println!("Signed area: {:.6}", area);

    Ok(())
}

fn cmd_deform(
    input: &Path,
    output: &Path,
    pin_weight: f64,
    iterative: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rig = io::load_rig(input)?;
    let mesh = rig.mesh()?;
    println!(
        "Loaded: {} vertices, {} triangles, {} pins, {} frames",
        mesh.num_vertices(),
        mesh.num_triangles(),
        rig.pins.len(),
        rig.num_frames()
    );

    let linear_solver = if iterative {
        LinearSolver::iterative()
    } else {
        LinearSolver::Cholesky
    };
    let options = ArapOptions::default()
        .with_pin_weight(pin_weight)
        .with_linear_solver(linear_solver)
        .with_parallel(!sequential);

    let start = Instant::now();
    let solver = ArapSolver::from_mesh(mesh, &rig.pins, &options)?;
    let setup = start.elapsed();

    let start = Instant::now();
    let frames = solver.solve_batch(&rig.targets())?;
    let solve = start.elapsed();
    info!("Solved {} frames", frames.len());

    let animation = Animation::from_frames(solver.mesh(), &frames);
    io::save_animation(&animation, output)?;

    println!("Setup: {:.2?}, solve: {:.2?}", setup, solve);
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_demo(
    output: &Path,
    nx: usize,
    ny: usize,
    frames: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let width = 1.0;
    let height = ny as f64 / nx.max(1) as f64;
    let mesh = generators::grid(nx, ny, width, height)?;

    // Bottom and top corners
    let top = ny * (nx + 1);
    let pins = vec![0, nx, top, top + nx];
    let mut rig = Rig::from_mesh(&mesh, pins.clone());

    let rest: Vec<Point2<f64>> = pins.iter().map(|&v| mesh.position(v)).collect();
    let pivot = Point2::new(0.5 * width, 0.0);
    for f in 0..frames {
        let t = f as f64 / frames.saturating_sub(1).max(1) as f64;
        let bend = Rotation2::new(std::f64::consts::FRAC_PI_2 * t);

        let mut targets = rest.clone();
        for target in &mut targets[2..] {
            *target = pivot + bend * (*target - pivot);
        }
        rig.push_frame(&targets);
    }

    io::save_rig(&rig, output)?;
    println!(
        "Saved: {} ({} vertices, {} frames)",
        output.display(),
        mesh.num_vertices(),
        frames
    );

    Ok(())
}
