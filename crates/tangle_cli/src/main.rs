//! TANGLE CLI
//!
//! Generate or load an instance space, execute it repeatedly with
//! randomized start choices, and write the run artifacts: the space
//! document, the dependency graph source, and a markdown report.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::Result;

use tangle_exec::RunReport;
use tangle_sim::{GenConfig, Harness, HarnessConfig, Seed, gen_space};
use tangle_space::Space;

#[derive(Parser)]
#[command(name = "tangle")]
#[command(about = "Deterministic execution of interfering instance graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random instance space, run it, and write a report
    Gen {
        /// Number of instances to generate
        #[arg(long, default_value_t = 10)]
        instances: usize,
        /// Base seed for generation and start choices
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of runs
        #[arg(long, default_value_t = 10)]
        runs: usize,
        /// Output directory
        #[arg(short, long, default_value = "local-min-rst")]
        out: PathBuf,
    },
    /// Load a dumped instance space and re-run it
    Run {
        /// Path to a space document
        #[arg(short, long)]
        file: PathBuf,
        /// Base seed for start choices
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of runs
        #[arg(long, default_value_t = 10)]
        runs: usize,
        /// Output directory
        #[arg(short, long, default_value = "local-min-rst")]
        out: PathBuf,
    },
    /// Print the dependency graph as Graphviz source
    Dot {
        /// Path to a space document
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Gen {
            instances,
            seed,
            runs,
            out,
        } => {
            let seed = Seed::from_literal(seed);
            let cfg = GenConfig::new().with_instances(instances);
            let space = gen_space(&mut seed.derive("space").rng(), &cfg)?;
            execute_and_report(&space, runs, seed, &out)
        }
        Commands::Run {
            file,
            seed,
            runs,
            out,
        } => {
            let space = load_space(&file)?;
            execute_and_report(&space, runs, Seed::from_literal(seed), &out)
        }
        Commands::Dot { file } => {
            let space = load_space(&file)?;
            print!("{}", space.to_dot());
            Ok(())
        }
    }
}

fn load_space(file: &Path) -> Result<Space> {
    let text = fs::read_to_string(file)?;
    Ok(Space::from_json(&text)?)
}

fn execute_and_report(space: &Space, runs: usize, seed: Seed, out: &Path) -> Result<()> {
    let initial = space.initial_store()?;
    let harness = Harness::new(HarnessConfig::new(seed).with_runs(runs));
    let output = harness.run(space, &initial)?;

    for run in &output.report.runs {
        println!(
            "result: {} exec sequence: [{}]",
            run.final_state,
            join_order(&run.order)
        );
    }

    fs::create_dir_all(out)?;
    fs::write(out.join("instance_space.json"), space.to_json()?)?;
    fs::write(out.join("dep_graph.dot"), space.to_dot())?;
    fs::write(out.join("report.md"), render_report(space, &output.report)?)?;

    if output.report.is_consistent() {
        println!("a detailed report is in {}", out.join("report.md").display());
    } else {
        println!(
            "inconsistent result found! see {}",
            out.join("report.md").display()
        );
    }
    Ok(())
}

fn join_order(order: &[tangle_core::InstanceId]) -> String {
    order
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_report(space: &Space, report: &RunReport) -> Result<String> {
    use std::fmt::Write;

    let mut md = String::new();
    writeln!(md, "# Instance execution report")?;
    writeln!(md)?;
    writeln!(md, "To re-run: `tangle run --file instance_space.json`")?;
    writeln!(md)?;
    writeln!(md, "## Instance space")?;
    writeln!(md)?;
    writeln!(md, "```json")?;
    writeln!(md, "{}", space.to_json()?)?;
    writeln!(md, "```")?;
    writeln!(md)?;
    writeln!(md, "Graph source: `dep_graph.dot`, render with `dot -Tjpg`")?;
    writeln!(md)?;
    writeln!(md, "## Executions")?;
    writeln!(md)?;
    writeln!(md, "Initial store `{}`", report.initial)?;
    writeln!(md)?;
    if let Some(first) = report.first_final() {
        writeln!(md, "Execution result `{}`", first)?;
        writeln!(md)?;
    }
    writeln!(md, "Execution sequences:")?;
    writeln!(md)?;
    writeln!(md, "```")?;
    for (i, run) in report.runs.iter().enumerate() {
        writeln!(md, "{:>02}-th: [{}]", i, join_order(&run.order))?;
        if report
            .first_final()
            .is_some_and(|first| run.final_state != *first)
        {
            writeln!(md, "inconsistent result: {}", run.final_state)?;
        }
    }
    writeln!(md, "```")?;
    Ok(md)
}
