//! CLI for benchmarking and querying the flat index

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flatknn::harness::{run_benchmark, BenchConfig, BenchReport, SyntheticDataset};
use flatknn::{FlatIndex, IndexConfig, Metric, Vector};

#[derive(Parser)]
#[command(name = "flatbench")]
#[command(about = "Exact k-NN search benchmarks over synthetic data", long_about = None)]
struct Cli {
    /// Metric used to rank neighbors
    #[arg(long, value_enum, default_value = "l2", global = true)]
    metric: MetricArg,

    /// Worker threads per search batch (0 uses every CPU)
    #[arg(long, default_value = "1", global = true)]
    threads: usize,

    /// Seed for the synthetic dataset
    #[arg(long, default_value = "1234", global = true)]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum MetricArg {
    L2,
    Ip,
    Cosine,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::L2 => Metric::L2,
            MetricArg::Ip => Metric::InnerProduct,
            MetricArg::Cosine => Metric::Cosine,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Time batched searches over a grid of dimensions and k values
    Bench {
        /// Dimensions to sweep (e.g., "16,32,64,128")
        #[arg(long, value_delimiter = ',', default_value = "16,32,64,128")]
        dims: Vec<usize>,
        /// Database size
        #[arg(long, default_value = "10000")]
        nb: usize,
        /// Queries per batch
        #[arg(long, default_value = "100")]
        nq: usize,
        /// Values of k to sweep
        #[arg(long, value_delimiter = ',', default_value = "1,10,100")]
        ks: Vec<usize>,
        /// Timed repetitions per (d, k); the first fifth is warmup
        #[arg(long, default_value = "10")]
        runs: usize,
        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Search a synthetic database for one query vector
    Query {
        /// Query vector as comma-separated values (e.g., "0.1,0.2,0.3")
        query: String,
        /// Database size
        #[arg(long, default_value = "10000")]
        nb: usize,
        /// Number of results to return
        #[arg(short, long, default_value = "5")]
        k: usize,
    },
}

fn print_table(report: &BenchReport) {
    let mut current_d = None;
    for row in &report.rows {
        if current_d != Some(row.d) {
            println!("========== d= {}", row.d);
            current_d = Some(row.d);
        }
        println!(
            "search k={:3} t={:.3} ms (± {:.4})",
            row.k, row.timing.mean_ms, row.timing.std_ms
        );
    }

    println!("restab=");
    for line in report.mean_matrix() {
        let cells: Vec<String> = line.iter().map(|v| format!("{v:.4}")).collect();
        println!("{}", cells.join("\t"));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let metric = Metric::from(cli.metric);

    match cli.command {
        Commands::Bench {
            dims,
            nb,
            nq,
            ks,
            runs,
            json,
        } => {
            let config = BenchConfig {
                dims,
                nb,
                nq,
                ks,
                runs,
                threads: cli.threads,
                metric,
                seed: cli.seed,
            };
            info!(nq = config.nq, nb = config.nb, runs = config.runs, "starting sweep");
            let report = run_benchmark(&config).context("benchmark failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_table(&report);
            }
        }
        Commands::Query { query, nb, k } => {
            let q: Vector = query.parse()?;
            let d = q.dimension();
            ensure!(d > 0, "query vector is empty");

            let ds = SyntheticDataset::new(d, nb, 0, cli.seed);
            let config = IndexConfig::with_auto_threads(cli.threads);
            let mut index = FlatIndex::with_config(d, metric, config)?;
            index.add(ds.database())?;

            let results = index.search(&[q], k)?;
            let hits = &results[0];
            if hits.is_empty() {
                println!("No results found (index is empty)");
            } else {
                println!("Top {} results:", hits.len());
                for (i, hit) in hits.iter().enumerate() {
                    println!("{}. id {} (distance: {:.4})", i + 1, hit.id, hit.distance);
                }
            }
        }
    }
    Ok(())
}
