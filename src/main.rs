//! amlgraph command line.

use amlgraph::config::{LoaderKind, PipelineConfig};
use amlgraph::core::SplitName;
use amlgraph::dataset::load_aml_world;
use amlgraph::ledger::Ledger;
use amlgraph::monitoring::{self, LogLevel, LoggerConfig};
use amlgraph::pipeline::{self, SplitData};
use amlgraph::split::SplitRatios;
use amlgraph::synthetic::SyntheticLedger;
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "amlgraph")]
#[command(about = "Temporal train/val/test graphs from transaction ledgers", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split, materialize and cache a ledger, then load the splits
    Prepare(PrepareArgs),

    /// Print the chosen day split without materializing anything
    Split {
        /// Transaction ledger (CSV)
        #[arg(short, long, env = "AMLGRAPH_DATA")]
        data: PathBuf,

        /// Train, val and test ratios
        #[arg(long, num_args = 3, value_names = ["TRAIN", "VAL", "TEST"])]
        ratios: Option<Vec<f64>>,
    },

    /// Write a synthetic ledger
    Synth {
        /// Output CSV path
        #[arg(short, long)]
        out: PathBuf,

        /// Number of days
        #[arg(long, default_value_t = 10)]
        days: usize,

        /// Transactions per day
        #[arg(long, default_value_t = 1000)]
        per_day: usize,

        /// Number of accounts
        #[arg(long, default_value_t = 500)]
        accounts: u64,

        /// Probability of a transaction being illicit
        #[arg(long, default_value_t = 0.05)]
        illicit_rate: f64,

        /// Random seed (defaults to the config file's `seed`)
        #[arg(long)]
        seed: Option<u64>,

        /// JSON config file supplying the seed
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct PrepareArgs {
    /// Transaction ledger (CSV)
    #[arg(short, long, env = "AMLGRAPH_DATA")]
    data: Option<PathBuf>,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build graphs with reverse relations
    #[arg(long)]
    reverse_mp: bool,

    /// Do not append port numberings to edge attributes
    #[arg(long)]
    no_ports: bool,

    /// Loader producing the splits
    #[arg(long, value_enum)]
    loader: Option<LoaderArg>,

    /// Dataset root for the aml-world loader
    #[arg(long)]
    root: Option<PathBuf>,

    /// Directory for cache artifacts
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LoaderArg {
    Ledger,
    AmlWorld,
}

impl From<LoaderArg> for LoaderKind {
    fn from(arg: LoaderArg) -> Self {
        match arg {
            LoaderArg::Ledger => LoaderKind::Ledger,
            LoaderArg::AmlWorld => LoaderKind::AmlWorld,
        }
    }
}

impl PrepareArgs {
    /// File config (or defaults) with flag overrides applied.
    fn into_config(self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(data) = self.data {
            config.data = Some(data);
        }
        if let Some(root) = self.root {
            config.root = Some(root);
        }
        if let Some(loader) = self.loader {
            config.loader = loader.into();
        }
        if let Some(dir) = self.out_dir {
            config.out_dir = Some(dir);
        }
        if self.reverse_mp {
            config.reverse_mp = true;
        }
        if self.no_ports {
            config.ports = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    monitoring::init(&LoggerConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        log_file: cli.log_file,
        ..Default::default()
    })?;

    match cli.command {
        Commands::Prepare(args) => {
            let config = args.into_config()?;
            let start = Instant::now();
            let data = match config.loader {
                LoaderKind::Ledger => {
                    let path = config.data_path()?.display().to_string();
                    pipeline::get_data(&config)
                        .with_context(|| format!("failed to prepare {}", path))?
                }
                LoaderKind::AmlWorld => {
                    load_aml_world(&config).context("failed to load AMLworld dataset")?
                }
            };
            info!("Retrieved data in {:.2}s", start.elapsed().as_secs_f64());
            print_summary(&data);
        }
        Commands::Split { data, ratios } => {
            let ratios = match ratios.as_deref() {
                Some(&[train, val, test]) => SplitRatios::new(train, val, test)?,
                _ => SplitRatios::default(),
            };
            let ledger = Ledger::load(&data)
                .with_context(|| format!("failed to load {}", data.display()))?;
            ledger.log_stats();

            let (bins, plan) = pipeline::plan_split(&ledger, &ratios)?;
            println!("days: {}, transactions: {}", bins.n_days(), bins.total());
            println!("i = {}, j = {}, score = {:.4}", plan.i, plan.j, plan.score);
            for ((split, days), total) in SplitName::ALL.iter().zip(plan.days()).zip(plan.totals) {
                println!(
                    "{:>5}: {:>10} transactions ({:.2}%), days {:?}",
                    split,
                    total,
                    total as f64 / bins.total() as f64 * 100.0,
                    days
                );
            }
        }
        Commands::Synth {
            out,
            days,
            per_day,
            accounts,
            illicit_rate,
            seed,
            config,
        } => {
            let seed = synth_seed(seed, config.as_deref())?;
            let rows = SyntheticLedger::uniform(days, per_day)
                .with_accounts(accounts)
                .with_illicit_rate(illicit_rate)
                .with_seed(seed)
                .write_csv(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("wrote {} transactions to {}", rows, out.display());
        }
    }

    Ok(())
}

/// Seed from the flag, else from the config file, else the config default.
fn synth_seed(seed: Option<u64>, config: Option<&Path>) -> anyhow::Result<u64> {
    match (seed, config) {
        (Some(seed), _) => Ok(seed),
        (None, Some(path)) => Ok(PipelineConfig::from_file(path)?.seed),
        (None, None) => Ok(PipelineConfig::default().seed),
    }
}

fn print_summary(data: &SplitData) {
    for split in SplitName::ALL {
        let graph = data.graph(split);
        let illicit = graph.labels().iter().filter(|&&y| y == 1).count();
        let edges = graph.num_edges().max(1);
        println!(
            "{:>5}: {} nodes, {} edges, {} = {} edges, illicit {:.2}%",
            split,
            graph.num_nodes(),
            graph.num_edges(),
            split.index_attr(),
            data.inds(split).len(),
            illicit as f64 / edges as f64 * 100.0
        );
    }
}
