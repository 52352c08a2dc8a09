use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use sigwarp_dtw::{CostMethod, Dtw, LookFor, Variant, WindowConfig, WindowCost};
use sigwarp_io::{ExperimentName, PairCost, ResultWriter, SignalPair, SignalReader, SignalTable};

#[derive(Parser)]
#[command(name = "sigwarp")]
#[command(about = "Dynamic time warping alignment costs between paired physiological signals")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel window computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Parameters shared by every alignment command.
#[derive(Args, Debug, Clone)]
struct AlignmentArgs {
    /// Signal pairs to align, as X:Y column names (repeatable)
    #[arg(long = "pair", required = true)]
    pairs: Vec<String>,

    /// Alignment cost method: "d-method", "td-method" or "c-method"
    #[arg(long, default_value = "d-method")]
    method: String,

    /// Align Keogh-Pazzani derivatives instead of raw samples (derivative DTW)
    #[arg(long, default_value_t = false)]
    derivative: bool,

    /// Field delimiter of the input CSV files
    #[arg(long, default_value_t = ';')]
    delimiter: char,
}

/// Sliding-window parameters.
#[derive(Args, Debug, Clone)]
struct WindowArgs {
    /// Samples per window (at least 5)
    #[arg(long, default_value_t = 10)]
    window_size: usize,

    /// Offset between consecutive windows
    #[arg(long, default_value_t = 1)]
    step: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Compute one full-sequence alignment cost per signal pair
    Align {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        alignment: AlignmentArgs,
    },

    /// Export per-window alignment costs of every pair for a batch of files
    Windows {
        /// Input CSV files; each produces `<file stem>_windows.csv`
        #[arg(long, required = true, num_args = 1..)]
        data: Vec<PathBuf>,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        alignment: AlignmentArgs,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Find the minimum, maximum or mean window alignment cost of one pair
    Search {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Statistic to look for: "MIN", "MAX" or "MEAN"
        #[arg(long, default_value = "MEAN")]
        look_for: String,

        /// Write alignment plotting data for every MIN/MAX window
        #[arg(long, default_value_t = false)]
        render: bool,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        alignment: AlignmentArgs,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Compute alignment costs over consecutive fixed-length blocks
    Blocks {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Samples per block; the last block takes the remainder
        #[arg(long)]
        block_len: usize,

        /// Number of blocks
        #[arg(long, default_value_t = 3)]
        n_blocks: usize,

        /// Report the MEAN sliding-window cost inside each block instead of
        /// one full alignment per block
        #[arg(long)]
        window_size: Option<usize>,

        /// Window offset inside each block (with --window-size)
        #[arg(long, default_value_t = 1)]
        step: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        alignment: AlignmentArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct AlignOutput {
    experiment: String,
    method: &'static str,
    results: Vec<PairCostOutput>,
}

#[derive(Serialize)]
struct PairCostOutput {
    pair: String,
    cost: f64,
}

#[derive(Debug, Serialize)]
struct WindowsOutput {
    n_files: usize,
    n_failed: usize,
    method: &'static str,
    outputs: Vec<PathBuf>,
}

#[derive(Serialize)]
struct SearchOutput {
    experiment: String,
    pair: String,
    method: &'static str,
    look_for: &'static str,
    value: f64,
    n_windows: usize,
    extremal_windows: Vec<[usize; 2]>,
}

#[derive(Serialize)]
struct BlocksOutput {
    experiment: String,
    method: &'static str,
    window_size: Option<usize>,
    pairs: Vec<BlockPairOutput>,
}

#[derive(Serialize)]
struct BlockPairOutput {
    pair: String,
    costs: Vec<f64>,
}

/// Parsed, validated form of [`AlignmentArgs`].
struct AlignmentSetup {
    pairs: Vec<SignalPair>,
    method: CostMethod,
    dtw: Dtw,
    delimiter: u8,
}

impl AlignmentSetup {
    fn from_args(args: &AlignmentArgs) -> Result<Self> {
        let pairs = args
            .pairs
            .iter()
            .map(|p| p.parse::<SignalPair>())
            .collect::<Result<Vec<_>, _>>()?;
        let method: CostMethod = args.method.parse()?;
        let variant = if args.derivative {
            Variant::Derivative
        } else {
            Variant::Standard
        };
        let delimiter = u8::try_from(args.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| format!("delimiter must be a single ASCII character, got {:?}", args.delimiter))?;
        Ok(Self {
            pairs,
            method,
            dtw: Dtw::new().with_variant(variant),
            delimiter,
        })
    }

    fn variant_name(&self) -> &'static str {
        match self.dtw.variant() {
            Variant::Standard => "standard",
            Variant::Derivative => "derivative",
        }
    }

    fn read(&self, path: &Path) -> Result<SignalTable> {
        SignalReader::new(path)
            .with_delimiter(self.delimiter)
            .read()
            .with_context(|| format!("failed to read input CSV {}", path.display()))
    }
}

fn window_costs_for_file(
    setup: &AlignmentSetup,
    config: &WindowConfig,
    data: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let table = setup.read(data)?;

    let columns = setup
        .pairs
        .iter()
        .map(|pair| -> Result<(SignalPair, Vec<WindowCost>)> {
            let (x, y) = table.pair(pair)?;
            let costs = setup
                .dtw
                .sliding_window(x.as_slice(), y.as_slice(), config, setup.method)
                .with_context(|| format!("window analysis failed for {pair}"))?;
            Ok((pair.clone(), costs))
        })
        .collect::<Result<Vec<_>>>()?;

    let writer = ResultWriter::new(output_dir, ExperimentName::from_file_stem(data)?)?;
    Ok(writer.write_window_costs(&columns)?)
}

/// Run the window analysis over every file. A failing file is logged and
/// skipped; the batch fails only when no file succeeds.
fn run_window_batch(
    setup: &AlignmentSetup,
    config: &WindowConfig,
    data: &[PathBuf],
    output_dir: &Path,
) -> Result<WindowsOutput> {
    // Outputs are named by file stem, so equal stems would overwrite each other.
    let mut stems = HashSet::new();
    for path in data {
        if let Some(stem) = path.file_stem() {
            if !stems.insert(stem) {
                anyhow::bail!(
                    "input files share the stem {:?}; their outputs would collide",
                    stem
                );
            }
        }
    }

    let mut outputs = Vec::new();
    let mut n_failed = 0;
    for path in data {
        match window_costs_for_file(setup, config, path, output_dir) {
            Ok(out) => {
                info!(file = %path.display(), "file processed");
                outputs.push(out);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %format!("{e:#}"), "file failed");
                n_failed += 1;
            }
        }
    }
    if outputs.is_empty() {
        anyhow::bail!("all {} input files failed", data.len());
    }

    Ok(WindowsOutput {
        n_files: data.len(),
        n_failed,
        method: setup.method.as_str(),
        outputs,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Align {
            data,
            experiment,
            output_dir,
            alignment,
        } => {
            let setup = AlignmentSetup::from_args(&alignment)?;
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let table = setup.read(&data)?;

            let costs = setup
                .pairs
                .iter()
                .map(|pair| -> Result<PairCost> {
                    let (x, y) = table.pair(pair)?;
                    let cost = setup
                        .dtw
                        .alignment_cost(x.as_slice(), y.as_slice(), setup.method)
                        .with_context(|| format!("alignment failed for {pair}"))?;
                    info!(pair = %pair, cost, "pair aligned");
                    Ok(PairCost {
                        pair: pair.clone(),
                        cost,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_align(setup.method, setup.variant_name(), &costs)?;

            let output = AlignOutput {
                experiment,
                method: setup.method.as_str(),
                results: costs
                    .iter()
                    .map(|c| PairCostOutput {
                        pair: c.pair.label(),
                        cost: c.cost,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Windows {
            data,
            output_dir,
            alignment,
            window,
        } => {
            let setup = AlignmentSetup::from_args(&alignment)?;
            let config = WindowConfig::new(window.window_size, window.step)?;
            let output = run_window_batch(&setup, &config, &data, &output_dir)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Search {
            data,
            look_for,
            render,
            experiment,
            output_dir,
            alignment,
            window,
        } => {
            let setup = AlignmentSetup::from_args(&alignment)?;
            let look_for: LookFor = look_for.parse()?;
            let config = WindowConfig::new(window.window_size, window.step)?;
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let [pair] = setup.pairs.as_slice() else {
                anyhow::bail!("search takes exactly one --pair, got {}", setup.pairs.len());
            };

            let table = setup.read(&data)?;
            let (x, y) = table.pair(pair)?;
            let search = setup
                .dtw
                .find_alignment_cost(x.as_slice(), y.as_slice(), &config, setup.method, look_for)
                .context("window search failed")?;
            info!(value = search.value, n_extremal = search.extremal.len(), "search complete");

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_search(pair, setup.method, &search)?;

            if render {
                for (index, w) in search.extremal_windows() {
                    let view = setup
                        .dtw
                        .render_window(x.as_slice(), y.as_slice(), w)
                        .with_context(|| format!("failed to render window {w}"))?;
                    writer.write_alignment_view(pair, index, &view)?;
                }
            }

            let output = SearchOutput {
                experiment,
                pair: pair.label(),
                method: setup.method.as_str(),
                look_for: look_for.as_str(),
                value: search.value,
                n_windows: search.costs.len(),
                extremal_windows: search
                    .extremal_windows()
                    .map(|(_, w)| [w.start, w.end])
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Blocks {
            data,
            block_len,
            n_blocks,
            window_size,
            step,
            experiment,
            output_dir,
            alignment,
        } => {
            let setup = AlignmentSetup::from_args(&alignment)?;
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let config = window_size
                .map(|size| WindowConfig::new(size, step))
                .transpose()?;
            let table = setup.read(&data)?;

            let columns = setup
                .pairs
                .iter()
                .map(|pair| -> Result<(SignalPair, Vec<WindowCost>)> {
                    let (x, y) = table.pair(pair)?;
                    let (x, y) = (x.as_slice(), y.as_slice());
                    let costs = match &config {
                        Some(config) => setup
                            .dtw
                            .block_window_costs(x, y, block_len, n_blocks, config, setup.method),
                        None => setup.dtw.block_costs(x, y, block_len, n_blocks, setup.method),
                    }
                    .with_context(|| format!("block analysis failed for {pair}"))?;
                    Ok((pair.clone(), costs))
                })
                .collect::<Result<Vec<_>>>()?;

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_window_costs(&columns)?;

            let output = BlocksOutput {
                experiment,
                method: setup.method.as_str(),
                window_size,
                pairs: columns
                    .iter()
                    .map(|(pair, costs)| BlockPairOutput {
                        pair: pair.label(),
                        costs: costs.iter().map(|c| c.cost).collect(),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const GOOD: &str = "ABP;CBFV\n0;0\n3;1\n6;4\n2;2\n4;1\n1;6\n1;9\n";

    fn setup() -> AlignmentSetup {
        AlignmentSetup::from_args(&AlignmentArgs {
            pairs: vec!["ABP:CBFV".to_string()],
            method: "d-method".to_string(),
            derivative: false,
            delimiter: ';',
        })
        .unwrap()
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn batch_skips_failing_file() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let good = write(input.path(), "good.csv", GOOD);
        let ragged = write(input.path(), "ragged.csv", "ABP;CBFV\n1;2\n3\n");
        let config = WindowConfig::new(5, 1).unwrap();

        let output = run_window_batch(&setup(), &config, &[ragged, good], out.path()).unwrap();
        assert_eq!(output.n_files, 2);
        assert_eq!(output.n_failed, 1);
        assert_eq!(output.outputs, vec![out.path().join("good_windows.csv")]);
        assert!(output.outputs[0].exists());
        assert!(!out.path().join("ragged_windows.csv").exists());
    }

    #[test]
    fn batch_fails_when_every_file_fails() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let ragged = write(input.path(), "ragged.csv", "ABP;CBFV\n1;2\n3\n");
        let wrong_columns = write(input.path(), "other.csv", "A;B\n1;2\n");
        let config = WindowConfig::new(5, 1).unwrap();

        let result = run_window_batch(&setup(), &config, &[ragged, wrong_columns], out.path());
        assert!(result.is_err());
    }

    #[test]
    fn batch_rejects_colliding_stems() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::create_dir(input.path().join("a")).unwrap();
        fs::create_dir(input.path().join("b")).unwrap();
        let first = write(&input.path().join("a"), "rest.csv", GOOD);
        let second = write(&input.path().join("b"), "rest.csv", GOOD);
        let config = WindowConfig::new(5, 1).unwrap();

        let err = run_window_batch(&setup(), &config, &[first, second], out.path()).unwrap_err();
        assert!(err.to_string().contains("rest"));
        assert!(!out.path().join("rest_windows.csv").exists());
    }
}
