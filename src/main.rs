use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use rmst_interactions::distributor::{Distributor, DistributorConfig};
use rmst_interactions::error::PipelineError;
use rmst_interactions::interaction::DEFAULT_TIME_PERCENTILE;
use rmst_interactions::io::{read_pairs, read_survival_data, write_results};

/// Score pairwise feature interactions against a censored survival outcome.
///
/// Job-array options fall back to the matching SLURM variables when not
/// given on the command line.
#[derive(Parser, Debug)]
#[command(name = "rmst-interactions", version, about)]
struct Cli {
    /// Project label, used for the default output location
    #[arg(long)]
    project: String,

    /// Table with `time`, `event` and one column per feature (.csv or .tsv)
    #[arg(long)]
    input_data: PathBuf,

    /// Headerless two-column list of feature pairs to score
    #[arg(long, alias = "input-genes")]
    input_pairs: PathBuf,

    /// Where to write the results [default: results/<project>/task_<worker-index>.csv]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Index of this worker among all workers
    #[arg(long, env = "SLURM_PROCID", default_value_t = 0)]
    worker_index: usize,

    /// Total number of workers sharing the pair list
    #[arg(long, env = "SLURM_NTASKS", default_value_t = 1)]
    worker_count: usize,

    /// Pair evaluations to run in parallel on this worker
    #[arg(long, env = "SLURM_CPUS_PER_TASK", default_value_t = 1)]
    threads: usize,

    /// Permutation replicate; anything but 1 shuffles feature rows
    #[arg(long, env = "SLURM_ARRAY_TASK_ID")]
    replicate: Option<u64>,

    /// Percentile of follow-up times used as the integration limit
    #[arg(long, default_value_t = DEFAULT_TIME_PERCENTILE)]
    time_percentile: f64,
}

impl Cli {
    fn config(&self) -> DistributorConfig {
        DistributorConfig::new()
            .with_worker(self.worker_index, self.worker_count)
            .with_threads(self.threads)
            .with_replicate(self.replicate)
            .with_time_percentile(self.time_percentile)
    }

    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from("results")
                .join(&self.project)
                .join(format!("task_{}.csv", self.worker_index))
        })
    }
}

fn run(cli: &Cli) -> Result<(), PipelineError> {
    let start = Instant::now();
    let distributor = Distributor::new(cli.config())?;

    let pairs = read_pairs(&cli.input_pairs)?;
    let mine = distributor.assigned(&pairs);
    log::info!(
        "{}: worker {}/{} has {} of {} pairs",
        cli.project,
        cli.worker_index,
        cli.worker_count,
        mine.len(),
        pairs.len()
    );

    let mut features: Vec<String> = Vec::with_capacity(mine.len() * 2);
    for pair in mine {
        features.push(pair.feature1.clone());
        features.push(pair.feature2.clone());
    }
    let data = read_survival_data(&cli.input_data, &features)?;

    let outcomes = distributor.run(&data, mine)?;
    write_results(&cli.output_path(), &outcomes)?;

    log::info!(
        "processing all pairs on worker {} took {:.2} seconds",
        cli.worker_index,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
