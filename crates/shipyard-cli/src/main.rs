mod config;
mod registry;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use uuid::Uuid;

use config::{ConfigError, ShipyardConfig};
use registry::{RunContext, RunPaths, init_run_logging, start_run, write_report};
use shipyard_eval::{EvalError, verify_all};
use shipyard_generate::{Assembler, GenerationError};
use shipyard_store::{CsvRepository, Repository, ScopedSnapshot, StoreError};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("verification error: {0}")]
    Eval(#[from] EvalError),
}

#[derive(Parser, Debug)]
#[command(name = "shipyard", version, about = "Shipyard fleet data CLI")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "shipyard.toml")]
    config: PathBuf,
    /// Source store directory (overrides `store_dir`).
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,
    /// Output directory for runs (overrides `run_dir`).
    #[arg(long, global = true)]
    run_dir: Option<PathBuf>,
    /// Random seed (overrides `seed`).
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate entities into the source store.
    Populate,
    /// Copy the source store into the snapshot directory and mutate the copy.
    Mutate,
    /// Compare the source store with the snapshot.
    Verify(VerifyArgs),
    /// Populate, mutate a scoped snapshot, and verify in one pass.
    Run(VerifyArgs),
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Fail when the stores differ.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Limit the number of mismatches listed in report.md.
    #[arg(long, default_value_t = 20)]
    max_examples: usize,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let mut config = ShipyardConfig::load(&cli.common.config)?;
    if let Some(store_dir) = cli.common.store_dir {
        config.store_dir = store_dir;
    }
    if let Some(run_dir) = cli.common.run_dir {
        config.run_dir = run_dir;
    }
    if cli.common.seed.is_some() {
        config.seed = cli.common.seed;
    }

    let name = match &cli.command {
        Command::Populate => "populate",
        Command::Mutate => "mutate",
        Command::Verify(_) => "verify",
        Command::Run(_) => "run",
    };
    let session = Session::start(name, config)?;

    match cli.command {
        Command::Populate => session.populate(),
        Command::Mutate => session.mutate(),
        Command::Verify(args) => session.verify(&args),
        Command::Run(args) => session.run(&args),
    }
}

/// One CLI invocation: resolved config, seeded RNG and run directory.
struct Session {
    config: ShipyardConfig,
    paths: RunPaths,
    rng: ChaCha8Rng,
    run_id: String,
    timer: Instant,
}

impl Session {
    fn start(command: &str, config: ShipyardConfig) -> Result<Self, CliError> {
        let run_id = Uuid::new_v4().to_string();
        let seed = config.seed.unwrap_or_else(rand::random);
        let ctx = RunContext {
            run_id: run_id.clone(),
            started_at: chrono::Utc::now(),
            command: command.to_string(),
            seed,
            run_dir: config.run_dir.clone(),
            config: config.clone(),
        };

        let paths = start_run(&ctx)?;
        init_run_logging(&paths.logs_path)?;

        tracing::info!(
            event = "run_started",
            run_id = %run_id,
            command,
            seed,
            store = %config.store_dir.display()
        );

        Ok(Self {
            config,
            paths,
            rng: ChaCha8Rng::seed_from_u64(seed),
            run_id,
            timer: Instant::now(),
        })
    }

    fn populate(mut self) -> Result<(), CliError> {
        let mut registry = self.config.build_registry()?;
        let mut store = CsvRepository::open(&self.config.store_dir)?;

        let report = Assembler::new(&mut registry)
            .with_populate_options(self.config.populate.clone())
            .populate(&mut store, &mut self.rng)?;
        let path = write_report(&self.paths, "population.json", &report)?;
        tracing::info!(event = "report_written", path = %path.display());

        self.finish();
        Ok(())
    }

    fn mutate(mut self) -> Result<(), CliError> {
        let mut registry = self.config.build_registry()?;
        let source = CsvRepository::open(&self.config.store_dir)?;
        let mut snapshot = source.create_snapshot(&self.config.snapshot_name)?;
        tracing::info!(event = "snapshot_created", location = %snapshot.location());

        let report = Assembler::new(&mut registry)
            .with_mutate_options(self.config.mutate.clone())
            .mutate(&mut snapshot, &mut self.rng)?;
        let path = write_report(&self.paths, "mutation.json", &report)?;
        tracing::info!(event = "report_written", path = %path.display());

        self.finish();
        Ok(())
    }

    fn verify(self, args: &VerifyArgs) -> Result<(), CliError> {
        let snapshot_dir = self.config.snapshot_dir();
        if !snapshot_dir.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "snapshot {} not found; run `shipyard mutate` first",
                snapshot_dir.display()
            ))
            .into());
        }
        let source = CsvRepository::open(&self.config.store_dir)?;
        let snapshot = CsvRepository::open(snapshot_dir)?;
        self.compare(&source, &snapshot, args)
    }

    fn run(mut self, args: &VerifyArgs) -> Result<(), CliError> {
        let mut registry = self.config.build_registry()?;
        let mut source = CsvRepository::open(&self.config.store_dir)?;

        let mut assembler = Assembler::new(&mut registry)
            .with_populate_options(self.config.populate.clone())
            .with_mutate_options(self.config.mutate.clone());
        let population = assembler.populate(&mut source, &mut self.rng)?;
        write_report(&self.paths, "population.json", &population)?;

        let mut snapshot = ScopedSnapshot::create(&source, &self.config.snapshot_name)?;
        tracing::info!(event = "snapshot_created", location = %snapshot.location());
        let mutation = assembler.mutate(&mut *snapshot, &mut self.rng)?;
        write_report(&self.paths, "mutation.json", &mutation)?;

        self.compare(&source, &*snapshot, args)
    }

    fn compare(
        self,
        expected: &impl Repository,
        actual: &impl Repository,
        args: &VerifyArgs,
    ) -> Result<(), CliError> {
        let report = verify_all(expected, actual)?;
        let files = shipyard_eval::write_report(&report, &self.paths.root, args.max_examples)?;
        tracing::info!(
            event = "report_written",
            json = %files.json_path.display(),
            markdown = %files.markdown_path.display(),
            problems = report.problem_count()
        );

        let problems = report.problem_count();
        self.finish();
        if args.strict && problems > 0 {
            return Err(EvalError::Failed(problems).into());
        }
        Ok(())
    }

    fn finish(self) {
        tracing::info!(
            event = "run_finished",
            run_id = %self.run_id,
            status = "success",
            duration_ms = self.timer.elapsed().as_millis() as u64
        );
    }
}
