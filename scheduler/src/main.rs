mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use scheduling_simulator::{
    compare,
    scheduler::{samples, RunSummary},
    Algorithm, ProcessConfig, SchedulerOptions, SchedulingEngine,
};
use std::{fs, io, path::PathBuf, sync::Mutex, time::Duration};
use tracing_subscriber::EnvFilter;
use ui::SimulationRunner;

#[derive(Parser, Debug)]
#[command(name = "scheduling-simulator", version, about = "CPU scheduling simulator")]
struct Args {
    /// fcfs, sjf, srtf, priority-np, priority-p, rr or mlfq
    #[arg(short, long, default_value = "fcfs")]
    algorithm: String,

    /// JSON array of processes ({ "arrivalTime", "burstTime", "priority"? })
    #[arg(long)]
    processes: Option<PathBuf>,

    /// JSON file with scheduler options; flags below override it
    #[arg(long)]
    options: Option<PathBuf>,

    #[arg(short, long)]
    quantum: Option<u64>,

    #[arg(long)]
    high_priority_first: bool,

    #[arg(long)]
    mlfq_queues: Option<usize>,

    #[arg(long, value_delimiter = ',')]
    mlfq_quantums: Option<Vec<u64>>,

    #[arg(long)]
    mlfq_aging: bool,

    #[arg(long)]
    mlfq_aging_threshold: Option<u64>,

    /// Generate this many sample processes instead of reading a file
    #[arg(long)]
    samples: Option<usize>,

    /// Generate a large stress set
    #[arg(long)]
    stress: bool,

    #[arg(long, default_value_t = samples::DEFAULT_SEED)]
    seed: u64,

    /// Milliseconds per simulated tick in interactive mode
    #[arg(long, default_value_t = 300)]
    tick_ms: u64,

    /// Run to completion and print the result as JSON
    #[arg(long)]
    batch: bool,

    /// Second algorithm to compare against (batch mode)
    #[arg(long)]
    compare: Option<String>,

    /// Write logs here in interactive mode
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.batch {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else if let Some(path) = &args.log_file {
        let file = fs::File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn load_options(args: &Args) -> Result<SchedulerOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("invalid options in {}", path.display()))?
        }
        None => SchedulerOptions::default(),
    };

    if let Some(quantum) = args.quantum {
        options.quantum = quantum;
    }
    if args.high_priority_first {
        options.high_priority_first = true;
    }
    if let Some(queues) = args.mlfq_queues {
        options.mlfq_queues = queues;
    }
    if let Some(quantums) = &args.mlfq_quantums {
        options.mlfq_quantums = quantums.clone();
    }
    if args.mlfq_aging {
        options.mlfq_aging = true;
    }
    if let Some(threshold) = args.mlfq_aging_threshold {
        options.mlfq_aging_threshold = threshold;
    }
    Ok(options)
}

fn build_engine(
    args: &Args,
    algorithm: Algorithm,
    options: SchedulerOptions,
) -> Result<SchedulingEngine> {
    let mut engine = SchedulingEngine::with_options(algorithm, options)?;
    engine.set_sample_seed(args.seed);

    if let Some(path) = &args.processes {
        let data =
            fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
        let configs: Vec<ProcessConfig> = serde_json::from_str(&data)
            .with_context(|| format!("invalid processes in {}", path.display()))?;
        for config in &configs {
            engine.spawn(config)?;
        }
    } else if args.stress {
        engine.set_processes(samples::stress_processes(
            samples::DEFAULT_STRESS_COUNT,
            args.seed,
        ))?;
    } else if let Some(count) = args.samples {
        engine.set_processes(samples::sample_processes(count, args.seed))?;
    }
    Ok(engine)
}

fn run_batch(args: &Args, algorithm: Algorithm, options: SchedulerOptions) -> Result<()> {
    let mut engine = build_engine(args, algorithm, options.clone())?;

    let json = match &args.compare {
        Some(key) => {
            let second: Algorithm = key.parse()?;
            // Run once to materialize the input (samples included), then
            // hand clones of it to two fresh engines.
            engine.start()?;
            let processes = engine.processes().to_vec();
            serde_json::to_string_pretty(&compare(&processes, algorithm, second, &options)?)?
        }
        None => {
            let output = engine.run_to_completion()?;
            let summary = RunSummary {
                algorithm,
                output,
                metrics: engine.metrics().clone(),
            };
            serde_json::to_string_pretty(&summary)?
        }
    };
    println!("{json}");
    Ok(())
}

fn run_interactive(args: &Args, algorithm: Algorithm, options: SchedulerOptions) -> Result<()> {
    let engine = build_engine(args, algorithm, options)?;

    execute!(io::stdout(), Clear(ClearType::All))?;
    let mut runner = SimulationRunner::new(engine, Duration::from_millis(args.tick_ms.max(1)))?;
    while runner.run()? {}
    let engine = runner.into_engine();
    execute!(io::stdout(), Clear(ClearType::All))?;

    let metrics = engine.metrics();
    println!(
        "{} after {} ticks: avg wait {:.2}, avg turnaround {:.2}, cpu {:.1}%",
        engine.algorithm().name(),
        engine.current_time(),
        metrics.avg_waiting_time,
        metrics.avg_turnaround_time,
        metrics.cpu_utilization * 100.0
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let algorithm: Algorithm = args.algorithm.parse()?;
    let options = load_options(&args)?;
    options.validate()?;

    if args.batch {
        run_batch(&args, algorithm, options)
    } else {
        run_interactive(&args, algorithm, options)
    }
}
