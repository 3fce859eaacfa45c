use division_elimination::{Division, EliminationConfig, SolveMethod, ValidationMode};
use log::{debug, LevelFilter};
use std::{path::PathBuf, process::ExitCode, time::Duration, time::Instant};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(
    name = "eliminator",
    about = "Reports which teams of a division are mathematically eliminated"
)]
struct Args {
    /// Division file: a header line, then `name wins losses remaining g0 g1 ...` per team
    input: PathBuf,

    /// MaxFlow or LinearProgramming
    #[structopt(short, long, default_value = "LinearProgramming")]
    method: SolveMethod,

    /// Seconds allowed for each max-flow or LP solve
    #[structopt(short, long, parse(try_from_str = parse_time_limit))]
    time_limit: Option<Duration>,

    /// Augmenting paths allowed for each max-flow solve
    #[structopt(long)]
    max_iterations: Option<usize>,

    /// Absolute tolerance for LP source-edge saturation
    #[structopt(long)]
    tolerance: Option<f64>,

    /// Reject tables whose head-to-head counts are asymmetric or do not sum to `remaining`
    #[structopt(long)]
    strict: bool,

    /// Run both certifiers and fail if they disagree
    #[structopt(long)]
    cross_check: bool,

    /// Print the teams responsible for each elimination
    #[structopt(short, long)]
    certificate: bool,

    #[structopt(short, long)]
    verbose: bool,
}

fn parse_time_limit(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value.parse().map_err(|err| format!("{}", err))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("{} is not a valid number of seconds", value))
}

// Mimalloc allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

struct ConsoleLogger {
    start: Instant,
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{:.2?} {} - {}",
                self.start.elapsed(),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

fn main() -> ExitCode {
    let args = Args::from_args();

    let console_logger = ConsoleLogger {
        start: Instant::now(),
    };
    let console_logger = Box::leak(Box::new(console_logger));

    if log::set_logger(console_logger).is_ok() {
        log::set_max_level(match () {
            #[cfg(feature = "verbose")]
            () => LevelFilter::Debug,
            #[cfg(not(feature = "verbose"))]
            () if args.verbose => LevelFilter::Debug,
            #[cfg(not(feature = "verbose"))]
            () => LevelFilter::Warn,
        });
    }

    debug!("Debug enabled");

    let mut config = EliminationConfig {
        validation: if args.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Permissive
        },
        solver_verbose: args.verbose,
        ..Default::default()
    };
    config.time_limit = args.time_limit;
    if let Some(max_iterations) = args.max_iterations {
        config.max_flow_iterations = Some(max_iterations);
    }
    if let Some(tolerance) = args.tolerance {
        config.lp_tolerance = tolerance;
    }

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &EliminationConfig) -> division_elimination::Result<()> {
    let division = Division::from_file(&args.input, config.validation)?;
    log::info!("Loaded {} teams from {}", division.len(), args.input.display());

    for team in division.teams() {
        let eliminated = if args.cross_check {
            division.cross_check(team.id, config)?
        } else {
            division.is_eliminated_with(team.id, args.method, config)?
        };

        println!("{}: Eliminated? {}", team.name, eliminated);

        if args.certificate && eliminated {
            if let Some(subset) = division.elimination_certificate(team.id, config)? {
                let names: Vec<_> = subset
                    .iter()
                    .map(|&id| division.team(id).map(|t| t.name.as_str()))
                    .collect::<division_elimination::Result<_>>()?;
                println!("    by {{{}}}", names.join(", "));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_limit_accepts_fractional_seconds() {
        assert_eq!(parse_time_limit("1.5"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_time_limit("0"), Ok(Duration::ZERO));
    }

    #[test]
    fn time_limit_rejects_unusable_values() {
        for value in ["-1", "NaN", "inf", "soon"] {
            assert!(parse_time_limit(value).is_err(), "{}", value);
        }
    }

    #[test]
    fn negative_time_limit_is_an_argument_error() {
        let args = Args::from_iter_safe(["eliminator", "teams.txt", "--time-limit", "-2"]);
        assert!(args.is_err());
    }
}
