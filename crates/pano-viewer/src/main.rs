use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pano_viewer::{run_simulation, HelpOverlay, NetworkTier, SimulationConfig, ViewerConfig};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("pano-viewer")
        .version(pano_viewer::VERSION)
        .about("Street-level panorama loading and navigation")
        .subcommand_required(true)
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format (filter with RUST_LOG)"),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run a seeded viewing session against a simulated provider")
                .arg(
                    Arg::new("landmarks")
                        .long("landmarks")
                        .default_value("5")
                        .value_parser(value_parser!(usize))
                        .help("Number of landmarks to visit"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("network")
                        .long("network")
                        .default_value("medium")
                        .value_parser(value_parser!(NetworkTier))
                        .help("Simulated connection: offline, low, medium or high"),
                )
                .arg(
                    Arg::new("failure-rate")
                        .long("failure-rate")
                        .default_value("0.05")
                        .value_parser(value_parser!(f64))
                        .help("Probability that an image fetch fails"),
                )
                .arg(
                    Arg::new("no-data-rate")
                        .long("no-data-rate")
                        .default_value("0.1")
                        .value_parser(value_parser!(f64))
                        .help("Probability that a landmark has no imagery"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(std::path::PathBuf))
                        .help("Viewer config file (TOML)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(Command::new("bindings").about("Print the keyboard bindings"))
}

fn init_tracing(matches: &ArgMatches) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match matches.get_one::<String>("log-format").map(String::as_str) {
        Some("json") => builder.json().init(),
        _ => builder.init(),
    }
}

async fn simulate(args: &ArgMatches) -> anyhow::Result<()> {
    let viewer = match args.get_one::<std::path::PathBuf>("config") {
        Some(path) => ViewerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    let config = SimulationConfig {
        seed: args.get_one::<u64>("seed").copied().unwrap_or(42),
        landmarks: args.get_one::<usize>("landmarks").copied().unwrap_or(5),
        network: args
            .get_one::<NetworkTier>("network")
            .copied()
            .unwrap_or(NetworkTier::Medium),
        no_data_rate: args.get_one::<f64>("no-data-rate").copied().unwrap_or(0.1),
        image_failure_rate: args.get_one::<f64>("failure-rate").copied().unwrap_or(0.05),
        viewer,
    };

    let report = run_simulation(config).await.context("simulation failed")?;
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.generate_text());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(&matches);

    match matches.subcommand() {
        Some(("simulate", args)) => simulate(args).await,
        Some(("bindings", _)) => {
            print!("{}", HelpOverlay::new().render_text());
            Ok(())
        }
        _ => unreachable!("subcommand_required"),
    }
}
