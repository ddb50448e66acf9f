mod commands;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::grid::handle_grid_command;
use commands::path::handle_path_command;
use commands::route::{handle_route_command, RouteCommandArgs};
use commands::{parse_point, RoutingArgs};
use pickroute_cli::output::{print_footer, OutputFormat};
use pickroute_cli::terminal::ColorPalette;
use pickroute_lib::{Point, SiteId};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pick-tour planning over facility floor plans")]
struct Cli {
    /// Facility bundle to load. Defaults to $PICKROUTE_FACILITY, then the
    /// platform data directory.
    #[arg(long, global = true)]
    facility: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Print elapsed time after text output.
    #[arg(long, global = true)]
    timings: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sequence target sites into a walking tour.
    Route {
        /// Start the tour at this site.
        #[arg(long, conflicts_with = "start")]
        start_site: Option<SiteId>,
        /// Start the tour at a plane coordinate `X,Y`.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        start: Option<Point>,
        /// Site ids to visit (repeat or separate with commas).
        #[arg(long = "target", required = true, value_delimiter = ',')]
        targets: Vec<SiteId>,
        #[command(flatten)]
        routing: RoutingArgs,
    },
    /// Find the shortest walkable path between two plane coordinates.
    Path {
        /// Start coordinate `X,Y`.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: Point,
        /// Destination coordinate `X,Y`.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: Point,
        #[command(flatten)]
        routing: RoutingArgs,
    },
    /// Show the occupancy grid as an ASCII map with layer counts.
    Grid,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let started = Instant::now();
    let facility = cli.facility.as_deref();

    match cli.command {
        Command::Route {
            start_site,
            start,
            targets,
            routing,
        } => {
            let args = RouteCommandArgs {
                start_site,
                start,
                targets,
                routing,
            };
            handle_route_command(facility, cli.format, &args)?;
        }
        Command::Path { from, to, routing } => {
            handle_path_command(facility, cli.format, from, to, &routing)?;
        }
        Command::Grid => handle_grid_command(facility, cli.format)?,
    }

    if cli.timings && cli.format != OutputFormat::Json {
        print_footer(started.elapsed(), &ColorPalette::detect());
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
