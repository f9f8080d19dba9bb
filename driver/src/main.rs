use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use plancore::config::{ClientConfig, API_BASE_ENV};
use plancore::export::ExportFormat;
use plancore::model::{AdditionalRooms, Requirements};
use plancore::HttpGateway;
use std::env;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{PlotInput, SessionConfig};
use workflow::runner::Runner;

mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Runs the floor-plan wizard without a GUI")]
struct Args {
    /// Load the whole session (plot, requirements, exports) from YAML
    #[arg(long)]
    session: Option<PathBuf>,
    /// Client config YAML with base_url / timeout_secs
    #[arg(long)]
    config: Option<PathBuf>,
    /// Plot image to upload
    #[arg(long)]
    image: Option<PathBuf>,
    /// Plot width in meters
    #[arg(long)]
    width: Option<f64>,
    /// Plot height in meters
    #[arg(long)]
    height: Option<f64>,
    #[arg(long)]
    scale_bar_px: Option<f64>,
    #[arg(long)]
    scale_bar_m: Option<f64>,
    #[arg(long, default_value_t = 3)]
    bedrooms: u8,
    #[arg(long, default_value_t = 2)]
    bathrooms: u8,
    #[arg(long, default_value_t = false)]
    puja_room: bool,
    /// Extra room names; repeat the flag. Defaults to Living Room and Dining Room
    #[arg(long = "room")]
    rooms: Vec<String>,
    /// Formats to download, e.g. pdf,dxf
    #[arg(long, value_delimiter = ',')]
    export: Vec<ExportFormat>,
    /// Directory for downloads (defaults to the user's download directory)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Backend base URL, overrides config and environment
    #[arg(long)]
    api_base: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

fn client_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let config = match &args.config {
        Some(path) => ClientConfig::load(path)?.with_base_url(env::var(API_BASE_ENV).ok()),
        None => ClientConfig::from_env()?,
    };
    Ok(config)
}

fn session_from_args(args: &Args) -> anyhow::Result<SessionConfig> {
    let (Some(image), Some(width_m), Some(height_m)) = (args.image.clone(), args.width, args.height)
    else {
        bail!("--image, --width and --height are required without --session");
    };

    let mut requirements = Requirements {
        bedrooms: args.bedrooms,
        bathrooms: args.bathrooms,
        ..Default::default()
    };
    requirements.vastu_preferences.puja_room = args.puja_room;
    if !args.rooms.is_empty() {
        requirements.additional_rooms = args.rooms.iter().collect::<AdditionalRooms>();
    }

    Ok(SessionConfig::from_args(
        client_config(args)?,
        PlotInput {
            image,
            width_m,
            height_m,
            scale_bar_px: args.scale_bar_px,
            scale_bar_m: args.scale_bar_m,
        },
        requirements,
        args.export.clone(),
        args.out.clone(),
    ))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut session = match &args.session {
        Some(path) => {
            let mut session = SessionConfig::load(path)?;
            session.api = match &args.config {
                Some(_) => client_config(&args)?,
                None => session.api.with_base_url(env::var(API_BASE_ENV).ok()),
            };
            if !args.export.is_empty() {
                session.exports = args.export.clone();
            }
            if args.out.is_some() {
                session.output_dir = args.out.clone();
            }
            session
        }
        None => session_from_args(&args)?,
    };
    session.api = session.api.with_base_url(args.api_base.clone());
    if let Some(timeout) = args.timeout {
        session.api.timeout_secs = timeout;
    }
    session.validate()?;

    let submission = session.submission()?;
    let gateway = HttpGateway::new(session.api.clone()).context("building HTTP client")?;
    let runner = Runner::new(gateway, session.saver());
    info!("using backend at {}", session.api.base_url);

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime")?;
    let mut report = runtime.block_on(async {
        tokio::select! {
            report = runner.execute(submission, session.requirements.clone(), &session.exports) => report,
            _ = signal::ctrl_c() => bail!("session cancelled"),
        }
    })?;
    report.metrics = Some(runner.gateway().metrics());

    print!("{}", report);
    if report.failed_exports() > 0 {
        bail!("{} download(s) failed", report.failed_exports());
    }
    Ok(())
}
