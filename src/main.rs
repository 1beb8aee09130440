//! Start Page - onboarding view speaking the host message protocol
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use tracing::{error, info};

use start_page::run_headless;
use startpage_app::config::{self, Settings, TransportKind};
use startpage_app::ViewFlow;

/// Start Page - onboarding view speaking the host message protocol
#[derive(Parser, Debug)]
#[command(name = "startpage")]
#[command(about = "Onboarding start page view speaking the host message protocol", long_about = None)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// How to reach the host: stdio or tcp
    #[arg(long, value_name = "KIND")]
    transport: Option<TransportKind>,

    /// Host address for the tcp transport
    #[arg(long, value_name = "HOST:PORT")]
    addr: Option<String>,

    /// Start page variant: changelog or no-python
    #[arg(long, value_name = "FLOW")]
    flow: Option<ViewFlow>,

    /// Replay user actions from this file
    #[arg(long, value_name = "FILE")]
    actions: Option<PathBuf>,

    /// Stamp requests with ids and match answers to them
    #[arg(long)]
    correlate: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

impl Args {
    /// Command line flags win over the config file
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(kind) = self.transport {
            settings.transport.kind = kind;
        }
        if let Some(addr) = &self.addr {
            settings.transport.addr = addr.clone();
        }
        if let Some(flow) = self.flow {
            settings.view.flow = flow;
        }
        if self.correlate {
            settings.protocol.correlate_requests = true;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config_path = args.config.clone().or_else(config::default_config_path);

    if args.init_config {
        let path = config_path.ok_or_else(|| eyre!("no config directory on this system"))?;
        if config::init_config(&path)? {
            eprintln!("Wrote default config to {}", path.display());
        } else {
            eprintln!("Config already exists at {}", path.display());
        }
        return Ok(());
    }

    startpage_core::logging::init()?;

    let mut settings = config::load_settings(config_path.as_deref());
    args.apply_to(&mut settings);
    config::validate_settings(&settings)?;

    let result = run_headless(&settings, args.actions.as_deref()).await;
    if let Err(ref e) = result {
        error!("Start page exited with error: {:?}", e);
    } else {
        info!("Start page exited normally");
    }

    Ok(result?)
}
