mod config;
mod render;
mod tracker;
mod web;

use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;

use crate::config::{Config, DataMode};
use crate::render::SharedScene;
use crate::tracker::{parse_states, OpenSkyClient, Tracker, TrackerService};

#[derive(Parser)]
#[command(name = "plane-o-mat")]
#[command(about = "Live aircraft tracking around a moving location")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tracker
    Run {
        #[arg(short, long)]
        config: String,
        /// Use synthetic traffic instead of the live feed
        #[arg(long)]
        simulate: bool,
    },
    /// Decode a saved feed payload and print the records
    Parse { file: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, simulate } => run(&config, simulate).await,
        Commands::Parse { file } => parse(&file),
    }
}

fn parse(path: &str) -> ExitCode {
    let payload = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut count = 0;
    for record in parse_states(&payload) {
        count += 1;
        println!(
            "  {:<8} {:>9.4} {:>10.4} {:>7.0} m {:>6.1} m/s {:>5.1} deg",
            record.callsign,
            record.latitude,
            record.longitude,
            record.altitude_m,
            record.velocity_m_s,
            record.heading_deg
        );
    }
    println!("{} records", count);
    ExitCode::SUCCESS
}

async fn run(path: &str, simulate: bool) -> ExitCode {
    let mut config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if simulate {
        config.tracker.mode = DataMode::Simulated;
    }

    let source = match &config.feed {
        Some(feed) => match OpenSkyClient::new(
            &feed.base_url,
            feed.username.clone(),
            feed.password.clone(),
            feed.timeout,
        ) {
            Ok(client) => Some(client),
            Err(e) => {
                eprintln!("Feed client error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let scene = SharedScene::new();
    let data_mode = config.tracker.mode;
    let tracker: Tracker<SharedScene, OpenSkyClient> = Tracker::new(
        config.tracker.clone(),
        &config.simulation,
        scene.clone(),
        source,
    );

    let mut service = TrackerService::new(data_mode);
    if let Err(e) = service.run(tracker) {
        eprintln!("Tracker error: {}", e);
        return ExitCode::FAILURE;
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = config.web.as_ref().map(|web| {
        let state = web::AppState {
            status: service.shared_status(),
            scene: scene.clone(),
            commands: service.commands(),
        };
        let bind = web.bind.clone();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = web::run_server(&bind, state, shutdown).await {
                log::error!("web server failed: {}", e);
            }
        })
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {}", e);
    }
    log::info!("shutting down");

    let _ = shutdown_tx.send(());
    if let Some(server) = server {
        let _ = server.await;
    }

    if let Err(e) = service.stop().await {
        eprintln!("Tracker error: {}", e);
        return ExitCode::FAILURE;
    }

    let status = service.status();
    println!(
        "Tracker stopped after {} ticks with {} planes",
        status.ticks, status.planes
    );
    ExitCode::SUCCESS
}
