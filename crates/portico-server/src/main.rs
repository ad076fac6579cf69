//! Portico: contact-network server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use portico_core::PorticoConfig;
use portico_server::{build_router, AppState};

mod layout;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "--layout" | "layout" => {
                if args.len() < 3 {
                    eprintln!("Usage: portico layout <network.json> [width height]");
                    std::process::exit(1);
                }
                let (width, height) = match (args.get(3), args.get(4)) {
                    (Some(w), Some(h)) => (w.parse::<f64>()?, h.parse::<f64>()?),
                    (None, None) => (layout::DEFAULT_WIDTH, layout::DEFAULT_HEIGHT),
                    _ => {
                        eprintln!("Width and height must be given together");
                        std::process::exit(1);
                    }
                };
                let positions = layout::settle_file(&PathBuf::from(&args[2]), width, height)?;
                println!("{}", serde_json::to_string_pretty(&positions)?);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("Portico: contact network server");
                println!();
                println!("Usage: portico [command]");
                println!();
                println!("Commands:");
                println!("  (none)                              Start the server");
                println!("  layout <network.json> [w h]         Settle a saved network and print node positions");
                println!("  help                                Show this help message");
                println!();
                println!("Environment:");
                println!("  PORTICO_HOST, PORT, PORTICO_SEED_CLUSTERS, PORTICO_UNIQUE_CLUSTER_NAMES, RUST_LOG");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'portico help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let config = PorticoConfig::from_env()?;
    let addr = config.bind_addr();

    let state = Arc::new(AppState::new(config));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Portico server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
