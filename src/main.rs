use anyhow::Result;
use colored::Colorize;
use option_contracts_viewer::app_config::AppConfig;
use option_contracts_viewer::{api_server_axum, display, logging};
use option_contracts_viewer::{GatewayClient, SelectionController, SelectionStatus};

/// Run the proxy gateway
async fn run_server(config: &AppConfig) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Option Contracts Gateway".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    api_server_axum::start_server(config.port, config.gateway.clone()).await
}

/// Activate a selection session against a running gateway and print the view
async fn run_select(config: &AppConfig) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Option Contracts Viewer".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    println!("{} Gateway: {}", "→".cyan(), config.gateway_url.yellow());
    println!("{} Ticker: {}", "→".cyan(), config.default_ticker.yellow());
    println!();

    let controller = SelectionController::new(
        GatewayClient::new(config.gateway_url.clone())?,
        config.default_ticker.clone(),
    );
    controller.activate().await;

    let state = controller.state();
    println!("{}", display::render_view(&state));
    println!();

    match state.status {
        SelectionStatus::Loaded => println!(
            "{} {} calls, {} puts",
            "✓".green(),
            state.call_contracts.len(),
            state.put_contracts.len()
        ),
        _ => println!("{} Selection did not load", "✗".red()),
    }
    println!("{}", "=".repeat(60).blue());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;

    let config = AppConfig::from_env();
    if let Err(e) = config.validate() {
        eprintln!("{} {}", "✗".red(), e);
        eprintln!("Set OPTIONS_MODE environment variable to control execution mode");
        eprintln!("Examples:");
        eprintln!("  OPTIONS_MODE=server OPTIONS_PORT=3001 cargo run   # Start the gateway on port 3001");
        eprintln!("  OPTIONS_MODE=select OPTIONS_TICKER=MSFT cargo run  # Load one ticker through a running gateway");
        std::process::exit(1);
    }

    match config.mode.as_str() {
        "select" => run_select(&config).await,
        _ => run_server(&config).await,
    }
}
