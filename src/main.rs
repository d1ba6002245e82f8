use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use trustbill_dashboard::commands::{self, dashboard, invoices, Command};
use trustbill_dashboard::config::{Cli, Config};
use trustbill_dashboard::models::Tab;
use trustbill_dashboard::services::api::HttpInvoiceApi;
use trustbill_dashboard::services::state::{AppState, LoadOutcome, UnflagOutcome, VendorRegistration};
use trustbill_dashboard::ui;

type Dashboard = AppState<HttpInvoiceApi>;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_cli(Cli::parse()).context("Configuration")?;
    tracing::info!(api = %config.api_base_url, tab = %config.initial_tab, "starting dashboard");

    let api = HttpInvoiceApi::new(config.api_base_url.clone());
    let state = Arc::new(AppState::with_tab(api, config.initial_tab));

    if config.once {
        return run_once(&state).await;
    }
    run_interactive(state).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TRUSTBILL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_once(state: &Dashboard) -> Result<()> {
    let outcome = state.fetch_data().await;
    state.read(|session| {
        for tab in Tab::ALL {
            println!("{}\n", ui::render_tab(session, tab));
        }
    });
    if outcome == LoadOutcome::Failed {
        bail!("Failed to load dashboard data");
    }
    Ok(())
}

async fn run_interactive(state: Arc<Dashboard>) -> Result<()> {
    println!("{}", commands::HELP);
    spawn_refresh(state.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Read command")? {
        let command = match commands::parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{}", commands::HELP),
            Command::Show => print_dashboard(&state),
            Command::SwitchTab(tab) => {
                dashboard::switch_tab(tab, &*state);
                print_dashboard(&state);
            }
            Command::Toggle(row) => match dashboard::toggle_row(&row, &*state) {
                Ok(_) => print_dashboard(&state),
                Err(message) => println!("{}", message),
            },
            Command::Refresh => {
                println!("Refreshing...");
                spawn_refresh(state.clone());
            }
            Command::Unflag(invoice_id) => spawn_unflag(state.clone(), invoice_id),
        }
    }

    Ok(())
}

fn print_dashboard(state: &Dashboard) {
    let screen = state.read(ui::render);
    println!("\n{}\n", screen);
}

fn spawn_refresh(state: Arc<Dashboard>) {
    tokio::spawn(async move {
        dashboard::refresh(&*state).await;
        print_dashboard(&state);
    });
}

fn spawn_unflag(state: Arc<Dashboard>, invoice_id: String) {
    tokio::spawn(async move {
        match invoices::unflag_invoice(&invoice_id, &*state).await {
            Ok(UnflagOutcome::Acknowledged { vendor }) => {
                println!("Invoice {} unflagged.", invoice_id);
                if vendor == VendorRegistration::Registered {
                    println!("Vendor details added to trusted vendors.");
                }
            }
            Ok(UnflagOutcome::AlreadyInFlight) => {
                println!("Invoice {} is already being unflagged.", invoice_id);
                return;
            }
            Ok(UnflagOutcome::Failed) => {}
            Err(message) => {
                println!("{}", message);
                return;
            }
        }
        print_dashboard(&state);
    });
}
