use std::future::Future;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    FetchController, FetchState, HttpProvisioningClient, ListView, RegistrationView, SearchView,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(name = "console", about = "Register, look up and list provisioned devices")]
struct Cli {
    /// Base URL of the provisioning backend; overrides console.toml and the environment.
    #[arg(long)]
    api_base: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Also print the full response JSON.
    #[arg(long)]
    raw: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a hub if needed and provision the device.
    Register { reg_id: String },
    /// Look up a registration and its enrollment.
    Search { reg_id: String },
    /// List every individual enrollment and enrollment group.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let api_base = config::select_api_base(cli.api_base.as_deref(), &settings);
    let client =
        HttpProvisioningClient::new(api_base).context("failed to build provisioning client")?;
    info!(api_base = client.base_url(), "using provisioning backend");

    match &cli.command {
        Command::Register { reg_id } => {
            let view = RegistrationView::new();
            with_progress(view.controller(), view.provision(&client, reg_id)).await;
            let raw = settled(view.controller())?;
            let summary = view.summary().context("registration response missing")?;
            emit(&cli, view.controller(), &summary, render::render_provision(&summary), &raw)
        }
        Command::Search { reg_id } => {
            let view = SearchView::new();
            with_progress(view.controller(), view.search(&client, reg_id)).await;
            let raw = settled(view.controller())?;
            let summary = view.summary().context("lookup response missing")?;
            emit(&cli, view.controller(), &summary, render::render_lookup(&summary), &raw)
        }
        Command::List => {
            let view = ListView::new();
            with_progress(view.controller(), view.load_all(&client)).await;
            let raw = settled(view.controller())?;
            let listing = view.listing();
            emit(&cli, view.controller(), &listing, render::render_listing(&listing), &raw)
        }
    }
}

/// Drives `request` while echoing the view's loading label to stderr.
async fn with_progress<F>(controller: &FetchController<Value>, request: F)
where
    F: Future<Output = ()>,
{
    let mut states = controller.subscribe();
    let label = controller.view().loading_label();
    let progress = async move {
        while states.changed().await.is_ok() {
            if !states.borrow_and_update().is_loading() {
                break;
            }
            eprintln!("{label}");
        }
    };
    tokio::join!(request, progress);
}

fn settled(controller: &FetchController<Value>) -> Result<Value> {
    match controller.state() {
        FetchState::Success(value) => Ok(value),
        FetchState::Error(message) => Err(anyhow!(message)),
        FetchState::Idle | FetchState::Loading => {
            Err(anyhow!("{} request did not settle", controller.view()))
        }
    }
}

fn emit<T: Serialize>(
    cli: &Cli,
    controller: &FetchController<Value>,
    model: &T,
    text: String,
    raw: &Value,
) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            println!("{}", render::heading(controller.view()));
            println!("{text}");
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(model)?),
    }
    if cli.raw {
        println!("{}", render::render_raw(raw)?);
    }
    Ok(())
}
