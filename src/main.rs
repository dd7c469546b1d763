//! GoBarber - Main CLI Entry Point

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeZone};
use clap::Parser;
use colored::Colorize;
use gobarber::{
    api::{ApiClient, Provider, ProviderDirectory},
    cli::{Args, Commands, Verbosity},
    config::Config,
    scheduling::{Collaborators, SchedulingViewModel, SlotView, SubmitOutcome},
    session::SessionContext,
    telemetry::{self, TelemetryDisplay},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

fn spinner(verbosity: Verbosity, message: &str) -> Option<ProgressBar> {
    if !verbosity.show_progress() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

fn finish(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

fn print_providers(providers: &[Provider]) {
    if providers.is_empty() {
        println!("{}", "No providers available.".yellow());
        return;
    }
    println!("{}", "Providers".bold());
    for provider in providers {
        println!(
            "  {}  {}  {}",
            provider.id.dimmed(),
            provider.name.bold(),
            provider.avatar_or_placeholder().dimmed()
        );
    }
}

fn print_section(title: &str, slots: &[SlotView], selected: Option<u8>) {
    println!("{}", title.bold());
    if slots.is_empty() {
        println!("  {}", "no slots".dimmed());
        return;
    }
    let line: Vec<String> = slots
        .iter()
        .map(|slot| {
            if Some(slot.hour) == selected {
                slot.hour_formatted.black().on_yellow().to_string()
            } else if slot.available {
                slot.hour_formatted.green().to_string()
            } else {
                slot.hour_formatted.dimmed().strikethrough().to_string()
            }
        })
        .collect();
    println!("  {}", line.join("  "));
}

fn print_schedule(view_model: &SchedulingViewModel) {
    let selection = view_model.selection();
    let schedule = view_model.day_schedule();
    println!(
        "{} {} on {}",
        "Availability for".bold(),
        selection.provider_id.cyan(),
        selection.date.format("%Y-%m-%d")
    );
    print_section("Morning", &schedule.morning, selection.hour);
    print_section("Afternoon", &schedule.afternoon, selection.hour);
}

async fn run_providers(client: ApiClient, session: &SessionContext, verbosity: Verbosity) -> Result<()> {
    if session.user().is_some() {
        println!("{}", session.greeting().bold());
    }

    let pb = spinner(verbosity, "Loading providers");
    let providers = client.list_providers().await;
    finish(pb);

    print_providers(&providers.context("Failed to load providers")?);
    Ok(())
}

async fn open_screen(
    client: ApiClient,
    session: Arc<SessionContext>,
    provider: String,
    date: NaiveDate,
    verbosity: Verbosity,
) -> SchedulingViewModel {
    let (view_model, _events) =
        SchedulingViewModel::new(Collaborators::from_client(client), session, provider, date);

    let pb = spinner(verbosity, "Loading availability");
    view_model.mount().await;
    finish(pb);

    view_model
}

async fn run_availability(
    client: ApiClient,
    session: Arc<SessionContext>,
    provider: String,
    date: NaiveDate,
    verbosity: Verbosity,
) -> Result<()> {
    let view_model = open_screen(client, session, provider, date, verbosity).await;
    print_schedule(&view_model);
    TelemetryDisplay::new(view_model.telemetry().clone(), verbosity).display_summary();
    Ok(())
}

async fn run_book(
    client: ApiClient,
    session: Arc<SessionContext>,
    provider: String,
    date: NaiveDate,
    hour: u8,
    verbosity: Verbosity,
) -> Result<()> {
    let view_model = open_screen(client, session, provider, date, verbosity).await;

    if let Err(e) = view_model.set_hour(hour) {
        print_schedule(&view_model);
        anyhow::bail!("{}", e);
    }

    let pb = spinner(verbosity, "Booking");
    let outcome = view_model.submit().await;
    finish(pb);

    let result = match outcome? {
        SubmitOutcome::Created {
            timestamp_millis,
            appointment_id,
            ..
        } => {
            let when = Local
                .timestamp_millis_opt(timestamp_millis)
                .single()
                .map(|t| t.format("%A, %d %B %Y at %H:%M").to_string())
                .unwrap_or_else(|| timestamp_millis.to_string());
            println!("{} {}", "✓ Appointment booked:".green().bold(), when);
            if let Some(id) = appointment_id {
                println!("  id: {}", id.dimmed());
            }
            Ok(())
        }
        SubmitOutcome::Failed { message } => {
            eprintln!("{} {}", "✗".red().bold(), message.red());
            Err(anyhow::anyhow!("appointment was not created"))
        }
    };

    TelemetryDisplay::new(view_model.telemetry().clone(), verbosity).display_summary();
    result
}

async fn run_config(config: &Config, client: &ApiClient) -> Result<()> {
    println!("{}", "Configuration".bold());
    if let Some(path) = Config::default_path() {
        println!("  file:     {}", path.display());
    }
    println!("  api:      {}", config.api_url());
    println!("  timeout:  {}s", config.api.timeout_secs);
    let status = if client.health_check().await {
        "reachable".green()
    } else {
        "unreachable".red()
    };
    println!("  status:   {}", status);
    let token = if config.session.token.is_some() { "set" } else { "not set" };
    println!("  token:    {}", token);
    if let Some(name) = &config.session.user_name {
        println!("  user:     {}", name);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    telemetry::init_logging(verbosity);

    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    if let Some(url) = args.api_url.clone() {
        config.apply_env_overrides(Some(url), None);
        config.validate()?;
    }

    let session = Arc::new(SessionContext::from_config(&config.session));
    let client = ApiClient::from_config(&config, session.clone())?;

    match args.command {
        Commands::Providers => run_providers(client, &session, verbosity).await,
        Commands::Availability { provider, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            run_availability(client, session, provider, date, verbosity).await
        }
        Commands::Book {
            provider,
            date,
            hour,
        } => run_book(client, session, provider, date, hour, verbosity).await,
        Commands::Config => run_config(&config, &client).await,
    }
}
