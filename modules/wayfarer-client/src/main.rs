//! `wayfarer`: plan, browse and edit trips from the terminal.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use wayfarer_client::render::{render_detail, render_index};
use wayfarer_client::{
    DetailView, EditModal, FileStore, HttpTripApi, PlannerForm, PlannerState, TripStore,
};
use wayfarer_common::{Budget, Companions, Pacing, PREFERENCE_OPTIONS};

#[derive(Parser)]
#[command(name = "wayfarer")]
#[command(about = "AI travel itinerary planner")]
#[command(version)]
struct Cli {
    /// Planner API base URL
    #[arg(long, global = true, env = "WAYFARER_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Trip store file
    #[arg(long, global = true, env = "WAYFARER_STORE", default_value = ".wayfarer/trips.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new itinerary and save it
    Plan {
        /// Destination city (repeat for multi-city trips)
        #[arg(short, long = "city", required = true)]
        cities: Vec<String>,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Places or experiences you want included
        #[arg(long, default_value = "")]
        places: String,

        /// Interest tag, e.g. "Local Food & Cuisine" (repeatable)
        #[arg(short, long = "pref")]
        preferences: Vec<String>,

        #[arg(long, default_value_t = Budget::default())]
        budget: Budget,

        #[arg(long, default_value_t = Companions::default())]
        companions: Companions,

        #[arg(long, default_value_t = Pacing::default())]
        pacing: Pacing,

        /// Ticket, booking or inspiration file to send along (repeatable)
        #[arg(short, long = "attach")]
        attachments: Vec<PathBuf>,
    },

    /// List saved trips, newest first
    List,

    /// Show a saved trip
    Show {
        id: String,

        /// Day to show (1-based)
        #[arg(short, long, default_value = "1")]
        day: usize,

        /// Activity to expand (1-based)
        #[arg(short, long)]
        activity: Option<usize>,
    },

    /// Change a saved trip with free-text instructions
    Edit {
        id: String,

        /// What to change; prompted for when omitted
        #[arg(short, long)]
        instructions: Option<String>,
    },

    /// Delete a saved trip
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    let store = TripStore::new(Arc::new(FileStore::new(&cli.store)));

    match cli.command {
        Commands::Plan {
            cities,
            from,
            to,
            places,
            preferences,
            budget,
            companions,
            pacing,
            attachments,
        } => {
            let form = PlannerForm {
                cities,
                places,
                start_date: from,
                end_date: to,
                preferences,
                budget,
                companions,
                pacing,
                attachments,
            };
            cmd_plan(&cli.api_url, &store, form).await
        }
        Commands::List => cmd_list(&store),
        Commands::Show { id, day, activity } => cmd_show(&store, &id, day, activity),
        Commands::Edit { id, instructions } => {
            cmd_edit(&cli.api_url, &store, &id, instructions).await
        }
        Commands::Delete { id, yes } => cmd_delete(&store, &id, yes),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

async fn cmd_plan(api_url: &str, store: &TripStore, form: PlannerForm) -> Result<()> {
    for tag in &form.preferences {
        if !PREFERENCE_OPTIONS.contains(&tag.as_str()) {
            println!(
                "{} custom preference \"{}\" (suggested: {})",
                style("note:").yellow(),
                tag,
                PREFERENCE_OPTIONS.join(", ")
            );
        }
    }

    let api = HttpTripApi::new(api_url)?;
    let mut state = PlannerState::default();

    let pb = spinner("Charting your journey...");
    let submitted = state.submit(form, &api, store).await;
    pb.finish_and_clear();
    submitted?;

    match state {
        PlannerState::Navigated(id) => {
            println!("{} saved as {}", style("✓").green(), style(&id).bold());
            let stored = store
                .load(&id)?
                .with_context(|| format!("trip {id} vanished from the store"))?;
            print!("{}", render_detail(&DetailView::new(stored)));
            Ok(())
        }
        PlannerState::ErrorShown(message) => {
            bail!("{message}. Please try again.")
        }
        PlannerState::Idle | PlannerState::Submitting => Ok(()),
    }
}

fn cmd_list(store: &TripStore) -> Result<()> {
    print!("{}", render_index(&store.list()?));
    Ok(())
}

fn load_view(store: &TripStore, id: &str) -> Result<DetailView> {
    match store.load(id)? {
        Some(stored) => Ok(DetailView::new(stored)),
        None => bail!("Trip not found: {id}. Run `wayfarer plan` to create a new trip."),
    }
}

fn cmd_show(store: &TripStore, id: &str, day: usize, activity: Option<usize>) -> Result<()> {
    let mut view = load_view(store, id)?;
    view.select_day(day.saturating_sub(1));
    if let Some(n) = activity {
        view.toggle_activity(n.saturating_sub(1));
    }
    print!("{}", render_detail(&view));
    Ok(())
}

async fn cmd_edit(
    api_url: &str,
    store: &TripStore,
    id: &str,
    instructions: Option<String>,
) -> Result<()> {
    let mut view = load_view(store, id)?;
    let api = HttpTripApi::new(api_url)?;
    let mut modal = EditModal::default();
    modal.open();

    let draft = match instructions {
        Some(text) => text,
        None => Input::<String>::new()
            .with_prompt("What should change?")
            .allow_empty(true)
            .interact_text()?,
    };

    loop {
        modal.set_draft(draft.clone());
        let pb = spinner("Reworking the itinerary...");
        let sent = modal.submit(&mut view, &api, store).await;
        pb.finish_and_clear();

        if !sent {
            println!("{}", style("Nothing to change; the trip is untouched.").dim());
            return Ok(());
        }
        match &modal {
            EditModal::Open {
                error: Some(message),
                ..
            } => {
                eprintln!("{} {}", style("Error:").red().bold(), message);
                let retry = Confirm::new()
                    .with_prompt("Try again with the same instructions?")
                    .default(false)
                    .interact()?;
                if !retry {
                    return Ok(());
                }
            }
            _ => break,
        }
    }

    println!("{} trip {} updated", style("✓").green(), style(id).bold());
    print!("{}", render_detail(&view));
    Ok(())
}

fn cmd_delete(store: &TripStore, id: &str, yes: bool) -> Result<()> {
    let Some(stored) = store.load(id)? else {
        bail!("Trip not found: {id}");
    };
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete \"{}\"? This action cannot be undone.",
                stored.trip.trip_name
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }
    store.delete(id)?;
    println!("{} deleted {}", style("✓").green(), style(&stored.trip.trip_name).bold());
    Ok(())
}
