use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use listing_wizard::address::{AddressSearch, BanClient, ListEvent, SearchParams, SuggestionList};
use listing_wizard::models::{EnergyRating, PropertyType};
use listing_wizard::publish::{Publisher, RestBackend};
use listing_wizard::wizard::{
    step_issue, DetailsPatch, FileStore, PendingPhoto, PricingPatch, StepKey, Wizard,
};
use listing_wizard::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "listing-wizard", about = "Create a rental listing step by step")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search addresses
    Search { query: Vec<String> },
    /// Search and select an address for the draft
    Select {
        query: Vec<String>,
        /// Position in the suggestion list (1-based)
        #[arg(long, default_value_t = 1)]
        pick: usize,
    },
    /// Enter the postal code by hand
    PostalCode { code: String },
    /// Enter the city by hand
    City { name: String },
    /// Property details
    Details {
        #[arg(long = "type")]
        property_type: Option<PropertyType>,
        #[arg(long)]
        surface: Option<f64>,
        #[arg(long)]
        rooms: Option<u32>,
        #[arg(long)]
        floor: Option<i32>,
        #[arg(long)]
        elevator: Option<bool>,
        #[arg(long)]
        furnished: Option<bool>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        dpe: Option<EnergyRating>,
    },
    /// Monthly rent, charges and deposit
    Pricing {
        #[arg(long)]
        rent: Option<f64>,
        #[arg(long)]
        charges: Option<f64>,
        #[arg(long)]
        deposit: Option<f64>,
    },
    /// Show the draft and step progress
    Status,
    /// Publish the draft with the given photos
    Publish {
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
    },
    /// Discard the draft
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let store = FileStore::open(&config.state_dir)?;
    let mut wizard = Wizard::load(store);
    let ban = BanClient::with_params(
        &config.ban_url,
        SearchParams {
            limit: config.search_limit,
            autocomplete: true,
        },
    )?;

    match cli.command {
        Command::Search { query } => {
            let query = query.join(" ");
            let suggestions = ban.search(&query, config.search_limit).await?;
            if suggestions.is_empty() {
                println!("No address found for {:?}", query);
            }
            for (i, s) in suggestions.iter().enumerate() {
                let marker = if s.is_selectable() { "" } else { " (non supporté)" };
                println!("{}. {} [{}]{}", i + 1, s.label, s.classification, marker);
                if let (Some(city), Some(code)) = (&s.city, &s.postal_code) {
                    println!("   {} {}", code, city);
                }
            }
        }
        Command::Select { query, pick } => {
            let query = query.join(" ");
            let mut list = SuggestionList::new();
            list.show(ban.search(&query, config.search_limit).await?);
            match list.click(pick.saturating_sub(1)) {
                ListEvent::Selected(suggestion) => {
                    wizard.select_address(&suggestion)?;
                    println!("Adresse : {}", suggestion.label);
                    if let Some(reason) = step_issue(wizard.state(), StepKey::Address) {
                        println!("⚠️  {}", reason);
                    }
                }
                ListEvent::Rejected(message) => anyhow::bail!(message),
                _ => anyhow::bail!("No suggestion #{} for {:?}", pick, query),
            }
        }
        Command::PostalCode { code } => wizard.set_postal_code(&code)?,
        Command::City { name } => wizard.set_city(&name)?,
        Command::Details {
            property_type,
            surface,
            rooms,
            floor,
            elevator,
            furnished,
            title,
            description,
            dpe,
        } => wizard.update_details(DetailsPatch {
            property_type,
            surface,
            rooms,
            floor,
            elevator,
            furnished,
            title,
            description,
            energy_rating: dpe,
        })?,
        Command::Pricing {
            rent,
            charges,
            deposit,
        } => wizard.update_pricing(PricingPatch {
            rent,
            charges,
            deposit,
        })?,
        Command::Status => {
            for (step, done) in wizard.progress() {
                let mark = if done { "✅" } else { "⬜" };
                match step_issue(wizard.state(), step) {
                    Some(reason) if !done => println!("{} {} - {}", mark, step, reason),
                    _ => println!("{} {}", mark, step),
                }
            }
            println!();
            println!("{}", serde_json::to_string_pretty(wizard.state())?);
        }
        Command::Publish { photos } => {
            if !config.is_backend_configured() {
                anyhow::bail!("Set SUPABASE_URL and SUPABASE_ANON_KEY to publish");
            }
            let owner_id = config
                .owner_id
                .clone()
                .context("Set LISTING_OWNER_ID to publish")?;

            for path in &photos {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "photo.jpg".to_string());
                wizard.add_photo(PendingPhoto::new(name, bytes))?;
            }

            let backend = RestBackend::new(config.backend())?;
            let publisher = Publisher::new(Arc::new(ban), Arc::new(backend));

            info!("Publishing listing...");
            let receipt = publisher.publish(&mut wizard, &owner_id).await?;
            println!("✅ {} ({})", receipt.title, receipt.listing_id);
            for url in &receipt.photo_urls {
                println!("   {}", url);
            }
        }
        Command::Reset => {
            wizard.clear()?;
            println!("Brouillon supprimé");
        }
    }

    Ok(())
}
