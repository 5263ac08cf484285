//! epiwatch CLI
//!
//! Command-line console over the dashboard core:
//! - Dashboard views (monthly totals, shares, map buckets, rankings)
//! - Country drill-down with projection
//! - Login/logout and reference-data administration
//! - CSV export and config generation

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use epiwatch::analytics::{monthly_totals_csv, ChoroplethBucket, ShareEntry};
use epiwatch::config::{generate_default_config, Config};
use epiwatch::dashboard::{DashboardService, DashboardSnapshot};
use epiwatch::records::parse_day;
use epiwatch::remote::{
    ApiClient, NewContinent, NewCountry, NewPandemic, NewReferenceItem, NewVirus, NewVirusFamily,
    ReferenceConsole, ReferenceKind, RemoteError,
};
use epiwatch::session::{Session, SessionStore};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "epiwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pandemic dashboard console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pandemic API URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known viruses
    Viruses,

    /// Monthly totals per virus
    Monthly {
        /// Print CSV instead of a table
        #[arg(long)]
        csv: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Share of each virus in total cases
    Shares,

    /// Share of each continent for one virus
    Continents {
        #[arg(short, long)]
        virus: Option<String>,
    },

    /// Map buckets for one virus and day
    Map {
        #[arg(short, long)]
        virus: Option<String>,
        /// Day (YYYY-MM-DD); unknown days fall back to the first one
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Country ranking for one virus and day
    Countries {
        #[arg(short, long)]
        virus: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        /// Filter on country code or name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Drill-down for one country
    Country {
        /// ISO alpha-2 code
        code: String,
        #[arg(short, long)]
        virus: Option<String>,
    },

    /// Yearly evolution of one virus
    Evolution {
        #[arg(short, long)]
        virus: Option<String>,
    },

    /// Log in and store the token
    Login {
        username: String,
        /// Password (default: read from EPIWATCH_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Reference-data administration
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// List a collection (continents, countries, families, viruses, pandemics)
    List { kind: String },

    /// Add a continent
    AddContinent { name: String },

    /// Add a country
    AddCountry {
        #[arg(long)]
        continent_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        alpha2: String,
        #[arg(long)]
        numeric: String,
        #[arg(long)]
        alpha3: String,
    },

    /// Add a virus family
    AddFamily { name: String },

    /// Add a virus
    AddVirus {
        #[arg(long)]
        family_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        scientific_name: Option<String>,
    },

    /// Add a pandemic
    AddPandemic {
        #[arg(long)]
        virus_id: i64,
        #[arg(long)]
        disease: String,
        /// Start day (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("epiwatch=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => {
            let load = Config::load_default();
            load.log();
            load.config
        }
    };
    if let Some(url) = &cli.api_url {
        config.remote.base_url = url.clone();
    }

    let json = cli.format == "json";
    let client = Arc::new(ApiClient::new(config.remote_config())?);

    match cli.command {
        Commands::Viruses => {
            let snapshot = load_snapshot(&client, &config).await;
            if json {
                return print_json(&snapshot.viruses());
            }
            for virus in snapshot.viruses() {
                let marker = if snapshot.default_virus.as_deref() == Some(virus.as_str()) {
                    " (default)"
                } else {
                    ""
                };
                println!("{}{}", virus, marker);
            }
        }

        Commands::Monthly { csv, output } => {
            let snapshot = load_snapshot(&client, &config).await;
            let text = if csv {
                monthly_totals_csv(&snapshot.monthly)?
            } else if json {
                serde_json::to_string_pretty(&snapshot.monthly)?
            } else {
                monthly_table(&snapshot)
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, &text)?;
                    println!("Exported to {:?}", path);
                }
                None => print!("{}", text),
            }
        }

        Commands::Shares => {
            let snapshot = load_snapshot(&client, &config).await;
            print_shares(&snapshot.virus_shares, json)?;
        }

        Commands::Continents { virus } => {
            let dashboard = DashboardService::new(client.clone(), config.dashboard_config());
            let snapshot = refreshed(&dashboard).await;
            let virus = require_virus(&snapshot, virus.as_deref())?;
            let shares = dashboard.continent_shares(&virus).await;
            print_shares(&shares, json)?;
        }

        Commands::Map { virus, date } => {
            let snapshot = load_snapshot(&client, &config).await;
            let virus = require_virus(&snapshot, virus.as_deref())?;
            let Some(cursor) = snapshot.date_cursor(&virus, parse_date(date.as_deref())?) else {
                bail!("No data for {}", virus);
            };
            let layer = snapshot.map_layer(&virus, cursor.current());
            if json {
                return print_json(&layer);
            }

            println!("{} on {} ({} to {})", virus, cursor.current(), cursor.first(), cursor.last());
            println!("{:<6} {:>12}  {}", "Code", "Cases", "Bucket");
            println!("{}", "-".repeat(34));
            for (code, cell) in &layer {
                println!("{:<6} {:>12}  {:?}", code, cell.cases, cell.bucket);
            }
            println!();
            for entry in ChoroplethBucket::legend() {
                println!("  {} {}", entry.color, entry.label);
            }
        }

        Commands::Countries {
            virus,
            date,
            search,
        } => {
            let snapshot = load_snapshot(&client, &config).await;
            let virus = require_virus(&snapshot, virus.as_deref())?;
            let Some(cursor) = snapshot.date_cursor(&virus, parse_date(date.as_deref())?) else {
                bail!("No data for {}", virus);
            };
            let ranking = snapshot.country_ranking(&virus, cursor.current(), search.as_deref());
            if json {
                return print_json(&ranking);
            }

            println!("{} on {}", virus, cursor.current());
            println!("{:<6} {:<24} {:>12} {:>8}", "Code", "Name", "Cases", "%");
            println!("{}", "-".repeat(53));
            for entry in &ranking {
                println!(
                    "{:<6} {:<24} {:>12} {:>7.1}%",
                    entry.label,
                    snapshot.country_name(&entry.label).unwrap_or("-"),
                    entry.value,
                    entry.percent_of_total
                );
            }
        }

        Commands::Country { code, virus } => {
            let dashboard = DashboardService::new(client.clone(), config.dashboard_config());
            let snapshot = refreshed(&dashboard).await;
            let virus = require_virus(&snapshot, virus.as_deref())?;
            let detail = dashboard.country_detail(&code, &virus).await;
            if json {
                return print_json(&*detail);
            }

            let name = snapshot.country_name(&detail.country_code).unwrap_or("-");
            println!("{} ({}) - {}", detail.country_code, name, detail.virus);
            if let Some(population) = detail.population {
                println!("Population: {}", population);
            }
            if let Some(latest) = detail.latest() {
                println!(
                    "Latest ({}): {} cases, {} deaths, {} recovered",
                    latest.date, latest.cases, latest.deaths, latest.recovered
                );
            }
            println!(
                "Projection: next {} ({}, growth {:.1}%)",
                detail.projection.projected_next_value,
                detail.projection.trend_direction,
                detail.projection.growth_rate * 100.0
            );
        }

        Commands::Evolution { virus } => {
            let snapshot = load_snapshot(&client, &config).await;
            let virus = require_virus(&snapshot, virus.as_deref())?;
            let years = snapshot.evolution(&virus);
            if json {
                return print_json(&years);
            }

            println!("{:<6} {:>14} {:>10}", "Year", "Cases", "Change");
            println!("{}", "-".repeat(32));
            for year in years {
                let change = year
                    .change_percent
                    .map(|p| format!("{:+.1}%", p))
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<6} {:>14} {:>10}", year.year, year.cases, change);
            }
        }

        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => std::env::var("EPIWATCH_PASSWORD")
                    .context("Pass --password or set EPIWATCH_PASSWORD")?,
            };

            match client.login(&username, &password).await {
                Ok(token) => {
                    let store = SessionStore::default_location()?;
                    store.save(&Session::new(&username, token.access_token, token.token_type))?;
                    println!("Logged in as {}", username);
                }
                Err(RemoteError::Unauthorized) => bail!("Invalid credentials"),
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Logout => {
            SessionStore::default_location()?.clear()?;
            println!("Logged out");
        }

        Commands::Admin { action } => admin(client.as_ref(), action, json).await?,

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

async fn admin(console: &dyn ReferenceConsole, action: AdminCommand, json: bool) -> anyhow::Result<()> {
    let item = match action {
        AdminCommand::List { kind } => {
            let kind: ReferenceKind = kind.parse()?;
            let items = console.list(kind).await?;
            if json {
                return print_json(&items);
            }
            println!("{:<6} {}", "ID", "Name");
            println!("{}", "-".repeat(40));
            for item in &items {
                let (id, name) = item.summary();
                println!("{:<6} {}", id, name);
            }
            return Ok(());
        }
        AdminCommand::AddContinent { name } => NewReferenceItem::Continent(NewContinent { name }),
        AdminCommand::AddCountry {
            continent_id,
            name,
            alpha2,
            numeric,
            alpha3,
        } => NewReferenceItem::Country(NewCountry {
            continent_id,
            name,
            alpha2: alpha2.to_uppercase(),
            numeric,
            alpha3: alpha3.to_uppercase(),
        }),
        AdminCommand::AddFamily { name } => NewReferenceItem::Family(NewVirusFamily { name }),
        AdminCommand::AddVirus {
            family_id,
            name,
            scientific_name,
        } => NewReferenceItem::Virus(NewVirus {
            family_id,
            name,
            scientific_name,
        }),
        AdminCommand::AddPandemic {
            virus_id,
            disease,
            start,
            end,
            description,
        } => NewReferenceItem::Pandemic(NewPandemic {
            virus_id,
            started_on: parse_date(Some(start.as_str()))?.context("--start is required")?,
            ended_on: parse_date(end.as_deref())?,
            description,
            disease_name: disease,
        }),
    };

    item.validate()?;

    let Some(session) = SessionStore::default_location()?.load()? else {
        bail!("Not logged in. Run `epiwatch login <username>` first");
    };

    match console.create(&session.token, &item).await {
        Ok(created) => {
            if json {
                return print_json(&created);
            }
            let (id, name) = created.summary();
            println!("Created {} #{}: {}", item.kind(), id, name);
            Ok(())
        }
        Err(RemoteError::Unauthorized) => {
            bail!("Session rejected. Run `epiwatch login <username>` again")
        }
        Err(e) => Err(e.into()),
    }
}

async fn load_snapshot(client: &Arc<ApiClient>, config: &Config) -> Arc<DashboardSnapshot> {
    let dashboard = DashboardService::new(client.clone(), config.dashboard_config());
    refreshed(&dashboard).await
}

async fn refreshed(dashboard: &DashboardService) -> Arc<DashboardSnapshot> {
    let report = dashboard.refresh().await;
    for source in &report.failed_sources {
        eprintln!("warning: could not fetch {}", source);
    }
    dashboard.snapshot().await
}

fn require_virus(snapshot: &DashboardSnapshot, requested: Option<&str>) -> anyhow::Result<String> {
    snapshot
        .resolve_virus(requested)
        .context("No virus data available")
}

fn parse_date(raw: Option<&str>) -> anyhow::Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) => match parse_day(s) {
            Some(day) => Ok(Some(day)),
            None => bail!("Invalid date: {}. Use YYYY-MM-DD", s),
        },
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_shares(shares: &[ShareEntry], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(shares);
    }
    println!("{:<24} {:>14} {:>8}", "Label", "Value", "%");
    println!("{}", "-".repeat(48));
    for entry in shares {
        println!(
            "{:<24} {:>14} {:>7.1}%",
            entry.label, entry.value, entry.percent_of_total
        );
    }
    Ok(())
}

fn monthly_table(snapshot: &DashboardSnapshot) -> String {
    let viruses = snapshot.viruses();
    let mut out = format!("{:<8}", "Month");
    for virus in &viruses {
        out.push_str(&format!(" | {:>12}", virus));
    }
    out.push('\n');
    out.push_str(&"-".repeat(8 + viruses.len() * 15));
    out.push('\n');

    for row in &snapshot.monthly {
        out.push_str(&format!("{:<8}", row.month));
        for virus in &viruses {
            let total = row.per_virus_total.get(virus).copied().unwrap_or(0);
            out.push_str(&format!(" | {:>12}", total));
        }
        out.push('\n');
    }
    out
}
