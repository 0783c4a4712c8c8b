//! EventPro CLI
//!
//! Offline administration of the site document. Works directly on the
//! configured stores, so it does not need the server to be running:
//! - Inspect, export and import the document
//! - Check legacy files for pending upgrades
//! - Moderate testimonials and submit reviews
//! - Manage albums, highlights and contact details

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use eventpro::admin::{ops, ContactUpdate, ImageSource, NewAlbum, ReviewInput};
use eventpro::config::{generate_default_config, Config};
use eventpro::content::{
    migrate, pending_steps, reconcile, ContentStore, SaveReport, WriteOutcome,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "eventpro-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage EventPro site content")]
#[command(long_about = "Reads and edits the EventPro site document.\nUses the same configuration as the server: remote table first, local store as fallback.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show info-level logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the current document (or one section) as JSON
    Show {
        /// Top-level section, e.g. hero, contact, gallery
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Show store policy and state
    Status,

    /// Export the document
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a document file (any stored shape) and save it
    Import {
        path: PathBuf,
    },

    /// Upgrade a legacy document file
    Migrate {
        path: PathBuf,
        /// Only list the upgrades the file needs; exits non-zero if any
        #[arg(long)]
        check: bool,
    },

    /// Moderate testimonials
    Testimonials {
        #[command(subcommand)]
        action: TestimonialAction,
    },

    /// Visitor reviews
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// Gallery albums
    Album {
        #[command(subcommand)]
        action: AlbumAction,
    },

    /// Recent highlights
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },

    /// Contact details
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },

    /// Drop the local copy so the next read comes from the remote table
    ForceResync,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TestimonialAction {
    /// List all testimonials with their index
    List {
        /// Only pending reviews
        #[arg(long)]
        pending: bool,
    },
    /// Publish a pending review
    Approve { index: usize },
    /// Discard a review or testimonial
    Reject { index: usize },
}

#[derive(Subcommand)]
pub enum ReviewAction {
    /// Queue a review for moderation
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "5")]
        rating: i64,
        #[arg(long)]
        text: String,
    },
}

#[derive(Subcommand)]
pub enum AlbumAction {
    /// List albums
    List,
    /// Create an album
    Create {
        #[arg(long)]
        title: String,
        /// Cover image URL
        #[arg(long)]
        cover_url: Option<String>,
        /// Cover image file, embedded in the document
        #[arg(long)]
        cover_file: Option<PathBuf>,
        #[arg(long)]
        subtitle: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove an album by id
    Remove { id: String },
    /// Add an image to an album
    AddImage {
        id: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum GalleryAction {
    /// Replace recent highlights with the stock images
    Reset,
}

#[derive(Subcommand)]
pub enum ContactAction {
    /// Change contact details; omitted fields are kept
    Set {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::load_default(),
    };

    let mut logging = config.logging.clone();
    if !cli.verbose {
        logging.level = "warn".to_string();
    }
    eventpro::logging::init(&logging)?;

    // Commands that do not touch the stores
    match &cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(path, content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
            return Ok(());
        }
        Commands::Migrate { path, check } => {
            return run_migrate(path, *check);
        }
        _ => {}
    }

    let store = config.open_store()?;

    match cli.command {
        Commands::Show { section } => {
            let outcome = store.load_with_source().await;
            eprintln!("Source: {:?}", outcome.source);
            for step in &outcome.migrations {
                eprintln!("Upgraded: {}", step);
            }

            let value = outcome.document.to_value()?;
            let value = match section {
                Some(section) => match value.get(&section) {
                    Some(part) => part.clone(),
                    None => bail!("No section named '{}'", section),
                },
                None => value,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }

        Commands::Status => {
            let status = store.status().await;

            println!("EventPro v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Policy: {:?}", status.policy);
            match &status.remote {
                Some(remote) => {
                    println!("Remote: {}", remote.location);
                    match &remote.error {
                        None => println!("  Connected"),
                        Some(error) => println!("  Unavailable: {}", error),
                    }
                }
                None => println!("Remote: disabled"),
            }
            println!();
            println!("Local:");
            if let Some(path) = &status.local_path {
                println!("  Path: {}", path.display());
            }
            match status.local_bytes {
                Some(bytes) => println!(
                    "  Size: {} of {} bytes",
                    bytes, status.local_quota_bytes
                ),
                None => println!("  No local copy"),
            }
            if status.legacy_gallery_present {
                println!("  Legacy gallery entry present");
            }
        }

        Commands::Export { output } => {
            let document = store.load().await;
            let json = serde_json::to_string_pretty(&document)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Exported to {:?}", path);
                }
                None => println!("{}", json),
            }
        }

        Commands::Import { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            let (document, migrations) = reconcile(value)?;
            for step in &migrations {
                println!("Upgraded: {}", step);
            }
            let report = store.save(&document).await;
            print_report(&report);
        }

        Commands::Migrate { .. } | Commands::Config { .. } => {}

        Commands::Testimonials { action } => run_testimonials(&store, action).await?,

        Commands::Review {
            action:
                ReviewAction::Submit {
                    name,
                    email,
                    rating,
                    text,
                },
        } => {
            let input = ReviewInput {
                name,
                email,
                rating,
                text,
            };
            let now = Utc::now();
            let ((), report) = store
                .update(|doc| ops::submit_review(doc, &input, now))
                .await?;
            println!("Review queued for moderation");
            print_report(&report);
        }

        Commands::Album { action } => run_album(&store, action).await?,

        Commands::Gallery {
            action: GalleryAction::Reset,
        } => {
            let ((), report) = store
                .update(|doc| {
                    ops::reset_gallery(doc);
                    Ok::<_, anyhow::Error>(())
                })
                .await?;
            println!("Recent highlights reset");
            print_report(&report);
        }

        Commands::Contact {
            action: ContactAction::Set {
                address,
                phone,
                email,
            },
        } => {
            let ((), report) = store
                .update(|doc| {
                    let current = doc.contact.clone();
                    ops::update_contact(
                        doc,
                        ContactUpdate {
                            address: address.unwrap_or(current.address),
                            phone: phone.unwrap_or(current.phone),
                            email: email.unwrap_or(current.email),
                        },
                    );
                    Ok::<_, anyhow::Error>(())
                })
                .await?;
            println!("Contact details updated");
            print_report(&report);
        }

        Commands::ForceResync => {
            if store.force_resync().await? {
                println!("Local copy removed; next read comes from the remote table");
            } else {
                println!("No local copy to remove");
            }
        }
    }

    Ok(())
}

fn run_migrate(path: &Path, check: bool) -> anyhow::Result<()> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&raw)?;

    if check {
        let steps = pending_steps(&value);
        if steps.is_empty() {
            println!("Up to date");
            return Ok(());
        }
        for step in &steps {
            println!("Needs: {}", step);
        }
        bail!("{} upgrade(s) pending", steps.len());
    }

    let steps = migrate(&mut value);
    for step in &steps {
        eprintln!("Upgraded: {}", step);
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn run_testimonials(store: &ContentStore, action: TestimonialAction) -> anyhow::Result<()> {
    match action {
        TestimonialAction::List { pending } => {
            let document = store.load().await;

            println!("{:<6} {:<10} {:<24} {:<10} {}", "Index", "Status", "Name", "Date", "Quote");
            println!("{}", "-".repeat(80));

            for (index, t) in document.testimonials.iter().enumerate() {
                if pending && t.is_approved() {
                    continue;
                }
                let status = if t.is_approved() { "approved" } else { "pending" };
                println!(
                    "{:<6} {:<10} {:<24} {:<10} {}",
                    index,
                    status,
                    truncate(&t.name, 24),
                    truncate(&t.date, 10),
                    truncate(&t.quote, 40)
                );
            }
        }
        TestimonialAction::Approve { index } => {
            let ((), report) = store
                .update(|doc| ops::approve_testimonial(doc, index))
                .await?;
            println!("Testimonial {} approved", index);
            print_report(&report);
        }
        TestimonialAction::Reject { index } => {
            let (removed, report) = store
                .update(|doc| ops::reject_testimonial(doc, index))
                .await?;
            println!("Removed testimonial from {}", removed.name);
            print_report(&report);
        }
    }
    Ok(())
}

async fn run_album(store: &ContentStore, action: AlbumAction) -> anyhow::Result<()> {
    match action {
        AlbumAction::List => {
            let document = store.load().await;
            if document.gallery.albums.is_empty() {
                println!("No albums yet.");
                println!();
                println!("Create one with:");
                println!("  eventpro-cli album create --title \"Beach Wedding\" --cover-url <url>");
            } else {
                println!("{:<22} {:<30} {}", "ID", "Title", "Images");
                println!("{}", "-".repeat(60));
                for album in &document.gallery.albums {
                    println!(
                        "{:<22} {:<30} {}",
                        album.id,
                        truncate(&album.title, 30),
                        album.images.len()
                    );
                }
            }
        }
        AlbumAction::Create {
            title,
            cover_url,
            cover_file,
            subtitle,
            description,
        } => {
            let cover_url =
                ImageSource::from_inputs(cover_url.as_deref(), cover_file.as_deref(), "cover")?
                    .resolve()
                    .await?;
            let input = NewAlbum {
                title,
                cover_url,
                subtitle,
                description,
                description_title: None,
            };
            let now = Utc::now();
            let (id, report) = store
                .update(|doc| ops::create_album(doc, input, now))
                .await?;
            println!("Created album {}", id);
            print_report(&report);
        }
        AlbumAction::Remove { id } => {
            let (album, report) = store
                .update(|doc| ops::remove_album_by_id(doc, &id))
                .await?;
            println!("Removed album '{}' ({} images)", album.title, album.images.len());
            print_report(&report);
        }
        AlbumAction::AddImage { id, url, file } => {
            let url = ImageSource::from_inputs(url.as_deref(), file.as_deref(), "image")?
                .resolve()
                .await?;
            let (index, report) = store
                .update(|doc| ops::add_album_image(doc, &id, &url))
                .await?;
            println!("Added image {} to album {}", index, id);
            print_report(&report);
        }
    }
    Ok(())
}

fn print_report(report: &SaveReport) {
    match &report.local {
        WriteOutcome::Written => println!("  Local:  saved"),
        WriteOutcome::Skipped => println!("  Local:  skipped"),
        WriteOutcome::Failed { error } => println!("  Local:  FAILED ({})", error),
    }
    match &report.remote {
        WriteOutcome::Written => println!("  Remote: saved"),
        WriteOutcome::Skipped => println!("  Remote: not configured"),
        WriteOutcome::Failed { error } => println!("  Remote: FAILED ({})", error),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
