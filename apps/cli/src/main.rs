use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use pipeline_core::{
    Board, DropTarget, HttpArtworkBackend, LocalItemId, PipelineClient, PipelineOptions,
    ReconcileMode, SessionState,
};
use shared::{
    domain::{ArtworkId, PipelineStatus, UserId},
    protocol::{ArtworkFields, ArtworkPatch},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "artconnect", about = "Artwork pipeline board")]
struct Args {
    #[arg(long, env = "ARTCONNECT_SERVER_URL", default_value = "http://127.0.0.1:8443")]
    server_url: String,
    #[arg(long, env = "ARTCONNECT_USER_ID")]
    user_id: Option<i64>,
    #[arg(long, value_enum, default_value_t = Reconcile::Resync)]
    reconcile: Reconcile,
    /// Per-request timeout; unset means no timeout.
    #[arg(long)]
    request_timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Reconcile {
    Resync,
    Revert,
}

impl From<Reconcile> for ReconcileMode {
    fn from(value: Reconcile) -> Self {
        match value {
            Reconcile::Resync => ReconcileMode::FullResync,
            Reconcile::Revert => ReconcileMode::RevertIntent,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a profile, or return the existing one with this display name.
    ///
    /// Display names are unique: signing up with a name that is already
    /// taken yields that profile's user id and board.
    Signup {
        #[arg(long)]
        display_name: String,
    },
    Board {
        #[arg(long)]
        json: bool,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        medium: String,
        #[arg(long, default_value = "concept")]
        status: PipelineStatus,
        #[command(flatten)]
        details: Details,
    },
    Edit {
        artwork_id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        medium: Option<String>,
        #[arg(long)]
        status: Option<PipelineStatus>,
        #[command(flatten)]
        details: Details,
        /// Remove a stored value; may be repeated.
        #[arg(long, value_enum)]
        clear: Vec<ClearField>,
    },
    /// Drag an artwork into another column, optionally in front of another card.
    Move {
        artwork_id: i64,
        #[arg(long, required_unless_present = "before")]
        to: Option<PipelineStatus>,
        #[arg(long)]
        before: Option<i64>,
    },
    /// Reorder within a column. Local only; the order is not stored.
    Reorder {
        artwork_id: i64,
        #[arg(long)]
        before: i64,
    },
    Delete {
        artwork_id: i64,
    },
    Summary {
        /// Reference date for overdue items, defaults to today (UTC).
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ClearField {
    Price,
    DueDate,
    Description,
    ImageUrl,
}

#[derive(ClapArgs, Debug)]
struct Details {
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    due_date: Option<NaiveDate>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let backend = match args.request_timeout_secs {
        Some(secs) => HttpArtworkBackend::with_timeout(&args.server_url, Duration::from_secs(secs))?,
        None => HttpArtworkBackend::new(&args.server_url)?,
    };

    if let Command::Signup { display_name } = &args.command {
        let profile = backend.create_profile(display_name).await?;
        println!(
            "profile user_id={} display_name={}",
            profile.user_id, profile.display_name
        );
        return Ok(());
    }

    let user_id = args
        .user_id
        .map(UserId)
        .context("--user-id (or ARTCONNECT_USER_ID) is required")?;
    let client = PipelineClient::new_with_options(
        Arc::new(backend),
        PipelineOptions {
            reconcile_mode: args.reconcile.into(),
            ..PipelineOptions::default()
        },
    );
    match client.begin_session(user_id).await? {
        SessionState::Ready { profile } => debug!(user_id = profile.user_id.0, "session ready"),
        SessionState::NoProfile { .. } => {
            bail!("user {user_id} has no profile; run `artconnect signup` first")
        }
        other => bail!("session did not become ready ({})", other.label()),
    }

    match args.command {
        Command::Signup { .. } => {}
        Command::Board { json } => {
            let board = client.board().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&render::board_json(&board))?);
            } else {
                print!("{}", render::board_text(&board));
            }
        }
        Command::Add {
            title,
            medium,
            status,
            details,
        } => {
            let fields = ArtworkFields {
                price: details.price,
                due_date: details.due_date,
                description: details.description,
                image_url: details.image_url,
                ..ArtworkFields::new(title, medium, status)
            };
            let item = client.create_item(fields).await?;
            let board = client.board().await;
            if let Some(entry) = board.item(item) {
                println!("{}", render::item_line(status, entry));
            }
        }
        Command::Edit {
            artwork_id,
            title,
            medium,
            status,
            details,
            clear,
        } => {
            let patch = ArtworkPatch {
                title,
                medium,
                price: edited(details.price, clear.contains(&ClearField::Price)),
                due_date: edited(details.due_date, clear.contains(&ClearField::DueDate)),
                description: edited(
                    details.description,
                    clear.contains(&ClearField::Description),
                ),
                image_url: edited(details.image_url, clear.contains(&ClearField::ImageUrl)),
                status,
            };
            if patch.is_empty() {
                bail!("nothing to change");
            }
            let item = lookup(&client.board().await, artwork_id)?;
            client.update_item(item, patch).await?;
            let board = client.board().await;
            if let (Some(status), Some(entry)) = (board.find_column(item), board.item(item)) {
                println!("{}", render::item_line(status, entry));
            }
        }
        Command::Move {
            artwork_id,
            to,
            before,
        } => {
            let board = client.board().await;
            let item = lookup(&board, artwork_id)?;
            let target = match (before, to) {
                (Some(other), _) => DropTarget::Item(lookup(&board, other)?),
                (None, Some(status)) => DropTarget::Column(status),
                (None, None) => bail!("either --to or --before is required"),
            };
            drag(&client, item, target).await?;
        }
        Command::Reorder { artwork_id, before } => {
            let board = client.board().await;
            let item = lookup(&board, artwork_id)?;
            let other = lookup(&board, before)?;
            if board.find_column(item) != board.find_column(other) {
                bail!("artworks {artwork_id} and {before} are in different columns; use `move`");
            }
            drag(&client, item, DropTarget::Item(other)).await?;
        }
        Command::Delete { artwork_id } => {
            let item = lookup(&client.board().await, artwork_id)?;
            client.delete_item(item).await?;
            println!("deleted artwork_id={artwork_id}");
        }
        Command::Summary { today } => {
            let today = today.unwrap_or_else(|| Utc::now().date_naive());
            let summary = client.summary(today).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

async fn drag(client: &PipelineClient, item: LocalItemId, target: DropTarget) -> Result<()> {
    if !client.drag_start(item).await {
        bail!("artwork is no longer on the board");
    }
    client.drag_over(item, target).await;
    let report = client.drag_end(item, Some(target)).await?;
    println!("{}", render::drop_report(&report));
    Ok(())
}

/// A new value wins over `--clear`; neither leaves the field untouched.
fn edited<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    match (value, clear) {
        (Some(value), _) => Some(Some(value)),
        (None, true) => Some(None),
        (None, false) => None,
    }
}

fn lookup(board: &Board, artwork_id: i64) -> Result<LocalItemId> {
    board
        .find_by_remote(ArtworkId(artwork_id))
        .ok_or_else(|| anyhow!("artwork {artwork_id} is not on this board"))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
