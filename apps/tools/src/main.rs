use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use futures::future::try_join_all;
use shared::{
    domain::{PipelineStatus, UserId},
    protocol::{ArtworkFields, ArtworkFilter},
};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://artconnect.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a profile; an existing display name returns its user_id.
    CreateProfile {
        display_name: String,
    },
    /// Fill a profile's board with sample artworks spread over every column.
    Seed {
        user_id: i64,
        #[arg(long, default_value_t = 8)]
        count: usize,
    },
    List {
        user_id: i64,
        #[arg(long)]
        status: Option<PipelineStatus>,
        #[arg(long, default_value_t = 500)]
        limit: u32,
    },
}

const SAMPLE_MEDIUMS: [&str; 4] = ["oil", "watercolor", "charcoal", "linocut"];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateProfile { display_name } => {
            let profile = storage.create_profile(&display_name).await?;
            println!("user_id={}", profile.user_id);
        }
        Command::Seed { user_id, count } => {
            let user_id = UserId(user_id);
            if storage.load_profile(user_id).await?.is_none() {
                bail!("no profile with user_id={user_id}");
            }
            let inserts = (0..count).map(|n| {
                let status = PipelineStatus::ALL[n % PipelineStatus::ALL.len()];
                let mut fields = ArtworkFields::new(
                    format!("Study {}", n + 1),
                    SAMPLE_MEDIUMS[n % SAMPLE_MEDIUMS.len()],
                    status,
                );
                fields.price = Some(150.0 * (n as f64 + 1.0));
                let storage = &storage;
                async move { storage.insert_artwork(user_id, &fields).await }
            });
            let created = try_join_all(inserts).await?;
            info!(user_id = user_id.0, count = created.len(), "seeded artworks");
            println!("seeded {} artworks for user_id={user_id}", created.len());
        }
        Command::List {
            user_id,
            status,
            limit,
        } => {
            let records = storage
                .list_artworks_for_user(UserId(user_id), &ArtworkFilter { status }, limit)
                .await?;
            for record in records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.id, record.status, record.title, record.medium
                );
            }
        }
    }

    Ok(())
}
