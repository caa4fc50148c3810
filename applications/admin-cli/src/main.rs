/// SFSCON Admin - conference dashboard on the command line
mod config;
mod render;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crate::config::AdminConfig;
use sfscon_admin_client::{AdminClient, AttendeeRow, FileTokenStorage, Session, SortSpec, TalkRow};
use sfscon_admin_views::{
    AuthGuard, BannerKind, Dashboard, Link, ListEntity, ListViewController, Navigation, Route,
    ViewQuery,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sfscon-admin")]
#[command(about = "SFSCON conference admin dashboard", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Admin API base URL
    #[arg(long, global = true, env = "SFSCON_ADMIN_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Password (read from stdin when omitted)
        #[arg(short, long, env = "SFSCON_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show whether a session token is stored
    Status,
    /// Show summary counters and the last sync time
    Summary,
    /// List attendees
    Attendees(ListArgs),
    /// List talks
    Talks(ListArgs),
    /// Download a CSV export
    Export {
        /// Which list to export
        #[arg(value_enum)]
        list: ExportList,
        #[command(flatten)]
        args: ListArgs,
        /// Output directory (defaults to export.output_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Import the latest conference data on the server
    Sync,
    /// Open a dashboard link such as `/admin/talks?sort=-rates&search=rust`
    Open {
        /// Path with optional query, or a full URL
        link: String,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Sort field, prefixed with `-` for descending
    #[arg(short, long, allow_hyphen_values = true)]
    sort: Option<String>,
    /// Case-insensitive search term
    #[arg(long)]
    search: Option<String>,
}

impl ListArgs {
    fn to_query(&self) -> ViewQuery {
        let sort = self.sort.as_deref().and_then(SortSpec::parse);
        ViewQuery::new()
            .with_sort(sort.as_ref())
            .with_search(self.search.as_deref().unwrap_or_default())
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportList {
    Attendees,
    Talks,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sfscon_admin=info,sfscon_admin_client=info,sfscon_admin_views=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AdminConfig::load(cli.config.as_deref())?.with_base_url(cli.api_url);
    config.validate()?;

    let storage = Arc::new(FileTokenStorage::new(&config.session.data_dir));
    let session = Arc::new(Session::hydrate(storage).await);
    let client = AdminClient::new(config.client_config(), session)?;
    tracing::debug!(url = client.url(), "Using admin API");

    match cli.command {
        Commands::Login { username, password } => {
            login(client, &config, &username, password).await?;
        }
        Commands::Logout => {
            client.logout().await;
            println!("Logged out");
        }
        Commands::Status => {
            status(&client);
        }
        Commands::Summary => {
            open(client, &config, Link::new(Route::Admin)).await?;
        }
        Commands::Attendees(args) => {
            open(client, &config, Link::with_query(Route::Attendees, args.to_query())).await?;
        }
        Commands::Talks(args) => {
            open(client, &config, Link::with_query(Route::Talks, args.to_query())).await?;
        }
        Commands::Export { list, args, out } => {
            let dest = out.unwrap_or_else(|| config.export.output_dir.clone());
            let query = args.to_query();
            match list {
                ExportList::Attendees => {
                    export::<AttendeeRow>(&client, &config, &query, dest).await?;
                }
                ExportList::Talks => {
                    export::<TalkRow>(&client, &config, &query, dest).await?;
                }
            }
        }
        Commands::Sync => {
            sync(client, &config).await?;
        }
        Commands::Open { link } => {
            let link = Link::parse(&link)?;
            open(client, &config, link).await?;
        }
    }

    Ok(())
}

async fn login(
    client: AdminClient,
    config: &AdminConfig,
    username: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    let mut dashboard = Dashboard::new(client, config.export_policy());
    if !dashboard.login(username, &password).await {
        bail!("Login failed");
    }

    println!("Logged in as {username}");
    Ok(())
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn status(client: &AdminClient) {
    let state = if client.session().is_logged_in() {
        "logged in"
    } else {
        "logged out"
    };
    println!("{} ({state})", client.url());
}

/// Navigate to `link` and print what it shows.
async fn open(client: AdminClient, config: &AdminConfig, link: Link) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new(client, config.export_policy());
    let shown = dashboard.navigate(link).await.clone();

    match shown.route {
        Route::Login => bail!("Not logged in, run `sfscon-admin login` first"),
        Route::Admin => {
            print!(
                "{}",
                render::overview(dashboard.summary(), dashboard.last_sync_time())
            );
        }
        Route::Attendees => print_view(dashboard.attendees())?,
        Route::Talks => print_view(dashboard.talks())?,
    }

    Ok(())
}

fn print_view<E: ListEntity>(view: &ListViewController<E>) -> anyhow::Result<()> {
    if let Some(failure) = view.last_error() {
        bail!("Failed to load {}: {}", E::KIND.label(), failure.message);
    }
    print!("{}", render::table(view, render::DEFAULT_WIDTH));
    Ok(())
}

async fn sync(client: AdminClient, config: &AdminConfig) -> anyhow::Result<()> {
    require_login(&client)?;

    let mut dashboard = Dashboard::new(client, config.export_policy());
    let banner = dashboard.sync().await.clone();
    println!("{}", render::banner(&banner));

    if banner.kind == BannerKind::Error {
        bail!("Sync failed");
    }

    println!("{}", render::last_sync(dashboard.last_sync_time()));
    Ok(())
}

async fn export<E: ListEntity>(
    client: &AdminClient,
    config: &AdminConfig,
    query: &ViewQuery,
    dest: PathBuf,
) -> anyhow::Result<()> {
    require_login(client)?;

    tokio::fs::create_dir_all(&dest)
        .await
        .with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut view = ListViewController::<E>::with_query(config.export_policy(), query);
    let saved = view
        .export(client, &dest)
        .await
        .with_context(|| format!("Error downloading {} CSV", E::KIND.label()))?;

    println!("Saved {}", saved.display());
    Ok(())
}

fn require_login(client: &AdminClient) -> anyhow::Result<()> {
    match AuthGuard::new(client.session().clone()).can_activate(Route::Admin) {
        Navigation::Proceed => Ok(()),
        Navigation::Redirect(_) => bail!("Not logged in, run `sfscon-admin login` first"),
    }
}
