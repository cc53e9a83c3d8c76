use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gazette_core::config_file;
use gazette_core::{
    Config, Confirm, Dashboard, DeleteOutcome, FormField, HttpBackend, Id, ImageUpload, Listing,
    LoadState,
};
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Gazette - browse and manage articles on a REST news backend
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Root of the REST API (env: GAZETTE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the front page: the featured article followed by the rest
    List {
        /// One line per article, as on the admin screen
        #[arg(long)]
        compact: bool,
    },

    /// Show one article in full
    Show { id: String },

    /// List the category and author choices accepted by create/edit
    Options,

    /// Create an article
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Category id
        #[arg(long)]
        category: String,
        /// Author (user) id
        #[arg(long)]
        author: String,
        /// Image file to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Edit an article; only the given fields change
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        author: Option<String>,
        /// Replace the image with this file
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Delete an article
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let config = resolve_config(cli.api_url, cli.config.as_deref())?;
    let color = ColorMode(!cli.no_color && std::io::stdout().is_terminal());
    let backend = HttpBackend::new(&config).context("invalid API configuration")?;
    tracing::debug!(base_url = backend.base_url(), "using backend");
    let mut dashboard = Dashboard::new(Arc::new(backend));

    match cli.command {
        Command::List { compact } => list(&mut dashboard, &config, compact, color).await,
        Command::Show { id } => show(&mut dashboard, &config, &Id::new(id), color).await,
        Command::Options => options(&mut dashboard, color).await,
        Command::Create {
            title,
            content,
            category,
            author,
            image,
        } => {
            dashboard.form.start_create();
            let fields = [
                (FormField::Title, Some(title)),
                (FormField::Content, Some(content)),
                (FormField::Category, Some(category)),
                (FormField::Author, Some(author)),
            ];
            submit(&mut dashboard, fields, image.as_deref(), color).await
        }
        Command::Edit {
            id,
            title,
            content,
            category,
            author,
            image,
        } => {
            load(&mut dashboard, color).await?;
            dashboard
                .edit(&Id::new(id))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let fields = [
                (FormField::Title, title),
                (FormField::Content, content),
                (FormField::Category, category),
                (FormField::Author, author),
            ];
            submit(&mut dashboard, fields, image.as_deref(), color).await
        }
        Command::Delete { id, yes } => delete(&mut dashboard, &Id::new(id), yes, color).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve configuration: CLI flags > env vars > config file > defaults
fn resolve_config(api_url: Option<String>, path: Option<&Path>) -> anyhow::Result<Config> {
    let file = match path {
        Some(path) => config_file::read_config(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => config_file::load_config(),
    };
    let mut config = Config::default().with_file(&file);
    if let Some(url) = api_url.or_else(|| std::env::var("GAZETTE_API_URL").ok()) {
        config.base_url = url;
    }
    Ok(config)
}

/// Load the directory, printing a warning for every fetch that failed.
async fn load(dashboard: &mut Dashboard, color: ColorMode) -> anyhow::Result<()> {
    let report = dashboard.load().await;
    output::print_load_warnings(&mut std::io::stderr(), &report, color)?;
    Ok(())
}

async fn list(
    dashboard: &mut Dashboard,
    config: &Config,
    compact: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    load(dashboard, color).await?;
    let directory = &dashboard.directory;
    if let LoadState::Failed(msg) = directory.state() {
        anyhow::bail!("{msg}");
    }

    let mut out = std::io::stdout().lock();
    if compact {
        match directory.listing(&config.labels.card) {
            Listing::Articles(views) => output::print_admin_rows(&mut out, &views, color)?,
            Listing::Failed(msg) => anyhow::bail!("{msg}"),
            Listing::Empty | Listing::Loading => writeln!(out, "{}", output::EMPTY_MESSAGE)?,
        }
        return Ok(());
    }
    match directory.front_page(&config.labels.featured, &config.labels.card) {
        Some(page) => output::print_front_page(&mut out, &page, color)?,
        None => writeln!(out, "{}", output::EMPTY_MESSAGE)?,
    }
    Ok(())
}

async fn show(
    dashboard: &mut Dashboard,
    config: &Config,
    id: &Id,
    color: ColorMode,
) -> anyhow::Result<()> {
    // Tables cover detail responses that carry bare ids.
    load(dashboard, color).await?;
    let view = dashboard
        .directory
        .detail(id, &config.labels.detail)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    output::print_detail(&mut std::io::stdout().lock(), &view, color)?;
    Ok(())
}

async fn options(dashboard: &mut Dashboard, color: ColorMode) -> anyhow::Result<()> {
    load(dashboard, color).await?;
    let directory = &dashboard.directory;
    output::print_options(
        &mut std::io::stdout().lock(),
        &directory.categories().options(),
        &directory.users().options(),
        color,
    )?;
    Ok(())
}

/// Overlay the given fields onto the form and submit it.
async fn submit(
    dashboard: &mut Dashboard,
    fields: [(FormField, Option<String>); 4],
    image: Option<&Path>,
    color: ColorMode,
) -> anyhow::Result<()> {
    for (field, value) in fields {
        if let Some(value) = value {
            dashboard.form.update_field(field, value);
        }
    }
    if let Some(path) = image {
        let upload = ImageUpload::from_path(path)
            .with_context(|| format!("failed to read image {}", path.display()))?;
        dashboard.form.select_image(upload);
    }

    tracing::debug!(heading = dashboard.form.heading(), "submitting form");
    let outcome = dashboard
        .submit()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    output::print_outcome(&mut std::io::stdout().lock(), &outcome, color)?;
    Ok(())
}

async fn delete(
    dashboard: &mut Dashboard,
    id: &Id,
    yes: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let outcome = if yes {
        dashboard.delete(id, &|_: &str| true).await
    } else {
        dashboard.delete(id, &StdinConfirm).await
    }
    .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match outcome {
        DeleteOutcome::Cancelled => eprintln!("Cancelled."),
        DeleteOutcome::Deleted(outcome) => {
            output::print_outcome(&mut std::io::stdout().lock(), &outcome, color)?
        }
    }
    Ok(())
}

/// Asks on stderr, reads the answer from stdin. Anything but `y`/`yes` declines.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = std::io::stderr();
        if write!(stderr, "{prompt} [y/N] ")
            .and_then(|_| stderr.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
