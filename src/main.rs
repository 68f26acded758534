mod chunk;
mod convert;
mod dom;
mod error;
mod notion;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use chunk::UploadPlan;
use convert::Document;
use notion::NotionClient;
use settings::Settings;

#[derive(Parser)]
#[command(name = "notion_importer", about = "Convert an HTML article into Notion blocks and import it")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// HTML file holding the article
    file: PathBuf,
    /// Base URL for root-relative links (default: NOTION_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,
    /// CSS selector of the article container (default: NOTION_CONTENT_SELECTOR)
    #[arg(long)]
    selector: Option<String>,
    /// Emit empty h1/h2 headings instead of dropping them
    #[arg(long)]
    keep_empty_headings: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the converted document as JSON
    Convert {
        #[command(flatten)]
        source: SourceArgs,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Show how the blocks would be split across API calls
    Plan {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Create a Notion page under NOTION_ROOT_PAGE_ID and upload the article
    Import {
        #[command(flatten)]
        source: SourceArgs,
        /// Convert and plan only, without calling the API
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Convert { source, pretty } => {
            let doc = load_document(&mut settings, &source)?;
            let out = if pretty {
                serde_json::to_string_pretty(&doc)?
            } else {
                serde_json::to_string(&doc)?
            };
            println!("{}", out);
            Ok(())
        }
        Commands::Plan { source } => {
            let doc = load_document(&mut settings, &source)?;
            let plan = UploadPlan::new(doc.blocks, settings.chunk_limit()?);
            print_plan(&doc.title, &plan);
            Ok(())
        }
        Commands::Import { source, dry_run } => {
            let doc = load_document(&mut settings, &source)?;
            let plan = UploadPlan::new(doc.blocks, settings.chunk_limit()?);
            if dry_run {
                print_plan(&doc.title, &plan);
                return Ok(());
            }
            import(&settings, &doc.title, &plan).await
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Apply CLI overrides, read the file and convert it.
fn load_document(settings: &mut Settings, source: &SourceArgs) -> anyhow::Result<Document> {
    if let Some(base_url) = &source.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(selector) = &source.selector {
        settings.content_selector = selector.clone();
    }
    if source.keep_empty_headings {
        settings.keep_empty_headings = true;
    }

    let html = std::fs::read_to_string(&source.file)
        .with_context(|| format!("Failed to read {}", source.file.display()))?;
    let doc = convert::convert_html(&html, &settings.content_selector, &settings.convert_options())
        .with_context(|| format!("Conversion of {} aborted", source.file.display()))?;

    if !doc.has_title() {
        warn!("No h1 found; page will be titled {:?}", doc.title);
    }
    info!("Converted {} into {} blocks", source.file.display(), doc.blocks.len());
    Ok(doc)
}

async fn import(settings: &Settings, title: &str, plan: &UploadPlan) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let (secret, root_page_id) = settings.credentials()?;
    let client = NotionClient::new(&settings.api_url, secret)?;

    let page = client
        .create_page(root_page_id, title, &plan.initial)
        .await
        .context("Failed to create page")?;
    info!("Created page {} with {} blocks", page.id, plan.initial.len());

    let pb = ProgressBar::new(plan.appends.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} chunks ({eta})")?
            .progress_chars("=> "),
    );

    // Chunks must land in order; each one is retried whole inside the client.
    for (i, chunk) in plan.appends.iter().enumerate() {
        client
            .append_children(&page.id, chunk)
            .await
            .with_context(|| {
                format!("Failed to append chunk {}/{} to page {}", i + 1, plan.appends.len(), page.id)
            })?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "Imported \"{}\" ({} blocks, {} calls): {}",
        title,
        plan.total_blocks(),
        plan.calls(),
        page.url.as_deref().unwrap_or(&page.id)
    );
    Ok(())
}

fn print_plan(title: &str, plan: &UploadPlan) {
    println!("Title:  {}", title);
    println!("Blocks: {}", plan.total_blocks());
    println!("{:>5} | {:<8} | {:>6}", "#", "Call", "Blocks");
    println!("{}", "-".repeat(26));
    println!("{:>5} | {:<8} | {:>6}", 1, "create", plan.initial.len());
    for (i, chunk) in plan.appends.iter().enumerate() {
        println!("{:>5} | {:<8} | {:>6}", i + 2, "append", chunk.len());
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
