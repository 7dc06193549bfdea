use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::assets::TemplateAssets;
use folio::models::{AppConfig, InvoiceDocument, RenderOutcome};
use folio::rendering::SvgRasterizer;
use folio::services::{
    aggregate, ArtifactStore, BundledTemplateSource, DocumentRenderer, HttpTemplateSource,
    TemplateRegistry, TemplateSource,
};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Invoice document generation and financial aggregation")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an invoice record to a PDF document
    Render {
        /// Invoice record as JSON
        #[arg(short, long)]
        invoice: PathBuf,

        /// Template id to render with
        #[arg(short, long, default_value = "classic")]
        template: String,

        /// Output directory (overrides the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute a financial snapshot over an invoice collection
    Stats {
        /// Invoice collection as a JSON array
        #[arg(short, long)]
        invoices: PathBuf,

        /// Display currency for the aggregated amounts
        #[arg(short = 'u', long, default_value = "USD")]
        currency: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config);

    match cli.command {
        Commands::Render {
            invoice,
            template,
            output,
        } => render_command(config, &invoice, &template, output).await,
        Commands::Stats { invoices, currency } => stats_command(config, &invoices, &currency),
    }
}

async fn render_command(
    config: AppConfig,
    invoice_path: &PathBuf,
    template_id: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(invoice_path)
        .with_context(|| format!("reading invoice record {}", invoice_path.display()))?;
    let invoice: InvoiceDocument =
        serde_json::from_str(&json).context("parsing invoice record")?;

    let source: Box<dyn TemplateSource> = match &config.templates.base_url {
        Some(base_url) => Box::new(HttpTemplateSource::new(base_url.clone())),
        None => Box::new(BundledTemplateSource::new(TemplateAssets::new(
            config.templates.dir.clone(),
        ))),
    };
    let registry = Arc::new(TemplateRegistry::new(source));
    let rasterizer = Arc::new(SvgRasterizer::with_font_dir(
        config.templates.fonts_dir.as_deref(),
    ));
    let renderer = DocumentRenderer::new(&config, registry, rasterizer);

    let store = ArtifactStore::new(output.unwrap_or_else(|| config.output_dir.clone()));

    match renderer.render(template_id, &invoice).await {
        RenderOutcome::Success {
            artifact,
            page_count,
        } => {
            let path = store.save(&artifact).await?;
            println!("Rendered {} ({} page(s))", path.display(), page_count);
            Ok(())
        }
        RenderOutcome::Degraded { artifact, reason } => {
            let path = store.save(&artifact).await?;
            println!(
                "Rendered {} (simplified document: {})",
                path.display(),
                reason
            );
            Ok(())
        }
        RenderOutcome::Failed { reason } => {
            anyhow::bail!("rendering failed: {reason}")
        }
    }
}

fn stats_command(config: AppConfig, invoices_path: &PathBuf, currency: &str) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(invoices_path)
        .with_context(|| format!("reading invoice collection {}", invoices_path.display()))?;
    let invoices: Vec<InvoiceDocument> =
        serde_json::from_str(&json).context("parsing invoice collection")?;

    let table = config.rate_table();
    let snapshot = aggregate(&invoices, currency, &table);

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
