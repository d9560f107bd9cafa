use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use partcount::{
    CountOptions, Dataset, FeatureClassDocument, Settings, Workspace, count_multipart,
    count_multipart_in_workspace,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "partcount")]
#[command(about = "Count the parts of multipart features and store them in a field")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count multipart features in one feature class (<workspace>/<name>)
    Count {
        dataset: PathBuf,
        #[command(flatten)]
        count: CountArgs,
    },
    /// Count multipart features in every matching feature class of a workspace
    CountAll {
        workspace: PathBuf,
        #[arg(long)]
        wildcard: Option<String>,
        #[command(flatten)]
        count: CountArgs,
    },
    /// Create or replace a feature class from a JSON document
    Import { workspace: PathBuf, json: PathBuf },
    /// Print a feature class description as JSON
    Describe { dataset: PathBuf },
}

#[derive(Args)]
struct CountArgs {
    /// Output field name [env: PARTCOUNT_FIELD, default: PartCount]
    #[arg(long)]
    field: Option<String>,
    /// Replace the output field if it already exists
    #[arg(long)]
    overwrite: bool,
    /// Only report the number of multipart features
    #[arg(long)]
    report_only: bool,
}

impl CountArgs {
    fn options(&self, settings: &Settings) -> CountOptions {
        settings.count_options(self.field.as_deref(), self.overwrite, self.report_only)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("partcount=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Count { dataset, count } => {
            let report = count_multipart(&dataset, &count.options(&settings))
                .with_context(|| format!("failed to count parts in {}", dataset.display()))?;
            println!("{}", report);
        }
        Command::CountAll {
            workspace,
            wildcard,
            count,
        } => {
            let reports =
                count_multipart_in_workspace(&workspace, wildcard.as_deref(), &count.options(&settings))
                    .with_context(|| format!("failed to count parts in {}", workspace.display()))?;
            for report in reports {
                println!("{}: {}", report.dataset, report);
            }
        }
        Command::Import { workspace, json } => import(&workspace, &json)?,
        Command::Describe { dataset } => {
            let dataset = Dataset::open(&dataset)
                .with_context(|| format!("failed to open {}", dataset.display()))?;
            let describe = dataset.describe()?;
            println!("{}", serde_json::to_string_pretty(&describe)?);
        }
    }

    Ok(())
}

fn import(workspace: &Path, json: &Path) -> Result<()> {
    let text =
        fs::read_to_string(json).with_context(|| format!("failed to read {}", json.display()))?;
    let class = FeatureClassDocument::from_json(&text)
        .with_context(|| format!("invalid feature class document {}", json.display()))?
        .into_feature_class()?;

    let name = class.name().to_string();
    let rows = class.row_count();
    let mut ws = Workspace::open_or_create(workspace)
        .with_context(|| format!("failed to open workspace {}", workspace.display()))?;
    ws.put_feature_class(class)?;

    println!("Imported {} rows into {}", rows, ws.catalog_path(&name).display());
    Ok(())
}
