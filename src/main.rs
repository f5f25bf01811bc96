//! Sheetlens CLI - inspect uploads, rank columns, export tables and build dashboard views.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use sheetlens::charts::executive::Sheets;
use sheetlens::charts::supplier_buyer::period_ranking;
use sheetlens::charts::{
    BuyerView, ChartOptions, ExecutiveView, ProductView, SupplierBuyerView, SupplierView,
};
use sheetlens::data::{DataProcessor, RowFilter, Table, TabularFileParser};
use sheetlens::export::{self, ExportFormat};
use sheetlens::fetch::{DataSource, StaticDataClient};
use sheetlens::period::{PeriodSelection, PeriodType};
use sheetlens::stats::{group_sum, top_n, SortOrder, StatsCalculator};
use sheetlens::DashboardConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetlens")]
#[command(about = "Spreadsheet ingestion and aggregation for inventory dashboards")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and print its structure and column statistics
    Inspect {
        /// Path to a .csv, .xls or .xlsx file
        file: PathBuf,

        /// Read several sheets; without indices the configured ones are used
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        sheets: Option<Vec<usize>>,
    },

    /// Rank groups of a column by the sum of another
    Top {
        file: PathBuf,

        /// Grouping column
        #[arg(long)]
        key: String,

        /// Summed column
        #[arg(long)]
        value: String,

        /// Entries to keep (defaults to the configured top N)
        #[arg(short)]
        n: Option<usize>,

        /// Keep only rows containing this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Export a parsed file as JSON, CSV or an HTML report
    Export {
        file: PathBuf,

        #[arg(long, value_enum, default_value = "json")]
        format: FormatArg,

        /// Output path (defaults to a generated name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report title
        #[arg(long, default_value = "Relatório de Dados")]
        title: String,
    },

    /// Fetch one static resource and summarise it
    Fetch {
        /// Resource name, e.g. sheet1_data.json
        resource: String,

        /// Base URL or directory of the JSON resources
        #[arg(long)]
        base: Option<String>,
    },

    /// Fetch the static sheets and print a dashboard view as JSON
    View {
        #[arg(value_enum)]
        view: ViewArg,

        /// Base URL or directory of the JSON resources
        #[arg(long)]
        base: Option<String>,

        /// Period granularity for the supplier × buyer ranking
        #[arg(long, value_enum)]
        period: Option<PeriodArg>,

        /// Month, quarter or semester number
        #[arg(long, default_value = "1")]
        index: u32,

        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
    Html,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Html => ExportFormat::Html,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Executive,
    Products,
    Suppliers,
    Buyers,
    SupplierBuyer,
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Month,
    Quarter,
    Semester,
}

impl From<PeriodArg> for PeriodType {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Month => PeriodType::Month,
            PeriodArg::Quarter => PeriodType::Quarter,
            PeriodArg::Semester => PeriodType::Semester,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = DashboardConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load config")?;

    match cli.command {
        Commands::Inspect { file, sheets } => inspect(&file, sheets, &config),
        Commands::Fetch { resource, base } => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(fetch_resource(&resource, base, &config))
        }
        Commands::Top {
            file,
            key,
            value,
            n,
            search,
        } => top(&file, &key, &value, n.unwrap_or(config.top_n), search),
        Commands::Export {
            file,
            format,
            output,
            title,
        } => export_table(&file, format.into(), output, &title),
        Commands::View {
            view,
            base,
            period,
            index,
            year,
        } => {
            let period = match period {
                Some(kind) => Some(
                    PeriodSelection::new(
                        kind.into(),
                        year.unwrap_or(config.default_period.year()),
                        index,
                    )
                    .context("Invalid period")?,
                ),
                None => None,
            };
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(print_view(view, base, period, &config))
        }
    }
}

fn read_table(path: &Path) -> anyhow::Result<Table> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let table = TabularFileParser::parse(&bytes, &file_name(path), None)?;
    Ok(table)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn inspect(
    path: &Path,
    sheets: Option<Vec<usize>>,
    config: &DashboardConfig,
) -> anyhow::Result<()> {
    let tables = match sheets {
        Some(indices) => {
            let indices = if indices.is_empty() {
                config.sheet_indices.clone()
            } else {
                indices
            };
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            TabularFileParser::parse_sheets(&bytes, &file_name(path), None, Some(&indices))?.sheets
        }
        None => vec![read_table(path)?],
    };

    for table in &tables {
        let summary = serde_json::json!({
            "sheet": table.name(),
            "headers": table.headers(),
            "stats": table.stats(),
            "columns": StatsCalculator::summarize_table(table, None, config.trend_policy),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn top(
    path: &Path,
    key: &str,
    value: &str,
    n: usize,
    search: Option<String>,
) -> anyhow::Result<()> {
    let table = read_table(path)?;
    for column in [key, value] {
        if table.column_kind(column).is_none() {
            bail!("Unknown column '{}'", column);
        }
    }

    let filter = search.map_or_else(RowFilter::new, |term| RowFilter::new().with_search(term));
    let rows = DataProcessor::filter_table(&table, &filter);
    let sums = group_sum(
        rows.rows(),
        |r| r.get(key).to_key(),
        |r| r.get(value).as_number_or_zero(),
    );
    for (position, entry) in top_n(&sums, n, SortOrder::Descending).iter().enumerate() {
        println!("{:>3}. {:<30} {}", position + 1, entry.key, entry.value);
    }
    Ok(())
}

fn export_table(
    path: &Path,
    format: ExportFormat,
    output: Option<PathBuf>,
    title: &str,
) -> anyhow::Result<()> {
    let table = read_table(path)?;
    let written = match output {
        Some(output) => {
            export::write_to(&table, format, &output, title)?;
            output
        }
        None => export::write_export(&table, format, Path::new("."), title)?,
    };
    println!("Exported {} rows to {}", table.len(), written.display());
    Ok(())
}

fn client_for(base: Option<String>, config: &DashboardConfig) -> anyhow::Result<StaticDataClient> {
    let client = match base {
        Some(base) => StaticDataClient::new(DataSource::parse(&base)?, config.fetch_timeout())?,
        None => StaticDataClient::from_config(config)?,
    };
    Ok(client)
}

async fn fetch_resource(
    resource: &str,
    base: Option<String>,
    config: &DashboardConfig,
) -> anyhow::Result<()> {
    let client = client_for(base, config)?;
    let payload: serde_json::Value = client
        .fetch_json(resource)
        .await
        .with_context(|| format!("Failed to fetch {resource}"))?;

    match &payload {
        serde_json::Value::Array(records) => {
            println!("{resource}: {} records", records.len());
            if let Some(serde_json::Value::Object(first)) = records.first() {
                let fields: Vec<&str> = first.keys().map(String::as_str).collect();
                println!("Fields: {}", fields.join(", "));
            }
        }
        serde_json::Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            println!("{resource}: object with keys {}", keys.join(", "));
        }
        other => println!("{resource}: {other}"),
    }
    Ok(())
}

async fn print_view(
    view: ViewArg,
    base: Option<String>,
    period: Option<PeriodSelection>,
    config: &DashboardConfig,
) -> anyhow::Result<()> {
    let client = client_for(base, config)?;
    let options = ChartOptions::from(config);

    let json = match view {
        ViewArg::Products => {
            serde_json::to_string_pretty(&ProductView::build(&client.products().await?, &options))?
        }
        ViewArg::Suppliers => serde_json::to_string_pretty(&SupplierView::build(
            &client.suppliers().await?,
            &options,
        ))?,
        ViewArg::Buyers => {
            serde_json::to_string_pretty(&BuyerView::build(&client.buyers().await?, &options))?
        }
        ViewArg::SupplierBuyer => {
            let records = client.supplier_buyer_complete().await?;
            match period {
                Some(period) => {
                    println!("Período: {}", period);
                    serde_json::to_string_pretty(&period_ranking(&records, &period, &options))?
                }
                None => serde_json::to_string_pretty(&SupplierBuyerView::build(&records, &options))?,
            }
        }
        ViewArg::Executive => {
            let (products, suppliers, buyers, pairs) = tokio::try_join!(
                client.products(),
                client.suppliers(),
                client.buyers(),
                client.supplier_buyer_complete(),
            )?;
            let sheets = Sheets {
                products: &products,
                suppliers: &suppliers,
                buyers: &buyers,
                pairs: &pairs,
            };
            serde_json::to_string_pretty(&ExecutiveView::build(sheets, &options))?
        }
    };
    println!("{json}");
    Ok(())
}
