use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::warn;

use onboarding_dashboard::catalog::Catalog;
use onboarding_dashboard::dates::{self, YearMonth};
use onboarding_dashboard::filter::{DateRange, FilterSpec, MonthFilter, StatusFilter};
use onboarding_dashboard::models::DateField;
use onboarding_dashboard::sort::{SortDirection, SortKey, SortSpec};
use onboarding_dashboard::source::{self, Source};
use onboarding_dashboard::{aggregate, logging, report};

#[derive(Parser)]
#[command(name = "onboarding-dashboard")]
#[command(about = "Client onboarding dashboard over the spreadsheet API", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Spreadsheet API endpoint
    #[arg(long, env = "ONBOARDING_API_URL")]
    api_url: Option<String>,
    /// Read a saved API response instead of fetching
    #[arg(long)]
    input: Option<PathBuf>,
    /// Read a CSV export of the spreadsheet instead of fetching
    #[arg(long)]
    csv: Option<PathBuf>,
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
}

impl SourceArgs {
    fn resolve(self) -> anyhow::Result<Source> {
        if let Some(path) = self.input {
            return Ok(Source::JsonFile(path));
        }
        if let Some(path) = self.csv {
            return Ok(Source::Csv(path));
        }
        match self.api_url {
            Some(url) => Ok(Source::Api {
                url,
                timeout: Duration::from_secs(self.timeout_secs.max(1)),
            }),
            None => bail!("set --api-url (or ONBOARDING_API_URL), --input or --csv"),
        }
    }
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long)]
    handler: Option<String>,
    /// completed, handedToSupport, inProgress or suspended
    #[arg(long)]
    status: Option<String>,
    /// Matches client or handler name
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    show_suspended: bool,
    #[arg(long)]
    only_missing_start: bool,
    #[arg(long)]
    only_closure_term: bool,
    /// YYYY-MM-DD or DD/MM/YYYY
    #[arg(long, value_parser = parse_date_arg)]
    start_from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    start_to: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    actual_from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    actual_to: Option<NaiveDate>,
    /// YYYY-MM
    #[arg(long, value_parser = parse_month_arg)]
    month: Option<YearMonth>,
    #[arg(long, value_enum, default_value_t = DateField::Actual)]
    month_field: DateField,
}

impl FilterArgs {
    fn to_spec(&self) -> FilterSpec {
        let status = self.status.as_deref().and_then(|value| {
            let parsed = StatusFilter::parse(value);
            if parsed.is_none() {
                warn!(status = value, "unknown status filter ignored");
            }
            parsed
        });

        FilterSpec {
            handler: self.handler.clone(),
            status,
            show_suspended: self.show_suspended,
            search: self.search.clone(),
            only_missing_actual_start: self.only_missing_start,
            only_closure_term: self.only_closure_term,
            start_range: DateRange {
                from: self.start_from,
                to: self.start_to,
            },
            actual_start_range: DateRange {
                from: self.actual_from,
                to: self.actual_to,
            },
            month: self.month.map(|YearMonth { year, month }| MonthFilter {
                field: self.month_field,
                year,
                month,
            }),
        }
    }
}

#[derive(Args, Debug)]
struct SortArgs {
    /// Column to sort by; defaults to actual start, then start date
    #[arg(long)]
    sort: Option<String>,
    #[arg(long)]
    desc: bool,
}

impl SortArgs {
    fn to_spec(&self) -> SortSpec {
        let direction = if self.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        let key = self.sort.as_deref().and_then(|value| {
            let parsed = SortKey::parse(value);
            if parsed.is_none() {
                warn!(sort = value, "unknown sort key ignored");
            }
            parsed
        });

        SortSpec { key, direction }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the indicators and clients per handler
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List the filtered clients
    List {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        sort: SortArgs,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// List the handler names present in the data
    Handlers,
    /// Write a markdown dashboard
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        sort: SortArgs,
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
    /// Write the filtered clients as CSV or JSON
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        sort: SortArgs,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long, default_value = "onboarding.csv")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    dates::parse_iso_date(value)
        .or_else(|| dates::parse_br_date(value))
        .ok_or_else(|| format!("invalid date {value:?}, expected YYYY-MM-DD or DD/MM/YYYY"))
}

fn parse_month_arg(value: &str) -> Result<YearMonth, String> {
    dates::parse_year_month(value).ok_or_else(|| format!("invalid month {value:?}, expected YYYY-MM"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let data_source = cli.source.resolve()?;
    let payload = source::load(&data_source).await?;
    let mut catalog = Catalog::default();
    catalog
        .refresh(payload)
        .context("failed to load onboarding records")?;
    let today = aggregate::today();

    match cli.command {
        Commands::Summary { filters } => {
            let view = catalog.view(&filters.to_spec(), &SortSpec::default(), today);
            println!("{}", report::count_info(&view));
            for line in report::kpi_lines(&view) {
                println!("{line}");
            }

            if view.handler_tallies.is_empty() {
                println!("No records match the current filters.");
                return Ok(());
            }

            println!("Clients per handler:");
            for tally in &view.handler_tallies {
                println!(
                    "{} {} {} ({}%)",
                    report::bar(tally.percent_of_top),
                    tally.handler,
                    tally.count,
                    tally.percent_of_top
                );
            }
        }
        Commands::List {
            filters,
            sort,
            limit,
        } => {
            let view = catalog.view(&filters.to_spec(), &sort.to_spec(), today);
            println!("{}", report::count_info(&view));
            for record in view.rows.iter().take(limit) {
                println!("- {}", report::row_line(record));
            }
        }
        Commands::Handlers => {
            let handlers = catalog.handler_options();
            if handlers.is_empty() {
                println!("No handlers found.");
            }
            for handler in handlers {
                println!("{handler}");
            }
        }
        Commands::Report {
            filters,
            sort,
            out,
        } => {
            let spec = filters.to_spec();
            let view = catalog.view(&spec, &sort.to_spec(), today);
            let report = report::build_report(&view, &spec, Local::now().naive_local());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            filters,
            sort,
            format,
            out,
        } => {
            let view = catalog.view(&filters.to_spec(), &sort.to_spec(), today);
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            match format {
                ExportFormat::Csv => report::export_csv(&view.rows, file)?,
                ExportFormat::Json => report::export_json(&view.rows, file)?,
            }
            println!("Exported {} clients to {}.", view.rows.len(), out.display());
        }
    }

    Ok(())
}
