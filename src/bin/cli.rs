use colored::*;
use std::path::PathBuf;
use structopt::StructOpt;
use weekly_digest::{
    core::{config::DigestConfig, service::DigestService, Digest},
    export,
    model::IntegratedRecord,
    utils::progress::ProgressTracker,
    view::{self, CountryFilter, SortColumn, SortDirection, TableView},
};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "digest-cli",
    about = "Weekly digest of game-industry stocks, disclosures and issues"
)]
struct Opt {
    /// Hide the loading spinner
    #[structopt(short, long)]
    quiet: bool,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Print the ranked digest table
    Show {
        /// Case-insensitive match on company name or symbol
        #[structopt(long, default_value = "")]
        search: String,
        /// Country code, or "all"
        #[structopt(long, default_value = "all")]
        country: CountryFilter,
        /// Column to sort by, e.g. rank, market-cap, change-rate, company-name
        #[structopt(long, default_value = "rank")]
        sort: SortColumn,
        #[structopt(long)]
        desc: bool,
        #[structopt(long)]
        limit: Option<usize>,
    },
    /// Print the KPI panel
    Kpi,
    /// Write the digest to a CSV file
    Export {
        #[structopt(short, long, parse(from_os_str))]
        output: PathBuf,
        /// Only export these symbols
        #[structopt(long, use_delimiter = true)]
        symbols: Vec<String>,
    },
    /// Check the upstream services
    Health,
}

async fn load(service: &DigestService, quiet: bool) -> anyhow::Result<Digest> {
    let progress = ProgressTracker::new("Loading weekly digest", !quiet);
    progress.update_message("fetching stock prices, companies, disclosures and issues");
    let digest = service.refresh().await;
    progress.finish("done");
    digest
}

fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0}", v),
        None => "N/A".to_string(),
    }
}

fn format_change(value: Option<f64>) -> ColoredString {
    match value {
        Some(v) if v > 0.0 => format!("+{:.2}%", v).red(),
        Some(v) if v < 0.0 => format!("{:.2}%", v).blue(),
        Some(v) => format!("{:.2}%", v).normal(),
        None => "N/A".dimmed(),
    }
}

fn summarize<T>(items: &[T], title: impl Fn(&T) -> &str) -> String {
    let (shown, more) = view::preview(items, 2);
    let mut text = shown.iter().map(|i| title(i)).collect::<Vec<_>>().join("; ");
    if more > 0 {
        text.push_str(&format!(" (+{} more)", more));
    }
    text
}

fn print_row(record: &IntegratedRecord) {
    println!(
        "{:>4}  {:<8} {:<20} {:<7} {:<7} {:>12} {:>10} {:>9}",
        record.market_cap_rank,
        record.symbol,
        record.company_name,
        record.country,
        record.market.to_string(),
        format_number(record.market_cap),
        format_number(record.current_price),
        format_change(record.change_rate_percent),
    );
    if !record.disclosures.is_empty() {
        println!(
            "      {} {}",
            "disclosures:".dimmed(),
            summarize(&record.disclosures, |d| d.title.as_str())
        );
    }
    if !record.issues.is_empty() {
        println!(
            "      {} {}",
            "issues:".dimmed(),
            summarize(&record.issues, |i| i.title.as_str())
        );
    }
}

fn print_table(digest: &Digest, view: &TableView, limit: Option<usize>) {
    let rows = view.visible(&digest.records);
    if rows.is_empty() {
        println!("{}", "No companies match.".yellow());
        return;
    }

    println!(
        "{}",
        format!(
            "{:>4}  {:<8} {:<20} {:<7} {:<7} {:>12} {:>10} {:>9}",
            "Rank", "Symbol", "Company", "Country", "Market", "Market Cap", "Price", "Change"
        )
        .bold()
    );
    for record in rows.iter().take(limit.unwrap_or(usize::MAX)) {
        print_row(record);
    }
    println!(
        "\n{} of {} companies · updated {}",
        rows.len(),
        digest.records.len(),
        digest.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

fn print_kpi(digest: &Digest) {
    let Some(kpi) = &digest.kpi else {
        println!("{}", "No data available.".yellow());
        return;
    };

    println!(
        "{:<18} {} {} ({})",
        "Top gainer".bold(),
        format_change(kpi.top_gainer.change_rate_percent),
        kpi.top_gainer.company_name,
        kpi.top_gainer.symbol
    );
    println!(
        "{:<18} {} {} ({})",
        "Top loser".bold(),
        format_change(kpi.top_loser.change_rate_percent),
        kpi.top_loser.company_name,
        kpi.top_loser.symbol
    );
    println!("{:<18} {}", "Disclosures".bold(), kpi.total_disclosures);
    println!("{:<18} {}", "Issues".bold(), kpi.total_issues);
    println!(
        "{:<18} {:.0} across {} companies",
        "Total market cap".bold(),
        kpi.total_market_cap,
        kpi.total_companies
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let opt = Opt::from_args();
    let config = DigestConfig::from_env()?;
    let service = DigestService::from_config(&config)?;

    match opt.cmd {
        Command::Show {
            search,
            country,
            sort,
            desc,
            limit,
        } => {
            let digest = load(&service, opt.quiet).await?;
            let mut table = TableView::new();
            table.set_search(search);
            table.set_country(country);
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            table.set_sort(sort, direction);
            print_table(&digest, &table, limit);
        }
        Command::Kpi => {
            let digest = load(&service, opt.quiet).await?;
            print_kpi(&digest);
        }
        Command::Export { output, symbols } => {
            let digest = load(&service, opt.quiet).await?;
            let mut table = TableView::new();
            for symbol in &symbols {
                table.toggle_selected(symbol);
            }
            let rows = if symbols.is_empty() {
                export::to_csv_file(&output, &digest.records)?
            } else {
                export::to_csv_file(&output, table.selected_records(&digest.records))?
            };
            println!("Exported {} companies to {}", rows, output.display());
        }
        Command::Health => {
            for health in service.health().await {
                let status = health
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unreachable".to_string());
                if health.healthy {
                    println!("{} {} ({})", "✓".green(), health.source, status);
                } else {
                    println!("{} {} ({})", "✗".red(), health.source, status);
                }
            }
        }
    }

    Ok(())
}
