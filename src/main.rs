use amortize::{
    annual_summary, compare, parse_rates, simulate_with, AnnualSummary, LoanError,
    LoanParameters, PaymentReset, RateIndexing, RefinancePolicy, RefinanceTrigger, Schedule,
    ScheduleSummary, SimulationOptions,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use serde::{Deserialize, Serialize};
use simple_logger::SimpleLogger;
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    process,
};

/// Month-by-month loan amortization schedules
#[derive(Parser)]
#[command(
    name = "amortize",
    version,
    about = "Month-by-month loan amortization schedules",
    long_about = "Computes a loan amortization schedule under a yearly rate schedule, \
                  with an optional minimum payment, a fixed extra payment and \
                  automatic refinancing, and compares scenarios side by side."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the schedule for one loan
    Schedule(ScheduleArgs),
    /// Compare several scenario files
    Compare(CompareArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Args)]
struct ScheduleArgs {
    /// JSON scenario file; loan flags are ignored when given
    #[arg(long)]
    scenario: Option<PathBuf>,

    #[command(flatten)]
    loan: LoanArgs,

    /// Date of the first payment, used to report the payoff date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Print the per-year roll-up instead of every month
    #[arg(long)]
    annual: bool,
}

#[derive(Args)]
struct LoanArgs {
    /// Loan amount
    #[arg(long, default_value_t = 4_300_000.)]
    principal: f64,

    /// Loan term in years
    #[arg(long, default_value_t = 40)]
    years: u32,

    /// Comma separated annual rates in percent, one per year
    #[arg(long, default_value = "2.3,2.9,3.5,4.495,4.495,5.495")]
    rates: String,

    /// Minimum monthly payment
    #[arg(long, default_value_t = 0.)]
    min_payment: f64,

    /// Extra amount paid every month
    #[arg(long, default_value_t = 0.)]
    additional_payment: f64,

    /// Enable automatic refinancing
    #[arg(long)]
    refinance: bool,

    /// Refinance cycle in years
    #[arg(long, default_value_t = 3)]
    refinance_every: u32,

    /// Refinance once the balance falls to this amount
    #[arg(long, default_value_t = 3_000_000.)]
    refinance_threshold: f64,

    /// Rate increase in percentage points on each refinance
    #[arg(long, default_value_t = 1.)]
    refinance_increase: f64,

    /// yearly or monthly
    #[arg(long, default_value = "yearly")]
    rate_indexing: RateIndexing,

    /// either or both
    #[arg(long, default_value = "either")]
    refinance_trigger: RefinanceTrigger,

    /// on-refinance or on-rate-change
    #[arg(long, default_value = "on-refinance")]
    payment_reset: PaymentReset,
}

impl LoanArgs {
    fn to_scenario(&self) -> Result<Scenario, LoanError> {
        let mut params = LoanParameters::new(self.principal, self.years, parse_rates(&self.rates)?)
            .with_minimum_payment(self.min_payment)
            .with_additional_payment(self.additional_payment);
        if self.refinance {
            params = params.with_refinance(RefinancePolicy::new(
                self.refinance_every,
                self.refinance_threshold,
                self.refinance_increase,
            ));
        }

        Ok(Scenario {
            name: None,
            params,
            options: SimulationOptions {
                rate_indexing: self.rate_indexing,
                refinance_trigger: self.refinance_trigger,
                payment_reset: self.payment_reset,
                ..SimulationOptions::default()
            },
        })
    }
}

#[derive(Args)]
struct CompareArgs {
    /// JSON scenario files
    #[arg(required = true, num_args = 1..)]
    files: Vec<PathBuf>,
}

/// A named parameter set as stored in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Scenario {
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    params: LoanParameters,
    #[serde(default)]
    options: SimulationOptions,
}

impl Scenario {
    fn parse(text: &str) -> Result<Self, LoanError> {
        Ok(serde_json::from_str(text)?)
    }

    fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        let mut scenario = Scenario::parse(&text)?;
        if scenario.name.is_none() {
            scenario.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        Ok(scenario)
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("scenario")
    }

    fn run(&self) -> Result<Schedule, LoanError> {
        info!("running {}", self.label());
        simulate_with(&self.params, &self.options)
    }
}

#[derive(Serialize)]
struct ScheduleReport<'a> {
    name: &'a str,
    summary: ScheduleSummary,
    payoff_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    payoff_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<&'a Schedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annual: Option<Vec<AnnualSummary>>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new().with_level(cli.log_level).init() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let result = match &cli.command {
        Commands::Schedule(args) => run_schedule(args, cli.output),
        Commands::Compare(args) => run_compare(args, cli.output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_schedule(args: &ScheduleArgs, output: OutputFormat) -> Result<(), Box<dyn Error>> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => args.loan.to_scenario()?,
    };
    let schedule = scenario.run()?;
    let summary = ScheduleSummary::from_schedule(&schedule);
    let payoff_date = args.start_date.and_then(|d| summary.payoff_date(d));

    match output {
        OutputFormat::Json => {
            let report = ScheduleReport {
                name: scenario.label(),
                summary,
                payoff_label: summary.payoff_label(),
                payoff_date: payoff_date.map(|d| d.to_string()),
                schedule: (!args.annual).then_some(&schedule),
                annual: args.annual.then(|| annual_summary(&schedule)),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            if args.annual {
                println!(
                    "{:>4} {:>16} {:>16} {:>16} {:>18} {:>18}",
                    "Year", "Principal", "Interest", "Paid", "End balance", "Cum. interest"
                );
                for year in annual_summary(&schedule) {
                    println!(
                        "{:>4} {:>16.2} {:>16.2} {:>16.2} {:>18.2} {:>18.2}",
                        year.year,
                        year.principal,
                        year.interest,
                        year.total,
                        year.loan_end,
                        year.cumulative_interest
                    );
                }
            } else {
                schedule.show_amortization();
            }
            println!();
            println!("{}: {}", scenario.label(), summary);
            if let Some(date) = payoff_date {
                println!("final payment on {}", date);
            }
        }
    }
    Ok(())
}

fn run_compare(args: &CompareArgs, output: OutputFormat) -> Result<(), Box<dyn Error>> {
    let mut summaries: Vec<(String, ScheduleSummary)> = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let scenario = Scenario::load(path)?;
        let schedule = scenario
            .run()
            .map_err(|e| format!("{}: {}", scenario.label(), e))?;
        summaries.push((
            scenario.label().to_string(),
            ScheduleSummary::from_schedule(&schedule),
        ));
    }
    let comparison = compare(&summaries);

    match output {
        OutputFormat::Json => {
            let scenarios: Vec<serde_json::Value> = summaries
                .iter()
                .map(|(name, summary)| {
                    serde_json::json!({
                        "name": name,
                        "payoff_label": summary.payoff_label(),
                        "summary": summary,
                    })
                })
                .collect();
            let report = serde_json::json!({
                "scenarios": scenarios,
                "comparison": comparison,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            println!(
                "{:<20} {:>8} {:>18} {:>18} {:>14}",
                "Scenario", "Payoff", "Total paid", "Total interest", "Avg monthly"
            );
            for (name, summary) in &summaries {
                println!(
                    "{:<20} {:>8} {:>18.2} {:>18.2} {:>14.2}",
                    name,
                    summary.payoff_label(),
                    summary.total_paid,
                    summary.total_interest,
                    summary.avg_monthly
                );
            }
            if let Some(cmp) = comparison {
                println!();
                println!(
                    "lowest interest: {} (saves ${:.2} over the most expensive)",
                    cmp.lowest_interest, cmp.interest_spread
                );
                println!(
                    "fastest payoff: {} ({} months sooner than the slowest)",
                    cmp.fastest_payoff, cmp.months_spread
                );
            }
        }
    }
    Ok(())
}
