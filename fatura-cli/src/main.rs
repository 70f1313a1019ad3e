use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fatura_core::{
    allocate_with, card_bill, card_exposure, discover, due_in_month_where, monthly_balance, statement,
    sum_by_category, sum_by_macro_category, BillFilter, CardCycle, CategoryResolver, CycleConfig, LegacyCycle,
    MacroCategory, PaymentMethod, Period, Transaction,
};
use fatura_ingest::parsers::values::parse_date;
use fatura_ingest::{load_ledger, Ledger};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod state;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FATURA_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "fatura", version, long_version = LONG_VERSION, about = "Credit card bills and monthly spending")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Ledger directory (overrides config)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Pretend today is this date (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Copy)]
struct PeriodArgs {
    /// Year to show (unknown years fall back to the default period)
    #[arg(long)]
    year: Option<i32>,

    /// Month to show, 1-12
    #[arg(long)]
    month: Option<u32>,
}

#[derive(Args, Debug, Clone, Default)]
struct TextFilters {
    /// Store name contains (case-insensitive)
    #[arg(long)]
    store: Option<String>,

    /// Description contains (case-insensitive)
    #[arg(long)]
    description: Option<String>,

    /// Exact category name
    #[arg(long)]
    category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GroupBy {
    Category,
    Macro,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write ~/.fatura/config.toml and create the ledger directory
    Init,

    /// First due date (and schedule) of a purchase
    DueDate {
        /// Purchase date
        date: String,

        /// Use this card's cycle
        #[arg(long, conflicts_with_all = ["closing", "due"])]
        card: Option<String>,

        /// Closing day of an ad-hoc cycle
        #[arg(long, requires = "due")]
        closing: Option<u32>,

        /// Due day of an ad-hoc cycle
        #[arg(long, requires = "closing")]
        due: Option<u32>,

        /// Number of installments
        #[arg(long, default_value_t = 1)]
        installments: u32,

        /// Purchase total, to show installment amounts
        #[arg(long, default_value = "0")]
        amount: Decimal,
    },

    #[command(flatten)]
    Report(ReportCommand),
}

/// Commands that read the ledger and look at one month.
#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Months that have something to show
    Periods {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// One card's bill for a month
    Bill {
        /// Card id (defaults to the first card by name)
        #[arg(long)]
        card: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,

        #[command(flatten)]
        filters: TextFilters,
    },

    /// Everything purchased in a month, any payment method
    Statement {
        #[command(flatten)]
        period: PeriodArgs,

        #[command(flatten)]
        filters: TextFilters,

        /// Only these payment methods (repeatable)
        #[arg(long = "method")]
        methods: Vec<PaymentMethod>,
    },

    /// Amounts owed in a month, grouped by category or macro-category
    Breakdown {
        #[command(flatten)]
        period: PeriodArgs,

        #[arg(long, value_enum, default_value_t = GroupBy::Macro)]
        by: GroupBy,

        /// Only these payment methods (repeatable)
        #[arg(long = "method")]
        methods: Vec<PaymentMethod>,
    },

    /// Installments owed in a month for one category or macro-category
    Details {
        #[command(flatten)]
        period: PeriodArgs,

        #[arg(long, conflicts_with = "macro_category", required_unless_present = "macro_category")]
        category: Option<String>,

        /// Macro-category name, e.g. "Essenciais"
        #[arg(long = "macro")]
        macro_category: Option<String>,
    },

    /// Income against card bills and direct spending for a month
    Balance {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Limit, outstanding installments and upcoming bills per card
    Cards,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config()?;
    init_tracing(&cfg.log.filter);

    let today = match &cli.today {
        Some(s) => parse_date(s)?,
        None => cfg.clock.today()?,
    };
    let ledger_dir = cli.ledger.unwrap_or(cfg.ledger.dir);
    tracing::debug!(ledger = %ledger_dir.display(), %today, "starting");

    let out = Output { json: cli.json };

    match cli.command {
        Command::Init => config::init_config(),

        Command::DueDate {
            date,
            card,
            closing,
            due,
            installments,
            amount,
        } => {
            let cycle: Box<dyn CycleConfig> = match (card, closing, due) {
                (Some(id), _, _) => {
                    let ledger = load(&ledger_dir)?;
                    let card = ledger.card(&id).ok_or_else(|| anyhow!("unknown card '{id}'"))?;
                    Box::new(card.cycle)
                }
                (None, Some(closing), Some(due)) => Box::new(CardCycle::new(closing, due)?),
                _ => Box::new(LegacyCycle),
            };
            due_date(&out, parse_date(&date)?, cycle.as_ref(), installments, amount)
        }

        Command::Report(command) => {
            let ledger = load(&ledger_dir)?;
            run_report(&out, &ledger, today, command)
        }
    }
}

fn run_report(out: &Output, ledger: &Ledger, today: NaiveDate, command: ReportCommand) -> Result<()> {
    let available = discover(&ledger.transactions, &ledger.incomes, today)?;
    let select = |p: PeriodArgs| -> Result<Period> {
        if let Some(month) = p.month {
            if !(1..=12).contains(&month) {
                bail!("month must be between 1 and 12, got {month}");
            }
        }
        Ok(available.resolve(p.year, p.month))
    };

    match command {
        ReportCommand::Periods { period } => {
            let selected = select(period)?;
            out.emit(&available, || report::periods(&available, selected))
        }

        ReportCommand::Bill { card, period, filters } => {
            let period = select(period)?;
            let card = match card {
                Some(id) => ledger.card(&id).ok_or_else(|| anyhow!("unknown card '{id}'"))?,
                None => ledger.default_card().context("no cards in the ledger")?,
            };
            let filter = filters.into_filter(Vec::new());
            let bill = card_bill(&ledger.transactions, &card.id, period, &filter)?;
            out.emit(&bill, || report::card_bill(&bill, &card.name))
        }

        ReportCommand::Statement {
            period,
            filters,
            methods,
        } => {
            let period = select(period)?;
            let st = statement(&ledger.transactions, period, &filters.into_filter(methods));
            out.emit(&st, || report::statement(&st))
        }

        ReportCommand::Breakdown { period, by, methods } => {
            let period = select(period)?;
            let filter = TextFilters::default().into_filter(methods);
            let txs = ledger.transactions.iter().filter(|tx| filter.matches(tx));
            let totals: BTreeMap<String, Decimal> = match by {
                GroupBy::Category => sum_by_category(txs, period, &ledger.categories)?.into_iter().collect(),
                GroupBy::Macro => sum_by_macro_category(txs, period, &ledger.categories)?
                    .into_iter()
                    .map(|(m, v)| (m.name().to_string(), v))
                    .collect(),
            };
            out.emit(&totals, || report::breakdown(period, totals.clone().into_iter().collect()))
        }

        ReportCommand::Details {
            period,
            category,
            macro_category,
        } => {
            let period = select(period)?;
            let (heading, lines) = match (category, macro_category) {
                (Some(name), _) => {
                    let lines = due_in_month_where(&ledger.transactions, period, |tx| {
                        ledger.categories.category_name(tx) == name
                    })?;
                    (name, lines)
                }
                (None, Some(name)) => {
                    let wanted =
                        MacroCategory::from_name(&name).ok_or_else(|| anyhow!("unknown macro-category '{name}'"))?;
                    let lines = due_in_month_where(&ledger.transactions, period, |tx| {
                        ledger.categories.macro_category(tx) == wanted
                    })?;
                    (wanted.name().to_string(), lines)
                }
                (None, None) => bail!("pass --category or --macro"),
            };
            out.emit(&lines, || report::details(period, &heading, &lines))
        }

        ReportCommand::Balance { period } => {
            let period = select(period)?;
            let bal = monthly_balance(&ledger.transactions, &ledger.incomes, period)?;
            out.emit(&bal, || report::balance(&bal))
        }

        ReportCommand::Cards => {
            let exposures = ledger
                .cards
                .iter()
                .map(|card| card_exposure(card, &ledger.transactions, today))
                .collect::<fatura_core::Result<Vec<_>>>()?;
            out.emit(&exposures, || report::exposures(&exposures))
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(dir: &std::path::Path) -> Result<Ledger> {
    load_ledger(dir).with_context(|| format!("loading ledger from {} (run `fatura init` first?)", dir.display()))
}

struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }
}

impl TextFilters {
    fn into_filter(self, methods: Vec<PaymentMethod>) -> BillFilter {
        BillFilter {
            store: self.store,
            description: self.description,
            category: self.category,
            card_id: None,
            methods: if methods.is_empty() { None } else { Some(methods) },
        }
    }
}

#[derive(Serialize)]
struct ScheduleLine {
    installment: String,
    due_date: NaiveDate,
    amount: Decimal,
}

fn due_date(out: &Output, purchase: NaiveDate, cycle: &dyn CycleConfig, count: u32, amount: Decimal) -> Result<()> {
    if count == 0 {
        bail!("installments must be at least 1");
    }
    let tx = Transaction::new("due-date", "", purchase, amount, PaymentMethod::Credit, "").with_installments(count);
    let schedule: Vec<ScheduleLine> = allocate_with(&tx, cycle)?
        .map(|i| ScheduleLine {
            installment: i.label(),
            due_date: i.due_date,
            amount: i.amount,
        })
        .collect();

    out.emit(&schedule, || {
        let mut text = format!(
            "Purchase {purchase}, closing day {}, due day {}\n\n",
            cycle.closing_day(),
            cycle.due_day()
        );
        for line in &schedule {
            text.push_str(&format!("{:>7}  {}  {:>14}\n", line.installment, line.due_date, report::brl(line.amount)));
        }
        text
    })
}
