use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use kas_core::time::{local_date, parse_date, parse_timezone};
use kas_core::{
    Dashboard, NewTransaction, TimeRange, TransactionType, ValidationError, category,
    category_breakdown, category_shares, has_any_data, overall_balance, time_series,
};
use kas_store::{
    Change, ChangeKind, Decision, ExportFormat, FileStorage, ImportMode, TransactionStore,
    read_export, write_export,
};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod amount;
mod config;
mod prompt;
mod render;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "kas", version, about = "Kas Virtual: personal income and expense tracker")]
struct Cli {
    /// Log store activity to stderr (overrides KAS_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.kas-virtual/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that open the transaction store.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Record a transaction
    Add {
        /// income or expense
        #[arg(long = "type")]
        kind: TransactionType,

        /// Category from the vocabulary (default: first one for the type)
        #[arg(long)]
        category: Option<String>,

        /// Amount, e.g. 25000, 12.5 or "Rp 25.000"
        #[arg(long, allow_hyphen_values = true)]
        amount: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Effective date YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List transactions, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },

    /// Delete one transaction (asks first)
    Remove {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Delete every transaction (asks first)
    Clear {
        #[arg(long)]
        yes: bool,
    },

    /// Month totals, lifetime balance and recent transactions
    Dashboard {
        /// Reference date YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Daily income/expense series
    Trend {
        /// week, month, quarter or a number of days
        #[arg(long)]
        range: Option<TimeRange>,

        /// Last day of the window YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Totals per category for one type
    Categories {
        #[arg(long = "type", default_value = "expense")]
        kind: TransactionType,
    },

    /// Show the category vocabulary
    Vocabulary {
        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },

    /// Write kas-virtual-export-<date>.<ext>
    Export {
        /// json or csv
        #[arg(long, default_value = "json")]
        format: ExportFormat,

        /// Output directory (default: current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Load transactions from a JSON export
    Import {
        path: PathBuf,

        /// Replace all existing transactions instead of merging
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config and paths
    Show,
}

/// One CLI invocation: the config plus the single store instance.
struct Session {
    cfg: Config,
    tz: Tz,
    store: TransactionStore<FileStorage>,
}

impl Session {
    fn open(cfg: Config) -> Result<Self> {
        let tz = parse_timezone(&cfg.display.timezone)
            .context("check [display].timezone in config.toml")?;
        let dir = state::data_dir(&cfg)?;
        let store = TransactionStore::load(FileStorage::new(dir)).with_timezone(tz);
        Ok(Self { cfg, tz, store })
    }

    fn today(&self) -> NaiveDate {
        local_date(Utc::now(), self.tz)
    }

    fn reference_date(&self, date: Option<&str>) -> Result<NaiveDate> {
        match date {
            Some(s) => parse_date(s),
            None => Ok(self.today()),
        }
    }

    fn symbol(&self) -> &str {
        &self.cfg.display.currency_symbol
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Config { command } => run_config(command),
        Command::Store(command) => {
            let mut session = Session::open(config::load_config()?)?;
            run(&mut session, command, cli.json)
        }
    }
}

fn run(session: &mut Session, command: StoreCommand, json: bool) -> Result<()> {
    match command {
        StoreCommand::Add {
            kind,
            category,
            amount,
            description,
            date,
        } => add(session, kind, category, &amount, description, date)?,

        StoreCommand::List { limit, kind } => {
            let rows: Vec<_> = session
                .store
                .snapshot()
                .iter()
                .filter(|t| kind.is_none_or(|k| t.kind == k))
                .take(limit.unwrap_or(usize::MAX))
                .cloned()
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", render::render_transactions(&rows, session.symbol()));
            }
        }

        StoreCommand::Remove { id, yes } => {
            let Some(target) = session.store.get(id) else {
                println!("No transaction with id {id}");
                return Ok(());
            };
            print!(
                "{}",
                render::render_transactions(std::slice::from_ref(target), session.symbol())
            );

            let intent = session.store.request_remove(id);
            let change = if yes {
                session.store.resolve(intent, Decision::Proceed)
            } else {
                session.store.confirm_and_resolve(intent, &mut prompt::StdinConfirm)
            };
            report(session, change);
        }

        StoreCommand::Clear { yes } => {
            let intent = session.store.request_clear();
            let change = if yes {
                session.store.resolve(intent, Decision::Proceed)
            } else {
                session.store.confirm_and_resolve(intent, &mut prompt::StdinConfirm)
            };
            report(session, change);
        }

        StoreCommand::Dashboard { date } => {
            let today = session.reference_date(date.as_deref())?;
            let dash = Dashboard::build(
                session.store.snapshot(),
                today,
                session.cfg.display.recent_limit,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&dash)?);
            } else {
                print!("{}", render::render_dashboard(&dash, session.symbol()));
            }
        }

        StoreCommand::Trend { range, date } => {
            let end = session.reference_date(date.as_deref())?;
            let range = range
                .unwrap_or_else(|| TimeRange::from_days(session.cfg.display.default_range_days));
            let series = time_series(session.store.snapshot(), range.days(), end);
            let has_data = has_any_data(&series);
            if json {
                let out = json!({
                    "rangeDays": range.days(),
                    "hasData": has_data,
                    "buckets": series,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("# Trend, {range} to {}\n", render::format_date(end));
                print!("{}", render::render_trend(&series, session.symbol(), has_data));
            }
        }

        StoreCommand::Categories { kind } => {
            let breakdown = category_breakdown(session.store.snapshot(), kind);
            let has_data = has_any_data(&breakdown);
            let shares = category_shares(&breakdown);
            if json {
                let out = json!({
                    "type": kind,
                    "hasData": has_data,
                    "shares": shares,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("# Categories ({kind})\n");
                print!("{}", render::render_categories(kind, &shares, session.symbol()));
            }
        }

        StoreCommand::Vocabulary { kind } => {
            let kinds = match kind {
                Some(k) => vec![k],
                None => TransactionType::ALL.to_vec(),
            };
            for k in kinds {
                println!("{k}: {}", category::categories_for(k).join(", "));
            }
        }

        StoreCommand::Export { format, out } => {
            let dir = out.unwrap_or_else(|| PathBuf::from("."));
            let path = write_export(
                &dir,
                session.store.snapshot(),
                format,
                Utc::now(),
                session.today(),
            )
            .with_context(|| format!("exporting to {}", dir.display()))?;
            println!("Exported {} transactions to {}", session.store.len(), path.display());
        }

        StoreCommand::Import { path, replace } => {
            let doc = read_export(&path, Utc::now())
                .with_context(|| format!("reading {}", path.display()))?;
            let mode = if replace {
                ImportMode::Replace
            } else {
                ImportMode::Merge
            };
            let change = session.store.import(doc.transactions, mode);
            report(session, Some(change));
        }
    }

    Ok(())
}

fn add(
    session: &mut Session,
    kind: TransactionType,
    category_input: Option<String>,
    amount_input: &str,
    description: String,
    date: Option<String>,
) -> Result<()> {
    let category = match category_input {
        Some(input) => category::resolve(kind, &input).ok_or_else(|| ValidationError::UnknownCategory {
            kind,
            category: input.clone(),
        })?,
        None => category::default_for(kind),
    };

    let amount = amount::parse_amount(amount_input).context("enter a valid amount")?;

    let mut new = NewTransaction::new(kind, category, amount).with_description(description.trim());
    if let Some(d) = date {
        new = new.with_date(parse_date(&d)?);
    }

    let change = session.store.add(new).context("transaction rejected")?;
    report(session, Some(change));
    Ok(())
}

/// Print what a mutation did, warn on failed writes, then the refreshed
/// summary.
fn report(session: &Session, change: Option<Change>) {
    let Some(change) = change else {
        println!("Cancelled");
        return;
    };

    match change.kind {
        ChangeKind::Added(id) => println!("Transaction added (id {id})"),
        ChangeKind::Removed { id, found: true } => println!("Transaction {id} deleted"),
        ChangeKind::Removed { id, found: false } => println!("No transaction with id {id}"),
        ChangeKind::Cleared { removed } => println!("Deleted all data ({removed} transactions)"),
        ChangeKind::Imported { added, skipped } => {
            println!("Imported {added} transactions ({skipped} skipped)")
        }
    }

    if let Some(e) = &change.persist_error {
        eprintln!("warning: changes are kept for this session only, saving failed: {e}");
    }

    println!(
        "Balance {} | {} transactions",
        render::format_money(session.symbol(), overall_balance(session.store.snapshot())),
        change.len
    );
}

fn run_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init => {
            let (path, created) = config::init_config()?;
            if created {
                println!("Wrote {}", path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            println!("# {}\n", config::config_path()?.display());
            println!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            println!("data dir: {}", state::data_dir(&cfg)?.display());
        }
    }
    Ok(())
}

/// stderr logging; `KAS_LOG` takes an EnvFilter directive (default: warn).
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("KAS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}
