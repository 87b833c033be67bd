use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use grocerytracker::summary::{daily_spend, format_amount};
use grocerytracker::voice::{self, LineSource, SpeechSource};
use grocerytracker::{Config, Filter, Item, ItemFields, Ledger, LedgerError, Status, Storage, share};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const TREND_WIDTH: f64 = 30.0;

#[derive(Parser)]
#[command(name = "grocerytracker")]
#[command(about = "GroceryTracker CLI - log grocery purchases and keep a shopping list")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the stored items (overrides config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Storage backend: json or sqlite (overrides config)
    #[arg(short, long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a purchase, or a shopping list entry with --planned
    Add {
        name: String,

        /// Unit price
        #[arg(short, long)]
        price: Option<String>,

        /// Quantity
        #[arg(short, long)]
        qty: Option<String>,

        /// kg, g, count or L
        #[arg(short, long)]
        unit: Option<String>,

        /// Put the item on the shopping list instead of the history
        #[arg(long)]
        planned: bool,
    },

    /// Add an item from a spoken phrase, e.g. "milk 60 rupees" or "eggs 40 to list".
    /// Reads one line from stdin when no phrase is given.
    Say { transcript: Vec<String> },

    /// Mark a shopping list item as bought
    Bought { id: i64 },

    /// Delete an item
    Remove { id: i64 },

    /// List items
    List {
        /// planned or bought
        #[arg(short, long)]
        status: Option<String>,

        /// Filter expression such as total>=100 or name~milk (repeatable)
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,
    },

    /// Show spend, item count and estimated savings
    Totals,

    /// Show bought spend per day
    Trend,

    /// Print the shopping list as a share message and WhatsApp link
    Share,

    /// Print items and totals as JSON
    Export,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(backend) = &cli.backend {
        config.backend = backend.parse()?;
    }

    let storage = config.open_storage()?;
    let mut ledger = Ledger::with_defaults(storage, config.defaults);

    match cli.command {
        Commands::Add {
            name,
            price,
            qty,
            unit,
            planned,
        } => {
            let fields = ItemFields {
                name,
                price,
                quantity: qty,
                unit,
                status: planned.then(|| Status::Planned.to_string()),
            };
            let item = ledger.add(fields)?;
            println!("{} {}", "Added".green().bold(), render_item(&item, &config.currency));
        }
        Commands::Say { transcript } => {
            let fields = if transcript.is_empty() {
                let mut stdin = LineSource::new(std::io::stdin().lock());
                let source = config.voice_input.then_some(&mut stdin as &mut dyn SpeechSource);
                match voice::capture(source) {
                    Ok(fields) => fields,
                    Err(e) if matches!(e.downcast_ref::<LedgerError>(), Some(LedgerError::Unsupported(_))) => {
                        println!("{}", "Voice not supported".yellow());
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                }
            } else {
                Some(voice::parse_transcript(&transcript.join(" ")))
            };

            match fields {
                Some(fields) => {
                    let item = ledger.add(fields)?;
                    println!("{} {}", "Added".green().bold(), render_item(&item, &config.currency));
                }
                None => println!("{}", "Nothing heard".yellow()),
            }
        }
        Commands::Bought { id } => match ledger.mark_bought(id)? {
            Some(item) => println!("{} {}", "Bought".green().bold(), render_item(&item, &config.currency)),
            None => println!("{}", format!("No planned item with id {}", id).yellow()),
        },
        Commands::Remove { id } => match ledger.remove(id)? {
            Some(item) => println!("{} {}", "Removed".red().bold(), render_item(&item, &config.currency)),
            None => println!("{}", format!("No item with id {}", id).yellow()),
        },
        Commands::List { status, filters } => {
            let mut parsed = filters.iter().map(|f| Filter::parse(f)).collect::<Result<Vec<_>>>()?;
            if let Some(status) = status {
                parsed.push(Filter::parse(&format!("status={}", status))?);
            }

            let items = ledger.list(&parsed);
            if items.is_empty() {
                println!("{}", "No items".dimmed());
            }
            for item in items {
                println!("{}", render_item(item, &config.currency));
            }
        }
        Commands::Totals => print_totals(&ledger, &config.currency),
        Commands::Trend => {
            let series = daily_spend(ledger.items());
            let max = series.iter().map(|(_, spend)| *spend).fold(0.0, f64::max);
            for (day, spend) in series {
                let width = if max > 0.0 { (spend / max * TREND_WIDTH).round() as usize } else { 0 };
                println!(
                    "{}  {} {}",
                    day,
                    "#".repeat(width).green(),
                    format_amount(&config.currency, spend)
                );
            }
        }
        Commands::Share => {
            let planned: Vec<&Item> = ledger.planned().collect();
            if planned.is_empty() {
                println!("{}", "Shopping list is empty".dimmed());
            } else {
                let message = share::shopping_list_message(planned);
                println!("{}\n", message);
                println!("{}", share::whatsapp_link(&message).cyan());
            }
        }
        Commands::Export => {
            println!("{}", serde_json::to_string_pretty(&ledger.snapshot())?);
        }
    }

    Ok(())
}

fn render_item(item: &Item, currency: &str) -> String {
    let status = match item.status {
        Status::Planned => item.status.as_str().yellow(),
        Status::Bought => item.status.as_str().green(),
    };
    format!(
        "[{}] {} {}  {} {} @ {} = {}",
        item.id,
        status,
        item.name.bold(),
        item.quantity,
        item.unit,
        format_amount(currency, item.price),
        format_amount(currency, item.total)
    )
}

fn print_totals<S: Storage>(ledger: &Ledger<S>, currency: &str) {
    let totals = ledger.totals();
    println!("Total spend:  {}", format_amount(currency, totals.total_spend).bold());
    println!("Items bought: {}", totals.item_count.to_string().bold());

    let amount = format_amount(currency, totals.estimated_savings.abs().round());
    if totals.is_saving() {
        println!("Savings this month: {} {}", amount.green().bold(), "(estimate)".dimmed());
    } else {
        // Only reached when the spend is not finite; the baseline always exceeds it otherwise
        println!("Budget alert: spending up {} {}", amount.yellow().bold(), "(estimate)".dimmed());
    }
}
