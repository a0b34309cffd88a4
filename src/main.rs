use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use sepa_debit::application::checkout::DebitCheckout;
use sepa_debit::application::registry::{CheckoutResponse, MandateRegistry};
use sepa_debit::application::vault::AccountVault;
use sepa_debit::config::Settings;
use sepa_debit::domain::mandate::PlacedOrder;
use sepa_debit::domain::ports::{CustomerProfileStoreBox, MandateStoreBox, OrderPaymentStoreBox};
use sepa_debit::infrastructure::cipher::AesGcmCipher;
use sepa_debit::infrastructure::in_memory::{
    InMemoryCustomerProfileStore, InMemoryMandateStore, InMemoryOrderPaymentStore,
};
use sepa_debit::interfaces::csv::checkout_reader::{CheckoutReader, CheckoutRow};
use sepa_debit::interfaces::csv::mandate_writer::MandateWriter;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const NOT_AVAILABLE_MESSAGE: &str = "The selected payment method is not available.";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML settings file. Without it the payment method is disabled.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay checkout submissions from a CSV file
    Checkout {
        /// Input checkouts CSV file
        input: PathBuf,
    },
    /// Write pending mandates as CSV to stdout
    Export {
        /// Flip every exported mandate to generated
        #[arg(long)]
        mark_generated: bool,
    },
}

struct Stores {
    mandates: MandateStoreBox,
    customers: CustomerProfileStoreBox,
    orders: OrderPaymentStoreBox,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            mandates: Box::new(InMemoryMandateStore::new()),
            customers: Box::new(InMemoryCustomerProfileStore::new()),
            orders: Box::new(InMemoryOrderPaymentStore::new()),
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
fn persistent_stores(db_path: PathBuf) -> Result<Stores> {
    use sepa_debit::infrastructure::rocksdb::RocksDBStore;

    let store = RocksDBStore::open(db_path).into_diagnostic()?;
    Ok(Stores {
        mandates: Box::new(store.clone()),
        customers: Box::new(store.clone()),
        orders: Box::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn persistent_stores(_db_path: PathBuf) -> Result<Stores> {
    tracing::warn!(
        "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
    );
    Ok(Stores::in_memory())
}

/// One line of `checkout` output.
#[derive(Serialize)]
struct CheckoutReport {
    increment_id: String,
    #[serde(flatten)]
    response: CheckoutResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    mandate_reference: Option<String>,
}

impl CheckoutReport {
    fn new(order: &PlacedOrder, response: CheckoutResponse) -> Self {
        Self {
            increment_id: order.increment_id.clone(),
            response,
            mandate_reference: None,
        }
    }
}

async fn process_checkout(
    checkout: &DebitCheckout,
    row: &CheckoutRow,
) -> sepa_debit::error::Result<CheckoutReport> {
    let order = row.order();
    if !order.is_debit() {
        return Ok(CheckoutReport::new(&order, CheckoutResponse::success()));
    }

    let Some(listing) = checkout.listing(order.store_id, &row.context()) else {
        return Ok(CheckoutReport::new(
            &order,
            CheckoutResponse::failure(NOT_AVAILABLE_MESSAGE),
        ));
    };
    tracing::debug!(
        order_id = order.order_id,
        title = %listing.title,
        custom_text = listing.custom_text.as_deref().unwrap_or_default(),
        "payment method offered"
    );

    let info = checkout.assign_payment_data(row.account_fields())?;

    let form = row.mandate_form();
    let outcome = checkout.validate_before_save(order.store_id, &order.payment_method, &form);
    if outcome.is_rejected() {
        return Ok(CheckoutReport::new(&order, outcome.response()));
    }

    let follow_up = checkout.after_order_saved(&order, info, &form).await?;
    let mut report = CheckoutReport::new(&order, CheckoutResponse::success());
    report.mandate_reference = follow_up.mandate.map(|m| m.mandate_reference);
    Ok(report)
}

async fn run_checkout(settings: Settings, stores: Stores, input: PathBuf) -> Result<()> {
    let key = settings.encryption_key().into_diagnostic()?;
    let vault = AccountVault::new(
        Box::new(AesGcmCipher::new(&key)),
        stores.orders,
        stores.customers,
    );
    let registry = MandateRegistry::new(stores.mandates);
    let checkout = DebitCheckout::new(settings, vault, registry);

    let file = File::open(input).into_diagnostic()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for row_result in CheckoutReader::new(file).rows() {
        match row_result {
            Ok(row) => match process_checkout(&checkout, &row).await {
                Ok(report) => {
                    let line = serde_json::to_string(&report).into_diagnostic()?;
                    writeln!(out, "{}", line).into_diagnostic()?;
                }
                Err(e) => {
                    tracing::error!(order_id = row.order_id, error = %e, "Error processing checkout");
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "Error reading checkout row");
            }
        }
    }

    Ok(())
}

async fn run_export(stores: Stores, mark_generated: bool) -> Result<()> {
    let registry = MandateRegistry::new(stores.mandates);
    let pending = registry.pending().await.into_diagnostic()?;

    let stdout = io::stdout();
    MandateWriter::new(stdout.lock())
        .write_mandates(&pending)
        .into_diagnostic()?;

    if mark_generated {
        for record in &pending {
            registry
                .mark_generated(record.order_id)
                .await
                .into_diagnostic()?;
        }
        tracing::info!(count = pending.len(), "marked mandates as generated");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match cli.config {
        Some(path) => Settings::from_file(path).into_diagnostic()?,
        None => Settings::default(),
    };

    let stores = match cli.db_path {
        Some(db_path) => persistent_stores(db_path)?,
        None => Stores::in_memory(),
    };

    match cli.command {
        Command::Checkout { input } => run_checkout(settings, stores, input).await,
        Command::Export { mark_generated } => run_export(stores, mark_generated).await,
    }
}
