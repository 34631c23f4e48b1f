//! Bitsnap CLI - cart and checkout from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Put two mugs in the cart and check out
//! bitsnap cart add prod_mug -q 2
//! bitsnap checkout
//!
//! # Price the cart
//! bitsnap quote
//!
//! # Pay for a single product directly
//! bitsnap buy prod_ebook --email jan@example.com
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and edit the stored cart
//! - `countries` - List shipping countries
//! - `quote` - Price the cart with the backend
//! - `checkout` - Create a hosted payment link for the cart
//! - `buy` - Create a payment link for one product
//! - `link` - Create a payment link for explicit items
//! - `wallets` - Show Apple Pay / Google Pay availability
//!
//! Configuration comes from `BITSNAP_*` environment variables (see
//! [`CheckoutConfig::from_env`]).

#![cfg_attr(not(test), forbid(unsafe_code))]

use bitsnap_checkout::{CheckoutConfig, CheckoutContext, DirectPurchase};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "bitsnap")]
#[command(author, version, about = "Bitsnap cart and checkout tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List countries the project ships to
    Countries,
    /// Price the cart
    Quote,
    /// Create a hosted payment link for the cart and clear it
    Checkout,
    /// Create a payment link for a single product
    Buy {
        /// Product id
        product: String,

        /// Buyer email
        #[arg(short, long)]
        email: Option<String>,

        /// Buyer name
        #[arg(short, long)]
        name: Option<String>,

        /// Shipping country code
        #[arg(short, long)]
        country: Option<String>,

        /// Accept marketing communication
        #[arg(long)]
        marketing: bool,
    },
    /// Create a payment link for explicit items
    Link {
        /// Items as `product` or `product:quantity`
        #[arg(required = true, value_parser = commands::parse_item)]
        items: Vec<(String, u32)>,

        /// Use the API-key endpoint (needs `BITSNAP_API_KEY`)
        #[arg(long)]
        automatic: bool,
    },
    /// Show which payment sheets are available
    Wallets {
        /// Print the Google Pay payment request
        #[arg(long)]
        request: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product
    Add {
        /// Product or variant id
        product: String,

        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Metadata as key=value, repeatable
        #[arg(short, long = "meta", value_parser = commands::parse_key_value)]
        meta: Vec<(String, String)>,
    },
    /// List line items and the subtotal
    List,
    /// Set a line item's quantity (0 removes it)
    Update {
        /// Line item id
        line_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove by line item or product id
    Remove {
        /// Line item or product id
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Show or set the shipping country
    Country {
        /// ISO 3166-1 alpha-2 code
        code: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CheckoutConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));
    Some(guard)
}

/// Warnings and errors become Sentry events, info and debug breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = CheckoutConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bitsnap_checkout=info,bitsnap_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: CheckoutConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!(?config, "Loaded configuration");
    let ctx = CheckoutContext::from_config(config)?;
    let cart = ctx.cart();

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Add {
                product,
                quantity,
                meta,
            } => commands::cart::add(&cart, &product, quantity, meta)?,
            CartAction::List => commands::cart::list(&cart).await,
            CartAction::Update { line_id, quantity } => {
                commands::cart::update(&cart, &line_id, quantity)?;
            }
            CartAction::Remove { id } => commands::cart::remove(&cart, &id)?,
            CartAction::Clear => commands::cart::clear(&cart)?,
            CartAction::Country { code } => commands::cart::country(&cart, code.as_deref())?,
        },
        Commands::Countries => commands::cart::countries(&cart).await,
        Commands::Quote => commands::pay::quote(&ctx).await?,
        Commands::Checkout => commands::pay::checkout(&ctx).await?,
        Commands::Buy {
            product,
            email,
            name,
            country,
            marketing,
        } => {
            let purchase = DirectPurchase {
                product_id: product.into(),
                email,
                name,
                country,
                marketing_agreement: marketing,
            };
            commands::pay::buy(&ctx, purchase).await?;
        }
        Commands::Link { items, automatic } => commands::pay::link(&ctx, items, automatic).await?,
        Commands::Wallets { request } => commands::pay::wallets(&ctx, request).await?,
    }
    Ok(())
}
