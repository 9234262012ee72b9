//! Outfitter CLI - Database migrations and back-office tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! outfitter migrate
//!
//! # Load items and coupons from YAML
//! outfitter seed crates/cli/fixtures/catalog.yaml
//!
//! # Create a coupon
//! outfitter coupon create -c SPRING10 -a 10.00
//!
//! # Create a shopper account (password from OUTFITTER_USER_PASSWORD)
//! outfitter user create -u alice -e alice@example.com
//!
//! # Work the refund queue
//! outfitter refund list
//! outfitter refund accept 12
//!
//! # Look up placed orders
//! outfitter order list alice
//! outfitter order show <ref-code>
//!
//! # Move an order through delivery
//! outfitter order ship <ref-code>
//! outfitter order receive <ref-code>
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use outfitter_core::{Money, RefCode, RefundId};

mod commands;

#[derive(Parser)]
#[command(name = "outfitter")]
#[command(author, version, about = "Outfitter CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed items and coupons from a YAML file
    Seed {
        /// Path to the seed file
        file: String,
    },
    /// Manage coupons
    Coupon {
        #[command(subcommand)]
        action: CouponAction,
    },
    /// Manage shopper accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Handle refund requests
    Refund {
        #[command(subcommand)]
        action: RefundAction,
    },
    /// Inspect placed orders and update their delivery status
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum CouponAction {
    /// Create a fixed-amount coupon
    Create {
        /// Coupon code customers enter at checkout
        #[arg(short, long)]
        code: String,

        /// Amount taken off the order total
        #[arg(short, long)]
        amount: Money,
    },
    /// List all coupons
    List,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a username/password account
    Create {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum RefundAction {
    /// List refund requests awaiting a decision
    List,
    /// Accept a refund request
    Accept {
        /// Refund request ID
        id: RefundId,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List a user's placed orders
    List { username: String },
    /// Show an order's lines, payment and billing address
    Show { ref_code: RefCode },
    /// Mark an order as being delivered
    Ship { ref_code: RefCode },
    /// Mark an order as received
    Receive { ref_code: RefCode },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Coupon { action } => match action {
            CouponAction::Create { code, amount } => {
                commands::coupon::create(&code, amount).await?;
            }
            CouponAction::List => commands::coupon::list().await?,
        },
        Commands::User { action } => match action {
            UserAction::Create { username, email } => {
                commands::user::create(&username, email.as_deref()).await?;
            }
        },
        Commands::Refund { action } => match action {
            RefundAction::List => commands::refund::list_pending().await?,
            RefundAction::Accept { id } => commands::refund::accept(id).await?,
        },
        Commands::Order { action } => match action {
            OrderAction::List { username } => {
                commands::order::list(&username).await?;
            }
            OrderAction::Show { ref_code } => {
                commands::order::show(&ref_code).await?;
            }
            OrderAction::Ship { ref_code } => {
                commands::order::ship(&ref_code).await?;
            }
            OrderAction::Receive { ref_code } => {
                commands::order::receive(&ref_code).await?;
            }
        },
    }
    Ok(())
}
