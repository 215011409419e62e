use std::io;

use clap::Subcommand;
use storefront_app::{carts::models::Quantity, context::AppContext};

use crate::errors::CliError;

mod auth;
mod cart;
mod orders;
mod products;

pub(crate) use auth::RegisterArgs;
pub(crate) use cart::CartCommand;
pub(crate) use orders::OrdersCommand;
pub(crate) use products::ProductsCommand;

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Browse the catalog
    #[command(subcommand)]
    Products(ProductsCommand),

    /// Inspect and change the active cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Log in and remember the access token
    Login {
        email: String,

        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in
    Register(RegisterArgs),

    /// Forget the stored access token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Turn the cart into an order and print the payment URL
    Checkout,

    /// Order history and payment confirmation
    #[command(subcommand)]
    Orders(OrdersCommand),
}

impl Command {
    pub(crate) async fn run(
        self,
        context: &AppContext,
        out: &mut impl io::Write,
    ) -> Result<(), CliError> {
        match self {
            Self::Products(command) => products::run(command, context, out).await,
            Self::Cart(command) => cart::run(command, &context.cart, out).await,
            Self::Login { email, password } => auth::login(context, &email, &password, out).await,
            Self::Register(args) => auth::register(args, context, out).await,
            Self::Logout => auth::logout(context, out).await,
            Self::Whoami => auth::whoami(context, out),
            Self::Checkout => orders::checkout(context, out).await,
            Self::Orders(command) => orders::run(command, context, out).await,
        }
    }
}

pub(crate) fn parse_quantity(raw: &str) -> Result<Quantity, String> {
    let value: u32 = raw
        .parse()
        .map_err(|error| format!("invalid quantity `{raw}`: {error}"))?;

    Quantity::new(value).map_err(|error| error.to_string())
}
