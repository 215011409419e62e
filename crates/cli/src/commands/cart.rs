use std::io;

use clap::Subcommand;
use storefront_app::{
    carts::{
        CartSession,
        models::{LineId, Quantity},
    },
    products::models::ProductId,
};
use tracing::warn;

use crate::{commands::parse_quantity, errors::CliError, render};

#[derive(Debug, Subcommand)]
pub(crate) enum CartCommand {
    /// Show the cart as the server sees it
    Show,

    /// Add a product, merging with an existing line
    Add {
        product: String,

        #[arg(long, default_value = "1", value_parser = parse_quantity)]
        quantity: Quantity,
    },

    /// Set the quantity of a line
    Update {
        line: String,

        #[arg(value_parser = parse_quantity)]
        quantity: Quantity,
    },

    /// Add one unit to a line
    Inc { line: String },

    /// Remove one unit from a line, never going below one
    Dec { line: String },

    /// Remove a line
    Remove { line: String },

    /// Add a product if it is not in the cart, remove it otherwise
    Toggle { product: String },
}

pub(crate) async fn run(
    command: CartCommand,
    cart: &CartSession,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    match command {
        // Without a stored id there is nothing to show, and refreshing would create a cart.
        CartCommand::Show => {
            if cart.identifier().is_some()
                && let Err(error) = cart.refresh().await
            {
                warn!(%error, "showing last known cart");
            }
        }
        CartCommand::Add { product, quantity } => {
            cart.add_item(&ProductId::from(product), quantity).await?;
        }
        CartCommand::Update { line, quantity } => {
            cart.update_item(&LineId::from(line), quantity).await?;
        }
        CartCommand::Inc { line } => {
            cart.refresh().await?;
            cart.increment_item(&LineId::from(line)).await?;
        }
        CartCommand::Dec { line } => {
            cart.refresh().await?;
            cart.decrement_item(&LineId::from(line)).await?;
        }
        CartCommand::Remove { line } => {
            cart.remove_item(&LineId::from(line)).await?;
        }
        CartCommand::Toggle { product } => {
            let product = ProductId::from(product);

            cart.refresh().await?;

            if cart.has_product(&product) {
                cart.remove_by_product(&product).await?;
            } else {
                cart.add_item(&product, Quantity::ONE).await?;
            }
        }
    }

    render::write_cart(
        out,
        cart.snapshot().as_ref(),
        cart.last_error().as_deref(),
    )?;

    Ok(())
}
