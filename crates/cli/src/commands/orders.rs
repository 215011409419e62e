use std::io;

use clap::Subcommand;
use storefront_app::{context::AppContext, orders::OrderId};

use crate::{errors::CliError, render};

#[derive(Debug, Subcommand)]
pub(crate) enum OrdersCommand {
    /// List your orders, newest first
    List,

    /// Confirm payment after returning from the payment provider
    Confirm { order: String },
}

pub(crate) async fn run(
    command: OrdersCommand,
    context: &AppContext,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    match command {
        OrdersCommand::List => {
            let orders = context.orders.list_orders().await?;

            render::write_orders(out, &orders)?;
        }
        OrdersCommand::Confirm { order } => {
            let order = context
                .orders
                .confirm_payment(&OrderId::from(order))
                .await?;

            render::write_order(out, &order)?;
        }
    }

    Ok(())
}

pub(crate) async fn checkout(context: &AppContext, out: &mut impl io::Write) -> Result<(), CliError> {
    if context.cart.identifier().is_some() {
        context.cart.refresh().await?;
    }

    let handoff = context.checkout.begin(&context.cart, &context.auth).await?;

    writeln!(out, "order {} created", handoff.order_id)?;
    writeln!(out, "complete payment at: {}", handoff.session_url)?;

    Ok(())
}
