use std::io;

use clap::Subcommand;
use storefront_app::{context::AppContext, products::models::ProductId};

use crate::{errors::CliError, render};

#[derive(Debug, Subcommand)]
pub(crate) enum ProductsCommand {
    /// List one page of the catalog
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1u32)]
        page: u32,
    },

    /// Show a single product
    Show { product: String },
}

pub(crate) async fn run(
    command: ProductsCommand,
    context: &AppContext,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    match command {
        ProductsCommand::List { page } => {
            let page_number = page.max(1);
            let listing = context.products.list_products(page_number).await?;

            render::write_products(out, &listing, page_number)?;
        }
        ProductsCommand::Show { product } => {
            let product = context
                .products
                .get_product(&ProductId::from(product))
                .await?;

            render::write_product(out, &product, context.api.base_url())?;
        }
    }

    Ok(())
}
