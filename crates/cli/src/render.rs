//! Table output for command results.

use std::{io, ops::Range};

use rust_decimal::Decimal;
use storefront_app::{
    api::media_url,
    carts::models::CartSnapshot,
    orders::Order,
    products::{ProductPage, models::Product},
};
use tabled::{
    Table,
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

pub(crate) fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

fn finish(builder: Builder, numeric: Range<usize>) -> Table {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(numeric), Alignment::right());

    table
}

pub(crate) fn write_products(
    out: &mut impl io::Write,
    page: &ProductPage,
    page_number: u32,
) -> io::Result<()> {
    if page.products.is_empty() {
        return writeln!(out, "no products on page {page_number}");
    }

    let mut builder = Builder::default();

    builder.push_record(["ID", "Name", "Price", "Was", "Stock"]);

    for product in &page.products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            money(product.price),
            product.old_price.map(money).unwrap_or_default(),
            product
                .inventory
                .map_or_else(|| "-".to_string(), |stock| stock.to_string()),
        ]);
    }

    writeln!(out, "{}", finish(builder, 2..5))?;

    if page.has_next {
        writeln!(out, "more: --page {}", page_number.saturating_add(1))?;
    }

    Ok(())
}

pub(crate) fn write_product(
    out: &mut impl io::Write,
    product: &Product,
    base_url: &str,
) -> io::Result<()> {
    writeln!(out, "{} ({})", product.name, product.id)?;
    writeln!(out, "price: {}", money(product.price))?;

    if let Some(old_price) = product.old_price {
        writeln!(out, "was:   {}", money(old_price))?;
    }

    if let Some(stock) = product.inventory {
        writeln!(out, "stock: {stock}")?;
    }

    if !product.description.is_empty() {
        writeln!(out, "\n{}", product.description)?;
    }

    for image in &product.images {
        writeln!(out, "image: {}", media_url(base_url, &image.image))?;
    }

    Ok(())
}

pub(crate) fn write_cart(
    out: &mut impl io::Write,
    snapshot: Option<&CartSnapshot>,
    last_error: Option<&str>,
) -> io::Result<()> {
    match snapshot {
        Some(snapshot) if !snapshot.is_empty() => {
            let mut builder = Builder::default();

            builder.push_record(["Line", "Product", "Price", "Qty", "Subtotal"]);

            for item in &snapshot.items {
                builder.push_record([
                    item.id.to_string(),
                    item.product.name.clone(),
                    money(item.product.price),
                    item.quantity.to_string(),
                    money(item.subtotal),
                ]);
            }

            writeln!(out, "{}", finish(builder, 2..5))?;
            writeln!(
                out,
                "{} item(s), total {}",
                snapshot.item_count(),
                money(snapshot.grand_total)
            )?;
        }
        _ => writeln!(out, "your cart is empty")?,
    }

    if let Some(error) = last_error {
        writeln!(out, "error: {error}")?;
    }

    Ok(())
}

pub(crate) fn write_orders(out: &mut impl io::Write, orders: &[Order]) -> io::Result<()> {
    if orders.is_empty() {
        return writeln!(out, "no orders yet");
    }

    let mut builder = Builder::default();

    builder.push_record(["Order", "Placed", "Status", "Items"]);

    for order in orders {
        builder.push_record([
            order.id.to_string(),
            order.placed_at.strftime("%Y-%m-%d %H:%M").to_string(),
            order.status.to_string(),
            order.item_count().to_string(),
        ]);
    }

    writeln!(out, "{}", finish(builder, 3..4))
}

pub(crate) fn write_order(out: &mut impl io::Write, order: &Order) -> io::Result<()> {
    writeln!(
        out,
        "order {}: {} (placed {})",
        order.id,
        order.status,
        order.placed_at.strftime("%Y-%m-%d %H:%M")
    )?;

    for item in &order.items {
        writeln!(out, "  {} x {}", item.quantity, item.product)?;
    }

    Ok(())
}
