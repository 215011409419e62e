use std::io;

use clap::Args;
use storefront_app::{auth::NewUser, context::AppContext};

use crate::errors::CliError;

#[derive(Debug, Args)]
pub(crate) struct RegisterArgs {
    email: String,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, default_value = "")]
    first_name: String,

    #[arg(long, default_value = "")]
    last_name: String,
}

pub(crate) async fn login(
    context: &AppContext,
    email: &str,
    password: &str,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let user = context.auth.login(email, password).await?;

    writeln!(out, "logged in as {}", user.email)?;

    Ok(())
}

pub(crate) async fn register(
    args: RegisterArgs,
    context: &AppContext,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let new_user = NewUser {
        email: args.email,
        first_name: args.first_name,
        last_name: args.last_name,
    };

    let user = context.auth.register(&new_user, &args.password).await?;

    writeln!(out, "registered and logged in as {}", user.email)?;

    Ok(())
}

pub(crate) async fn logout(context: &AppContext, out: &mut impl io::Write) -> Result<(), CliError> {
    context.auth.logout().await?;

    writeln!(out, "logged out")?;

    Ok(())
}

pub(crate) fn whoami(context: &AppContext, out: &mut impl io::Write) -> Result<(), CliError> {
    match context.auth.user() {
        Some(user) => writeln!(out, "{}", user.email)?,
        None => writeln!(out, "not logged in")?,
    }

    Ok(())
}
