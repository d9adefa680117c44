//! Register and recover commands - customer onboarding and password reset

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;

use super::{get_context, get_new_password};
use crate::output;
use acmebank_core::NewUser;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Identification type (cc, ce, ti, passport)
    #[arg(long)]
    pub id_type: Option<String>,
    /// Identification number
    #[arg(long)]
    pub id_number: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    /// Password (prompted for twice when not given)
    #[arg(long, env = "ACME_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Accept the terms and conditions without prompting
    #[arg(long)]
    pub accept_terms: bool,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RegisterArgs) -> Result<()> {
    let ctx = get_context()?;
    let (password, confirm_password) = get_new_password(args.password)?;

    let accept_terms = args.accept_terms
        || (!args.json
            && Confirm::new()
                .with_prompt("Do you accept the terms and conditions?")
                .default(false)
                .interact()?);

    let form = NewUser {
        id_type: args
            .id_type
            .unwrap_or_else(|| ctx.config.default_id_type.clone()),
        id_number: args.id_number,
        first_name: args.first_name,
        last_name: args.last_name,
        gender: args.gender,
        phone: args.phone,
        email: args.email,
        address: args.address,
        city: args.city,
        password,
        confirm_password,
        accept_terms,
    };

    let registration = ctx
        .user_service
        .register_user(form)
        .context("Registration failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "accountNumber": registration.account.account_number,
                "createdAt": registration.account.created_at,
            })
        );
        return Ok(());
    }

    output::success("Registration successful");
    println!(
        "  Account number: {}",
        registration.account.account_number.bold()
    );
    println!(
        "  Opened: {}",
        registration.account.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    output::info("Log in with your id number or email to start operating.");
    Ok(())
}

#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// Identification type (defaults to the configured id type)
    #[arg(long)]
    pub id_type: Option<String>,
    #[arg(long)]
    pub id_number: String,
    #[arg(long)]
    pub email: String,
    /// New password (prompted for twice when not given)
    #[arg(long, env = "ACME_NEW_PASSWORD", hide_env_values = true)]
    pub new_password: Option<String>,
}

pub fn run_recover(args: RecoverArgs) -> Result<()> {
    let ctx = get_context()?;
    let id_type = args
        .id_type
        .unwrap_or_else(|| ctx.config.default_id_type.clone());

    ctx.user_service
        .find_for_recovery(&id_type, &args.id_number, &args.email)
        .context("We could not find an account with those details")?;

    let (password, confirm) = get_new_password(args.new_password)?;
    ctx.user_service
        .reset_password(&id_type, &args.id_number, &args.email, &password, &confirm)
        .context("Password reset failed")?;

    output::success("Password updated. You can now log in.");
    Ok(())
}
