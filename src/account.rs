use anyhow::{Context, Result};
use console::style;

use crate::api::ApiClient;
use crate::auth::AuthContext;
use crate::cache;

/// Log in and persist the returned bearer token.
pub fn login(
    client: &ApiClient,
    auth: &AuthContext,
    name: &str,
    password: Option<&str>,
) -> Result<()> {
    let password = resolve_password(password, "Password: ")?;
    let token = client.login(name, &password)?;
    auth.set_token(&token)?;

    println!("Logged in as {}.", style(name).bold());
    Ok(())
}

/// Drop the stored token.
pub fn logout(auth: &AuthContext) -> Result<()> {
    auth.clear()?;
    println!("Logged out.");
    Ok(())
}

/// Create an account. The user still logs in afterwards.
pub fn register(
    client: &ApiClient,
    name: &str,
    email: &str,
    password: Option<&str>,
) -> Result<()> {
    let password = resolve_password(password, "Choose a password: ")?;
    let message = client.register(name, email, &password)?;

    println!("{message}");
    println!("Now run {} to log in.", style(format!("voicelens login {name}")).cyan());
    Ok(())
}

pub fn change_name(client: &ApiClient, name: &str) -> Result<()> {
    let message = client.change_name(name)?;
    println!("{message}");
    Ok(())
}

pub fn change_email(client: &ApiClient, email: &str) -> Result<()> {
    let message = client.change_email(email)?;
    println!("{message}");
    Ok(())
}

pub fn change_password(client: &ApiClient, password: Option<&str>) -> Result<()> {
    let password = resolve_password(password, "New password: ")?;
    let message = client.change_password(&password)?;
    println!("{message}");
    Ok(())
}

/// Delete the account server-side, then wipe the token and the whole
/// analysis cache; nothing local should outlive the account.
pub fn delete_user(client: &ApiClient, auth: &AuthContext, assume_yes: bool) -> Result<()> {
    if !assume_yes {
        let answer = prompt("Delete your account and all recordings? [y/N] ")?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Kept.");
            return Ok(());
        }
    }

    let message = client.delete_user()?;
    auth.clear()?;
    let removed = cache::clear()?;
    log::debug!("cleared {removed} cached analyses");

    println!("{message}");
    Ok(())
}

fn resolve_password(given: Option<&str>, prompt_text: &str) -> Result<String> {
    match given {
        Some(p) if !p.is_empty() => Ok(p.to_string()),
        _ => {
            let entered = prompt(prompt_text)?;
            anyhow::ensure!(!entered.is_empty(), "password must not be empty");
            Ok(entered)
        }
    }
}

fn prompt(message: &str) -> Result<String> {
    use std::io::Write as _;
    print!("{message}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}
