//! EcoBot setup wizard.
//!
//! Asks for the bot token and the data API keys in the terminal and writes
//! `config.toml` to the project root. Refuses to overwrite an existing file
//! unless `--force` is given; `--print` writes the result to stdout instead.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;

struct ConfigParams<'a> {
    bot_token: &'a str,
    currency_token: &'a str,
    weather_key: &'a str,
    gif_key: &'a str,
    news_key: &'a str,
    timeout_secs: u64,
    port: u16,
}

/// An empty value becomes a commented-out line so the bot treats the key as missing.
fn key_line(name: &str, value: &str) -> String {
    if value.is_empty() {
        format!("# {name} = \"\"")
    } else {
        format!("{name} = \"{value}\"")
    }
}

/// Produces a valid config.toml string. Extracted so it can be unit-tested.
fn format_config(p: &ConfigParams<'_>) -> String {
    let bot_token = p.bot_token;
    let currency = key_line("currency_token", p.currency_token);
    let weather = key_line("weather_key", p.weather_key);
    let gif = key_line("gif_key", p.gif_key);
    let news = key_line("news_key", p.news_key);
    let timeout_secs = p.timeout_secs;
    let port = p.port;

    format!(
        r#"[telegram]
bot_token = "{bot_token}"

[apis]
{currency}
{weather}
{gif}
{news}

[http]
timeout_secs = {timeout_secs}

[health]
enabled = true
port = {port}
"#
    )
}

fn run_cli() -> Result<String> {
    println!("=== EcoBot Setup ===\n");

    let read_line = |prompt: &str| -> Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)?;
        Ok(buf.trim().to_owned())
    };

    let bot_token = loop {
        let token = read_line("Telegram bot token: ")?;
        if !token.is_empty() {
            break token;
        }
        println!("  The bot cannot start without a token.");
    };
    let currency_token = read_line("AwesomeAPI token (optional): ")?;
    let weather_key = read_line("WeatherAPI key (for /clima): ")?;
    let gif_key = read_line("GIPHY key (for /gif): ")?;
    let news_key = read_line("NewsAPI key (for /noticias): ")?;

    let timeout_secs = read_line("HTTP timeout in seconds [10]: ")?
        .parse()
        .ok()
        .filter(|&secs: &u64| secs > 0)
        .unwrap_or(10);
    let port = read_line("Health check port [3000]: ")?
        .parse()
        .unwrap_or(3000);

    Ok(format_config(&ConfigParams {
        bot_token: &bot_token,
        currency_token: &currency_token,
        weather_key: &weather_key,
        gif_key: &gif_key,
        news_key: &news_key,
        timeout_secs,
        port,
    }))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let force = args.iter().any(|a| a == "--force");
    let print_only = args.iter().any(|a| a == "--print");

    // Resolve project root: prefer ECOBOT_ROOT env, fall back to cwd.
    let project_root =
        PathBuf::from(std::env::var("ECOBOT_ROOT").unwrap_or_else(|_| ".".to_string()));
    let config_path = project_root.join("config.toml");

    if !print_only && config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists; rerun with --force to overwrite",
            config_path.display()
        );
    }

    let config = run_cli()?;

    if print_only {
        println!("\n{config}");
        return Ok(());
    }

    std::fs::write(&config_path, &config)
        .with_context(|| format!("Could not write {}", config_path.display()))?;

    println!("\n✓  config.toml saved to {}", config_path.display());
    println!("   Run the bot with:  cargo run");
    Ok(())
}
