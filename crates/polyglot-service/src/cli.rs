//! CLI command structure and argument parsing.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::{ServiceConfig, TranslationHub};
use polyglot_core::models::ProviderId;

#[derive(Parser)]
#[command(name = "polyglot")]
#[command(about = "Translation hub for the polyglot companion bot", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate text against the configured provider tiers
    Translate(TranslateArgs),

    /// List the language directory or look a language up
    Languages(LanguagesArgs),

    /// Run health checks and validate configuration
    Doctor(DoctorArgs),
}

#[derive(Parser)]
pub struct TranslateArgs {
    /// Target language (code, name, alias, or flag emoji)
    #[arg(short, long)]
    pub to: String,

    /// Source language hint; detected when omitted
    #[arg(short, long)]
    pub from: Option<String>,

    /// Text to translate
    #[arg(required = true)]
    pub text: Vec<String>,
}

#[derive(Parser)]
pub struct LanguagesArgs {
    /// Lookup query (alias or flag); lists everything when omitted
    pub query: Option<String>,
}

#[derive(Parser)]
pub struct DoctorArgs {
    /// Print extra detail per check
    #[arg(long)]
    pub verbose: bool,
}

pub async fn translate(args: TranslateArgs) -> Result<()> {
    let hub = TranslationHub::new(ServiceConfig::from_env())?;
    let text = args.text.join(" ");
    let result = hub
        .translate(&text, Some(&args.to), args.from.as_deref())
        .await;

    if result.succeeded() {
        if let Some(provider) = result.provider_id {
            eprintln!(
                "{}",
                format!(
                    "via {} ({} → {})",
                    provider,
                    result.src.as_ref().map(|s| s.as_str()).unwrap_or("?"),
                    result.tgt.as_ref().map(|t| t.as_str()).unwrap_or("?"),
                )
                .dimmed()
            );
        }
        println!("{}", TranslationHub::describe(&result));
    } else {
        eprintln!("{}", TranslationHub::describe(&result).red());
        std::process::exit(1);
    }
    Ok(())
}

pub fn languages(args: LanguagesArgs) -> Result<()> {
    let hub = TranslationHub::new(ServiceConfig::from_env())?;
    let directory = hub.directory();

    match args.query {
        Some(query) => match directory.lookup_by_alias(&query).or_else(|| {
            directory.lookup_by_flag(&query)
        }) {
            Some(entry) => {
                println!(
                    "{}  {} ({})",
                    entry.flags.join(" "),
                    entry.display_name.bold(),
                    entry.code
                );
                if !entry.aliases.is_empty() {
                    println!("aliases: {}", entry.aliases.join(", ").dimmed());
                }
            }
            None => {
                eprintln!("{}", format!("no language matches {:?}", query).red());
                std::process::exit(1);
            }
        },
        None => {
            for entry in directory.entries() {
                println!(
                    "{:<4} {:<14} {}",
                    entry.code,
                    entry.display_name,
                    entry.flags.join(" ")
                );
            }
            println!("{}", format!("{} languages", directory.len()).dimmed());
        }
    }
    Ok(())
}

pub async fn doctor(args: DoctorArgs) -> Result<()> {
    println!("{}", "🩺 polyglot health check".bright_cyan().bold());
    println!("{}", "========================".bright_cyan());
    println!();

    let mut issues: Vec<String> = vec![];
    let mut warnings: Vec<String> = vec![];

    let config = ServiceConfig::from_env();

    if config.premium_api_key.is_none() {
        warnings.push("PREMIUM_API_KEY not set; the premium tier is disabled".to_string());
    }
    if config.free_user_identity.is_none() {
        warnings.push("FREE_USER_IDENTITY not set; the free tier runs on the low quota".to_string());
    }
    if !config.broad_enabled {
        warnings.push("BROAD_ENABLED=false; rare languages will be unsupported".to_string());
    }

    match TranslationHub::new(config.clone()) {
        Ok(hub) => {
            println!(
                "✓ language directory: {} languages",
                hub.directory().len()
            );
            for backend in hub.backends() {
                println!(
                    "✓ {} tier: {} targets",
                    backend.id(),
                    backend.supported_targets().len()
                );
            }
            if args.verbose {
                println!(
                    "  cache: {} entries, {} hits (capacity {}, ttl {:?})",
                    hub.cache().len(),
                    hub.cache().hit_count(),
                    config.cache_capacity,
                    config.cache_ttl
                );
            }
            if !hub
                .backends()
                .iter()
                .any(|b| b.id() == ProviderId::Premium)
                && !config.broad_enabled
            {
                warnings.push("only the free tier is active".to_string());
            }
        }
        Err(err) => issues.push(format!("hub failed to start: {}", err)),
    }

    println!();
    if issues.is_empty() && warnings.is_empty() {
        println!("{}", "✅ All checks passed.".bright_green().bold());
    } else {
        for warning in &warnings {
            println!("{} {}", "⚠️ ".yellow(), warning.yellow());
        }
        for issue in &issues {
            println!("{} {}", "❌".red(), issue.red());
        }
        if !issues.is_empty() {
            std::process::exit(1);
        }
    }
    Ok(())
}
