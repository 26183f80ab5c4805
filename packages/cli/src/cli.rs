//! Command-line interface for citelaw.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use citelaw_resolver::config::{registry_file_from_env, ApiConfig, TraversalOptions};
use citelaw_resolver::{
    CacheFirstResolver, CitationParser, DivisionsApi, HttpDivisionsApi, JurisdictionRegistry,
    MemoryStore, ParsedCitation, Resolution, ResolveOptions, ResolverError, Statute,
    StatuteStore,
};
use citelaw_store::{create_pool, run_migrations, PgStatuteStore, StoreConfig};

use crate::error::{CliError, Result};

/// citelaw - Resolve free-text statute citations to statute text.
#[derive(Parser)]
#[command(name = "citelaw")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a citation without contacting the law API.
    Parse {
        /// Citation (e.g., "Cal. Penal Code § 187")
        citation: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve a citation to statute text.
    Resolve {
        /// Citation (e.g., "N.J.S.A. 2C:15-1")
        citation: String,

        /// Store the statute when found
        #[arg(long)]
        import: bool,

        /// Maximum remote API calls for this lookup
        #[arg(long)]
        max_calls: Option<u32>,

        /// Maximum tree levels searched below a compilation
        #[arg(long)]
        max_depth: Option<u32>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check the law API and the statute store.
    Status,

    /// List known jurisdictions.
    Jurisdictions {
        /// Ask the law API instead of the local registry
        #[arg(long)]
        remote: bool,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Commands::Parse { citation, json } => parse_command(&citation, json),
        Commands::Resolve {
            citation,
            import,
            max_calls,
            max_depth,
            json,
        } => runtime.block_on(resolve_command(&citation, import, max_calls, max_depth, json)),
        Commands::Status => runtime.block_on(status_command()),
        Commands::Jurisdictions { remote } => runtime.block_on(jurisdictions_command(remote)),
    }
}

fn load_registry() -> Result<JurisdictionRegistry> {
    Ok(match registry_file_from_env() {
        Some(path) => JurisdictionRegistry::builtin_with_file(&path)?,
        None => JurisdictionRegistry::builtin(),
    })
}

/// Postgres store when `DATABASE_URL` is set, otherwise an in-memory store.
async fn open_store() -> Result<(Arc<dyn StatuteStore>, Option<PgStatuteStore>)> {
    match StoreConfig::from_env_optional() {
        Some(config) => {
            let pool = create_pool(&config).await?;
            run_migrations(&pool).await?;
            let store = PgStatuteStore::new(pool);
            Ok((Arc::new(store.clone()), Some(store)))
        }
        None => {
            tracing::debug!("DATABASE_URL not set, using in-memory store");
            Ok((Arc::new(MemoryStore::new()), None))
        }
    }
}

fn build_resolver(store: Arc<dyn StatuteStore>, options: TraversalOptions) -> Result<CacheFirstResolver> {
    let config = ApiConfig::from_env()?;
    Ok(CacheFirstResolver::from_config(
        &config,
        options,
        load_registry()?,
        store,
    )?)
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    citation: &'a str,
    #[serde(flatten)]
    parsed: &'a ParsedCitation,
}

fn parse_command(citation: &str, json: bool) -> Result<()> {
    let registry = load_registry()?;
    let parsed = CitationParser::new(&registry).parse(citation)?;

    if json {
        let output = ParseOutput {
            citation,
            parsed: &parsed,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let name = registry
        .get(&parsed.jurisdiction)
        .map(|entry| entry.name.as_str())
        .unwrap_or_default();
    println!("  Jurisdiction: {} ({})", style(&parsed.jurisdiction).cyan(), name);
    println!("  Section: {}", style(&parsed.section).green());
    println!(
        "  Code hint: {}",
        parsed.code_hint.as_deref().unwrap_or("-")
    );
    println!("  Format: {}", parsed.format.as_str());
    Ok(())
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    citation: &'a str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    statute: Option<&'a Statute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parsed: Option<&'a ParsedCitation>,
    imported: bool,
}

async fn resolve_command(
    citation: &str,
    import: bool,
    max_calls: Option<u32>,
    max_depth: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut options = TraversalOptions::from_env();
    if let Some(max_calls) = max_calls {
        options = options.with_call_budget(max_calls);
    }
    if let Some(max_depth) = max_depth {
        options = options.with_max_depth(max_depth);
    }

    let (store, _) = open_store().await?;
    let resolver = build_resolver(store, options)?;

    if !json {
        println!("{} {}", style("Resolving").bold(), style(citation).cyan());
        println!();
    }

    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Searching law database...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let resolve_options = ResolveOptions {
        import_if_found: import,
    };
    let resolution = match resolver.resolve(citation, resolve_options).await {
        Ok(resolution) => resolution,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    pb.finish_and_clear();

    let parsed = match &resolution {
        Resolution::NotFound { parsed } | Resolution::NotConfigured { parsed } => Some(parsed),
        _ => None,
    };
    let imported = matches!(resolution, Resolution::Resolved { imported: true, .. });

    if json {
        let output = ResolveOutput {
            citation,
            outcome: resolution.outcome(),
            statute: resolution.statute(),
            parsed,
            imported,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_resolution(&resolution, imported);
    }

    match resolution.statute() {
        Some(_) => Ok(()),
        None => Err(CliError::NotResolved {
            outcome: resolution.outcome(),
        }),
    }
}

fn print_resolution(resolution: &Resolution, imported: bool) {
    match resolution {
        Resolution::Cached(statute) | Resolution::Resolved { statute, .. } => {
            println!("  Title: {}", style(&statute.title).green());
            println!("  Jurisdiction: {}", statute.jurisdiction);
            println!("  Path: {}", statute.id);
            if let Some(url) = &statute.source_url {
                println!("  Source: {url}");
            }
            println!(
                "  Origin: {}",
                if matches!(resolution, Resolution::Cached(_)) {
                    style("store").yellow()
                } else {
                    style("law API").cyan()
                }
            );
            if imported {
                println!("  {}", style("Imported into store").green().bold());
            }
            println!();
            println!("{}", statute.content);
        }
        Resolution::NotFound { parsed } => {
            println!(
                "{} section {} not found in {}",
                style("Not found:").yellow().bold(),
                parsed.section,
                parsed.jurisdiction
            );
        }
        Resolution::Unparseable(err) => {
            println!("{} {err}", style("Unparseable:").red().bold());
        }
        Resolution::NotConfigured { .. } => {
            println!(
                "{} set OPENLAWS_API_KEY to search the law API",
                style("Not configured:").yellow().bold()
            );
        }
    }
}

async fn status_command() -> Result<()> {
    let (store, pg) = open_store().await?;
    let resolver = build_resolver(store, TraversalOptions::from_env())?;

    let availability = resolver.check_availability().await;
    let marker = if availability.available {
        style("available").green().bold()
    } else {
        style("unavailable").red().bold()
    };
    println!("  Law API: {marker} ({})", availability.message);
    println!("  Registry: {} jurisdictions", resolver.registry().len());

    match pg {
        Some(store) => {
            let counts = citelaw_store::statutes::count_by_jurisdiction(store.pool()).await?;
            let total: i64 = counts.iter().map(|(_, count)| count).sum();
            println!("  Store: PostgreSQL, {total} active statutes");
            for (jurisdiction, count) in counts {
                println!("    {jurisdiction}: {count}");
            }
        }
        None => println!("  Store: in-memory (set DATABASE_URL to persist)"),
    }
    Ok(())
}

async fn jurisdictions_command(remote: bool) -> Result<()> {
    if remote {
        let api = HttpDivisionsApi::new(&ApiConfig::from_env()?).map_err(ResolverError::from)?;
        if !api.is_configured() {
            return Err(ResolverError::NotConfigured.into());
        }
        let jurisdictions = api
            .list_jurisdictions()
            .await
            .map_err(ResolverError::from)?;
        for jurisdiction in jurisdictions {
            println!("{:<8} {}", style(&jurisdiction.key).cyan(), jurisdiction.name);
        }
        return Ok(());
    }

    let registry = load_registry()?;
    for entry in registry.iter() {
        println!(
            "{:<10} {:<22} {}/{}",
            style(&entry.code).cyan(),
            entry.name,
            entry.key,
            entry.law_key
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_resolve_flags() {
        let cli = Cli::parse_from([
            "citelaw",
            "resolve",
            "Cal. Penal Code § 187",
            "--import",
            "--max-calls",
            "10",
            "--max-depth",
            "3",
        ]);

        match cli.command {
            Commands::Resolve {
                citation,
                import,
                max_calls,
                max_depth,
                json,
            } => {
                assert_eq!(citation, "Cal. Penal Code § 187");
                assert!(import);
                assert_eq!(max_calls, Some(10));
                assert_eq!(max_depth, Some(3));
                assert!(!json);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_cli_parse_jurisdictions_default_local() {
        let cli = Cli::parse_from(["citelaw", "jurisdictions"]);
        assert!(matches!(cli.command, Commands::Jurisdictions { remote: false }));
    }
}
