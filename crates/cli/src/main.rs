use clap::{Args, Parser, Subcommand};
use getdns_domain::{CliOverrides, Config, LookupOptions, LookupResult, NameserverChoice};
use std::process::ExitCode;
use tracing::{debug, error};

mod bootstrap;
mod di;

#[derive(Parser)]
#[command(name = "getdns")]
#[command(version)]
#[command(about = "Iterative DNS lookups from the root servers down, printed as JSON")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up records of one type
    Resolve {
        domain: String,

        /// A, AAAA, CNAME, MX, NS, SOA, SRV or TXT
        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: String,

        /// Ask the configured recursive pool instead of walking from the roots
        #[arg(long, conflicts_with = "nameserver")]
        random: bool,

        #[command(flatten)]
        lookup: LookupArgs,

        /// Include every round trip in the output
        #[arg(long)]
        trace: bool,
    },

    /// Show the nameservers a domain is delegated to
    Delegation {
        domain: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
struct LookupArgs {
    /// Send the query to this server (IP or IP:PORT)
    #[arg(long, value_name = "IP")]
    nameserver: Option<NameserverChoice>,

    /// Deadline for one round trip
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cli_overrides = match &cli.command {
        Command::Resolve { lookup, trace, .. } => CliOverrides {
            timeout_ms: lookup.timeout_ms,
            trace: trace.then_some(true),
            log_level: cli.log_level.clone(),
        },
        Command::Delegation { lookup, .. } => CliOverrides {
            timeout_ms: lookup.timeout_ms,
            trace: None,
            log_level: cli.log_level.clone(),
        },
        Command::Config => CliOverrides {
            log_level: cli.log_level.clone(),
            ..CliOverrides::default()
        },
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);
    debug!("getdns v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Resolve {
            domain,
            record_type,
            random,
            lookup,
            ..
        } => {
            let nameserver = if random {
                NameserverChoice::RandomFromPool
            } else {
                lookup.nameserver.unwrap_or_default()
            };
            let use_cases = di::UseCases::new(&config);
            let result = use_cases
                .lookup_records
                .execute(&domain, &record_type, &lookup_options(&config, nameserver))
                .await?;
            print_result(&result)
        }
        Command::Delegation { domain, lookup } => {
            let nameserver = lookup.nameserver.unwrap_or_default();
            let use_cases = di::UseCases::new(&config);
            let result = use_cases
                .lookup_delegation
                .execute(&domain, &lookup_options(&config, nameserver))
                .await?;
            print_result(&result)
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn lookup_options(config: &Config, nameserver: NameserverChoice) -> LookupOptions {
    LookupOptions::default()
        .with_nameserver(nameserver)
        .with_timeout(config.resolver.timeout())
        .with_trace(config.resolver.trace)
}

fn print_result(result: &LookupResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
