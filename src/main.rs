use anyhow::{Context, Error, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use geocoder::{
    AddressCollection, Config, FallbackResolver, PluginKind, PluginRegistry, ProviderId,
    ProviderOptions, Query, ResolutionOutcome, TracingSink,
};

/// Check if the error chain contains a broken pipe error.
fn is_broken_pipe(err: &Error) -> bool {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
    }
    false
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file with provider lists and per-provider options
    #[clap(
        short,
        long,
        global = true,
        value_name = "FILE",
        value_hint = clap::ValueHint::FilePath,
        env = "GEOCODER_CONFIG"
    )]
    config: Option<Utf8PathBuf>,

    /// Provider to try, in order. Repeat to set up a fallback chain.
    /// Overrides the provider list from the configuration file
    #[clap(short, long = "provider", value_name = "ID", global = true)]
    providers: Vec<String>,

    /// Provider option as ID.KEY=VALUE. VALUE is parsed as JSON when
    /// possible and taken as a plain string otherwise
    #[clap(short, long = "option", value_name = "ID.KEY=VALUE", global = true)]
    options: Vec<String>,

    /// Print each result with this dumper instead of as JSON
    #[clap(short, long, value_name = "ID", global = true)]
    dumper: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a free-text address into coordinates
    Geocode {
        /// The address to look up
        query: String,
    },
    /// Resolve a coordinate pair into an address
    Reverse {
        /// Latitude in decimal degrees
        #[clap(allow_negative_numbers = true)]
        latitude: f64,
        /// Longitude in decimal degrees
        #[clap(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// List registered plugins of a kind
    List {
        #[clap(value_enum, default_value_t = ArgsPluginKind::Provider)]
        kind: ArgsPluginKind,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum ArgsPluginKind {
    Provider,
    Dumper,
}

impl From<ArgsPluginKind> for PluginKind {
    fn from(kind: ArgsPluginKind) -> Self {
        match kind {
            ArgsPluginKind::Provider => PluginKind::Provider,
            ArgsPluginKind::Dumper => PluginKind::Dumper,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();

    let err = match run_main() {
        Ok(code) => return code,
        Err(err) => err,
    };

    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }

    if std::env::var("RUST_BACKTRACE").is_ok_and(|v| v == "1") {
        let _ = writeln!(io::stderr(), "{:?}", err);
    } else {
        let _ = writeln!(io::stderr(), "{:#}", err);
    }

    ExitCode::FAILURE
}

fn run_main() -> Result<ExitCode> {
    let args = Args::parse();
    let registry = PluginRegistry::default();

    let query = match args.command {
        Command::List { kind } => return list_plugins(&registry, kind.into()),
        Command::Geocode { query } => Query::Address(query),
        Command::Reverse {
            latitude,
            longitude,
        } => Query::Coordinates {
            latitude,
            longitude,
        },
    };

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if !args.providers.is_empty() {
        let providers: Vec<ProviderId> = args.providers.iter().map(ProviderId::new).collect();
        config.geocode_providers = providers.clone();
        config.reverse_providers = providers;
    }
    config.options.merge(parse_options(&args.options)?);

    // Resolve the dumper up front so a typo fails before any network call.
    let dumper = match &args.dumper {
        Some(id) => {
            let id = ProviderId::new(id);
            let dumper_options = config.options.for_provider(&id);
            Some(registry.resolve_dumper(&id, &dumper_options)?)
        }
        None => None,
    };

    let resolver = FallbackResolver::new(registry, TracingSink)
        .with_geocode_providers(config.geocode_providers)
        .with_reverse_providers(config.reverse_providers);

    let outcome = match query {
        Query::Address(text) => resolver.geocode(&text, &config.options)?,
        Query::Coordinates {
            latitude,
            longitude,
        } => resolver.reverse(latitude, longitude, &config.options)?,
    };

    let addresses = match outcome {
        ResolutionOutcome::Success(addresses) => addresses,
        // The resolver has already logged why.
        ResolutionOutcome::Failure => return Ok(ExitCode::FAILURE),
    };

    let mut out = io::stdout().lock();
    match dumper {
        Some(dumper) => {
            for address in &addresses {
                writeln!(out, "{}", dumper.dump(address)?)?;
            }
        }
        None => write_json(&addresses, &mut out)?,
    }
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}

fn list_plugins(registry: &PluginRegistry, kind: PluginKind) -> Result<ExitCode> {
    let mut out = io::stdout().lock();
    for (id, name) in registry.list_plugins(kind) {
        writeln!(out, "{}\t{}", id, name)?;
    }
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn write_json(addresses: &AddressCollection, out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, addresses).context("failed to write results")?;
    writeln!(out)?;
    Ok(())
}

/// Parse repeated `ID.KEY=VALUE` arguments into per-provider options.
fn parse_options(raw: &[String]) -> Result<ProviderOptions> {
    let mut options = ProviderOptions::new();
    for item in raw {
        let (target, value) = item
            .split_once('=')
            .with_context(|| format!("option '{}' is not of the form ID.KEY=VALUE", item))?;
        let (id, key) = target
            .split_once('.')
            .with_context(|| {
                format!(
                    "option '{}' is missing the provider id, expected ID.KEY=VALUE",
                    item
                )
            })?;
        if id.is_empty() || key.is_empty() {
            anyhow::bail!("option '{}' is not of the form ID.KEY=VALUE", item);
        }
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        options.set(id, key, value);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_parse_json_then_string() {
        let raw = vec![
            "openstreetmap.limit=2".to_string(),
            "OpenStreetMap.language=de".to_string(),
            "openstreetmap.endpoint=http://localhost:8080".to_string(),
        ];
        let options = parse_options(&raw).unwrap();
        let osm = options.for_provider(&ProviderId::new("openstreetmap"));
        assert_eq!(osm.get("limit"), Some(&json!(2)));
        assert_eq!(osm.get("language"), Some(&json!("de")));
        assert_eq!(osm.get("endpoint"), Some(&json!("http://localhost:8080")));
    }

    #[test]
    fn malformed_options_are_errors() {
        assert!(parse_options(&["limit=2".to_string()]).is_err());
        assert!(parse_options(&["openstreetmap.limit".to_string()]).is_err());
        assert!(parse_options(&[".limit=2".to_string()]).is_err());
    }
}
