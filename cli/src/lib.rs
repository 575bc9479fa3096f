pub mod server;

use anyhow::{anyhow, Context, Error, Result};
use clap::{Parser, Subcommand};
use easylod::config::{Config, DEFAULT_CONFIG_FILE};
use easylod::paths::absolute_url;
use easylod::source::SourceRegistry;
use easylod::Resolver;
use log::info;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "easylod")]
#[command(about = "Expose content-management metadata as Linked Open Data")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to the JSON configuration file
    #[clap(long, short, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on, overrides the configured value
        #[clap(long, short)]
        listen: Option<String>,
    },
    /// Print the human-readable page URL for an identifier
    Page {
        /// Identifier of the form namespace:alias:pointer
        identifier: String,
    },
    /// Fetch a record and print its RDF/XML description
    Describe {
        /// Identifier of the form namespace:alias:pointer
        identifier: String,
        /// Subject URI for rdf:about, defaults to the /resource URL on the configured base
        #[clap(long, short)]
        subject: Option<String>,
    },
    /// List the registered data sources
    Sources,
    /// Print the effective configuration
    Config,
    /// Prints the version of the easylod binary
    Version,
}

pub fn run() -> Result<()> {
    easylod::init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    easylod::init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(anyhow!(
            "No configuration found at {}. Pass --config <file>.",
            path.display()
        ));
    }
    Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn build_resolver(config: &Config) -> Result<Resolver> {
    let registry = SourceRegistry::from_config(config)?;
    if registry.is_empty() {
        log::warn!("No data sources configured; every identifier will be rejected");
    }
    Ok(Resolver::new(registry))
}

fn default_subject(config: &Config, identifier: &str) -> String {
    let base = config
        .base_url
        .clone()
        .unwrap_or_else(|| format!("http://{}", config.listen));
    absolute_url(&base, &format!("/resource/{}", identifier))
}

fn execute(cmd: Cli) -> Result<()> {
    // EASYLOD_LOG has already been copied into RUST_LOG; CLI flags take precedence.
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    match cmd.command {
        Commands::Version => print_version(),
        command => {
            let config = load_config(&cmd.config)?;
            execute_with_config(command, config)?;
        }
    }
    Ok(())
}

fn print_version() {
    println!("easylod {}", env!("CARGO_PKG_VERSION"));
}

fn execute_with_config(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Serve { listen } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            serve(&config)?;
        }
        Commands::Page { identifier } => {
            let resolver = build_resolver(&config)?;
            println!("{}", resolver.human_page(&identifier)?);
        }
        Commands::Describe {
            identifier,
            subject,
        } => {
            let resolver = build_resolver(&config)?;
            let subject = subject.unwrap_or_else(|| default_subject(&config, &identifier));
            print!("{}", resolver.describe(&identifier, &subject)?);
        }
        Commands::Sources => {
            let resolver = build_resolver(&config)?;
            for (namespace, source_type) in resolver.registry().entries() {
                println!("{}\t{}", namespace, source_type);
            }
        }
        Commands::Config => config.print(),
        Commands::Version => print_version(),
    }
    Ok(())
}

fn serve(config: &Config) -> Result<()> {
    // The registry owns blocking HTTP clients, which must be created and dropped outside
    // the async runtime; this function keeps the last reference.
    let resolver = Arc::new(build_resolver(config)?);
    let state = server::AppState::new(resolver.clone(), config.base_url.clone());
    let router = server::build_router(state);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let listen = config.listen.clone();
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&listen)
            .await
            .with_context(|| format!("Failed to bind {}", listen))?;
        server::serve(listener, router).await
    })?;
    drop(runtime);
    info!("Served {} data sources", resolver.registry().len());
    Ok(())
}
