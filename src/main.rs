//! uibind - Native UI Library Loader
//!
//! CLI entry point for resolving, loading and calling the native UI library.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use uibind::config::UiBindConfig;
use uibind::ffi::{
    library_file_name, ForeignSignature, LibrarySpec, LoadedLibrary, LoaderHandle, UiBindings,
};
use uibind::logging;
use uibind::resources::BundleDirs;

#[derive(Parser)]
#[command(name = "uibind")]
#[command(version)]
#[command(about = "Load the native UI library and call its entry points", long_about = None)]
struct Cli {
    /// Config file (default: search for uibind.toml upwards from the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Load this artifact instead of searching the resource bundle
    #[arg(long, global = true)]
    library_path: Option<PathBuf>,

    /// Extra resource directory, searched before configured roots (repeatable)
    #[arg(long = "resource-dir", global = true)]
    resource_dirs: Vec<PathBuf>,

    /// Only search --resource-dir and configured roots
    #[arg(long, global = true)]
    no_default_roots: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call the diagnostic entry point
    HelloWorld,

    /// Call the string transformation entry point
    Hello {
        /// Input string passed to the native library
        input: String,
    },

    /// Show configuration and where the library resolves to
    Info {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Map the library and bind its exports without calling them
    Load,

    /// Print the platform file name and the bundled path of the library
    Resolve,

    /// List the entry point signatures
    Signatures,
}

/// Composition root: configuration plus the one handle the CLI uses.
struct App {
    config: UiBindConfig,
    roots: Vec<PathBuf>,
    handle: Arc<LoaderHandle>,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => UiBindConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => UiBindConfig::load_from_cwd().context("Failed to load config")?,
        };

        logging::init_tracing(cli.verbose, &config.logging.filter);

        if cli.no_default_roots {
            config.resources.include_defaults = false;
        }

        let mut roots = cli.resource_dirs.clone();
        roots.extend(config.resource_roots());

        let mut spec: LibrarySpec = config.library_spec();
        if let Some(path) = &cli.library_path {
            spec = spec.with_path(path.clone());
        }

        let handle = Arc::new(LoaderHandle::new(spec, Arc::new(BundleDirs::new(roots.clone()))));

        Ok(Self {
            config,
            roots,
            handle,
        })
    }

    /// Eager load: a missing or broken artifact aborts here, before any call.
    fn load(&self) -> Result<Arc<LoadedLibrary>> {
        self.handle
            .load()
            .with_context(|| format!("Failed to initialize native library '{}'", self.handle.name()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let app = App::new(&cli)?;

    match cli.command {
        Commands::HelloWorld => cmd_hello_world(&app),
        Commands::Hello { input } => cmd_hello(&app, &input),
        Commands::Info { json } => cmd_info(&app, json),
        Commands::Load => cmd_load(&app),
        Commands::Resolve => cmd_resolve(&app),
        Commands::Signatures => cmd_signatures(),
    }
}

fn cmd_hello_world(app: &App) -> Result<()> {
    app.load()?;
    app.handle.hello_world().context("helloWorld failed")?;
    Ok(())
}

fn cmd_hello(app: &App, input: &str) -> Result<()> {
    app.load()?;
    let output = app.handle.hello(input).context("hello failed")?;
    println!("{}", output);
    Ok(())
}

fn cmd_info(app: &App, as_json: bool) -> Result<()> {
    let spec = app.handle.spec();
    let resolved = app.handle.resolve();

    if as_json {
        let (path, error) = match &resolved {
            Ok(artifact) => (Some(artifact.path.display().to_string()), None),
            Err(err) => (None, Some(err.to_string())),
        };
        let roots: Vec<String> = app.roots.iter().map(|r| r.display().to_string()).collect();
        let info = json!({
            "name": spec.name,
            "file_name": library_file_name(&spec.name),
            "explicit_path": spec.path.as_ref().map(|p| p.display().to_string()),
            "resource_roots": roots,
            "symbols": spec.symbols,
            "resolved_path": path,
            "error": error,
            "log_filter": app.config.logging.filter,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Library:    {}", spec.name);
    println!("File name:  {}", library_file_name(&spec.name));
    if let Some(path) = &spec.path {
        println!("Explicit:   {}", path.display());
    }
    println!("Symbols:    {}", spec.symbols.all().join(", "));
    println!("Roots:");
    for root in &app.roots {
        println!("  {}", root.display());
    }
    match resolved {
        Ok(artifact) => println!("Resolved:   {}", artifact.path.display()),
        Err(err) => println!("Resolved:   <{}>", err),
    }
    Ok(())
}

fn cmd_load(app: &App) -> Result<()> {
    let library = app.load()?;
    println!(
        "Loaded {} from {} ({})",
        library.name(),
        library.path().display(),
        app.handle.state()
    );
    Ok(())
}

fn cmd_resolve(app: &App) -> Result<()> {
    let artifact = app.handle.resolve()?;
    println!("{}", artifact.file_name);
    println!("{}", artifact.path.display());
    Ok(())
}

fn cmd_signatures() -> Result<()> {
    for signature in ForeignSignature::standard() {
        println!("{}", signature);
    }
    Ok(())
}
