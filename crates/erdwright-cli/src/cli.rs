//! Command-line interface for the erdwright utility
//!
//! Loads a model catalog exported by the host environment and draws entity
//! relationship diagrams for the models it names.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use erdwright::core::{write_atomic, ModelAdapter};
use erdwright::plugins::default_registry;
use erdwright::{
    AdapterRegistry, DiagramOptions, GraphvizCli, ModelCatalog, Orientation, UNBOUNDED_DEPTH,
};

/// Environment variable naming the model catalog file
pub const SCHEMA_ENV: &str = "ERDWRIGHT_SCHEMA";

/// Erdwright - Entity relationship diagrams for data model classes
#[derive(Parser)]
#[command(name = "erdwright")]
#[command(about = "Draw entity relationship diagrams for pydantic models and dataclasses")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Model catalog (JSON) exported from the host environment
    /// [env: ERDWRIGHT_SCHEMA]
    #[arg(short, long, global = true)]
    pub schema: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Diagram layout direction
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum OrientationChoice {
    /// Left to right
    #[default]
    Horizontal,
    /// Top to bottom
    Vertical,
}

impl From<OrientationChoice> for Orientation {
    fn from(value: OrientationChoice) -> Self {
        match value {
            OrientationChoice::Horizontal => Orientation::Horizontal,
            OrientationChoice::Vertical => Orientation::Vertical,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a diagram to a file (format from the extension)
    Draw {
        /// Model classes or modules, e.g. `game.Party` or `game`
        #[arg(required = true)]
        paths: Vec<String>,

        /// Output file: .svg, .png, .pdf, .dot, ...
        #[arg(short, long)]
        out: PathBuf,

        /// Relationship hops to follow from the roots (default: unbounded)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Layout direction
        #[arg(long, value_enum, default_value_t = OrientationChoice::Horizontal)]
        orientation: OrientationChoice,

        /// Shorthand for `--orientation vertical`
        #[arg(long)]
        vertical: bool,

        /// Also write the DOT source next to the output as `<OUT>.dot`
        #[arg(long)]
        emit_dot: bool,

        /// Graphviz program to run instead of `dot` [env: ERDWRIGHT_DOT]
        #[arg(long)]
        dot_program: Option<PathBuf>,
    },

    /// Print the Graphviz DOT source of a diagram
    Dot {
        /// Model classes or modules
        #[arg(required = true)]
        paths: Vec<String>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Relationship hops to follow from the roots (default: unbounded)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Layout direction
        #[arg(long, value_enum, default_value_t = OrientationChoice::Horizontal)]
        orientation: OrientationChoice,

        /// Shorthand for `--orientation vertical`
        #[arg(long)]
        vertical: bool,
    },

    /// List catalog classes recognized as models
    Models {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List registered adapters in dispatch order
    Adapters {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn diagram_options(
    depth: Option<usize>,
    orientation: OrientationChoice,
    vertical: bool,
) -> DiagramOptions {
    let orientation = if vertical {
        Orientation::Vertical
    } else {
        orientation.into()
    };
    DiagramOptions::new(depth.unwrap_or(UNBOUNDED_DEPTH), orientation)
}

/// Main CLI application
pub struct ErdwrightApp {
    registry: AdapterRegistry,
}

impl ErdwrightApp {
    /// Create a new application with the shipped adapters
    pub fn new() -> Self {
        Self::with_registry(default_registry())
    }

    pub fn with_registry(registry: AdapterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        if cli.verbose {
            eprintln!("Erdwright v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Draw {
                paths,
                out,
                depth,
                orientation,
                vertical,
                emit_dot,
                dot_program,
            } => {
                let catalog = self.load_catalog(cli.schema.as_deref(), cli.verbose)?;
                let options = diagram_options(depth, orientation, vertical);
                self.draw_command(
                    &catalog,
                    &paths,
                    &out,
                    options,
                    emit_dot,
                    dot_program,
                    cli.verbose,
                )
            }
            Commands::Dot {
                paths,
                out,
                depth,
                orientation,
                vertical,
            } => {
                let catalog = self.load_catalog(cli.schema.as_deref(), cli.verbose)?;
                let options = diagram_options(depth, orientation, vertical);
                self.dot_command(&catalog, &paths, out, options)
            }
            Commands::Models { json } => {
                let catalog = self.load_catalog(cli.schema.as_deref(), cli.verbose)?;
                print!("{}", self.models_report(&catalog, json)?);
                Ok(())
            }
            Commands::Adapters { json } => {
                print!("{}", self.adapters_report(json)?);
                Ok(())
            }
        }
    }

    /// Load the catalog from `--schema` or `ERDWRIGHT_SCHEMA`
    pub fn load_catalog(&self, schema: Option<&Path>, verbose: bool) -> Result<ModelCatalog> {
        let path = match schema {
            Some(path) => path.to_path_buf(),
            None => std::env::var_os(SCHEMA_ENV)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .ok_or_else(|| {
                    anyhow!("No model catalog given: pass --schema or set {}", SCHEMA_ENV)
                })?,
        };

        let catalog = ModelCatalog::from_path(&path)?;
        debug!(path = %path.display(), classes = catalog.class_count(), "Loaded catalog");
        if verbose {
            eprintln!(
                "Loaded {} classes from {} modules in '{}'",
                catalog.class_count(),
                catalog.module_count(),
                path.display()
            );
        }
        Ok(catalog)
    }

    /// Handle the draw command
    #[allow(clippy::too_many_arguments)]
    pub fn draw_command(
        &self,
        catalog: &ModelCatalog,
        paths: &[String],
        out: &Path,
        options: DiagramOptions,
        emit_dot: bool,
        dot_program: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let backend = dot_program
            .map(GraphvizCli::with_program)
            .unwrap_or_default();

        let diagram = erdwright::create(catalog, &self.registry, paths, options)?;
        if verbose {
            eprintln!(
                "Built diagram with {} models and {} relationships",
                diagram.node_count(),
                diagram.edge_count()
            );
        }

        diagram.render(out, &backend)?;

        if emit_dot {
            let mut dot_path: OsString = out.as_os_str().to_owned();
            dot_path.push(".dot");
            let dot_path = PathBuf::from(dot_path);
            write_atomic(&dot_path, diagram.to_dot().as_bytes())?;
            if verbose {
                eprintln!("Wrote DOT source to '{}'", dot_path.display());
            }
        }

        if verbose {
            eprintln!("Wrote diagram to '{}'", out.display());
        }
        Ok(())
    }

    /// Handle the dot command
    pub fn dot_command(
        &self,
        catalog: &ModelCatalog,
        paths: &[String],
        out: Option<PathBuf>,
        options: DiagramOptions,
    ) -> Result<()> {
        let dot = erdwright::to_dot(catalog, &self.registry, paths, options)?;
        self.write_output(out, &dot)
    }

    /// Text (or JSON) listing of every model in the catalog
    pub fn models_report(&self, catalog: &ModelCatalog, json: bool) -> Result<String> {
        let mut models: Vec<(String, &'static str, usize)> = Vec::new();
        for class in catalog.classes() {
            let Ok(adapter) = self.registry.resolve_adapter(&class) else {
                continue;
            };
            let fields = adapter
                .fields(&class)
                .with_context(|| format!("Failed to read fields of {}", class.qualified_name()))?;
            models.push((adapter.identity_key(&class), adapter.name(), fields.len()));
        }

        if json {
            let entries: Vec<serde_json::Value> = models
                .iter()
                .map(|(key, adapter, fields)| {
                    serde_json::json!({ "model": key, "adapter": adapter, "fields": fields })
                })
                .collect();
            let report = serde_json::json!({ "models": entries, "total": models.len() });
            return Ok(format!("{}\n", serde_json::to_string_pretty(&report)?));
        }

        let width = models.iter().map(|(key, _, _)| key.len()).max().unwrap_or(0);
        let mut out = String::new();
        for (key, adapter, _) in &models {
            out.push_str(&format!("{:<width$}  {}\n", key, adapter, width = width));
        }
        out.push_str(&format!("\nTotal: {} models\n", models.len()));
        Ok(out)
    }

    /// Text (or JSON) listing of registered adapters
    pub fn adapters_report(&self, json: bool) -> Result<String> {
        let adapters: Vec<&dyn ModelAdapter> = self.registry.adapters().collect();

        if json {
            let entries: Vec<serde_json::Value> = adapters
                .iter()
                .enumerate()
                .map(|(priority, adapter)| {
                    serde_json::json!({
                        "name": adapter.name(),
                        "description": adapter.description(),
                        "priority": priority,
                    })
                })
                .collect();
            let report = serde_json::json!({ "adapters": entries, "total": adapters.len() });
            return Ok(format!("{}\n", serde_json::to_string_pretty(&report)?));
        }

        let mut out = String::from("Registered adapters (in dispatch order):\n");
        for adapter in &adapters {
            out.push_str(&format!("  {:<12} - {}\n", adapter.name(), adapter.description()));
        }
        Ok(out)
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                write_atomic(&path, content.as_bytes())
                    .with_context(|| format!("Failed to write output file '{}'", path.display()))?;
            }
            _ => {
                print!("{}", content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for ErdwrightApp {
    fn default() -> Self {
        Self::new()
    }
}
