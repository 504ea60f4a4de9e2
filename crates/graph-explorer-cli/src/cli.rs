//! Command-line interface for the graph-explorer utility
//!
//! Reads graph snapshots (JSON), runs layout passes or collapse operations
//! over them, and reports graph statistics.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use graph_explorer::core::logging::{init_logging, LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use graph_explorer::{ForceConfig, ForceDirectedLayout, GraphModel, GraphSnapshot, GraphStore};

/// Graph Explorer - lay out and inspect graph snapshots
#[derive(Parser)]
#[command(name = "graph-explorer")]
#[command(about = "Force-directed layout and inspection for graph-explorer snapshots")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
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
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
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

#[derive(Subcommand)]
pub enum Commands {
    /// Run one force-directed layout pass over a snapshot
    Layout {
        /// Input snapshot file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the laid-out snapshot (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Viewport width in pixels
        #[arg(long, default_value_t = 800.0)]
        width: f64,

        /// Viewport height in pixels
        #[arg(long, default_value_t = 600.0)]
        height: f64,

        /// Node id to keep in place (repeatable)
        #[arg(long = "lock", value_name = "NODE")]
        locked: Vec<String>,

        /// JSON file with layout constants
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the iteration bound
        #[arg(long)]
        iterations: Option<usize>,

        /// Override the target arc length
        #[arg(long)]
        spring_length: Option<f64>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Collapse a node and prune its collapsed leaf neighbors
    Collapse {
        /// Input snapshot file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the resulting snapshot (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Node to collapse
        #[arg(long)]
        node: String,
    },

    /// Show node and arc counts with per-node degrees
    Stats {
        /// Input snapshot file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List the neighbors of a node
    Neighbors {
        /// Input snapshot file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Node whose neighbors to list
        #[arg(long)]
        node: String,
    },

    /// Check that a snapshot loads into a consistent graph
    Validate {
        /// Input snapshot file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Graph summary printed by `stats`
#[derive(Debug, Serialize, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub arc_count: usize,
    pub nodes: Vec<NodeStats>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct NodeStats {
    pub id: String,
    pub state: String,
    pub degree: usize,
    pub in_degree: usize,
    pub out_degree: usize,
}

impl GraphStats {
    pub fn from_store(store: &GraphStore) -> Self {
        let nodes = store
            .nodes()
            .map(|node| NodeStats {
                id: node.id().to_string(),
                state: node.state.to_string(),
                degree: store.degree(node.id()),
                in_degree: store.in_degree(node.id()),
                out_degree: store.out_degree(node.id()),
            })
            .collect();

        Self {
            node_count: store.node_count(),
            arc_count: store.arc_count(),
            nodes,
        }
    }
}

/// Main CLI application
pub struct GraphExplorerApp {
    config: ForceConfig,
}

impl GraphExplorerApp {
    /// Create a new application instance with default layout constants
    pub fn new() -> Self {
        Self::with_config(ForceConfig::default())
    }

    /// Create a new application instance with base layout constants
    pub fn with_config(config: ForceConfig) -> Self {
        Self { config }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("graph-explorer v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Layout {
                input,
                output,
                width,
                height,
                locked,
                config,
                iterations,
                spring_length,
                seed,
            } => {
                self.config = self.build_config(config, iterations, spring_length, seed)?;
                self.layout_command(input, output, width, height, &locked, cli.verbose)
            }
            Commands::Collapse {
                input,
                output,
                node,
            } => self.collapse_command(input, output, &node, cli.verbose),
            Commands::Stats { input, json } => self.stats_command(input, json),
            Commands::Neighbors { input, node } => self.neighbors_command(input, &node),
            Commands::Validate { input } => self.validate_command(input, cli.verbose),
        }
    }

    /// Layer a config file and flag overrides on top of the base constants
    pub fn build_config(
        &self,
        path: Option<PathBuf>,
        iterations: Option<usize>,
        spring_length: Option<f64>,
        seed: Option<u64>,
    ) -> Result<ForceConfig> {
        let mut config = match path {
            Some(path) => {
                let text = fs::read_to_string(&path).map_err(|e| {
                    anyhow!("Failed to read config file '{}': {}", path.display(), e)
                })?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid layout config '{}'", path.display()))?
            }
            None => self.config.clone(),
        };

        if let Some(iterations) = iterations {
            config = config.with_max_iterations(iterations);
        }
        if let Some(spring_length) = spring_length {
            config = config.with_spring_length(spring_length);
        }
        if let Some(seed) = seed {
            config = config.with_seed(seed);
        }
        debug!(?config, "Resolved layout config");
        Ok(config)
    }

    /// Handle the layout command
    fn layout_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        width: f64,
        height: f64,
        locked: &[String],
        verbose: bool,
    ) -> Result<()> {
        let snapshot = self.read_snapshot(input)?;
        let (laid_out, report) =
            graph_explorer::layout_snapshot(snapshot, width, height, locked, self.config.clone())?;

        info!(
            iterations = report.iterations,
            converged = report.converged,
            "Laid out snapshot"
        );
        if verbose {
            eprintln!(
                "{} iterations, {} movable nodes, converged: {}",
                report.iterations, report.movable, report.converged
            );
        }

        self.write_output(output, &laid_out.to_json()?)
    }

    /// Handle the collapse command
    fn collapse_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        node: &str,
        verbose: bool,
    ) -> Result<()> {
        let snapshot = self.read_snapshot(input)?;
        let mut model = GraphModel::with_engine(ForceDirectedLayout::with_config(self.config.clone()));
        model.load(snapshot)?;

        let removed = model.collapse(node)?;
        if verbose {
            eprintln!("Removed {} node(s): {}", removed.len(), removed.join(", "));
        }

        self.write_output(output, &model.snapshot().to_json()?)
    }

    /// Handle the stats command
    fn stats_command(&self, input: Option<PathBuf>, json: bool) -> Result<()> {
        let store = self.read_store(input)?;
        let stats = GraphStats::from_store(&store);

        if json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Nodes: {}", stats.node_count);
            println!("Arcs:  {}", stats.arc_count);
            for node in &stats.nodes {
                println!(
                    "  {:<20} {:<9} degree {} (in {}, out {})",
                    node.id, node.state, node.degree, node.in_degree, node.out_degree
                );
            }
        }
        Ok(())
    }

    /// Handle the neighbors command
    fn neighbors_command(&self, input: Option<PathBuf>, node: &str) -> Result<()> {
        let store = self.read_store(input)?;
        if !store.contains_node(node) {
            return Err(anyhow!("Node not found: {}", node));
        }

        for neighbor in store.neighbors(node) {
            println!("{}", neighbor.id());
        }
        Ok(())
    }

    /// Handle the validate command
    fn validate_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let result = GraphSnapshot::from_json(&content)
            .map_err(anyhow::Error::from)
            .and_then(|snapshot| GraphStore::from_snapshot(snapshot).map_err(anyhow::Error::from));

        match result {
            Ok(store) if store.is_consistent() => {
                println!(
                    "✓ Valid graph: {} nodes, {} arcs",
                    store.node_count(),
                    store.arc_count()
                );
                Ok(())
            }
            Ok(_) => {
                println!("✗ Graph indexes are inconsistent");
                Err(anyhow!("Inconsistent graph"))
            }
            Err(e) => {
                println!("✗ Invalid graph: {}", e);
                Err(e)
            }
        }
    }

    fn read_snapshot(&self, input: Option<PathBuf>) -> Result<GraphSnapshot> {
        let content = self.read_input(input)?;
        GraphSnapshot::from_json(&content).context("Failed to parse graph snapshot")
    }

    fn read_store(&self, input: Option<PathBuf>) -> Result<GraphStore> {
        let snapshot = self.read_snapshot(input)?;
        Ok(GraphStore::from_snapshot(snapshot)?)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                if content.is_empty() || content.ends_with('\n') {
                    print!("{}", content);
                } else {
                    println!("{}", content);
                }
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for GraphExplorerApp {
    fn default() -> Self {
        Self::new()
    }
}
