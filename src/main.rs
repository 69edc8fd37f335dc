use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use tracing::{debug, info};

use namespace_search::enumerate::{DirectoryEnumerator, Enumerator, ListingEnumerator};
use namespace_search::logging::init_logger;
use namespace_search::metrics::metrics;
use namespace_search::tree::{ConflictPolicy, Declaration};
use namespace_search::{EngineConfig, SearchEngine, SearchResults};

/// Incremental fuzzy search over a dotted namespace.
///
/// Queries are dotted paths whose last segment is matched fuzzily, e.g. `os.pa`.
/// Prefix a query with `*` to search the whole subtree, e.g. `*join` or `os.*jo`.
/// Without positional queries, reads one query per line from stdin; `:refresh`
/// re-enumerates the namespace and `:quit` exits.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("source").required(true).multiple(true).args(["listing", "root"])))]
struct Args {
    /// Namespace listing file: one `name<TAB>kind<TAB>source` entry per line
    #[arg(short, long)]
    listing: Vec<PathBuf>,

    /// Package root to walk, such as a site-packages directory
    #[arg(short, long)]
    root: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum results shown per query
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Reject conflicting declarations instead of accepting the last one
    #[arg(long)]
    strict: bool,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable ANSI colors in log output
    #[arg(long)]
    no_color: bool,

    /// Log level for stderr (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Also write a debug session log to the user cache directory
    #[arg(long)]
    log_file: bool,

    /// Queries to run; reads stdin when none are given
    queries: Vec<String>,
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(max_results) = self.max_results {
            config.max_results = max_results;
        }
        if self.strict {
            config.conflict_policy = ConflictPolicy::Strict;
        }
        config.validate()?;
        Ok(config)
    }
}

/// All configured listings and package roots, enumerated in command-line order.
struct Sources {
    listings: Vec<ListingEnumerator>,
    roots: Option<DirectoryEnumerator>,
}

impl Sources {
    fn from_args(args: &Args) -> Self {
        Self {
            listings: args.listing.iter().map(ListingEnumerator::new).collect(),
            roots: (!args.root.is_empty()).then(|| DirectoryEnumerator::new(&args.root)),
        }
    }
}

impl Enumerator for Sources {
    fn enumerate(&self) -> Result<Vec<Declaration>> {
        let mut declarations = Vec::new();
        for listing in &self.listings {
            declarations.extend(listing.enumerate()?);
        }
        if let Some(roots) = &self.roots {
            declarations.extend(roots.enumerate()?);
        }
        Ok(declarations)
    }

    fn name(&self) -> &'static str {
        "command-line"
    }
}

fn print_results(out: &mut impl Write, engine: &SearchEngine, results: &SearchResults, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, results)?;
        writeln!(out)?;
        return Ok(());
    }

    if results.query.is_empty() {
        let stats = engine.stats();
        writeln!(
            out,
            "{} names, {} top-level, max depth {}",
            stats.nodes, stats.top_level, stats.max_depth
        )?;
    }

    if let Some(exact) = &results.exact {
        match exact.metadata.as_ref().and_then(|m| m.source_path.as_ref()) {
            Some(source) => writeln!(out, "= {} ({}) {}", exact.full_path, exact.kind, source.display())?,
            None => writeln!(out, "= {} ({})", exact.full_path, exact.kind)?,
        }
    }

    for hit in &results.hits {
        writeln!(out, "  {} ({})", hit.full_path, hit.kind)?;
    }

    match results.hidden() {
        0 if results.is_empty() => writeln!(out, "  no matches")?,
        0 => {}
        hidden => writeln!(out, "  {} more results not shown..", hidden)?,
    }
    Ok(())
}

fn interactive(engine: &SearchEngine, sources: &Sources, json: bool) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read query from stdin")?;
        match line.trim() {
            ":quit" | ":q" => break,
            ":refresh" => match engine.rebuild(sources) {
                Ok(stats) => writeln!(out, "refreshed: {} names", stats.nodes)?,
                // The previous tree stays active
                Err(e) => writeln!(out, "refresh failed: {:#}", e)?,
            },
            ":metrics" => {
                serde_json::to_writer_pretty(&mut out, &metrics().summary())?;
                writeln!(out)?;
            }
            _ => {
                let results = engine.search(&line);
                print_results(&mut out, engine, &results, json)?;
            }
        }
        out.flush()?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logger(args.no_color, args.log_level.as_deref(), args.log_file)
        .context("Failed to initialize logging")?;

    let config = args.engine_config()?;
    debug!("Engine configuration: {:?}", config);

    let engine = SearchEngine::new(config);
    let sources = Sources::from_args(&args);
    let stats = engine.rebuild(&sources)?;
    info!("Loaded {} names ({} top-level)", stats.nodes, stats.top_level);

    if args.queries.is_empty() {
        interactive(&engine, &sources, args.json)?;
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for query in &args.queries {
            let results = engine.search(query);
            if !args.json {
                writeln!(out, "{}", results.query)?;
            }
            print_results(&mut out, &engine, &results, args.json)?;
        }
    }

    debug!("Metrics: {:?}", metrics().summary());
    Ok(())
}
