//! kvindex CLI - inspect index tables.
//!
//! This is the entry point for the `kvindex` binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use kvindex::{IndexConfig, IndexDescriptor, IndexMaintainer, IndexOptions, RecordSchema};
use kvindex_core::{Attributes, Value};
use kvindex_store::RocksStore;
use serde_json::json;

/// kvindex CLI - inspect index tables.
#[derive(Parser, Debug)]
#[command(name = "kvindex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Table namespace. Falls back to `KVINDEX_NAMESPACE`, then "kvindex".
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Enable debug logging.
    #[arg(long, global = true, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the table name of an index.
    TableName {
        #[command(flatten)]
        index: IndexArgs,
    },

    /// List the record IDs stored under one index location.
    Lookup {
        #[command(flatten)]
        index: IndexArgs,

        /// RocksDB data directory.
        #[arg(long, env = "KVINDEX_DATA_DIR")]
        data_dir: PathBuf,

        /// Hash value, the `.`-joined hash key values.
        #[arg(long, conflicts_with = "attrs")]
        hash: Option<String>,

        /// Range value, for ranged indexes.
        #[arg(long, conflicts_with = "attrs")]
        range: Option<f64>,

        /// Record attributes as `name=value`; the location is derived from them.
        #[arg(long = "attr", value_parser = parse_attr)]
        attrs: Vec<(String, Value)>,
    },
}

/// Identifies one index.
#[derive(Args, Debug)]
struct IndexArgs {
    /// Source record type name.
    #[arg(long = "type")]
    type_name: String,

    /// Hash key attributes, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    keys: Vec<String>,

    /// Range key attribute.
    #[arg(long)]
    range_key: Option<String>,

    /// Table prefix. Defaults to the lowercased type name.
    #[arg(long)]
    prefix: Option<String>,
}

impl IndexArgs {
    fn descriptor(&self, config: &IndexConfig) -> anyhow::Result<IndexDescriptor> {
        let schema = RecordSchema::new(
            self.type_name.as_str(),
            self.keys.iter().chain(self.range_key.iter()),
        );

        let mut options = IndexOptions::new();
        if let Some(range_key) = &self.range_key {
            options = options.range_key(range_key.as_str());
        }
        if let Some(prefix) = &self.prefix {
            options = options.prefix(prefix.as_str());
        }

        IndexDescriptor::new(Arc::new(schema), &self.keys, options, config)
            .context("invalid index definition")
    }
}

fn parse_attr(input: &str) -> Result<(String, Value), String> {
    Attributes::parse_assignment(input).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_env_filter("kvindex=debug,kvindex_store=debug,kvindex_cli=debug,warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let output = run(cli)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<serde_json::Value> {
    let config = cli
        .namespace
        .map_or_else(IndexConfig::from_env, IndexConfig::new);

    match cli.command {
        Command::TableName { index } => {
            let descriptor = index.descriptor(&config)?;
            Ok(json!({
                "table": descriptor.table_name(),
                "hash_keys": descriptor.hash_keys(),
                "range_key": descriptor.range_key(),
            }))
        }
        Command::Lookup {
            index,
            data_dir,
            hash,
            range,
            attrs,
        } => {
            let descriptor = index.descriptor(&config)?;
            let store = RocksStore::open(&data_dir)
                .with_context(|| format!("failed to open store at {}", data_dir.display()))?;
            let maintainer = IndexMaintainer::new(descriptor, Arc::new(store));

            let ids = if attrs.is_empty() {
                let hash = hash.context("either --hash or --attr is required")?;
                tracing::debug!(%hash, ?range, "Looking up index location");
                maintainer.lookup(&hash, range)?
            } else {
                let attributes: Attributes = attrs.into_iter().collect();
                maintainer.lookup_by(&attributes)?
            };

            Ok(json!({
                "table": maintainer.table_name(),
                "ids": ids,
            }))
        }
    }
}
