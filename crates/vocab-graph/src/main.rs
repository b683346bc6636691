use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info};

use vocab_graph::emitter::ntriples::NTriplesEmitter;
use vocab_graph::emitter::turtle::TurtleEmitter;
use vocab_graph::emitter::{emit_nodes, TriplesEmitter};
use vocab_graph::ingest::loader::{self, Format};
use vocab_graph::ingest::source::HttpVocabSource;
use vocab_graph::model::ontology::{schema, sh, standard};
use vocab_graph::{logging, EngineConfig, OxigraphEvaluator, Restriction, VocabStore};

/// Query RDF vocabularies: class hierarchies, node lookup and SHACL restrictions.
#[derive(Parser)]
#[command(name = "vocab-graph", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "FILE", env = "VOCAB_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Vocabulary file to load; the file stem names the vocabulary. Repeatable.
    #[arg(short, long = "input", global = true, value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Media type of every input [default: from extension, else detected].
    #[arg(long, global = true, value_name = "TYPE")]
    media_type: Option<String>,

    /// More log output (repeat for more).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write every loaded node as RDF.
    Export {
        /// Output format: ntriples, turtle.
        #[arg(short, long, value_name = "FORMAT", default_value = "ntriples")]
        format: String,

        /// Output file path [default: stdout].
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// A class followed by every class it derives from.
    SuperClasses { id: String },
    /// A class followed by every class deriving from it.
    SubClasses { id: String },
    /// Restrictions of shapes targeting the given types.
    Restrictions {
        #[arg(required = true)]
        types: Vec<String>,

        /// Additional shape id to include. Repeatable.
        #[arg(long = "extra", value_name = "ID")]
        extra: Vec<String>,
    },
    /// Restrictions of shapes whose sh:targetNode is the given node.
    NodeRestrictions { id: String },
    /// Restrictions of SPARQL-targeted shapes matching a JSON-LD document.
    SparqlRestrictions {
        /// JSON-LD document the target queries run against.
        #[arg(long, value_name = "FILE")]
        document: PathBuf,

        types: Vec<String>,

        #[arg(long = "extra", value_name = "ID")]
        extra: Vec<String>,
    },
    /// Print a node as JSON-LD.
    Node {
        id: String,

        /// De-reference blank nodes in the output.
        #[arg(long)]
        resolve_blank_nodes: bool,
    },
    /// Fetch default vocabularies and summarize what was loaded.
    Defaults {
        /// Vocabulary names [default: from config].
        names: Vec<String>,

        #[arg(long, value_name = "URL", env = "VOCAB_GRAPH_BASE_URL")]
        base_url: Option<String>,
    },
}

fn load_inputs(store: &mut VocabStore, inputs: &[PathBuf], media_type: Option<&str>) -> Result<()> {
    let forced: Option<Format> = media_type.map(str::parse).transpose()?;
    for path in inputs {
        let (raw, guessed) = loader::read_document(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = vocabulary_name(path);
        let count = store
            .add_vocabulary(&name, raw, forced.or(guessed))
            .with_context(|| format!("failed to load {}", path.display()))?;
        info!(vocab = %name, nodes = count, "loaded vocabulary");
    }
    Ok(())
}

fn vocabulary_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_restrictions(out: &mut impl Write, restrictions: &[Restriction]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, restrictions)?;
    writeln!(out)?;
    Ok(())
}

fn export(store: &VocabStore, format: &str, output: Option<&Path>) -> Result<u64> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut emitter: Box<dyn TriplesEmitter> = match format.to_lowercase().as_str() {
        "ntriples" | "nt" => Box::new(NTriplesEmitter::new(writer)),
        "turtle" | "ttl" => Box::new(TurtleEmitter::new(writer)),
        other => bail!("Unknown format: {other}. Use 'ntriples' or 'turtle'."),
    };
    emitter.add_prefix("rdf", standard::RDF);
    emitter.add_prefix("rdfs", standard::RDFS);
    emitter.add_prefix("xsd", standard::XSD);
    emitter.add_prefix(schema::PREFIX, schema::NS);
    emitter.add_prefix(sh::PREFIX, sh::NS);
    emit_nodes(emitter.as_mut(), &store.all_nodes())?;
    emitter.flush()?;
    Ok(emitter.triple_count())
}

async fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    debug!(?config, "configuration");

    let mut store = VocabStore::new(config.store.clone());
    load_inputs(&mut store, &cli.inputs, cli.media_type.as_deref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Export { format, output } => {
            let count = export(&store, &format, output.as_deref())?;
            info!(triples = count, "exported");
        }
        Command::SuperClasses { id } => {
            for class in store.super_classes(&id) {
                writeln!(out, "{class}")?;
            }
        }
        Command::SubClasses { id } => {
            for class in store.sub_classes(&id) {
                writeln!(out, "{class}")?;
            }
        }
        Command::Restrictions { types, extra } => {
            print_restrictions(&mut out, &store.restrictions_for_types(&types, &extra))?;
        }
        Command::NodeRestrictions { id } => {
            print_restrictions(&mut out, &store.restrictions_for_node(&id))?;
        }
        Command::SparqlRestrictions {
            document,
            types,
            extra,
        } => {
            let text = std::fs::read_to_string(&document)
                .with_context(|| format!("failed to read {}", document.display()))?;
            let document: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not JSON", document.display()))?;
            let result = store
                .sparql_restrictions_for_types(&types, &extra, &document, &OxigraphEvaluator)
                .await;
            for failure in &result.failures {
                eprintln!("skipped shape {}: {}", failure.shape_id, failure.message);
            }
            print_restrictions(&mut out, &result.restrictions)?;
        }
        Command::Node {
            id,
            resolve_blank_nodes,
        } => {
            let Some(node) = store.get_node(&id) else {
                bail!("no node with id {id}");
            };
            let node = if resolve_blank_nodes {
                store.replace_blank_nodes_in(&node)
            } else {
                node.into_owned()
            };
            serde_json::to_writer_pretty(&mut out, &node)?;
            writeln!(out)?;
        }
        Command::Defaults { names, base_url } => {
            let names = if names.is_empty() {
                config.default_vocabularies.clone()
            } else {
                names
            };
            let base_url = base_url.unwrap_or_else(|| config.vocab_base_url.clone());
            let source = HttpVocabSource::with_timeout(&base_url, config.request_timeout())?;
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let loaded = store.set_default_vocabularies(&source, &names).await;
            for name in store.vocabulary_names() {
                let count = store.vocabulary(name).map_or(0, |v| v.len());
                writeln!(out, "{name}\t{count}")?;
            }
            loaded?;
        }
    }
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbosity = if cli.quiet { -1 } else { cli.verbose.min(3) as i8 };
    logging::init(verbosity);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
