use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use memmap2::Mmap;

use tridex::output::{self, CompletionRecord, DictStats, MatchRecord};
use tridex::{decode_symbols, encode_str, TrieDict, DEFAULT_BOUND_CHARS};

#[derive(Parser)]
#[command(name = "tridex")]
#[command(about = "Trie dictionary with prefix search and Aho-Corasick matching")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a dictionary file from a pattern list
    Build {
        /// Input file: one `pattern` or `pattern<TAB>value` per line
        patterns: PathBuf,

        /// Output dictionary file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Look up a single key
    Lookup {
        /// Dictionary file
        dict: PathBuf,
        key: String,
    },
    /// List stored patterns starting with a prefix
    Prefix {
        /// Dictionary file
        dict: PathBuf,
        prefix: String,

        /// Emit one JSON object per completion
        #[arg(long)]
        json: bool,
    },
    /// Find all pattern occurrences in a text
    Match {
        /// Dictionary file
        dict: PathBuf,

        /// Text to scan (omit when using --file)
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Keep only occurrences delimited by word-boundary characters
        #[arg(short, long)]
        words: bool,

        /// Custom boundary characters (implies --words)
        #[arg(long)]
        bounds: Option<String>,

        /// Emit one JSON object per match
        #[arg(long)]
        json: bool,
    },
    /// Show dictionary statistics
    Stats {
        /// Dictionary file
        dict: PathBuf,

        /// Emit the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the trie as an indented tree
    Dump {
        /// Dictionary file
        dict: PathBuf,
    },
}

/// Map the dictionary file and deserialize from the mapped bytes.
fn load_dict(path: &Path) -> Result<TrieDict> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("failed to map {}", path.display()))?;
    TrieDict::deserialize(&mmap[..])
        .with_context(|| format!("failed to load dictionary {}", path.display()))
}

/// Parse a `pattern` or `pattern<TAB>value` line. Values default to 1, the
/// plain "this pattern is present" marker.
fn parse_pattern_line(line: &str, number: usize) -> Result<Option<(String, u32)>> {
    if line.is_empty() {
        return Ok(None);
    }
    match line.split_once('\t') {
        Some((pattern, value)) => {
            let value: u32 = value
                .trim()
                .parse()
                .with_context(|| format!("line {number}: invalid value {value:?}"))?;
            Ok(Some((pattern.to_string(), value)))
        }
        None => Ok(Some((line.to_string(), 1))),
    }
}

fn cmd_build(patterns: &Path, output: &Path) -> Result<()> {
    let input = fs::read_to_string(patterns)
        .with_context(|| format!("failed to read {}", patterns.display()))?;

    let mut dict = TrieDict::new();
    for (i, line) in input.lines().enumerate() {
        if let Some((pattern, value)) = parse_pattern_line(line, i + 1)? {
            dict.assign(&encode_str(&pattern), value)
                .with_context(|| format!("line {}: cannot store {pattern:?}", i + 1))?;
        }
    }
    dict.build_suffix_links();

    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    dict.serialize(BufWriter::new(file))?;

    println!(
        "{}: {} patterns, {} nodes",
        output.display(),
        dict.len(),
        dict.num_nodes()
    );
    Ok(())
}

fn cmd_match(
    dict_path: &Path,
    text: String,
    bounds: Option<String>,
    json: bool,
    color: bool,
) -> Result<()> {
    let mut dict = load_dict(dict_path)?;
    if !dict.has_suffix_links() {
        dict.build_suffix_links();
    }

    let symbols = encode_str(&text);
    let matches: Vec<MatchRecord> = match bounds {
        Some(bounds) => dict
            .find_bounded_iter(&symbols, &encode_str(&bounds))?
            .map(|m| MatchRecord::from_match(&m))
            .collect(),
        None => dict
            .find_iter(&symbols)?
            .map(|m| MatchRecord::from_match(&m))
            .collect(),
    };

    if json {
        for record in &matches {
            println!("{}", serde_json::to_string(record)?);
        }
    } else {
        output::print_matches(&matches, color)?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    let color = !cli.no_color;
    match cli.command {
        Commands::Build { patterns, output } => {
            cmd_build(&patterns, &output)?;
        }
        Commands::Lookup { dict, key } => {
            let dict = load_dict(&dict)?;
            match dict.lookup(&encode_str(&key)) {
                Some(value) => println!("{value}"),
                None => {
                    println!("(absent)");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Prefix { dict, prefix, json } => {
            let dict = load_dict(&dict)?;
            let completions: Vec<CompletionRecord> = dict
                .prefix_search(&encode_str(&prefix))
                .map(|(suffix, value)| CompletionRecord {
                    suffix: decode_symbols(&suffix),
                    value,
                })
                .collect();
            if json {
                for record in &completions {
                    println!("{}", serde_json::to_string(record)?);
                }
            } else {
                output::print_completions(&completions, color)?;
            }
        }
        Commands::Match {
            dict,
            text,
            file,
            words,
            bounds,
            json,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("provide TEXT or --file"),
            };
            let bounds = bounds.or_else(|| words.then(|| DEFAULT_BOUND_CHARS.to_string()));
            cmd_match(&dict, text, bounds, json, color)?;
        }
        Commands::Stats { dict, json } => {
            let dict = load_dict(&dict)?;
            let stats = DictStats::of(&dict);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                output::print_stats(&stats)?;
            }
        }
        Commands::Dump { dict } => {
            let dict = load_dict(&dict)?;
            print!("{}", output::render_tree(&dict));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    run(Cli::parse())
}
