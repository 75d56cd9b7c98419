//! Output formatting for CLI results: matches, completions, stats, and the
//! indented tree dump.

use std::io::{self, Write};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::dict::node::{NODE_SIZE, ROOT};
use crate::dict::{decode_symbols, TrieDict};
use crate::matcher::Match;

/// Nodes above this count are summarized instead of drawn.
const DUMP_NODE_LIMIT: usize = 500;

/// One match occurrence, decoded for display or JSON emission.
#[derive(Debug, Serialize)]
pub struct MatchRecord {
    pub start: usize,
    pub end: usize,
    pub pattern: String,
    pub value: u32,
}

impl MatchRecord {
    pub fn from_match(m: &Match) -> Self {
        Self {
            start: m.start(),
            end: m.end,
            pattern: decode_symbols(&m.pattern),
            value: m.value,
        }
    }
}

/// One prefix-search completion, decoded for display or JSON emission.
#[derive(Debug, Serialize)]
pub struct CompletionRecord {
    pub suffix: String,
    pub value: u32,
}

/// Dictionary summary shown by `stats`.
#[derive(Debug, Serialize)]
pub struct DictStats {
    pub patterns: usize,
    pub nodes: usize,
    pub node_bytes: usize,
    pub suffix_links: bool,
}

impl DictStats {
    pub fn of(dict: &TrieDict) -> Self {
        Self {
            patterns: dict.len(),
            nodes: dict.num_nodes(),
            node_bytes: dict.num_nodes() * NODE_SIZE,
            suffix_links: dict.has_suffix_links(),
        }
    }
}

fn stream(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print matches as `start..end: pattern = value` lines.
pub fn print_matches(matches: &[MatchRecord], color: bool) -> io::Result<()> {
    let mut stdout = stream(color);
    for m in matches {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(stdout, "{}..{}", m.start, m.end)?;
        stdout.reset()?;
        write!(stdout, ": ")?;
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(stdout, "{}", m.pattern)?;
        stdout.reset()?;
        writeln!(stdout, " = {}", m.value)?;
    }
    Ok(())
}

/// Print completions as `suffix = value` lines; the empty suffix (the
/// prefix itself is a stored pattern) renders as `<exact>`.
pub fn print_completions(completions: &[CompletionRecord], color: bool) -> io::Result<()> {
    let mut stdout = stream(color);
    for c in completions {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        if c.suffix.is_empty() {
            write!(stdout, "<exact>")?;
        } else {
            write!(stdout, "{}", c.suffix)?;
        }
        stdout.reset()?;
        writeln!(stdout, " = {}", c.value)?;
    }
    Ok(())
}

/// Print the stats summary.
pub fn print_stats(stats: &DictStats) -> io::Result<()> {
    let mut stdout = stream(false);
    writeln!(stdout, "patterns:     {}", stats.patterns)?;
    writeln!(stdout, "nodes:        {}", stats.nodes)?;
    writeln!(stdout, "node bytes:   {}", stats.node_bytes)?;
    writeln!(stdout, "suffix links: {}", stats.suffix_links)?;
    Ok(())
}

/// Render the trie as an indented tree, one node per line. Dictionaries
/// beyond [`DUMP_NODE_LIMIT`] nodes are summarized instead.
pub fn render_tree(dict: &TrieDict) -> String {
    if dict.num_nodes() > DUMP_NODE_LIMIT {
        return format!(
            "(dictionary too large to render: {} nodes, {} patterns)",
            dict.num_nodes(),
            dict.len()
        );
    }

    let mut out = String::new();
    out.push_str(&format!(
        ". root ({} nodes, {} patterns)\n",
        dict.num_nodes(),
        dict.len()
    ));
    let mut stack = Vec::new();
    let mut child = dict.store.get(ROOT).child;
    while child != 0 {
        stack.push((child, 1usize));
        child = dict.store.get(child).sibling;
    }
    while let Some((index, depth)) = stack.pop() {
        let node = dict.store.get(index);
        out.push_str(&"+".repeat(depth));
        out.push_str(&format!(" {} #{}", decode_symbols(&[node.symbol]), index));
        if node.is_pattern() {
            out.push_str(&format!(" = {}", node.value));
        }
        out.push('\n');
        let mut child = node.child;
        while child != 0 {
            stack.push((child, depth + 1));
            child = dict.store.get(child).sibling;
        }
    }
    out
}
