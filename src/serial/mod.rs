//! Binary serialization of the node array.
//!
//! The stream is self-describing and exploits the flat node layout: a small
//! header followed by the raw records in index order.
//!
//! ```text
//! magic    4 bytes   "TDIX"
//! version  u16 BE    1
//! flags    u8        bit 0: suffix links present and current
//! count    u32 BE    number of node records, root included
//! records  count x 5 u32 BE: symbol, value, child, sibling, suffix
//! ```
//!
//! The loader validates the header, bounds-checks every pointer field, and
//! walks the tree once to rebuild the pattern side table; the walk doubles
//! as a structural check (every node reachable exactly once from the root).

use std::io::{ErrorKind, Read, Write};

use ahash::AHashMap;

use crate::dict::node::{Node, NodeIndex, Symbol, NO_VALUE, ROOT};
use crate::dict::store::NodeStore;
use crate::dict::TrieDict;
use crate::TrieError;

/// Stream tag identifying the format.
pub const MAGIC: [u8; 4] = *b"TDIX";

/// Current format version. Wider records require a version bump.
pub const FORMAT_VERSION: u16 = 1;

/// Flag bit: suffix links were current when the stream was written.
const FLAG_SUFFIX_LINKS: u8 = 1;

fn read_exact(source: &mut impl Read, buf: &mut [u8]) -> Result<(), TrieError> {
    source.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            TrieError::CorruptSerializedData("unexpected end of stream".into())
        } else {
            TrieError::Io(e)
        }
    })
}

fn read_u16_be(source: &mut impl Read) -> Result<u16, TrieError> {
    let mut buf = [0u8; 2];
    read_exact(source, &mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32_be(source: &mut impl Read) -> Result<u32, TrieError> {
    let mut buf = [0u8; 4];
    read_exact(source, &mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

impl TrieDict {
    /// Write the dictionary to `sink` in the format above. Callers keeping
    /// the result on disk should hand in a buffered writer.
    pub fn serialize<W: Write>(&self, mut sink: W) -> Result<(), TrieError> {
        let flags = if self.links_built { FLAG_SUFFIX_LINKS } else { 0 };
        sink.write_all(&MAGIC)?;
        sink.write_all(&FORMAT_VERSION.to_be_bytes())?;
        sink.write_all(&[flags])?;
        sink.write_all(&(self.store.len() as u32).to_be_bytes())?;
        for node in self.store.nodes() {
            sink.write_all(&node.symbol.to_be_bytes())?;
            sink.write_all(&node.value.to_be_bytes())?;
            sink.write_all(&node.child.to_be_bytes())?;
            sink.write_all(&node.sibling.to_be_bytes())?;
            sink.write_all(&node.suffix.to_be_bytes())?;
        }
        Ok(())
    }

    /// Read a dictionary back from `source`.
    ///
    /// Any inconsistency fails with [`TrieError::CorruptSerializedData`]:
    /// short reads, a wrong magic or version, pointer fields outside the
    /// record range, a malformed root, or a record graph that is not a tree.
    /// If the stream was written without current suffix links, the loaded
    /// dictionary is stale and needs [`TrieDict::build_suffix_links`]
    /// before matching.
    pub fn deserialize<R: Read>(mut source: R) -> Result<Self, TrieError> {
        let mut magic = [0u8; 4];
        read_exact(&mut source, &mut magic)?;
        if magic != MAGIC {
            return Err(TrieError::CorruptSerializedData("bad magic".into()));
        }
        let version = read_u16_be(&mut source)?;
        if version != FORMAT_VERSION {
            return Err(TrieError::CorruptSerializedData(format!(
                "unsupported format version {version}"
            )));
        }
        let mut flags = [0u8; 1];
        read_exact(&mut source, &mut flags)?;
        let links_built = flags[0] & FLAG_SUFFIX_LINKS != 0;

        let count = read_u32_be(&mut source)?;
        if count == 0 || count == u32::MAX {
            return Err(TrieError::CorruptSerializedData(format!(
                "invalid node count {count}"
            )));
        }

        let mut nodes = Vec::with_capacity(count as usize);
        for index in 0..count {
            let mut node = Node {
                symbol: read_u32_be(&mut source)?,
                value: read_u32_be(&mut source)?,
                child: read_u32_be(&mut source)?,
                sibling: read_u32_be(&mut source)?,
                suffix: read_u32_be(&mut source)?,
            };
            if !links_built {
                // Stale on the wire; normalize rather than trust.
                node.suffix = 0;
            }
            for pointer in [node.child, node.sibling, node.suffix] {
                if pointer >= count {
                    return Err(TrieError::CorruptSerializedData(format!(
                        "record {index}: pointer {pointer} out of range"
                    )));
                }
            }
            nodes.push(node);
        }

        let root = nodes[ROOT as usize];
        if root.symbol != 0 || root.sibling != 0 || root.value != NO_VALUE || root.suffix != 0 {
            return Err(TrieError::CorruptSerializedData("malformed root".into()));
        }

        let store = NodeStore::from_nodes(nodes);
        let patterns = rebuild_pattern_table(&store, count)?;
        Ok(Self {
            store,
            patterns,
            links_built,
        })
    }
}

/// Walk the tree from the root, recording the full path of every pattern
/// node. Rejects records that do not form a tree: a node visited twice
/// (cycle or shared child) or never (orphan record). Also rejects suffix
/// links that do not point strictly shallower, the invariant that keeps the
/// matcher's fallback walks finite.
fn rebuild_pattern_table(
    store: &NodeStore,
    count: u32,
) -> Result<AHashMap<NodeIndex, Box<[Symbol]>>, TrieError> {
    let mut patterns = AHashMap::new();
    let mut depths: Vec<u32> = vec![0; count as usize];
    let mut visited = vec![false; count as usize];
    let mut stack: Vec<(NodeIndex, usize)> = Vec::new();
    let mut path: Vec<Symbol> = Vec::new();

    visited[ROOT as usize] = true;
    let mut reached: u32 = 1;
    if store.get(ROOT).child != 0 {
        stack.push((store.get(ROOT).child, 1));
    }

    while let Some((index, depth)) = stack.pop() {
        if visited[index as usize] {
            return Err(TrieError::CorruptSerializedData(format!(
                "record {index} reachable twice"
            )));
        }
        visited[index as usize] = true;
        depths[index as usize] = depth as u32;
        reached += 1;

        let node = store.get(index);
        if node.sibling != 0 {
            stack.push((node.sibling, depth));
        }
        if node.child != 0 {
            stack.push((node.child, depth + 1));
        }
        path.truncate(depth - 1);
        path.push(node.symbol);
        if node.value != NO_VALUE {
            patterns.insert(index, path.clone().into_boxed_slice());
        }
    }

    if reached != count {
        return Err(TrieError::CorruptSerializedData(format!(
            "{} orphan records",
            count - reached
        )));
    }

    for index in 1..count {
        let suffix = store.get(index).suffix;
        if depths[suffix as usize] >= depths[index as usize] {
            return Err(TrieError::CorruptSerializedData(format!(
                "record {index}: suffix link does not shorten the path"
            )));
        }
    }
    Ok(patterns)
}
