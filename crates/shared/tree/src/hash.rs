//! Canonical content digest.
//!
//! The digest covers the flattened form sorted by key. Every value is written
//! with a one-byte kind tag so that `1`, `1.0`, `"1"` and `true` never collide.

use crate::node::Node;
use crate::tree::Tree;
use sha2::{Digest, Sha256};

const ENTRY: u8 = 0x1e;
const FIELD: u8 = 0x1f;

pub(crate) fn digest(tree: &Tree) -> String {
    let mut flat: Vec<_> = tree.flatten().into_iter().collect();
    flat.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (key, value) in &flat {
        hasher.update(key.as_bytes());
        hasher.update([FIELD]);
        feed(&mut hasher, value);
        hasher.update([ENTRY]);
    }
    hex::encode(hasher.finalize())
}

fn feed(hasher: &mut Sha256, node: &Node) {
    match node {
        Node::Null => hasher.update([0u8]),
        Node::Bool(b) => hasher.update([1, u8::from(*b)]),
        Node::Int(i) => {
            hasher.update([2u8]);
            hasher.update(i.to_le_bytes());
        },
        Node::Float(f) => {
            hasher.update([3u8]);
            hasher.update(f.to_bits().to_le_bytes());
        },
        Node::Str(s) => {
            hasher.update([4u8]);
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        },
        Node::Seq(items) => {
            hasher.update([5u8]);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                feed(hasher, item);
            }
        },
        Node::Map(tree) => {
            let mut entries: Vec<_> = tree.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            hasher.update([6u8]);
            hasher.update((entries.len() as u64).to_le_bytes());
            for (key, value) in entries {
                hasher.update(key.as_bytes());
                hasher.update([FIELD]);
                feed(hasher, value);
            }
        },
    }
}
