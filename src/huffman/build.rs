// Length-limited minimum-redundancy code lengths via package-merge.
//
// Each "coin" is a leaf (symbol, weight).  Starting from the sorted leaf
// list, `max_len - 1` rounds pair adjacent items into packages and merge
// them back with a fresh copy of the leaves.  The first `2n - 2` items of
// the final list are selected; a symbol's code length is the number of
// selected items that contain its leaf.

use log::trace;

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(usize),
    Package(usize, usize),
}

struct Arena {
    weights: Vec<u64>,
    nodes: Vec<Node>,
}

impl Arena {
    fn push(&mut self, weight: u64, node: Node) -> usize {
        self.weights.push(weight);
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

/// Compute code lengths (at most `max_len` bits) for the given symbol
/// frequencies.  Symbols with zero frequency get length 0.
///
/// A single used symbol gets length 1 so that it is still encodable.
pub fn build_lengths(freqs: &[u32], max_len: u8) -> Vec<u8> {
    let mut lengths = vec![0u8; freqs.len()];

    let mut leaves: Vec<(u64, usize)> = freqs
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f > 0)
        .map(|(sym, &f)| (u64::from(f), sym))
        .collect();

    match leaves.len() {
        0 => return lengths,
        1 => {
            lengths[leaves[0].1] = 1;
            return lengths;
        }
        _ => {}
    }
    debug_assert!(max_len >= 1 && max_len < 32);
    debug_assert!(
        leaves.len() <= 1usize << max_len,
        "too many symbols for the length limit"
    );

    leaves.sort_unstable();

    let mut arena = Arena {
        weights: Vec::with_capacity(leaves.len() * max_len as usize * 2),
        nodes: Vec::with_capacity(leaves.len() * max_len as usize * 2),
    };
    let leaf_ids: Vec<usize> = leaves
        .iter()
        .map(|&(w, sym)| arena.push(w, Node::Leaf(sym)))
        .collect();

    let mut current = leaf_ids.clone();
    for _ in 1..max_len {
        let mut packages = Vec::with_capacity(current.len() / 2);
        for pair in current.chunks_exact(2) {
            let weight = arena.weights[pair[0]] + arena.weights[pair[1]];
            packages.push(arena.push(weight, Node::Package(pair[0], pair[1])));
        }
        current = merge(&leaf_ids, &packages, &arena.weights);
    }

    let take = (2 * leaves.len() - 2).min(current.len());
    let mut stack = Vec::with_capacity(max_len as usize * 2);
    for &id in &current[..take] {
        stack.push(id);
        while let Some(n) = stack.pop() {
            match arena.nodes[n] {
                Node::Leaf(sym) => lengths[sym] += 1,
                Node::Package(a, b) => {
                    stack.push(a);
                    stack.push(b);
                }
            }
        }
    }

    trace!(
        "package-merge: {} symbols, limit {max_len}, {} nodes",
        leaves.len(),
        arena.nodes.len()
    );
    lengths
}

/// Merge two weight-sorted id lists; leaves win ties.
fn merge(leaves: &[usize], packages: &[usize], weights: &[u64]) -> Vec<usize> {
    let mut out = Vec::with_capacity(leaves.len() + packages.len());
    let (mut i, mut j) = (0, 0);
    while i < leaves.len() && j < packages.len() {
        if weights[leaves[i]] <= weights[packages[j]] {
            out.push(leaves[i]);
            i += 1;
        } else {
            out.push(packages[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&leaves[i..]);
    out.extend_from_slice(&packages[j..]);
    out
}
