// src/matching/blocking.rs - Candidate blocking on base names

use std::collections::HashMap;

/// Key shared by every record whose base name is empty.
pub const EMPTY_BLOCK_KEY: &str = "NONE";

/// `FIRSTCHAR_LENBUCKET_FIRSTTOKEN`, e.g. `I_0_IBM` for "IBM".
///
/// A deliberately coarse key: names that differ in first letter, first word
/// or rough length are never compared.
pub fn block_key(base_name: &str, bucket_width: usize) -> String {
    let Some(first_char) = base_name.chars().next() else {
        return EMPTY_BLOCK_KEY.to_string();
    };
    let length_bucket = base_name.chars().count() / bucket_width.max(1);
    let first_token = base_name.split_whitespace().next().unwrap_or(EMPTY_BLOCK_KEY);
    format!("{}_{}_{}", first_char, length_bucket, first_token)
}

/// Records sharing one block key, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub key: String,
    pub members: Vec<usize>,
}

impl Block {
    /// Unordered member pairs `(i, j)` with `i` before `j` in input order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.members.iter().enumerate().flat_map(move |(pos, &i)| {
            self.members[pos + 1..].iter().map(move |&j| (i, j))
        })
    }

    pub fn pair_count(&self) -> usize {
        let n = self.members.len();
        n * n.saturating_sub(1) / 2
    }
}

/// Group `(index, key)` entries into blocks, ordered by first appearance.
pub fn group_into_blocks<'a, I>(entries: I) -> Vec<Block>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let mut blocks: Vec<Block> = Vec::new();
    let mut position: HashMap<&'a str, usize> = HashMap::new();

    for (idx, key) in entries {
        match position.get(key) {
            Some(&pos) => blocks[pos].members.push(idx),
            None => {
                position.insert(key, blocks.len());
                blocks.push(Block {
                    key: key.to_string(),
                    members: vec![idx],
                });
            }
        }
    }
    blocks
}
