//! Unified line diff for rejected submissions
//!
//! Produces the "your output" vs expected diff shown to a player after a
//! wrong answer. Every emitted line carries a tag so a presentation layer can
//! classify (e.g. colorize) lines without parsing prefixes. Lines keep their
//! original terminators; a final line without a trailing newline stays that
//! way, which is what makes a missing trailing newline visible in the diff.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffTag {
    /// File or hunk header (`---`, `+++`, `@@`)
    Header,
    /// Line present only in the player's output
    Removed,
    /// Line present only in the expected output
    Added,
    /// Unchanged context line
    Context,
}

/// One line of a rendered unified diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

impl DiffLine {
    fn new(tag: DiffTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            DiffTag::Header => write!(f, "{}", self.text),
            DiffTag::Removed => write!(f, "-{}", self.text),
            DiffTag::Added => write!(f, "+{}", self.text),
            DiffTag::Context => write!(f, " {}", self.text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkTag {
    Equal,
    Delete,
    Insert,
    Replace,
}

/// One matching-block opcode over line ranges `a[a1..a2]` / `b[b1..b2]`.
#[derive(Debug, Clone, Copy)]
struct Chunk {
    tag: ChunkTag,
    a1: usize,
    a2: usize,
    b1: usize,
    b2: usize,
}

/// Split into lines, keeping each line's terminator.
fn split_keepends(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, byte) in s.bytes().enumerate() {
        if byte == b'\n' {
            out.push(&s[start..=i]);
            start = i + 1;
        }
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

/// Compute edit opcodes via longest-common-subsequence over lines.
/// Quadratic, which is fine for the short outputs golf tasks produce.
fn opcodes(a: &[&str], b: &[&str]) -> Vec<Chunk> {
    let n = a.len();
    let m = b.len();
    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i][j] = if a[i] == b[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }

    let mut matches = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            matches.push((i, j));
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }

    let mut chunks = Vec::new();
    let (mut ai, mut bj) = (0, 0);
    let mut k = 0;
    loop {
        let (mi, mj) = if k < matches.len() {
            matches[k]
        } else {
            (n, m)
        };
        if ai < mi && bj < mj {
            chunks.push(Chunk {
                tag: ChunkTag::Replace,
                a1: ai,
                a2: mi,
                b1: bj,
                b2: mj,
            });
        } else if ai < mi {
            chunks.push(Chunk {
                tag: ChunkTag::Delete,
                a1: ai,
                a2: mi,
                b1: bj,
                b2: bj,
            });
        } else if bj < mj {
            chunks.push(Chunk {
                tag: ChunkTag::Insert,
                a1: ai,
                a2: ai,
                b1: bj,
                b2: mj,
            });
        }
        if k >= matches.len() {
            break;
        }
        let mut run = 1;
        while k + run < matches.len() && matches[k + run] == (mi + run, mj + run) {
            run += 1;
        }
        chunks.push(Chunk {
            tag: ChunkTag::Equal,
            a1: mi,
            a2: mi + run,
            b1: mj,
            b2: mj + run,
        });
        ai = mi + run;
        bj = mj + run;
        k += run;
    }
    chunks
}

/// Group opcodes into hunks with up to `context` equal lines on each side.
fn grouped(mut codes: Vec<Chunk>, context: usize) -> Vec<Vec<Chunk>> {
    if codes.is_empty() {
        return Vec::new();
    }

    // Trim leading and trailing context down to the window.
    let first = &mut codes[0];
    if first.tag == ChunkTag::Equal {
        first.a1 = first.a1.max(first.a2.saturating_sub(context));
        first.b1 = first.b1.max(first.b2.saturating_sub(context));
    }
    let last_idx = codes.len() - 1;
    let last = &mut codes[last_idx];
    if last.tag == ChunkTag::Equal {
        last.a2 = last.a2.min(last.a1 + context);
        last.b2 = last.b2.min(last.b1 + context);
    }

    let gap = context * 2;
    let mut groups = Vec::new();
    let mut group: Vec<Chunk> = Vec::new();
    for mut chunk in codes {
        // A large equal block ends the current hunk and starts the next one.
        if chunk.tag == ChunkTag::Equal && chunk.a2 - chunk.a1 > gap {
            group.push(Chunk {
                tag: ChunkTag::Equal,
                a1: chunk.a1,
                a2: (chunk.a1 + context).min(chunk.a2),
                b1: chunk.b1,
                b2: (chunk.b1 + context).min(chunk.b2),
            });
            groups.push(std::mem::take(&mut group));
            chunk.a1 = chunk.a1.max(chunk.a2.saturating_sub(context));
            chunk.b1 = chunk.b1.max(chunk.b2.saturating_sub(context));
        }
        group.push(chunk);
    }
    if !(group.is_empty() || (group.len() == 1 && group[0].tag == ChunkTag::Equal)) {
        groups.push(group);
    }
    groups
}

/// Render a `@@` range: 1-based start plus length, length elided when 1.
fn format_range(start: usize, stop: usize) -> String {
    let length = stop - start;
    if length == 1 {
        return format!("{}", start + 1);
    }
    let beginning = if length == 0 { start } else { start + 1 };
    format!("{},{}", beginning, length)
}

/// Build a unified diff between the player's output (`actual`, rendered as
/// removals) and the expected output (`expected`, rendered as additions).
/// Returns an empty vector when the inputs are identical.
pub fn unified(actual: &str, expected: &str, from_label: &str, to_label: &str) -> Vec<DiffLine> {
    let a = split_keepends(actual);
    let b = split_keepends(expected);
    let groups = grouped(opcodes(&a, &b), 3);

    let mut out = Vec::new();
    if groups.is_empty() {
        return out;
    }

    out.push(DiffLine::new(DiffTag::Header, format!("--- {}\n", from_label)));
    out.push(DiffLine::new(DiffTag::Header, format!("+++ {}\n", to_label)));

    for group in &groups {
        let first = group[0];
        let last = group[group.len() - 1];
        out.push(DiffLine::new(
            DiffTag::Header,
            format!(
                "@@ -{} +{} @@\n",
                format_range(first.a1, last.a2),
                format_range(first.b1, last.b2)
            ),
        ));
        for chunk in group {
            match chunk.tag {
                ChunkTag::Equal => {
                    for line in &a[chunk.a1..chunk.a2] {
                        out.push(DiffLine::new(DiffTag::Context, *line));
                    }
                }
                ChunkTag::Delete => {
                    for line in &a[chunk.a1..chunk.a2] {
                        out.push(DiffLine::new(DiffTag::Removed, *line));
                    }
                }
                ChunkTag::Insert => {
                    for line in &b[chunk.b1..chunk.b2] {
                        out.push(DiffLine::new(DiffTag::Added, *line));
                    }
                }
                ChunkTag::Replace => {
                    for line in &a[chunk.a1..chunk.a2] {
                        out.push(DiffLine::new(DiffTag::Removed, *line));
                    }
                    for line in &b[chunk.b1..chunk.b2] {
                        out.push(DiffLine::new(DiffTag::Added, *line));
                    }
                }
            }
        }
    }
    out
}
