//!
//! Line-oriented GFA parsing
//!
//! Only the records the analysis needs are kept:
//!
//! ```text
//! S <id> <seq> [LN:i:n ...]        node with sequence length
//! L <id> <+-> <id> <+-> <cigar>    link, for topology stats only
//! P <name> <id><+->,... <overlaps> haplotype path
//! ```
//!
//! Any other record type, and any malformed S/L/P line, is skipped with a
//! warning. A failed report run aborts at the caller, not here.
//!
use crate::common::{NodeId, Orientation, Step};
use crate::path::HaplotypePath;
use flate2::bufread::MultiGzDecoder;
use log::warn;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

///
/// node declared by one S record
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GfaNode {
    pub id: NodeId,
    /// length of the node sequence (LN tag wins over the literal sequence)
    pub length: usize,
}

///
/// link declared by one L record
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GfaLink {
    pub from: Step,
    pub to: Step,
}

///
/// In-memory flat tables of one GFA file.
///
#[derive(Clone, Debug, Default)]
pub struct Gfa {
    pub nodes: Vec<GfaNode>,
    pub links: Vec<GfaLink>,
    pub paths: Vec<HaplotypePath>,
}

impl Gfa {
    ///
    /// Parse a GFA file, transparently decompressing `.gz`.
    ///
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Gfa> {
        let path = path.as_ref();
        let file = BufReader::new(File::open(path)?);
        if path.extension().map_or(false, |ext| ext == "gz") {
            Self::from_reader(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Self::from_reader(file)
        }
    }
    ///
    /// Parse GFA records from a buffered reader.
    ///
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Gfa> {
        let mut gfa = Gfa::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            gfa.parse_line(&line, i);
        }
        Ok(gfa)
    }
    ///
    /// Parse GFA records from an in-memory string (tests, mostly).
    ///
    pub fn from_gfa_str(s: &str) -> Gfa {
        let mut gfa = Gfa::default();
        for (i, line) in s.lines().enumerate() {
            gfa.parse_line(line, i);
        }
        gfa
    }
    fn parse_line(&mut self, line: &str, lineno: usize) {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields[0] {
            "S" => match parse_node(&fields) {
                Some(node) => self.nodes.push(node),
                None => warn!("skipping malformed S record at line {}", lineno + 1),
            },
            "L" => match parse_link(&fields) {
                Some(link) => self.links.push(link),
                None => warn!("skipping malformed L record at line {}", lineno + 1),
            },
            "P" => match parse_path(&fields) {
                Some(path) => self.paths.push(path),
                None => warn!("skipping malformed P record at line {}", lineno + 1),
            },
            // headers, walks, comments, whatever else
            _ => {}
        }
    }
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
    pub fn n_links(&self) -> usize {
        self.links.len()
    }
    pub fn n_paths(&self) -> usize {
        self.paths.len()
    }
    ///
    /// look up a path by name
    ///
    pub fn path(&self, name: &str) -> Option<&HaplotypePath> {
        self.paths.iter().find(|p| p.name == name)
    }
    ///
    /// total sequence length of all nodes
    ///
    pub fn total_node_length(&self) -> usize {
        self.nodes.iter().map(|n| n.length).sum()
    }
}

/// `S <id> <seq> [tags]`, length from LN:i: when present
fn parse_node(fields: &[&str]) -> Option<GfaNode> {
    if fields.len() < 3 {
        return None;
    }
    let id: NodeId = fields[1].parse().ok()?;
    let seq = fields[2];
    let length = fields[3..]
        .iter()
        .find_map(|tag| tag.strip_prefix("LN:i:").and_then(|v| v.parse().ok()))
        .unwrap_or_else(|| if seq == "*" { 0 } else { seq.len() });
    Some(GfaNode { id, length })
}

/// `L <id> <orient> <id> <orient> <overlap>`
fn parse_link(fields: &[&str]) -> Option<GfaLink> {
    if fields.len() < 5 {
        return None;
    }
    let from = (fields[1].parse().ok()?, fields[2].parse().ok()?);
    let to = (fields[3].parse().ok()?, fields[4].parse().ok()?);
    Some(GfaLink { from, to })
}

/// `P <name> <id><orient>,... <overlaps>`
fn parse_path(fields: &[&str]) -> Option<HaplotypePath> {
    if fields.len() < 3 {
        return None;
    }
    let steps: Option<Vec<Step>> = fields[2].split(',').map(parse_step).collect();
    Some(HaplotypePath::new(fields[1], steps?))
}

/// `<id><+->` token of a P record
fn parse_step(token: &str) -> Option<Step> {
    // split on the last char, not the last byte: the token may be garbage
    let orient = token.chars().last()?;
    let id = token.strip_suffix(orient)?;
    let orientation = match orient {
        '+' => Orientation::Forward,
        '-' => Orientation::Reverse,
        _ => return None,
    };
    Some((id.parse().ok()?, orientation))
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Orientation::{Forward, Reverse};

    const GFA: &str = "\
H\tVN:Z:1.0
S\t1\tACGT
S\t2\t*\tLN:i:100
S\t3\tACGTACGT\tLN:i:3
L\t1\t+\t2\t-\t0M
P\tsample#1#chr1\t1+,2-,3+\t*
P\tempty\t\t*
P\tbroken\t1*,2+\t*
X\tunknown record
";

    #[test]
    fn parse_small_gfa() {
        let gfa = Gfa::from_gfa_str(GFA);
        assert_eq!(gfa.n_nodes(), 3);
        assert_eq!(gfa.nodes[0], GfaNode { id: 1, length: 4 });
        // LN tag wins over literal sequence
        assert_eq!(gfa.nodes[1], GfaNode { id: 2, length: 100 });
        assert_eq!(gfa.nodes[2], GfaNode { id: 3, length: 3 });
        assert_eq!(gfa.total_node_length(), 107);

        assert_eq!(gfa.n_links(), 1);
        assert_eq!(
            gfa.links[0],
            GfaLink {
                from: (1, Forward),
                to: (2, Reverse),
            }
        );

        // the two malformed P records are dropped
        assert_eq!(gfa.n_paths(), 1);
        let p = gfa.path("sample#1#chr1").unwrap();
        assert_eq!(p.steps, vec![(1, Forward), (2, Reverse), (3, Forward)]);
        assert!(gfa.path("nope").is_none());
    }

    #[test]
    fn parse_step_tokens() {
        assert_eq!(parse_step("12+"), Some((12, Forward)));
        assert_eq!(parse_step("7-"), Some((7, Reverse)));
        assert_eq!(parse_step("+"), None);
        assert_eq!(parse_step("x+"), None);
        assert_eq!(parse_step("12"), None);
        assert_eq!(parse_step(""), None);
        // multibyte trailing char must not split mid-character
        assert_eq!(parse_step("1\u{e9}"), None);
        assert_eq!(parse_step("\u{e9}+"), None);
    }

    #[test]
    fn multibyte_step_token_skips_record() {
        let gfa = Gfa::from_gfa_str("S\t1\tAAAA\nP\tx\t1\u{e9},2+\t*\nP\ty\t1+\t*\n");
        assert_eq!(gfa.n_paths(), 1);
        assert!(gfa.path("x").is_none());
        assert!(gfa.path("y").is_some());
    }

    #[test]
    fn from_reader_matches_from_str() {
        let a = Gfa::from_gfa_str(GFA);
        let b = Gfa::from_reader(std::io::Cursor::new(GFA)).unwrap();
        assert_eq!(a.n_nodes(), b.n_nodes());
        assert_eq!(a.n_links(), b.n_links());
        assert_eq!(a.n_paths(), b.n_paths());
    }
}
