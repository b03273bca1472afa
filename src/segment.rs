//!
//! Flank/module segmentation of haplotype paths
//!
//! A haplotype that loops through the collapsed module region visits node
//! identifiers inside the interval spanned by the loop-back edge once per
//! copy. Labeling is a single pass with a three-way comparison per step:
//! inside the interval is a module step, everything else is flank, and the
//! module index advances on each module-to-flank transition.
//!
use crate::common::{NodeId, Orientation};
use crate::path::HaplotypePath;
use indicatif::ParallelProgressIterator;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

///
/// Label of one step of a segmented path.
///
/// Module indices are 1-based and strictly increase along the path.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentLabel {
    Flank,
    Module(usize),
}

impl SegmentLabel {
    pub fn is_module(&self) -> bool {
        match self {
            SegmentLabel::Module(_) => true,
            _ => false,
        }
    }
    pub fn module_index(&self) -> Option<usize> {
        match self {
            SegmentLabel::Module(i) => Some(*i),
            SegmentLabel::Flank => None,
        }
    }
}

impl std::fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SegmentLabel::Flank => write!(f, "flank"),
            SegmentLabel::Module(i) => write!(f, "module-{}", i),
        }
    }
}

///
/// The loop-back edge of the reference traversal, as a (from, to) node pair.
///
/// Stored in traversal order. Segmentation only depends on the interval
/// `(lo, hi)` spanned by the pair, so a jump written forward or backward
/// labels identically.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ReferenceJump {
    pub from: NodeId,
    pub to: NodeId,
}

impl ReferenceJump {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        ReferenceJump { from, to }
    }
    ///
    /// Pick the loop-back edge of a reference path: the adjacent step pair
    /// with the largest absolute node-identifier difference. Ties are broken
    /// by first occurrence in traversal order.
    ///
    /// Returns None when the path has fewer than two steps.
    ///
    pub fn detect(path: &HaplotypePath) -> Option<ReferenceJump> {
        let ids = path.node_ids();
        ids.iter()
            .tuple_windows()
            .map(|(&a, &b)| (ReferenceJump::new(a, b), a.max(b) - a.min(b)))
            // max_by_key would pick the last of equals
            .fold(None, |best: Option<(ReferenceJump, usize)>, (jump, gap)| {
                match best {
                    Some((_, best_gap)) if best_gap >= gap => best,
                    _ => Some((jump, gap)),
                }
            })
            .map(|(jump, _)| jump)
    }
    pub fn lo(&self) -> NodeId {
        self.from.min(self.to)
    }
    pub fn hi(&self) -> NodeId {
        self.from.max(self.to)
    }
}

impl std::fmt::Display for ReferenceJump {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

///
/// Label every step of a node sequence as flank or module-k.
///
/// * `lo < id < hi` (strict on both sides) => current module index
/// * otherwise => flank, incrementing the module index first when the
///   previous step was a module step
///
/// An empty input yields an empty output. A sequence that never enters the
/// interval yields all-flank with the index never incremented. Irregular
/// numbering gets the same uniform comparison, whatever it produces.
///
pub fn segment_path(node_ids: &[NodeId], jump: ReferenceJump) -> Vec<SegmentLabel> {
    let (lo, hi) = (jump.lo(), jump.hi());
    let mut labels = Vec::with_capacity(node_ids.len());
    let mut module = 1;
    let mut prev_was_module = false;
    for &id in node_ids {
        if lo < id && id < hi {
            labels.push(SegmentLabel::Module(module));
            prev_was_module = true;
        } else {
            if prev_was_module {
                module += 1;
            }
            labels.push(SegmentLabel::Flank);
            prev_was_module = false;
        }
    }
    labels
}

///
/// One row of the flat (path, position) label table.
///
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledStep {
    pub path: String,
    pub pos: usize,
    pub node: NodeId,
    pub orientation: Orientation,
    pub label: SegmentLabel,
}

///
/// Segment every path independently and concatenate into one flat table.
///
/// Paths are processed in parallel; row order is (path order, position).
///
pub fn label_paths(paths: &[HaplotypePath], jump: ReferenceJump) -> Vec<LabeledStep> {
    paths
        .par_iter()
        .progress_count(paths.len() as u64)
        .map(|path| {
            let labels = segment_path(&path.node_ids(), jump);
            path.steps
                .iter()
                .zip(labels)
                .enumerate()
                .map(|(pos, (&(node, orientation), label))| LabeledStep {
                    path: path.name.clone(),
                    pos,
                    node,
                    orientation,
                    label,
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

///
/// TSV serialization of the label table
///
pub fn label_table_tsv(steps: &[LabeledStep]) -> String {
    let mut out = String::from("path\tpos\tnode\torientation\tlabel\n");
    for s in steps {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            s.path, s.pos, s.node, s.orientation, s.label
        ));
    }
    out
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Orientation::Forward;
    use test_case::test_case;

    fn flank() -> SegmentLabel {
        SegmentLabel::Flank
    }
    fn module(i: usize) -> SegmentLabel {
        SegmentLabel::Module(i)
    }

    #[test]
    fn empty_path_gives_empty_labels() {
        let labels = segment_path(&[], ReferenceJump::new(500, 13));
        assert!(labels.is_empty());
    }

    #[test]
    fn path_outside_interval_is_all_flank() {
        // never enters (13, 500)
        let ids = vec![1, 5, 13, 500, 900, 13];
        let labels = segment_path(&ids, ReferenceJump::new(500, 13));
        assert_eq!(labels, vec![flank(); 6]);
    }

    #[test]
    fn single_traversal() {
        let ids = vec![10, 12, 100, 200, 300, 600, 700];
        let labels = segment_path(&ids, ReferenceJump::new(500, 13));
        assert_eq!(
            labels,
            vec![
                flank(),
                flank(),
                module(1),
                module(1),
                module(1),
                flank(),
                flank(),
            ]
        );
    }

    #[test]
    fn three_traversals_use_indices_1_2_3() {
        let ids = vec![10, 100, 200, 510, 150, 250, 510, 100, 300, 510, 900];
        let labels = segment_path(&ids, ReferenceJump::new(500, 13));
        assert_eq!(
            labels,
            vec![
                flank(),
                module(1),
                module(1),
                flank(),
                module(2),
                module(2),
                flank(),
                module(3),
                module(3),
                flank(),
                flank(),
            ]
        );
        // indices are contiguous runs, strictly increasing
        let used: Vec<usize> = labels.iter().filter_map(|l| l.module_index()).collect();
        assert_eq!(used, vec![1, 1, 2, 2, 3, 3]);
    }

    // boundary policy: strict on both sides, endpoint ids are flank
    #[test_case(13 => flank(); "equal to lower endpoint")]
    #[test_case(14 => module(1); "just inside lower")]
    #[test_case(499 => module(1); "just inside upper")]
    #[test_case(500 => flank(); "equal to upper endpoint")]
    #[test_case(501 => flank(); "above upper")]
    #[test_case(12 => flank(); "below lower")]
    fn boundary(id: usize) -> SegmentLabel {
        segment_path(&[id], ReferenceJump::new(500, 13))[0]
    }

    #[test]
    fn repeated_return_nodes_follow_three_way_rule() {
        // return nodes 500/501 and endpoint 13 are all flank, strictly
        let ids = vec![10, 11, 12, 500, 501, 13, 14, 500, 501, 15];
        let labels = segment_path(&ids, ReferenceJump::new(500, 13));
        assert_eq!(
            labels,
            vec![
                flank(),
                flank(),
                flank(),
                flank(),
                flank(),
                flank(),
                module(1),
                flank(),
                flank(),
                module(2),
            ]
        );
    }

    #[test]
    fn detect_picks_largest_gap() {
        let p = HaplotypePath::new(
            "ref",
            vec![10, 11, 12, 500, 501, 13, 14]
                .into_iter()
                .map(|id| (id, Forward))
                .collect(),
        );
        // |12-500| = 488 and |501-13| = 488 tie; first occurrence wins
        let jump = ReferenceJump::detect(&p).unwrap();
        assert_eq!(jump, ReferenceJump::new(12, 500));
        assert_eq!(jump.lo(), 12);
        assert_eq!(jump.hi(), 500);
    }

    #[test]
    fn detect_loopback_written_backwards() {
        let p = HaplotypePath::new(
            "ref",
            vec![1, 2, 600, 3, 4]
                .into_iter()
                .map(|id| (id, Forward))
                .collect(),
        );
        let jump = ReferenceJump::detect(&p).unwrap();
        assert_eq!(jump, ReferenceJump::new(600, 3));
        assert_eq!((jump.lo(), jump.hi()), (3, 600));
    }

    #[test]
    fn detect_needs_two_steps() {
        let p = HaplotypePath::new("ref", vec![(7, Forward)]);
        assert!(ReferenceJump::detect(&p).is_none());
        let p = HaplotypePath::new("ref", vec![]);
        assert!(ReferenceJump::detect(&p).is_none());
    }

    #[test]
    fn label_paths_flat_table() {
        let paths = vec![
            HaplotypePath::new("a", vec![(1, Forward), (100, Forward), (600, Forward)]),
            HaplotypePath::new("b", vec![(2, Forward)]),
        ];
        let table = label_paths(&paths, ReferenceJump::new(500, 13));
        assert_eq!(table.len(), 4);
        assert_eq!(table[0].path, "a");
        assert_eq!(table[0].pos, 0);
        assert_eq!(table[0].label, flank());
        assert_eq!(table[1].label, module(1));
        assert_eq!(table[2].label, flank());
        assert_eq!((table[3].path.as_str(), table[3].pos), ("b", 0));

        let tsv = label_table_tsv(&table);
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "path\tpos\tnode\torientation\tlabel");
        assert_eq!(lines[2], "a\t1\t100\t+\tmodule-1");
    }
}
