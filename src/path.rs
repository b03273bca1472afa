//!
//! Haplotype path through the pangenome graph
//!
use crate::common::{NodeId, Step};
use itertools::Itertools;

///
/// Named ordered traversal of graph nodes by one haplotype.
///
#[derive(Clone, Debug, PartialEq)]
pub struct HaplotypePath {
    pub name: String,
    pub steps: Vec<Step>,
}

impl HaplotypePath {
    pub fn new(name: &str, steps: Vec<Step>) -> Self {
        HaplotypePath {
            name: name.to_string(),
            steps,
        }
    }
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
    ///
    /// node identifiers only, traversal order
    ///
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.steps.iter().map(|(id, _)| *id).collect()
    }
    ///
    /// the number of reverse-oriented steps
    ///
    pub fn n_reverse(&self) -> usize {
        self.steps.iter().filter(|(_, o)| o.is_reverse()).count()
    }
    ///
    /// Bring the path into the comparison direction.
    ///
    /// If strictly more than half of the steps are reverse-oriented, the
    /// traversal was recorded against the numbering direction: reverse the
    /// step order and flip every orientation. Otherwise the path is kept
    /// unchanged (a tie counts as forward).
    ///
    /// Returns the normalized path and whether it was flipped.
    ///
    pub fn normalize(&self) -> (HaplotypePath, bool) {
        if 2 * self.n_reverse() > self.len() {
            let steps = self
                .steps
                .iter()
                .rev()
                .map(|(id, o)| (*id, o.flip()))
                .collect();
            (
                HaplotypePath {
                    name: self.name.clone(),
                    steps,
                },
                true,
            )
        } else {
            (self.clone(), false)
        }
    }
}

impl std::fmt::Display for HaplotypePath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}",
            self.name,
            self.steps.iter().map(|(id, o)| format!("{}{}", id, o)).join(",")
        )
    }
}

//
// tests
//
