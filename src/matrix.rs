//!
//! Module membership matrix
//!
//! One row per (path, module index) pair, one column per node observed in
//! any module segment, cell = presence/absence of the node in the segment.
//! Duplicated visits within one segment collapse to a single presence bit.
//!
use crate::common::NodeId;
use crate::hist::Hist;
use crate::segment::LabeledStep;
use fixedbitset::FixedBitSet;
use fnv::FnvHashMap as HashMap;
use itertools::Itertools;
use ndarray::Array2;

///
/// row key: which module segment of which haplotype
///
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct RowKey {
    pub path: String,
    pub module: usize,
}

///
/// Presence/absence table of module segments over module nodes.
///
#[derive(Clone, Debug)]
pub struct ModuleMatrix {
    pub rows: Vec<RowKey>,
    /// sorted node identifiers of the module columns
    pub columns: Vec<NodeId>,
    presence: Vec<FixedBitSet>,
}

impl ModuleMatrix {
    ///
    /// Build the matrix from the flat label table.
    ///
    /// Row order follows first appearance in the table, so rows come out
    /// grouped by path with module indices increasing. Flank steps are
    /// ignored entirely.
    ///
    pub fn build(steps: &[LabeledStep]) -> ModuleMatrix {
        let module_steps: Vec<(&LabeledStep, usize)> = steps
            .iter()
            .filter_map(|s| s.label.module_index().map(|m| (s, m)))
            .collect();

        let columns: Vec<NodeId> = module_steps
            .iter()
            .map(|(s, _)| s.node)
            .sorted()
            .dedup()
            .collect();
        let column_index: HashMap<NodeId, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, &node)| (node, i))
            .collect();

        let mut rows: Vec<RowKey> = Vec::new();
        let mut row_index: HashMap<RowKey, usize> = HashMap::default();
        let mut presence: Vec<FixedBitSet> = Vec::new();
        for (step, module) in module_steps {
            let key = RowKey {
                path: step.path.clone(),
                module,
            };
            let row = match row_index.get(&key) {
                Some(&row) => row,
                None => {
                    rows.push(key.clone());
                    presence.push(FixedBitSet::with_capacity(columns.len()));
                    row_index.insert(key, rows.len() - 1);
                    rows.len() - 1
                }
            };
            presence[row].insert(column_index[&step.node]);
        }

        ModuleMatrix {
            rows,
            columns,
            presence,
        }
    }
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
    ///
    /// is the node present in the segment of the given row?
    ///
    pub fn contains(&self, row: usize, node: NodeId) -> bool {
        self.columns
            .binary_search(&node)
            .map(|col| self.presence[row].contains(col))
            .unwrap_or(false)
    }
    ///
    /// number of distinct nodes of one segment
    ///
    pub fn row_size(&self, row: usize) -> usize {
        self.presence[row].count_ones(..)
    }
    ///
    /// histogram of distinct-node counts over all module segments
    ///
    pub fn size_hist(&self) -> Hist {
        let sizes: Vec<usize> = (0..self.n_rows()).map(|row| self.row_size(row)).collect();
        Hist::from(&sizes)
    }
    ///
    /// dense 0/1 matrix for the decomposition
    ///
    pub fn to_array(&self) -> Array2<f64> {
        let mut x = Array2::zeros((self.n_rows(), self.n_columns()));
        for (row, bits) in self.presence.iter().enumerate() {
            for col in bits.ones() {
                x[[row, col]] = 1.0;
            }
        }
        x
    }
    ///
    /// TSV serialization, one segment per line
    ///
    pub fn to_tsv(&self) -> String {
        let mut out = String::from("path\tmodule");
        for node in &self.columns {
            out.push_str(&format!("\t{}", node));
        }
        out.push('\n');
        for (key, bits) in self.rows.iter().zip(&self.presence) {
            out.push_str(&format!("{}\t{}", key.path, key.module));
            for col in 0..self.n_columns() {
                out.push_str(if bits.contains(col) { "\t1" } else { "\t0" });
            }
            out.push('\n');
        }
        out
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::HaplotypePath;
    use crate::segment::{label_paths, ReferenceJump};
    use crate::common::Orientation::Forward;

    fn fwd(ids: Vec<usize>) -> Vec<(usize, crate::common::Orientation)> {
        ids.into_iter().map(|id| (id, Forward)).collect()
    }

    #[test]
    fn build_from_two_paths() {
        // interval (13, 500); a has modules {100, 200} and {100}, b has {300}
        let paths = vec![
            HaplotypePath::new("a", fwd(vec![1, 100, 200, 100, 510, 100, 510])),
            HaplotypePath::new("b", fwd(vec![1, 300, 510])),
        ];
        let table = label_paths(&paths, ReferenceJump::new(500, 13));
        let m = ModuleMatrix::build(&table);

        assert_eq!(m.n_rows(), 3);
        assert_eq!(
            m.rows,
            vec![
                RowKey { path: "a".into(), module: 1 },
                RowKey { path: "a".into(), module: 2 },
                RowKey { path: "b".into(), module: 1 },
            ]
        );
        assert_eq!(m.columns, vec![100, 200, 300]);

        // a/module-1 visited 100 twice, collapsed to one bit
        assert_eq!(m.row_size(0), 2);
        assert!(m.contains(0, 100));
        assert!(m.contains(0, 200));
        assert!(!m.contains(0, 300));
        assert_eq!(m.row_size(1), 1);
        assert!(m.contains(1, 100));
        assert!(m.contains(2, 300));
        assert!(!m.contains(2, 77)); // not a column at all

        let x = m.to_array();
        assert_eq!(x.shape(), &[3, 3]);
        assert_eq!(x.row(0).to_vec(), vec![1.0, 1.0, 0.0]);
        assert_eq!(x.row(1).to_vec(), vec![1.0, 0.0, 0.0]);
        assert_eq!(x.row(2).to_vec(), vec![0.0, 0.0, 1.0]);

        let tsv = m.to_tsv();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "path\tmodule\t100\t200\t300");
        assert_eq!(lines[1], "a\t1\t1\t1\t0");
        assert_eq!(lines[3], "b\t1\t0\t0\t1");

        // segment sizes 2, 1, 1
        assert_eq!(m.size_hist().to_string(), "1:2,2:1");
    }

    #[test]
    fn all_flank_table_gives_empty_matrix() {
        let paths = vec![HaplotypePath::new("a", fwd(vec![1, 2, 3]))];
        let table = label_paths(&paths, ReferenceJump::new(500, 13));
        let m = ModuleMatrix::build(&table);
        assert_eq!(m.n_rows(), 0);
        assert_eq!(m.n_columns(), 0);
        assert_eq!(m.to_array().shape(), &[0, 0]);
    }
}
