//!
//! Histogram counter for per-path module counts and segment sizes
//!
use fnv::FnvHashMap as HashMap;
use itertools::Itertools;

/// calculate (average, std dev, min, max) of the list of f64
pub fn stat(xs: &[f64]) -> (f64, f64, f64, f64) {
    if xs.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }
    let n = xs.len() as f64;
    let ave = xs.iter().sum::<f64>() / n;
    let d: f64 = xs.iter().map(|x| (x - ave).powi(2)).sum();
    let sd = (d / n).sqrt();
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (ave, sd, min, max)
}

///
/// Histogram counter struct
///
#[derive(Clone, Debug, Default)]
pub struct Hist(HashMap<usize, usize>);

impl Hist {
    pub fn new() -> Self {
        Hist(HashMap::default())
    }
    ///
    /// count every value of an occurrence table
    ///
    pub fn from(values: &[usize]) -> Self {
        let mut h = Hist::new();
        for &value in values {
            h.add(value);
        }
        h
    }
    ///
    /// increment the count of the value
    ///
    pub fn add(&mut self, value: usize) {
        *self.0.entry(value).or_insert(0) += 1;
    }
    ///
    /// count of the value
    ///
    pub fn get(&self, value: usize) -> usize {
        self.0.get(&value).copied().unwrap_or(0)
    }
    ///
    /// min/max of the counted values
    ///
    pub fn range(&self) -> Option<(usize, usize)> {
        match self.0.keys().minmax().into_option() {
            Some((&min, &max)) => Some((min, max)),
            None => None,
        }
    }
    ///
    /// total number of counted elements
    ///
    pub fn len(&self) -> usize {
        self.0.values().sum()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    ///
    /// (value, count) pairs sorted by value, for bar plotting
    ///
    pub fn bars(&self) -> Vec<(usize, usize)> {
        self.0.iter().map(|(&k, &v)| (k, v)).sorted().collect()
    }
}

impl std::fmt::Display for Hist {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.bars()
            .iter()
            .enumerate()
            .try_for_each(|(i, (k, v))| write!(f, "{}{}:{}", if i != 0 { "," } else { "" }, k, v))
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hist_counts() {
        let h = Hist::from(&[3, 1, 3, 3, 2, 1]);
        assert_eq!(h.get(3), 3);
        assert_eq!(h.get(1), 2);
        assert_eq!(h.get(2), 1);
        assert_eq!(h.get(0), 0);
        assert_eq!(h.range(), Some((1, 3)));
        assert_eq!(h.len(), 6);
        assert_eq!(h.bars(), vec![(1, 2), (2, 1), (3, 3)]);
        assert_eq!(h.to_string(), "1:2,2:1,3:3");
    }

    #[test]
    fn hist_empty() {
        let h = Hist::new();
        assert!(h.is_empty());
        assert_eq!(h.range(), None);
        assert_eq!(h.to_string(), "");
    }

    #[test]
    fn stat_of_list() {
        let (ave, sd, min, max) = stat(&[0., 10.]);
        assert_eq!((ave, sd, min, max), (5.0, 5.0, 0.0, 10.0));
        assert_eq!(stat(&[]), (0.0, 0.0, 0.0, 0.0));
    }
}
