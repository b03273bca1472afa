//!
//!
//!
use std::str::FromStr;

/// integer identifier of a graph segment (S record)
pub type NodeId = usize;

/// one step of a haplotype walk: which node, in which direction
pub type Step = (NodeId, Orientation);

///
/// Direction a path visits a node in.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// `+` in GFA
    Forward,
    /// `-` in GFA
    Reverse,
}

impl Orientation {
    /// reverse the direction
    pub fn flip(&self) -> Orientation {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }
    pub fn is_reverse(&self) -> bool {
        match self {
            Orientation::Reverse => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Orientation::Forward => write!(f, "+"),
            Orientation::Reverse => write!(f, "-"),
        }
    }
}

///
/// Error (unit type) in from_str of Orientation
///
#[derive(Clone, Debug)]
pub struct OrientationParseError;

impl FromStr for Orientation {
    type Err = OrientationParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Orientation::Forward),
            "-" => Ok(Orientation::Reverse),
            _ => Err(OrientationParseError),
        }
    }
}

//
// tests
//
