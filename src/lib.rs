pub mod common;
pub mod graph;
pub mod hist;
pub mod io;
pub mod matrix;
pub mod path;
pub mod pca;
pub mod plot;
pub mod segment;
