pub mod gfa;

use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

///
/// write string into a file
///
pub fn write_string<P: AsRef<Path>>(filename: P, string: &str) -> std::io::Result<()> {
    let mut file = File::create(filename)?;
    file.write_all(string.as_bytes())?;
    Ok(())
}
