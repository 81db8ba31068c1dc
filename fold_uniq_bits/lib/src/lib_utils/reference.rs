use bio::io::fasta;
use log::{debug, info};
use std::fs::File;
use std::path::Path;
use super::errors::{FoldError, Result};

/// Pull the named entry out of a FASTA collection
pub fn load_reference(path: &Path, name: &str) -> Result<String> {
    let file = File::open(path)?;
    for record in fasta::Reader::new(file).records() {
        let record = record.map_err(|e| FoldError::Fasta {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("Reference entry {}", record.id());
        if record.id() != name {
            continue;
        }
        let sequence = String::from_utf8_lossy(record.seq()).into_owned();
        if sequence.is_empty() {
            return Err(FoldError::EmptyReference { name: name.to_string() });
        }
        info!("Reference {} loaded, {} positions", name, sequence.len());
        return Ok(sequence);
    }
    Err(FoldError::ReferenceNotFound {
        name: name.to_string(),
        path: path.to_path_buf(),
    })
}
