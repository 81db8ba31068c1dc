/*
    Merge worker results into the four row-aligned outputs
        structure file: <dotbracket>
        posterior file: bit_<k>\t<posterior>
        element file:   bit_<k>\t<element line>
        size file:      bit_<k>\t<count>\t<profile>
    Rows are written for k = 1..K in lockstep, a missing k is fatal
    Each output is staged in a temporary file next to its target and
    only renamed into place once every row of every output is written
        targets are checked before the first rename
        a failed rename takes back the outputs already placed
*/

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use log::{info, warn};
use tempfile::NamedTempFile;
use super::errors::{FoldError, Result};
use super::worker::WorkerResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub structure: PathBuf,
    pub posterior: PathBuf,
    pub element: PathBuf,
    pub size: PathBuf,
}

impl OutputPaths {
    /// `<base>.db`, `<base>.txt`, `<base>.element_string` plus the size file
    pub fn from_basename(basename: &str, size: PathBuf) -> Self {
        Self {
            structure: PathBuf::from(format!("{basename}.db")),
            posterior: PathBuf::from(format!("{basename}.txt")),
            element: PathBuf::from(format!("{basename}.element_string")),
            size,
        }
    }

    fn all(&self) -> [&Path; 4] {
        [&self.structure, &self.posterior, &self.element, &self.size]
    }
}

pub fn write_rows<W: Write>(results: &BTreeMap<usize, WorkerResult>, job_count: usize,
                            structure: &mut W, posterior: &mut W, element: &mut W,
                            size: &mut W) -> Result<()> {
    for index in 1..=job_count {
        let result = results.get(&index)
            .filter(|r| r.index == index)
            .ok_or(FoldError::IncompleteResults { index })?;
        writeln!(structure, "{}", result.dotbracket)?;
        writeln!(posterior, "bit_{}\t{}", index, result.posterior)?;
        writeln!(element, "bit_{}\t{}", index, result.element_line)?;
        writeln!(size, "bit_{}\t{}\t{}", index, result.count, result.profile)?;
    }
    if let Some(&extra) = results.keys().find(|&&k| k == 0 || k > job_count) {
        return Err(FoldError::IncompleteResults { index: extra });
    }
    Ok(())
}

pub fn write_outputs(results: &BTreeMap<usize, WorkerResult>, job_count: usize,
                     paths: &OutputPaths) -> Result<()> {
    for target in paths.all() {
        check_target(target)?;
    }
    let mut structure = BufWriter::new(staging_file(&paths.structure)?);
    let mut posterior = BufWriter::new(staging_file(&paths.posterior)?);
    let mut element = BufWriter::new(staging_file(&paths.element)?);
    let mut size = BufWriter::new(staging_file(&paths.size)?);
    write_rows(results, job_count, &mut structure, &mut posterior, &mut element, &mut size)?;
    let mut finished: Vec<NamedTempFile> = Vec::with_capacity(4);
    for writer in [structure, posterior, element, size] {
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.as_file().sync_all()?;
        finished.push(file);
    }
    persist_all(finished.into_iter().zip(paths.all()))
}

// a directory sitting on a target would only fail at rename time
fn check_target(target: &Path) -> Result<()> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_dir() => Err(FoldError::OutputBlocked {
            path: target.to_path_buf(),
            reason: "a directory is in the way",
        }),
        _ => Ok(()),
    }
}

fn persist_all<'a, I>(staged: I) -> Result<()>
where
    I: IntoIterator<Item = (NamedTempFile, &'a Path)>,
{
    let mut placed: Vec<&Path> = Vec::with_capacity(4);
    for (file, target) in staged {
        if let Err(e) = file.persist(target) {
            for done in placed {
                if let Err(remove) = fs::remove_file(done) {
                    warn!("Could not take back {:?}: {}", done, remove);
                }
            }
            return Err(e.error.into());
        }
        placed.push(target);
    }
    for target in placed {
        info!("Wrote {:?}", target);
    }
    Ok(())
}

fn staging_file(target: &Path) -> io::Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = target.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let prefix = format!(".{name}.");
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".partial");
    // same mode a plain File::create would give, the umask still applies
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lib_utils::profiles::Profile;

    fn result(index: usize, count: usize, calls: [&str; 3]) -> WorkerResult {
        WorkerResult {
            index,
            dotbracket: format!("(.{index})"),
            posterior: format!("p{index}"),
            element_line: format!("e{index}"),
            profile: Profile::from_calls(calls),
            count,
        }
    }

    fn results() -> BTreeMap<usize, WorkerResult> {
        [result(2, 1, ["0", "1", "0"]), result(1, 4, ["1", "1", "0"])]
            .into_iter()
            .map(|r| (r.index, r))
            .collect()
    }

    #[test]
    fn rows_align_across_streams() {
        let (mut s, mut p, mut e, mut z) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        write_rows(&results(), 2, &mut s, &mut p, &mut e, &mut z).unwrap();
        assert_eq!(String::from_utf8(s).unwrap(), "(.1)\n(.2)\n");
        assert_eq!(String::from_utf8(p).unwrap(), "bit_1\tp1\nbit_2\tp2\n");
        assert_eq!(String::from_utf8(e).unwrap(), "bit_1\te1\nbit_2\te2\n");
        assert_eq!(String::from_utf8(z).unwrap(), "bit_1\t4\t11.\nbit_2\t1\t.1.\n");
    }

    #[test]
    fn missing_index_is_fatal_and_nothing_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("merged");
        let paths = OutputPaths::from_basename(base.to_str().unwrap(), dir.path().join("sizer.tab"));
        let err = write_outputs(&results(), 3, &paths).unwrap_err();
        assert!(matches!(err, FoldError::IncompleteResults { index: 3 }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn unexpected_extra_index_is_fatal() {
        let (mut s, mut p, mut e, mut z) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        let err = write_rows(&results(), 1, &mut s, &mut p, &mut e, &mut z).unwrap_err();
        assert!(matches!(err, FoldError::IncompleteResults { index: 2 }));
    }

    #[test]
    fn outputs_land_at_their_targets() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run1");
        let paths = OutputPaths::from_basename(base.to_str().unwrap(), dir.path().join("sizes.tab"));
        write_outputs(&results(), 2, &paths).unwrap();
        assert_eq!(fs::read_to_string(&paths.structure).unwrap(), "(.1)\n(.2)\n");
        assert_eq!(fs::read_to_string(&paths.size).unwrap(), "bit_1\t4\t11.\nbit_2\t1\t.1.\n");
        assert!(paths.posterior.ends_with("run1.txt"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let plain = dir.path().join("plain");
            fs::File::create(&plain).unwrap();
            let expected = fs::metadata(&plain).unwrap().permissions().mode() & 0o777;
            for target in paths.all() {
                let mode = fs::metadata(target).unwrap().permissions().mode() & 0o777;
                assert_eq!(mode, expected, "{:?}", target);
            }
        }
    }

    #[test]
    fn directory_in_the_way_finalizes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("merged");
        let paths = OutputPaths::from_basename(base.to_str().unwrap(), dir.path().join("sizer.tab"));
        fs::create_dir(&paths.size).unwrap();
        let err = write_outputs(&results(), 2, &paths).unwrap_err();
        assert!(matches!(err, FoldError::OutputBlocked { .. }));
        assert!(!paths.structure.exists());
        assert!(!paths.posterior.exists());
        assert!(!paths.element.exists());
        assert!(paths.size.is_dir());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_rename_takes_back_placed_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.db");
        let blocked = dir.path().join("blocked");
        fs::create_dir(&blocked).unwrap();
        let staged = vec![
            (staging_file(&first).unwrap(), first.as_path()),
            (staging_file(&blocked).unwrap(), blocked.as_path()),
        ];
        assert!(matches!(persist_all(staged), Err(FoldError::Io(_))));
        assert!(!first.exists());
        // the losing staged file is removed when its handle drops
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
