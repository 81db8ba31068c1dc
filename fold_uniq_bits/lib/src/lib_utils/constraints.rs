/*
    Turn a profile into per-position folding constraints
        position: 1-based
        base: reference symbol at that position
        code:
            mutated position => 0
            unmutated position => -1
    Written as a three column BPSEQ-style constraints file
*/

use std::io::{self, Write};
use super::errors::{FoldError, Result};
use super::profiles::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintCode {
    Free,
    PairedOrUnpaired,
}

impl ConstraintCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintCode::Free => "0",
            ConstraintCode::PairedOrUnpaired => "-1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub position: usize,
    pub base: char,
    pub code: ConstraintCode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSpec(Vec<Constraint>);

impl ConstraintSpec {
    pub fn build(reference: &str, profile: &Profile) -> Result<ConstraintSpec> {
        let expected = reference.chars().count();
        if expected != profile.len() {
            return Err(FoldError::LengthMismatch { expected, found: profile.len() });
        }
        Ok(ConstraintSpec(reference.chars()
            .zip(profile.calls())
            .enumerate()
            .map(|(idx, (base, mutated))| Constraint {
                position: idx + 1,
                base,
                code: if mutated { ConstraintCode::Free } else { ConstraintCode::PairedOrUnpaired },
            })
            .collect()))
    }

    /// Concatenated codes; the second dedup key
    pub fn signature(&self) -> String {
        self.0.iter().map(|c| c.code.as_str()).collect()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.0
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for c in &self.0 {
            writeln!(writer, "{}\t{}\t{}", c.position, c.base, c.code.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_calls() {
        let profile = Profile::from_calls(["1", "1", "0", "0"]);
        let spec = ConstraintSpec::build("ACGU", &profile).unwrap();
        let codes: Vec<ConstraintCode> = spec.constraints().iter().map(|c| c.code).collect();
        assert_eq!(codes, vec![
            ConstraintCode::Free, ConstraintCode::Free,
            ConstraintCode::PairedOrUnpaired, ConstraintCode::PairedOrUnpaired,
        ]);
        assert_eq!(spec.signature(), "00-1-1");
    }

    #[test]
    fn constraints_file_rows() {
        let profile = Profile::from_calls(["0", "1", "0"]);
        let spec = ConstraintSpec::build("GCA", &profile).unwrap();
        let mut out = Vec::new();
        spec.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\tG\t-1\n2\tC\t0\n3\tA\t-1\n");
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let profile = Profile::from_calls(["1", "0", "0"]);
        let err = ConstraintSpec::build("ACGU", &profile).unwrap_err();
        assert!(matches!(err, FoldError::LengthMismatch { expected: 4, found: 3 }));
    }
}
