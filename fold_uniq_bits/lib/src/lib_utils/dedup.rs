/*
    Decide which unique profiles get folded
        Order unique profiles by mutation count, highest first
            ties keep the order the profiles were first scanned in
        Build the constraints of every profile
            length mismatch against the reference aborts before any job exists
        Keep a profile only if its constraint signature has not been seen
        Number survivors 1..K in that order
*/

use std::cmp::Reverse;
use std::collections::HashSet;
use log::{debug, info};
use super::constraints::ConstraintSpec;
use super::errors::Result;
use super::profiles::{Profile, ProfileCount};

/// One unit of folding work, addressed by its submission index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub index: usize,
    pub profile: Profile,
    pub count: usize,
}

impl Job {
    pub fn tag(&self) -> String {
        format!("bit_{}", self.index)
    }
}

pub fn schedule(entries: &[ProfileCount], reference: &str) -> Result<Vec<Job>> {
    let mut ordered: Vec<(usize, &ProfileCount)> = entries.iter()
        .map(|entry| (entry.profile.mutation_count(), entry))
        .collect();
    // sort_by_key is stable, scan order breaks ties
    ordered.sort_by_key(|&(mutations, _)| Reverse(mutations));

    let mut seen: HashSet<String> = HashSet::with_capacity(ordered.len());
    let mut jobs: Vec<Job> = Vec::with_capacity(ordered.len());
    for (mutations, entry) in ordered {
        let signature = ConstraintSpec::build(reference, &entry.profile)?.signature();
        if !seen.insert(signature) {
            debug!("Constraints of {} ({} mutations) already scheduled", entry.profile, mutations);
            continue;
        }
        jobs.push(Job {
            index: jobs.len() + 1,
            profile: entry.profile.clone(),
            count: entry.count,
        });
    }
    info!("{} of {} unique profiles have distinct constraints", jobs.len(), entries.len());
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lib_utils::errors::FoldError;
    use crate::lib_utils::profiles::ProfileCounts;

    fn counts(rows: &[&[&str]]) -> ProfileCounts {
        rows.iter().map(|calls| Profile::from_calls(calls.iter().copied())).collect()
    }

    #[test]
    fn higher_mutation_count_first() {
        let counts = counts(&[&["1", "1", "0", "0"], &["1", "1", "0", "1"]]);
        let jobs = schedule(counts.entries(), "ACGU").unwrap();
        let order: Vec<(usize, &str)> = jobs.iter().map(|j| (j.index, j.profile.as_str())).collect();
        assert_eq!(order, vec![(1, "11.1"), (2, "11..")]);
    }

    #[test]
    fn ties_keep_scan_order() {
        let counts = counts(&[&["0", "1", "0"], &["1", "0", "0"], &["0", "0", "1"], &["1", "0", "0"]]);
        let jobs = schedule(counts.entries(), "ACG").unwrap();
        let order: Vec<&str> = jobs.iter().map(|j| j.profile.as_str()).collect();
        assert_eq!(order, vec![".1.", "1..", "..1"]);
        assert_eq!(jobs[1].count, 2);
    }

    #[test]
    fn indices_are_dense() {
        let counts = counts(&[&["1", "0"], &["0", "0"], &["1", "1"], &["0", "1"], &["1", "0"]]);
        let jobs = schedule(counts.entries(), "AC").unwrap();
        let indices: Vec<usize> = jobs.iter().map(|j| j.index).collect();
        assert_eq!(indices, (1..=counts.unique()).collect::<Vec<_>>());
    }

    #[test]
    fn second_pass_changes_nothing() {
        let counts = counts(&[&["1", "0", "1"], &["0", "0", "1"], &["1", "0", "1"], &["0", "0", "0"]]);
        let first = schedule(counts.entries(), "GGA").unwrap();
        let again: Vec<ProfileCount> = first.iter()
            .map(|j| ProfileCount { profile: j.profile.clone(), count: j.count })
            .collect();
        assert_eq!(schedule(&again, "GGA").unwrap(), first);
    }

    #[test]
    fn length_mismatch_stops_scheduling() {
        let counts = counts(&[&["1", "0", "0", "0"], &["1", "0"]]);
        let err = schedule(counts.entries(), "ACGU").unwrap_err();
        assert!(matches!(err, FoldError::LengthMismatch { expected: 4, found: 2 }));
    }

    #[test]
    fn signature_duplicates_keep_first_entry() {
        let first = ProfileCount { profile: Profile::from_calls(["1", "0"]), count: 7 };
        let duplicate = ProfileCount { profile: Profile::from_calls(["1", "0"]), count: 2 };
        let other = ProfileCount { profile: Profile::from_calls(["0", "0"]), count: 1 };
        let jobs = schedule(&[first, duplicate, other], "AU").unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!((jobs[0].index, jobs[0].count), (1, 7));
        assert_eq!((jobs[1].index, jobs[1].profile.as_str()), (2, ".."));
    }
}
