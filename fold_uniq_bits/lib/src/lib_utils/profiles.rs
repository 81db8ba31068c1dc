/*
    Read the positional bit file
        Column 0 is the read label
        Columns 1..N are per-position calls
            "1" => mutated
            anything else => unmutated
    Count every distinct profile, remember the order it was first seen in
*/

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use log::{debug, info};
use super::errors::Result;
use super::struct_helper::FileBufferHelper;

pub const MUTATED: char = '1';
pub const UNMUTATED: char = '.';

/// Per-position binary call vector, rendered with `1` and `.`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Profile(String);

impl Profile {
    pub fn from_calls<'a, I>(calls: I) -> Profile
    where
        I: IntoIterator<Item = &'a str>,
    {
        Profile(calls.into_iter()
            .map(|call| if call == "1" { MUTATED } else { UNMUTATED })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn mutation_count(&self) -> usize {
        self.0.chars().filter(|&c| c == MUTATED).count()
    }

    pub fn calls(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.chars().map(|c| c == MUTATED)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCount {
    pub profile: Profile,
    pub count: usize,
}

/// Unique profiles in first-seen order with their occurrence counts
#[derive(Debug, Default)]
pub struct ProfileCounts {
    entries: Vec<ProfileCount>,
    positions: HashMap<Profile, usize>,
    pub total: usize,
    pub skipped: usize,
}

impl ProfileCounts {
    pub fn add(&mut self, profile: Profile) {
        self.total += 1;
        match self.positions.get(&profile) {
            Some(&pos) => self.entries[pos].count += 1,
            None => {
                self.positions.insert(profile.clone(), self.entries.len());
                self.entries.push(ProfileCount { profile, count: 1 });
            }
        }
    }

    pub fn unique(&self) -> usize {
        self.entries.len()
    }

    pub fn count_of(&self, profile: &Profile) -> Option<usize> {
        self.positions.get(profile).map(|&pos| self.entries[pos].count)
    }

    /// entries in the order their profile was first scanned
    pub fn entries(&self) -> &[ProfileCount] {
        &self.entries
    }
}

impl FromIterator<Profile> for ProfileCounts {
    fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
        let mut counts = ProfileCounts::default();
        iter.into_iter().for_each(|profile| counts.add(profile));
        counts
    }
}

pub fn load_bit_file(path: &Path) -> Result<ProfileCounts> {
    let mut bit_file = FileBufferHelper::new(path)?;
    let mut counts = ProfileCounts::default();
    while bit_file.read_next()? {
        let mut columns = bit_file.line.split('\t');
        let _label = columns.next();
        let calls: Vec<&str> = columns.collect();
        if calls.is_empty() {
            // label-only or blank row
            debug!("Skipping line {} of {:?}: fewer than 2 columns", bit_file.line_number, bit_file.path);
            counts.skipped += 1;
            continue;
        }
        counts.add(Profile::from_calls(calls));
    }
    info!("Scanned {} rows from {:?} ({} skipped)", counts.total, path, counts.skipped);
    Ok(counts)
}
