//! Filter predicates shared by group and rename.
//!
//! A [`Filter`] is parsed once from the effective parameter map and then
//! tested against each candidate entry. An entry matches when every option
//! present matches. Malformed option values are reported while parsing, so a
//! bad filter fails the whole operation before anything is touched.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};
use regex::Regex;
use tracing::warn;

use super::params::ParamMap;
use crate::executor::errors::FilterError;

/// Timestamp layout accepted by `modified_date`.
pub const DATE_FORMAT: &str = "%Y/%m/%d-%H:%M";

/// Restriction on the kind of entry, from the `type` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    /// `"file"` or `"folder"`; anything else places no restriction.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "file" => Some(EntryKind::File),
            "folder" => Some(EntryKind::Folder),
            _ => None,
        }
    }

    pub fn admits(self, path: &Path) -> bool {
        match self {
            EntryKind::File => !path.is_dir(),
            EntryKind::Folder => path.is_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Before(NaiveDateTime),
    After(NaiveDateTime),
    Between(NaiveDateTime, NaiveDateTime),
}

impl DateRange {
    /// Parse `"<before|after|between> <date> [<date>]"`.
    pub fn parse(value: &str) -> Result<Self, FilterError> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(FilterError::DateArity);
        }

        let comparator = parts[0].to_ascii_lowercase();
        if !matches!(comparator.as_str(), "before" | "after" | "between") {
            return Err(FilterError::UnknownRange(parts[0].to_string()));
        }

        let first = parse_date(parts[1])?;
        let second = parts.get(2).map(|raw| parse_date(raw)).transpose()?;

        Ok(match comparator.as_str() {
            "before" => DateRange::Before(first),
            "after" => DateRange::After(first),
            _ => DateRange::Between(first, second.ok_or(FilterError::MissingUpperDate)?),
        })
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        match *self {
            DateRange::Before(limit) => time <= limit,
            DateRange::After(limit) => time >= limit,
            DateRange::Between(low, high) => time >= low && time <= high,
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDateTime, FilterError> {
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| FilterError::InvalidDate(format!("{raw}: {err}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBound {
    /// Fails entries smaller than the bound.
    AtLeast(u64),
    /// Fails entries larger than the bound.
    AtMost(u64),
}

impl SizeBound {
    /// `size` is in kilobytes; `comparator` is `GT` or `LT`.
    pub fn parse(size: Option<&str>, comparator: Option<&str>) -> Result<Option<Self>, FilterError> {
        let (size, comparator) = match (size, comparator) {
            (None, None) => return Ok(None),
            (Some(_), None) => return Err(FilterError::MissingComparator),
            (None, Some(_)) => return Err(FilterError::MissingSize),
            (Some(size), Some(comparator)) => (size, comparator),
        };

        let kilobytes: u64 = size.trim().parse().map_err(|_| FilterError::InvalidSize)?;
        let bytes = kilobytes.checked_mul(1024).ok_or(FilterError::InvalidSize)?;

        match comparator {
            "GT" => Ok(Some(SizeBound::AtLeast(bytes))),
            "LT" => Ok(Some(SizeBound::AtMost(bytes))),
            other => Err(FilterError::UnknownComparator(other.to_string())),
        }
    }

    pub fn admits(self, len: u64) -> bool {
        match self {
            SizeBound::AtLeast(bytes) => len >= bytes,
            SizeBound::AtMost(bytes) => len <= bytes,
        }
    }
}

/// A parsed set of filter options.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub contains: Option<String>,
    pub regex: Option<Regex>,
    pub extension: Option<String>,
    pub kind: Option<EntryKind>,
    pub modified: Option<DateRange>,
    pub size: Option<SizeBound>,
}

impl Filter {
    /// Build a filter from `params`, skipping the keys in `exclude`.
    ///
    /// Keys with no filter meaning are ignored.
    pub fn from_params(params: &ParamMap, exclude: &[&str]) -> Result<Self, FilterError> {
        let get = |key: &str| {
            if exclude.contains(&key) {
                None
            } else {
                params.get(key).map(String::as_str)
            }
        };

        let regex = get("regex")
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| FilterError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            contains: get("contains").map(str::to_string),
            regex,
            extension: get("extension").map(str::to_string),
            kind: get("type").and_then(EntryKind::parse),
            modified: get("modified_date").map(DateRange::parse).transpose()?,
            size: SizeBound::parse(get("size"), get("comparator"))?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.contains.is_none()
            && self.regex.is_none()
            && self.extension.is_none()
            && self.kind.is_none()
            && self.modified.is_none()
            && self.size.is_none()
    }

    /// Test one entry. A vanished entry, or a link to one, never matches.
    pub fn matches(&self, path: &Path) -> Result<bool, FilterError> {
        let Ok(metadata) = fs::metadata(path) else {
            warn!(
                path = %path.display(),
                "entry does not exist, it may have been moved or deleted; ignoring"
            );
            return Ok(false);
        };

        let name = file_name(path);

        if let Some(needle) = &self.contains {
            if !name.contains(needle.as_str()) {
                return Ok(false);
            }
        }

        // Passes whenever the pattern declares a capture group; the name
        // itself is not matched.
        if let Some(regex) = &self.regex {
            if regex.captures_len() < 2 {
                return Ok(false);
            }
        }

        if let Some(extension) = &self.extension {
            if extension_of(&name) != extension {
                return Ok(false);
            }
        }

        if let Some(kind) = self.kind {
            if !kind.admits(path) {
                return Ok(false);
            }
        }

        if let Some(range) = &self.modified {
            let modified = metadata.modified().map_err(|source| FilterError::Metadata {
                path: path.to_path_buf(),
                source,
            })?;
            let local: DateTime<Local> = modified.into();
            if !range.contains(local.naive_local()) {
                return Ok(false);
            }
        }

        if let Some(bound) = self.size {
            if !bound.admits(metadata.len()) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Keep the entries of `candidates` that match, in order.
    pub fn apply<I, P>(&self, candidates: I) -> Result<Vec<P>, FilterError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut kept = Vec::new();
        for candidate in candidates {
            if self.matches(candidate.as_ref())? {
                kept.push(candidate);
            }
        }
        Ok(kept)
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Text after the last `.`, or the whole name when there is none.
pub(crate) fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}
