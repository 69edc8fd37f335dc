//! Random dotted namespaces and query text for property-based testing.
//!
//! Segment names are drawn from a deliberately small alphabet so that generated
//! namespaces share prefixes and sibling names, and generated queries actually hit
//! something most of the time.

use quickcheck::{Arbitrary, Gen};
use std::fmt;

const SEGMENT_CHARS: &[char] = &['a', 'b', 'c', 'd', 'e', 'A', 'B', '_', '1'];
const QUERY_CHARS: &[char] = &['a', 'b', 'c', 'd', 'e', 'A', 'B', '_', '1', '.', ' '];

const MAX_SEGMENT_LEN: u32 = 5;
const MAX_DEPTH: u32 = 4;
const MAX_NAMES: u32 = 40;
const MAX_QUERY_LEN: u32 = 8;

/// Generates a random number in the range [min, max] inclusive.
fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

/// Generates a non-empty segment that starts with a letter or underscore.
fn gen_segment(g: &mut Gen) -> String {
    let len = gen_range(g, 1, MAX_SEGMENT_LEN);
    let mut segment = String::new();
    segment.push(*g.choose(&SEGMENT_CHARS[..SEGMENT_CHARS.len() - 1]).unwrap());
    for _ in 1..len {
        segment.push(*g.choose(SEGMENT_CHARS).unwrap());
    }
    segment
}

/// A well-formed fully-qualified name such as `ab.c_.Bd`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DottedName(pub String);

impl DottedName {
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl Arbitrary for DottedName {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = gen_range(g, 1, MAX_DEPTH);
        let segments: Vec<String> = (0..depth).map(|_| gen_segment(g)).collect();
        DottedName(segments.join("."))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // Drop trailing segments
        let segments: Vec<String> = self.0.split('.').map(str::to_string).collect();
        Box::new((1..segments.len()).rev().map(move |n| DottedName(segments[..n].join("."))))
    }
}

impl fmt::Display for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A list of names as an enumerator would report them (duplicates allowed).
#[derive(Clone, Debug)]
pub struct Namespace {
    pub names: Vec<DottedName>,
}

impl Namespace {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.0.as_str())
    }
}

impl Arbitrary for Namespace {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = gen_range(g, 0, MAX_NAMES);
        let mut names: Vec<DottedName> = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = DottedName::arbitrary(g);
            // Extend an earlier name half of the time to get deeper shared subtrees
            let name = if names.is_empty() || bool::arbitrary(g) {
                name
            } else {
                let parent = g.choose(&names).unwrap().clone();
                DottedName(format!("{}.{}", parent.0, name.0))
            };
            names.push(name);
        }
        Namespace { names }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.names.shrink().map(|names| Namespace { names }))
    }
}

/// Raw search-box text without wildcard markers: segment characters, dots and spaces.
#[derive(Clone, Debug)]
pub struct QueryText(pub String);

impl Arbitrary for QueryText {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = gen_range(g, 0, MAX_QUERY_LEN);
        QueryText((0..len).map(|_| *g.choose(QUERY_CHARS).unwrap()).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let text = self.0.clone();
        Box::new((0..text.chars().count()).map(move |skip| {
            QueryText(
                text.chars()
                    .enumerate()
                    .filter(|&(i, _)| i != skip)
                    .map(|(_, c)| c)
                    .collect(),
            )
        }))
    }
}

impl fmt::Display for QueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
