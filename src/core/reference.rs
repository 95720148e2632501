//! Fixed reference-segment tables for named assemblies.
//!
//! Used as a fallback when a backend's variant set names a reference set but
//! does not describe its segments.

use std::sync::OnceLock;

use crate::core::segment::ReferenceSegment;

/// Assembly name for which a standard table exists
pub const GRCH38: &str = "GRCh38";

/// GRCh38 primary assembly lengths: chromosomes 1-22, X, Y and MT
const GRCH38_COMMON: [(&str, u64); 25] = [
    ("1", 248_956_422),
    ("2", 242_193_529),
    ("3", 198_295_559),
    ("4", 190_214_555),
    ("5", 181_538_259),
    ("6", 170_805_979),
    ("7", 159_345_973),
    ("8", 145_138_636),
    ("9", 138_394_717),
    ("10", 133_797_422),
    ("11", 135_086_622),
    ("12", 133_275_309),
    ("13", 114_364_328),
    ("14", 107_043_718),
    ("15", 101_991_189),
    ("16", 90_338_345),
    ("17", 83_257_441),
    ("18", 80_373_285),
    ("19", 58_617_616),
    ("20", 64_444_167),
    ("21", 46_709_983),
    ("22", 50_818_468),
    ("X", 156_040_895),
    ("Y", 57_227_415),
    ("MT", 16_569),
];

fn grch38() -> &'static [ReferenceSegment] {
    static TABLE: OnceLock<Vec<ReferenceSegment>> = OnceLock::new();
    TABLE.get_or_init(|| {
        GRCH38_COMMON
            .iter()
            .map(|(name, length)| ReferenceSegment::new(*name, *length))
            .collect()
    })
}

/// Standard segments for an assembly, matched by exact name
#[must_use]
pub fn standard_segments(assembly: &str) -> Option<&'static [ReferenceSegment]> {
    match assembly {
        GRCH38 => Some(grch38()),
        _ => None,
    }
}

/// Look up one standard segment of an assembly by exact name
#[must_use]
pub fn segment(assembly: &str, name: &str) -> Option<&'static ReferenceSegment> {
    standard_segments(assembly)?.iter().find(|s| s.name == name)
}
