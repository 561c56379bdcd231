// SPDX-License-Identifier: MPL-2.0

//! Sets of versions, expressed as unions of half-open intervals, and the compound constraint
//! strings (`>=1.0.0,<2.0.0`) that denote them.

use std::fmt;
use std::str::FromStr;

use version_ranges::Ranges;

use crate::error::ConstraintParseError;
use crate::version::Version;

/// A set of [Version]s, represented as a union of half-open intervals.
///
/// This is a type alias over the generic [Ranges] interval algebra in the `version-ranges`
/// workspace member, specialized to the concrete [Version] type used throughout this crate.
pub type VersionSet = Ranges<Version>;

/// The set of versions at-or-above `v` (or strictly above, unless `inclusive`).
pub fn above(v: Version, inclusive: bool) -> VersionSet {
    if inclusive {
        VersionSet::higher_than(v)
    } else {
        VersionSet::strictly_higher_than(v)
    }
}

/// The set of versions at-or-below `v` (or strictly below, unless `inclusive`).
pub fn below(v: Version, inclusive: bool) -> VersionSet {
    if inclusive {
        VersionSet::lower_than(v)
    } else {
        VersionSet::strictly_lower_than(v)
    }
}

/// Parse a single constraint atom: `*`, `==1.2.3`, `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`, or a
/// bare `1.2.3` meaning exact equality.
fn parse_atom(atom: &str) -> Result<VersionSet, ConstraintParseError> {
    let atom = atom.trim();
    if atom == "*" {
        return Ok(VersionSet::full());
    }
    for op in [">=", "<=", "==", ">", "<"] {
        if let Some(rest) = atom.strip_prefix(op) {
            let version: Version = rest.trim().parse()?;
            return Ok(match op {
                ">=" => above(version, true),
                ">" => above(version, false),
                "<=" => below(version, true),
                "<" => below(version, false),
                "==" => VersionSet::singleton(version),
                _ => unreachable!(),
            });
        }
    }
    let version: Version = atom
        .parse()
        .map_err(|_| ConstraintParseError::InvalidAtom(atom.to_string()))?;
    Ok(VersionSet::singleton(version))
}

/// Parse a compound, comma-separated constraint string (e.g. `>=1.0.0,<2.0.0`) into the
/// [VersionSet] it denotes: the intersection of every comma-separated atom.
pub fn parse_constraint(s: &str) -> Result<VersionSet, ConstraintParseError> {
    let s = s.trim();
    if s.is_empty() || s == "*" {
        return Ok(VersionSet::full());
    }
    let mut set = VersionSet::full();
    for atom in s.split(',') {
        set = set.intersection(&parse_atom(atom)?);
    }
    Ok(set)
}

/// A `FromStr` wrapper around [parse_constraint], for call sites that want to `.parse()` a
/// constraint string directly.
pub struct Constraint(pub VersionSet);

impl FromStr for Constraint {
    type Err = ConstraintParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_constraint(s).map(Constraint)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wildcard() {
        assert_eq!(parse_constraint("*").unwrap(), VersionSet::full());
        assert_eq!(parse_constraint("").unwrap(), VersionSet::full());
    }

    #[test]
    fn parses_simple_atoms() {
        let v1 = Version::new(1, 0, 0);
        assert_eq!(
            parse_constraint("==1.0.0").unwrap(),
            VersionSet::singleton(v1)
        );
        assert_eq!(parse_constraint("1.0.0").unwrap(), VersionSet::singleton(v1));
        assert!(parse_constraint(">=1.0.0").unwrap().contains(&v1));
        assert!(!parse_constraint(">1.0.0").unwrap().contains(&v1));
        assert!(parse_constraint("<=1.0.0").unwrap().contains(&v1));
        assert!(!parse_constraint("<1.0.0").unwrap().contains(&v1));
    }

    #[test]
    fn parses_compound_range() {
        let set = parse_constraint(">=1.0.0,<2.0.0").unwrap();
        assert!(set.contains(&Version::new(1, 0, 0)));
        assert!(set.contains(&Version::new(1, 9, 9)));
        assert!(!set.contains(&Version::new(2, 0, 0)));
        assert!(!set.contains(&Version::new(0, 9, 9)));
    }

    #[test]
    fn rejects_garbage_atoms() {
        assert!(parse_constraint(">=1.0.0,banana").is_err());
        assert!(parse_constraint("~1.0.0").is_err());
    }

    #[test]
    fn union_with_complement_is_full() {
        let set = parse_constraint(">=1.0.0,<2.0.0").unwrap();
        assert_eq!(set.union(&set.complement()), VersionSet::full());
    }

    #[test]
    fn intersection_with_complement_is_empty() {
        let set = parse_constraint(">=1.0.0,<2.0.0").unwrap();
        assert_eq!(set.intersection(&set.complement()), VersionSet::empty());
    }

    #[test]
    fn double_complement_is_identity() {
        let set = parse_constraint(">=1.0.0,<2.0.0").unwrap();
        assert_eq!(set.complement().complement(), set);
    }

    #[test]
    fn inclusive_bounds_include_the_boundary_version() {
        let v = Version::new(1, 2, 3);
        assert!(above(v, true).contains(&v));
        assert!(!above(v, false).contains(&v));
        assert!(below(v, true).contains(&v));
        assert!(!below(v, false).contains(&v));
    }
}
