// SPDX-License-Identifier: MPL-2.0

//! A term is the fundamental unit of operation of the PubGrub algorithm. It is a positive or
//! negative expression regarding a set of versions.

use std::fmt;

use crate::version::Version;
use crate::version_set::VersionSet;

/// A positive or negative expression regarding a set of versions.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Term {
    /// For example, "1.0.0 <= v < 2.0.0" is a positive expression that is true if a selected
    /// version is comprised between version 1.0.0 and version 2.0.0.
    Positive(VersionSet),
    /// The term "not v < 3.0.0" is a negative expression that is true if a selected version is
    /// >= 3.0.0, or if no version is selected at all.
    Negative(VersionSet),
}

impl Term {
    /// A term that is always true.
    pub fn any() -> Self {
        Self::Negative(VersionSet::empty())
    }

    /// A term that is never true.
    pub fn empty() -> Self {
        Self::Positive(VersionSet::empty())
    }

    /// A positive term containing exactly that version.
    pub fn exact(version: Version) -> Self {
        Self::Positive(VersionSet::singleton(version))
    }

    /// Whether this term is positive.
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive(_))
    }

    /// Negate a term. Evaluation of a negated term always returns the opposite of the evaluation
    /// of the original one.
    pub fn negate(&self) -> Self {
        match self {
            Self::Positive(set) => Self::Negative(set.clone()),
            Self::Negative(set) => Self::Positive(set.clone()),
        }
    }

    /// Evaluate a term regarding a given choice of version.
    pub fn contains(&self, v: &Version) -> bool {
        match self {
            Self::Positive(set) => set.contains(v),
            Self::Negative(set) => !set.contains(v),
        }
    }

    /// Unwrap the set contained in a positive term. Panics on a negative term.
    pub fn unwrap_positive(&self) -> &VersionSet {
        match self {
            Self::Positive(set) => set,
            Self::Negative(_) => panic!("negative term has no positive set to unwrap"),
        }
    }

    /// Intersection of two terms. Per the algebra, if at least one term is positive the
    /// intersection is positive as well.
    pub fn intersection(&self, other: &Term) -> Term {
        match (self, other) {
            (Self::Positive(r1), Self::Positive(r2)) => Self::Positive(r1.intersection(r2)),
            (Self::Positive(r1), Self::Negative(r2)) => {
                Self::Positive(r1.intersection(&r2.complement()))
            }
            (Self::Negative(r1), Self::Positive(r2)) => {
                Self::Positive(r1.complement().intersection(r2))
            }
            (Self::Negative(r1), Self::Negative(r2)) => Self::Negative(r1.union(r2)),
        }
    }

    /// Union of two terms. If at least one term is negative, the union is negative as well.
    pub fn union(&self, other: &Term) -> Term {
        self.negate().intersection(&other.negate()).negate()
    }

    /// Whether this term is a subset of another: `t1` is a subset of `t2` iff `t1 ∩ t2 == t1`.
    pub fn subset_of(&self, other: &Term) -> bool {
        self == &self.intersection(other)
    }

    /// Whether a set of terms, known only through its intersection, satisfies this term.
    ///
    /// A set of terms S satisfies a term t if t must be true whenever every term in S is true,
    /// which can be expressed with set operations as `⋂ S ⊆ t`.
    pub fn satisfied_by(&self, terms_intersection: &Term) -> bool {
        terms_intersection.subset_of(self)
    }

    /// Whether a set of terms, known only through its intersection, contradicts this term.
    ///
    /// A set of terms S contradicts a term t if t must be false whenever every term in S is
    /// true, which can be expressed with set operations as `(⋂ S) ⋂ t = ∅`.
    pub fn contradicted_by(&self, terms_intersection: &Term) -> bool {
        terms_intersection.intersection(self) == Self::empty()
    }

    /// Check whether a set of terms (known only through its intersection) satisfies, contradicts,
    /// or is inconclusive for this term.
    pub fn relation_with(&self, other_terms_intersection: &Term) -> Relation {
        let full_intersection = self.intersection(other_terms_intersection);
        if &full_intersection == other_terms_intersection {
            Relation::Satisfied
        } else if full_intersection == Self::empty() {
            Relation::Contradicted
        } else {
            Relation::Inconclusive
        }
    }
}

/// A relation between a set of terms S (known only through its intersection) and a term t.
///
/// As a shorthand, we say that a term v satisfies or contradicts a term t if `{v}` satisfies or
/// contradicts it.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Relation {
    /// t must be true whenever every term in S is true.
    Satisfied,
    /// t must be false whenever every term in S is true.
    Contradicted,
    /// Neither of the above.
    Inconclusive,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive(set) => write!(f, "{}", set),
            Self::Negative(set) => write!(f, "not ( {} )", set),
        }
    }
}
