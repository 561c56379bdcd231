// SPDX-License-Identifier: MPL-2.0

//! Build a report as clear as possible as to why dependency solving failed.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::package::Package;
use crate::term::Term;
use crate::type_aliases::{Map, Set};
use crate::version::Version;
use crate::version_set::VersionSet;

/// A reporter turns a [DerivationTree] into some output, typically human-readable text.
pub trait Reporter {
    /// Output type of the report.
    type Output;

    /// Generate a report from the derivation tree describing the resolution failure, using the
    /// default formatter.
    fn report(derivation_tree: &DerivationTree) -> Self::Output;

    /// Generate a report from the derivation tree using a custom formatter.
    fn report_with_formatter(
        derivation_tree: &DerivationTree,
        formatter: &impl ReportFormatter<Output = Self::Output>,
    ) -> Self::Output;
}

/// Derivation tree resulting in the impossibility to solve the dependencies of the root package.
#[derive(Debug, Clone)]
pub enum DerivationTree {
    /// An incompatibility that is not derived from others; it has its own reason.
    External(External),
    /// An incompatibility derived from two others.
    Derived(Derived),
}

/// Incompatibilities that are not derived from others: they have their own reason.
#[derive(Debug, Clone)]
pub enum External {
    /// The initial incompatibility aiming at picking the root package for the first decision.
    NotRoot(Package, Version),
    /// There are no versions in the given set for this package.
    NoVersions(Package, VersionSet),
    /// Incompatibility coming from the dependencies of a given package.
    FromDependencyOf(Package, Version, Package, VersionSet),
}

/// An incompatibility derived from two others.
#[derive(Debug, Clone)]
pub struct Derived {
    /// Terms of the incompatibility.
    pub terms: Map<Package, Term>,
    /// Present if this incompatibility occurs multiple times in the derivation tree: carries a
    /// unique id shared across occurrences, so a reporter can explain it once and refer back to
    /// that explanation on later occurrences.
    pub shared_id: Option<usize>,
    /// First cause.
    pub cause1: Box<DerivationTree>,
    /// Second cause.
    pub cause2: Box<DerivationTree>,
}

impl DerivationTree {
    /// Every [Package] referred to anywhere in the derivation tree.
    pub fn packages(&self) -> Set<&Package> {
        let mut packages = Set::default();
        match self {
            Self::External(external) => match external {
                External::FromDependencyOf(p, _, p2, _) => {
                    packages.insert(p);
                    packages.insert(p2);
                }
                External::NoVersions(p, _) | External::NotRoot(p, _) => {
                    packages.insert(p);
                }
            },
            Self::Derived(derived) => {
                packages.extend(derived.terms.keys());
                packages.extend(derived.cause1.packages());
                packages.extend(derived.cause2.packages());
            }
        }
        packages
    }

    /// Merge [NoVersions](External::NoVersions) external incompatibilities with the other cause
    /// they are paired with in a derived incompatibility; tidies up the generated report when the
    /// dependency provider is known not to have had access to every version (e.g. offline mode).
    pub fn collapse_no_versions(&mut self) {
        match self {
            DerivationTree::External(_) => {}
            DerivationTree::Derived(derived) => {
                match (derived.cause1.deref_mut(), derived.cause2.deref_mut()) {
                    (DerivationTree::External(External::NoVersions(p, r)), ref mut cause2) => {
                        cause2.collapse_no_versions();
                        *self = cause2
                            .clone()
                            .merge_no_versions(p.to_owned(), r.to_owned())
                            .unwrap_or_else(|| self.to_owned());
                    }
                    (ref mut cause1, DerivationTree::External(External::NoVersions(p, r))) => {
                        cause1.collapse_no_versions();
                        *self = cause1
                            .clone()
                            .merge_no_versions(p.to_owned(), r.to_owned())
                            .unwrap_or_else(|| self.to_owned());
                    }
                    _ => {
                        derived.cause1.collapse_no_versions();
                        derived.cause2.collapse_no_versions();
                    }
                }
            }
        }
    }

    fn merge_no_versions(self, package: Package, set: VersionSet) -> Option<Self> {
        match self {
            DerivationTree::Derived(_) => Some(self),
            DerivationTree::External(External::NotRoot(_, _)) => {
                panic!("a NoVersions cannot be merged with a NotRoot")
            }
            DerivationTree::External(External::NoVersions(_, r)) => Some(DerivationTree::External(
                External::NoVersions(package, set.union(&r)),
            )),
            DerivationTree::External(External::FromDependencyOf(p1, v1, p2, r2)) => {
                if p1 == package {
                    // `package`'s own exact version cannot be unioned with a version set; the
                    // no-versions cause must instead be about the dependency side.
                    Some(DerivationTree::External(External::FromDependencyOf(
                        p1, v1, p2, r2,
                    )))
                } else {
                    Some(DerivationTree::External(External::FromDependencyOf(
                        p1,
                        v1,
                        p2,
                        r2.union(&set),
                    )))
                }
            }
        }
    }
}

impl fmt::Display for External {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRoot(package, version) => {
                write!(f, "we are solving dependencies of {} {}", package, version)
            }
            Self::NoVersions(package, set) => {
                if set == &VersionSet::full() {
                    write!(f, "there is no available version for {}", package)
                } else {
                    write!(f, "there is no version of {} in {}", package, set)
                }
            }
            Self::FromDependencyOf(p, version, dep, dep_set) => {
                if dep_set == &VersionSet::full() {
                    write!(f, "{} {} depends on {}", p, version, dep)
                } else {
                    write!(f, "{} {} depends on {} {}", p, version, dep, dep_set)
                }
            }
        }
    }
}

/// Formats the pieces of a report's output.
pub trait ReportFormatter {
    /// Output type of the report.
    type Output;

    /// Format an [External] incompatibility.
    fn format_external(&self, external: &External) -> Self::Output;

    /// Format the terms of an incompatibility.
    fn format_terms(&self, terms: &Map<Package, Term>) -> Self::Output;

    /// Simplest case: combine two external incompatibilities.
    fn explain_both_external(
        &self,
        external1: &External,
        external2: &External,
        current_terms: &Map<Package, Term>,
    ) -> Self::Output;

    /// Both causes have already been explained, so refer to them by their line refs.
    fn explain_both_ref(
        &self,
        ref_id1: usize,
        derived1: &Derived,
        ref_id2: usize,
        derived2: &Derived,
        current_terms: &Map<Package, Term>,
    ) -> Self::Output;

    /// One cause is derived (already explained, so referenced in one line), the other is a
    /// one-line external cause, concluding with the current incompatibility.
    fn explain_ref_and_external(
        &self,
        ref_id: usize,
        derived: &Derived,
        external: &External,
        current_terms: &Map<Package, Term>,
    ) -> Self::Output;

    /// Add an external cause to the chain of explanations.
    fn and_explain_external(
        &self,
        external: &External,
        current_terms: &Map<Package, Term>,
    ) -> Self::Output;

    /// Add an already explained incompatibility to the chain of explanations.
    fn and_explain_ref(
        &self,
        ref_id: usize,
        derived: &Derived,
        current_terms: &Map<Package, Term>,
    ) -> Self::Output;

    /// Add an already explained incompatibility and an external cause to the chain.
    fn and_explain_prior_and_external(
        &self,
        prior_external: &External,
        external: &External,
        current_terms: &Map<Package, Term>,
    ) -> Self::Output;
}

/// Default formatter for [DefaultStringReporter].
#[derive(Default, Debug)]
pub struct DefaultStringReportFormatter;

impl ReportFormatter for DefaultStringReportFormatter {
    type Output = String;

    fn format_external(&self, external: &External) -> String {
        external.to_string()
    }

    fn format_terms(&self, terms: &Map<Package, Term>) -> Self::Output {
        let terms_vec: Vec<_> = terms.iter().collect();
        match terms_vec.as_slice() {
            [] => "version solving failed".into(),
            [(package, Term::Positive(set))] => format!("{} {} is forbidden", package, set),
            [(package, Term::Negative(set))] => format!("{} {} is mandatory", package, set),
            [(p1, Term::Positive(r1)), (p2, Term::Negative(r2))] => match r1.as_singleton() {
                Some(v1) => self.format_external(&External::FromDependencyOf(
                    (*p1).clone(),
                    *v1,
                    (*p2).clone(),
                    r2.clone(),
                )),
                None => format!("{} {}, not {} {}", p1, r1, p2, r2),
            },
            [(p1, Term::Negative(r1)), (p2, Term::Positive(r2))] => match r2.as_singleton() {
                Some(v2) => self.format_external(&External::FromDependencyOf(
                    (*p2).clone(),
                    *v2,
                    (*p1).clone(),
                    r1.clone(),
                )),
                None => format!("{} {}, not {} {}", p2, r2, p1, r1),
            },
            slice => {
                let str_terms: Vec<_> = slice.iter().map(|(p, t)| format!("{} {}", p, t)).collect();
                str_terms.join(", ") + " are incompatible"
            }
        }
    }

    fn explain_both_external(
        &self,
        external1: &External,
        external2: &External,
        current_terms: &Map<Package, Term>,
    ) -> String {
        format!(
            "Because {} and {}, {}.",
            self.format_external(external1),
            self.format_external(external2),
            self.format_terms(current_terms)
        )
    }

    fn explain_both_ref(
        &self,
        ref_id1: usize,
        derived1: &Derived,
        ref_id2: usize,
        derived2: &Derived,
        current_terms: &Map<Package, Term>,
    ) -> String {
        format!(
            "Because {} ({}) and {} ({}), {}.",
            self.format_terms(&derived1.terms),
            ref_id1,
            self.format_terms(&derived2.terms),
            ref_id2,
            self.format_terms(current_terms)
        )
    }

    fn explain_ref_and_external(
        &self,
        ref_id: usize,
        derived: &Derived,
        external: &External,
        current_terms: &Map<Package, Term>,
    ) -> String {
        format!(
            "Because {} ({}) and {}, {}.",
            self.format_terms(&derived.terms),
            ref_id,
            self.format_external(external),
            self.format_terms(current_terms)
        )
    }

    fn and_explain_external(
        &self,
        external: &External,
        current_terms: &Map<Package, Term>,
    ) -> String {
        format!(
            "And because {}, {}.",
            self.format_external(external),
            self.format_terms(current_terms)
        )
    }

    fn and_explain_ref(
        &self,
        ref_id: usize,
        derived: &Derived,
        current_terms: &Map<Package, Term>,
    ) -> String {
        format!(
            "And because {} ({}), {}.",
            self.format_terms(&derived.terms),
            ref_id,
            self.format_terms(current_terms)
        )
    }

    fn and_explain_prior_and_external(
        &self,
        prior_external: &External,
        external: &External,
        current_terms: &Map<Package, Term>,
    ) -> String {
        format!(
            "And because {} and {}, {}.",
            self.format_external(prior_external),
            self.format_external(external),
            self.format_terms(current_terms)
        )
    }
}

/// Default reporter, generating an explanation as a [String].
pub struct DefaultStringReporter {
    ref_count: usize,
    shared_with_ref: Map<usize, usize>,
    lines: Vec<String>,
}

impl DefaultStringReporter {
    fn new() -> Self {
        Self {
            ref_count: 0,
            shared_with_ref: Map::default(),
            lines: Vec::new(),
        }
    }

    /// Render the terms of an incompatibility the way [DefaultStringReportFormatter] would, for
    /// callers (such as [Incompatibility](crate::internal::incompatibility::Incompatibility)'s
    /// `Display` impl) that want a one-off rendering without a full report.
    pub fn string_terms(terms: &Map<Package, Term>) -> String {
        DefaultStringReportFormatter.format_terms(terms)
    }

    fn build_recursive(&mut self, derived: &Derived, formatter: &impl ReportFormatter<Output = String>) {
        self.build_recursive_helper(derived, formatter);
        if let Some(id) = derived.shared_id {
            if self.shared_with_ref.get(&id).is_none() {
                self.add_line_ref();
                self.shared_with_ref.insert(id, self.ref_count);
            }
        }
    }

    fn build_recursive_helper(
        &mut self,
        current: &Derived,
        formatter: &impl ReportFormatter<Output = String>,
    ) {
        match (current.cause1.deref(), current.cause2.deref()) {
            (DerivationTree::External(external1), DerivationTree::External(external2)) => {
                self.lines
                    .push(formatter.explain_both_external(external1, external2, &current.terms));
            }
            (DerivationTree::Derived(derived), DerivationTree::External(external)) => {
                self.report_one_each(derived, external, &current.terms, formatter);
            }
            (DerivationTree::External(external), DerivationTree::Derived(derived)) => {
                self.report_one_each(derived, external, &current.terms, formatter);
            }
            (DerivationTree::Derived(derived1), DerivationTree::Derived(derived2)) => {
                match (
                    self.line_ref_of(derived1.shared_id),
                    self.line_ref_of(derived2.shared_id),
                ) {
                    (Some(ref1), Some(ref2)) => self.lines.push(formatter.explain_both_ref(
                        ref1,
                        derived1,
                        ref2,
                        derived2,
                        &current.terms,
                    )),
                    (Some(ref1), None) => {
                        self.build_recursive(derived2, formatter);
                        self.lines
                            .push(formatter.and_explain_ref(ref1, derived1, &current.terms));
                    }
                    (None, Some(ref2)) => {
                        self.build_recursive(derived1, formatter);
                        self.lines
                            .push(formatter.and_explain_ref(ref2, derived2, &current.terms));
                    }
                    (None, None) => {
                        self.build_recursive(derived1, formatter);
                        if derived1.shared_id.is_some() {
                            self.lines.push(String::new());
                            self.build_recursive(current, formatter);
                        } else {
                            self.add_line_ref();
                            let ref1 = self.ref_count;
                            self.lines.push(String::new());
                            self.build_recursive(derived2, formatter);
                            self.lines
                                .push(formatter.and_explain_ref(ref1, derived1, &current.terms));
                        }
                    }
                }
            }
        }
    }

    fn report_one_each(
        &mut self,
        derived: &Derived,
        external: &External,
        current_terms: &Map<Package, Term>,
        formatter: &impl ReportFormatter<Output = String>,
    ) {
        match self.line_ref_of(derived.shared_id) {
            Some(ref_id) => self.lines.push(formatter.explain_ref_and_external(
                ref_id,
                derived,
                external,
                current_terms,
            )),
            None => self.report_recurse_one_each(derived, external, current_terms, formatter),
        }
    }

    fn report_recurse_one_each(
        &mut self,
        derived: &Derived,
        external: &External,
        current_terms: &Map<Package, Term>,
        formatter: &impl ReportFormatter<Output = String>,
    ) {
        match (derived.cause1.deref(), derived.cause2.deref()) {
            (DerivationTree::Derived(prior_derived), DerivationTree::External(prior_external)) => {
                self.build_recursive(prior_derived, formatter);
                self.lines.push(formatter.and_explain_prior_and_external(
                    prior_external,
                    external,
                    current_terms,
                ));
            }
            (DerivationTree::External(prior_external), DerivationTree::Derived(prior_derived)) => {
                self.build_recursive(prior_derived, formatter);
                self.lines.push(formatter.and_explain_prior_and_external(
                    prior_external,
                    external,
                    current_terms,
                ));
            }
            _ => {
                self.build_recursive(derived, formatter);
                self.lines
                    .push(formatter.and_explain_external(external, current_terms));
            }
        }
    }

    fn add_line_ref(&mut self) {
        self.ref_count += 1;
        if let Some(line) = self.lines.last_mut() {
            *line = format!("{} ({})", line, self.ref_count);
        }
    }

    fn line_ref_of(&self, shared_id: Option<usize>) -> Option<usize> {
        shared_id.and_then(|id| self.shared_with_ref.get(&id).cloned())
    }
}

impl Reporter for DefaultStringReporter {
    type Output = String;

    fn report(derivation_tree: &DerivationTree) -> Self::Output {
        let formatter = DefaultStringReportFormatter;
        match derivation_tree {
            DerivationTree::External(external) => formatter.format_external(external),
            DerivationTree::Derived(derived) => {
                let mut reporter = Self::new();
                reporter.build_recursive(derived, &formatter);
                reporter.lines.join("\n")
            }
        }
    }

    fn report_with_formatter(
        derivation_tree: &DerivationTree,
        formatter: &impl ReportFormatter<Output = Self::Output>,
    ) -> Self::Output {
        match derivation_tree {
            DerivationTree::External(external) => formatter.format_external(external),
            DerivationTree::Derived(derived) => {
                let mut reporter = Self::new();
                reporter.build_recursive(derived, formatter);
                reporter.lines.join("\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::arena::Arena;
    use crate::internal::incompatibility::Incompatibility;

    #[test]
    fn reports_a_single_external_incompatibility() {
        let incompat = Incompatibility::no_versions(Package::new("foo"), VersionSet::full());
        let mut arena: Arena<Incompatibility> = Arena::new();
        let id = arena.alloc(incompat.clone());
        let tree = incompat.build_derivation_tree(id, &Set::default(), &arena);
        let report = DefaultStringReporter::report(&tree);
        assert_eq!(report, "there is no available version for foo");
    }

    #[test]
    fn formats_terms_of_a_derived_incompatibility() {
        let foo = Package::new("foo");
        let bar = Package::new("bar");
        let mut terms = Map::default();
        terms.insert(foo.clone(), Term::exact(Version::new(1, 0, 0)));
        terms.insert(
            bar.clone(),
            Term::Negative(crate::version_set::parse_constraint(">=2.0.0").unwrap()),
        );
        let rendered = DefaultStringReportFormatter.format_terms(&terms);
        assert_eq!(rendered, "foo 1.0.0 depends on bar >=2.0.0");
    }
}
