//! Shared target prioritization.
//!
//! Every "pick the best target" decision in the engine — delivery
//! destinations, repair targets, withdrawal sources, turret attack
//! priority — goes through [`rank`]: a stable sort keyed first by an
//! explicit, caller-declared priority-class list and second by a
//! caller-declared metric. When candidates tie on both keys their original
//! world-query order is preserved; no further tie-break exists, and none
//! should be invented.
//!
//! Ratio metrics compare by integer cross-multiplication, never floats.

use std::cmp::Ordering;

use outpost_types::{Agent, Facility, FacilityKind, Health, Stock};

/// The secondary sort key applied after the priority-class position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Lowest raw health first.
    HealthAscending,
    /// Lowest `current / max` health ratio first.
    HealthRatioAscending,
    /// Highest stock fill ratio first.
    FillDescending,
}

/// A candidate the selector can order.
pub trait Rankable {
    /// The facility kind used against the priority-class list, if any.
    /// Candidates without a kind (agents) sort after every listed kind.
    fn priority_kind(&self) -> Option<FacilityKind>;

    /// The candidate's health pair.
    fn health(&self) -> Health;

    /// The candidate's stock, if it has one. `None` ranks as empty.
    fn stock(&self) -> Option<&Stock>;
}

impl Rankable for Facility {
    fn priority_kind(&self) -> Option<FacilityKind> {
        Some(self.kind)
    }

    fn health(&self) -> Health {
        self.health
    }

    fn stock(&self) -> Option<&Stock> {
        self.stock.as_ref()
    }
}

impl Rankable for Agent {
    fn priority_kind(&self) -> Option<FacilityKind> {
        None
    }

    fn health(&self) -> Health {
        self.health
    }

    fn stock(&self) -> Option<&Stock> {
        Some(&self.stock)
    }
}

/// Order candidates best-first.
///
/// Primary key: position in `priority`; kinds absent from the list (and
/// kind-less candidates) sort last. Secondary key: `metric`. The sort is
/// stable, so full ties retain world-query order.
pub fn rank<T: Rankable>(candidates: Vec<T>, priority: &[FacilityKind], metric: Metric) -> Vec<T> {
    let mut ranked = candidates;
    ranked.sort_by(|a, b| {
        class_position(a, priority)
            .cmp(&class_position(b, priority))
            .then_with(|| metric_cmp(a, b, metric))
    });
    ranked
}

fn class_position<T: Rankable>(candidate: &T, priority: &[FacilityKind]) -> usize {
    candidate
        .priority_kind()
        .and_then(|kind| priority.iter().position(|p| *p == kind))
        .unwrap_or(priority.len())
}

fn metric_cmp<T: Rankable>(a: &T, b: &T, metric: Metric) -> Ordering {
    match metric {
        Metric::HealthAscending => a.health().current.cmp(&b.health().current),
        Metric::HealthRatioAscending => a.health().ratio_cmp(b.health()),
        Metric::FillDescending => fill_cmp(b, a),
    }
}

/// Ascending fill-ratio comparison; callers flip arguments for descending.
fn fill_cmp<T: Rankable>(a: &T, b: &T) -> Ordering {
    let (a_used, a_cap) = fill_of(a);
    let (b_used, b_cap) = fill_of(b);
    a_used
        .saturating_mul(b_cap)
        .cmp(&b_used.saturating_mul(a_cap))
}

fn fill_of<T: Rankable>(candidate: &T) -> (u64, u64) {
    candidate.stock().map_or((0, 1), |stock| {
        (u64::from(stock.used()), u64::from(stock.capacity.max(1)))
    })
}
