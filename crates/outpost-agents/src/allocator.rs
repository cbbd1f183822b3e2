//! Capability budget allocation: sizing a new agent's loadout.
//!
//! Given a role's module catalog and a resource budget, [`allocate`] grows
//! the role's minimum loadout round by round until every module has
//! exhausted its budget share or the round limit is reached. Each module's
//! spend is capped at its own share of the total budget, so a catalog can
//! bias a role toward cargo, mobility, or actuation without hard counts.
//!
//! The allocator never fails: when a tight budget cannot grow the loadout
//! to a minimally functional size, the role's static minimum is returned
//! unchanged. It is also deterministic — same catalog, same budget, same
//! loadout — because growth follows declared catalog order and the result
//! is sorted lexically by module identifier.

use std::collections::BTreeSet;

use tracing::debug;

use outpost_types::{CapabilityModule, ModuleCatalog};

/// Maximum growth rounds per allocation. Bounds iteration so allocation
/// always terminates, and caps each module at this many appends beyond the
/// minimum loadout.
pub const ALLOCATION_ROUNDS: u32 = 5;

/// A loadout smaller than this falls back to the role's static minimum.
pub const MIN_VIABLE_MODULES: usize = 3;

/// Produce a concrete loadout for the given budget.
///
/// The running total starts at the minimum loadout's cost (modules absent
/// from the catalog cost zero). Each round walks the catalog in declared
/// order and appends one unit of every module that still fits within its
/// budget share and per-agent limit, together with its declared companion;
/// a module that no longer fits is exhausted for the rest of this
/// allocation. The finished loadout is sorted lexically so capability
/// ordering never affects downstream behavior.
pub fn allocate(
    catalog: &ModuleCatalog,
    min_loadout: &[CapabilityModule],
    budget: u32,
) -> Vec<CapabilityModule> {
    let mut loadout: Vec<CapabilityModule> = min_loadout.to_vec();
    let mut total: u32 = min_loadout
        .iter()
        .fold(0, |acc, m| acc.saturating_add(catalog.cost_of(*m)));
    let mut exhausted: BTreeSet<CapabilityModule> = BTreeSet::new();

    for _ in 0..ALLOCATION_ROUNDS {
        if exhausted.len() >= catalog.entries.len() {
            break;
        }
        for entry in &catalog.entries {
            if exhausted.contains(&entry.module) {
                continue;
            }

            let bundle_cost = entry.unit_cost.saturating_add(
                entry.companion.map_or(0, |companion| catalog.cost_of(companion)),
            );
            let share_cap = budget_share(budget, entry.budget_share_pct);
            let within_share = total
                .checked_add(bundle_cost)
                .is_some_and(|new_total| new_total <= share_cap);
            let within_limit = entry.per_agent_limit.is_none_or(|limit| {
                module_count(&loadout, entry.module) < limit
            });

            if within_share && within_limit {
                loadout.push(entry.module);
                if let Some(companion) = entry.companion {
                    loadout.push(companion);
                }
                total = total.saturating_add(bundle_cost);
            } else {
                exhausted.insert(entry.module);
            }
        }
    }

    loadout.sort_by_key(|m| m.as_str());

    if loadout.len() < MIN_VIABLE_MODULES {
        debug!(
            budget,
            modules = loadout.len(),
            "Budget too tight; falling back to minimum loadout"
        );
        let mut fallback = min_loadout.to_vec();
        fallback.sort_by_key(|m| m.as_str());
        return fallback;
    }

    loadout
}

/// The absolute spend cap for one module: `budget * share_pct / 100`.
fn budget_share(budget: u32, share_pct: u32) -> u32 {
    let cap = u64::from(budget)
        .saturating_mul(u64::from(share_pct))
        .checked_div(100)
        .unwrap_or(0);
    u32::try_from(cap).unwrap_or(u32::MAX)
}

/// Count of one module in a loadout.
fn module_count(loadout: &[CapabilityModule], module: CapabilityModule) -> u32 {
    let count = loadout.iter().filter(|m| **m == module).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::ModuleEntry;

    use super::*;

    fn full_catalog() -> ModuleCatalog {
        ModuleCatalog::new(vec![
            ModuleEntry::new(CapabilityModule::Move, 50, 30),
            ModuleEntry::new(CapabilityModule::Work, 100, 20),
            ModuleEntry::new(CapabilityModule::Carry, 50, 50),
        ])
    }

    fn minimum() -> Vec<CapabilityModule> {
        vec![
            CapabilityModule::Work,
            CapabilityModule::Carry,
            CapabilityModule::Move,
        ]
    }

    fn cost_of(catalog: &ModuleCatalog, loadout: &[CapabilityModule]) -> u32 {
        loadout
            .iter()
            .fold(0, |acc, m| acc.saturating_add(catalog.cost_of(*m)))
    }

    #[test]
    fn tight_budget_returns_minimum_fallback() {
        // Neither module alone can grow the loadout under a budget of 80,
        // so the declared minimum comes back (sorted).
        let catalog = ModuleCatalog::new(vec![
            ModuleEntry::new(CapabilityModule::Work, 100, 100),
            ModuleEntry::new(CapabilityModule::Carry, 50, 100),
        ]);
        let minimum = minimum();

        let loadout = allocate(&catalog, &minimum, 80);

        let mut expected = minimum;
        expected.sort_by_key(|m| m.as_str());
        assert_eq!(loadout, expected);
    }

    #[test]
    fn zero_budget_returns_minimum_fallback() {
        let loadout = allocate(&full_catalog(), &minimum(), 0);
        assert_eq!(loadout.len(), 3);
    }

    #[test]
    fn grown_loadout_stays_within_budget() {
        let catalog = full_catalog();
        let minimum = minimum();
        for budget in [0_u32, 80, 300, 500, 1_000, 5_000] {
            let loadout = allocate(&catalog, &minimum, budget);
            let min_cost = cost_of(&catalog, &minimum);
            let total = cost_of(&catalog, &loadout);
            // Growth beyond the minimum never exceeds the budget; the
            // minimum itself is exempt (it is the fallback floor).
            assert!(
                total <= budget.max(min_cost),
                "budget {budget}: loadout cost {total} exceeds bound"
            );
        }
    }

    #[test]
    fn allocation_is_deterministic() {
        let catalog = full_catalog();
        let minimum = minimum();
        let first = allocate(&catalog, &minimum, 800);
        let second = allocate(&catalog, &minimum, 800);
        assert_eq!(first, second);
    }

    #[test]
    fn result_is_sorted_lexically() {
        let loadout = allocate(&full_catalog(), &minimum(), 1_000);
        let mut sorted = loadout.clone();
        sorted.sort_by_key(|m| m.as_str());
        assert_eq!(loadout, sorted);
    }

    #[test]
    fn per_agent_limit_is_respected() {
        let catalog = ModuleCatalog::new(vec![
            ModuleEntry {
                module: CapabilityModule::Work,
                unit_cost: 100,
                budget_share_pct: 100,
                per_agent_limit: Some(2),
                companion: None,
            },
            ModuleEntry::new(CapabilityModule::Carry, 50, 100),
            ModuleEntry::new(CapabilityModule::Move, 50, 100),
        ]);
        let loadout = allocate(&catalog, &minimum(), 10_000);
        let works = loadout
            .iter()
            .filter(|m| **m == CapabilityModule::Work)
            .count();
        assert_eq!(works, 2);
    }

    #[test]
    fn round_limit_bounds_growth() {
        // With generous shares every module appends once per round, so no
        // module grows by more than ALLOCATION_ROUNDS beyond the minimum.
        let loadout = allocate(
            &ModuleCatalog::new(vec![
                ModuleEntry::new(CapabilityModule::Carry, 50, 100),
                ModuleEntry::new(CapabilityModule::Move, 50, 100),
                ModuleEntry::new(CapabilityModule::Work, 100, 100),
            ]),
            &minimum(),
            1_000_000,
        );
        let carries = loadout
            .iter()
            .filter(|m| **m == CapabilityModule::Carry)
            .count();
        assert_eq!(carries, 1 + ALLOCATION_ROUNDS as usize);
    }

    #[test]
    fn companion_rides_along_with_its_module() {
        let catalog = ModuleCatalog::new(vec![
            ModuleEntry {
                module: CapabilityModule::Work,
                unit_cost: 100,
                budget_share_pct: 100,
                // The minimum already carries one Work; allow one append.
                per_agent_limit: Some(2),
                companion: Some(CapabilityModule::Move),
            },
            ModuleEntry::new(CapabilityModule::Move, 50, 1),
            ModuleEntry::new(CapabilityModule::Carry, 50, 1),
        ]);
        // Budget 400: the Work bundle (100 + 50) fits its share once; the
        // standalone Move and Carry shares (4 energy) never fit.
        let loadout = allocate(&catalog, &minimum(), 400);
        let moves = loadout
            .iter()
            .filter(|m| **m == CapabilityModule::Move)
            .count();
        // One from the minimum, one riding along with the appended Work.
        assert_eq!(moves, 2);
    }
}
