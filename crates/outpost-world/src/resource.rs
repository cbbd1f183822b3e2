//! Regeneration and harvest logic for resource nodes.
//!
//! Each [`ResourceNode`] has a current `available` quantity, a
//! `regen_per_tick` rate, and a `capacity` ceiling. Regeneration runs when
//! the host starts a new tick and is capped so that `available` never
//! exceeds `capacity`. Harvesting is clamped: over-subscribed nodes simply
//! run dry and later callers take nothing.

use outpost_types::ResourceNode;

/// Apply one tick of regeneration to a node.
///
/// Returns the number of units actually restored (zero when the node is
/// already at capacity).
pub const fn regenerate(node: &mut ResourceNode) -> u32 {
    if node.available >= node.capacity {
        return 0;
    }

    let headroom = node.capacity.saturating_sub(node.available);
    let added = if node.regen_per_tick < headroom {
        node.regen_per_tick
    } else {
        headroom
    };
    node.available = node.available.saturating_add(added);
    added
}

/// Deduct up to `requested` units from a node, returning the amount
/// actually taken.
///
/// If the node holds fewer units than requested, the entire remainder is
/// taken; an empty node yields zero.
pub const fn harvest(node: &mut ResourceNode, requested: u32) -> u32 {
    let taken = if requested < node.available {
        requested
    } else {
        node.available
    };
    node.available = node.available.saturating_sub(taken);
    taken
}
