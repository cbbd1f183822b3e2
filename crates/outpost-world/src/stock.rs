//! Checked stock (inventory) operations.
//!
//! Every stock in the world — agent cargo, facility stores, the zone core's
//! sink — shares one capacity across resource kinds. This module provides
//! the mutation primitives with full checked arithmetic: no silent
//! overflows, no panics. Read-only accounting lives on
//! [`Stock`] itself.

use outpost_types::{ResourceKind, Stock};

use crate::error::WorldError;

/// Add `amount` units of `resource` to the stock.
///
/// Fails if the addition would exceed the stock's capacity or overflow.
pub fn deposit(stock: &mut Stock, resource: ResourceKind, amount: u32) -> Result<(), WorldError> {
    let current_load = stock.used();

    let new_load = current_load
        .checked_add(amount)
        .ok_or(WorldError::StockOverflow {
            resource,
            attempted: amount,
            current_load,
            capacity: stock.capacity,
        })?;

    if new_load > stock.capacity {
        return Err(WorldError::StockOverflow {
            resource,
            attempted: amount,
            current_load,
            capacity: stock.capacity,
        });
    }

    let entry = stock.held.entry(resource).or_insert(0);
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| WorldError::ArithmeticOverflow {
            context: String::from("individual resource quantity overflow in deposit"),
        })?;

    Ok(())
}

/// Remove `amount` units of `resource` from the stock.
///
/// Fails if the stock does not hold enough of the resource. Removes the
/// key entirely when the quantity reaches zero.
pub fn withdraw(stock: &mut Stock, resource: ResourceKind, amount: u32) -> Result<(), WorldError> {
    let current = stock.amount_of(resource);

    if current < amount {
        return Err(WorldError::InsufficientResource {
            resource,
            requested: amount,
            available: current,
        });
    }

    let remaining = current
        .checked_sub(amount)
        .ok_or_else(|| WorldError::ArithmeticOverflow {
            context: String::from("subtraction underflow in withdraw"),
        })?;

    if remaining == 0 {
        stock.held.remove(&resource);
    } else {
        stock.held.insert(resource, remaining);
    }

    Ok(())
}

/// Move up to `requested` units of `resource` between two stocks, clamped
/// to what the source holds and what the destination can take.
///
/// Returns the quantity actually moved (possibly zero).
pub fn transfer(
    from: &mut Stock,
    to: &mut Stock,
    resource: ResourceKind,
    requested: u32,
) -> Result<u32, WorldError> {
    let moved = requested
        .min(from.amount_of(resource))
        .min(to.free_capacity());

    if moved > 0 {
        withdraw(from, resource, moved)?;
        deposit(to, resource, moved)?;
    }

    Ok(moved)
}
