#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pooled entity lifecycles and the per-frame active-set driver.
//!
//! A [`Pool`] hands out [`Pooled`] values stamped with the pool's identity and
//! insists on getting them back through the same pool. A
//! [`BehaviorCollection`] owns the active members of one category and visits
//! each of them once per frame, retiring those that report they are done.

use std::{
    fmt,
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

/// Identity of a pool, stamped onto everything it hands out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u32);

impl PoolId {
    /// Creates a new pool identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Value owned by the caller but remembering the pool it came from.
///
/// The stamp is written once by [`Pool::acquire`] and can never change, so
/// an unstamped or restamped value cannot exist.
#[derive(Debug)]
pub struct Pooled<T> {
    origin: PoolId,
    item: T,
}

impl<T> Pooled<T> {
    /// Pool that created the value and must reclaim it.
    #[must_use]
    pub const fn origin(&self) -> PoolId {
        self.origin
    }
}

impl<T> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

/// Allocator for one category of entities.
#[derive(Debug)]
pub struct Pool<T> {
    id: PoolId,
    outstanding: usize,
    _items: PhantomData<fn() -> T>,
}

impl<T> Pool<T> {
    /// Creates an empty pool with the provided identity.
    #[must_use]
    pub const fn new(id: PoolId) -> Self {
        Self {
            id,
            outstanding: 0,
            _items: PhantomData,
        }
    }

    /// Identity stamped onto every value this pool hands out.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Number of values handed out and not yet reclaimed.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Stamps `item` with this pool and transfers it to the caller.
    pub fn acquire(&mut self, item: T) -> Pooled<T> {
        self.outstanding += 1;
        Pooled {
            origin: self.id,
            item,
        }
    }

    /// Takes back and destroys a value created by this pool.
    ///
    /// # Panics
    ///
    /// Panics when the value was stamped by another pool.
    pub fn reclaim(&mut self, pooled: Pooled<T>) {
        assert_eq!(
            pooled.origin, self.id,
            "wrong pool reclaimed: {} handed to {}",
            pooled.origin, self.id
        );
        self.outstanding = self.outstanding.saturating_sub(1);
        drop(pooled);
    }
}

/// Capability shared by everything driven by a [`BehaviorCollection`].
pub trait GameBehavior<C: ?Sized> {
    /// Advances the member by one frame; `false` asks for its removal.
    fn game_update(&mut self, context: &mut C) -> bool;
}

impl<T, C> GameBehavior<C> for Pooled<T>
where
    T: GameBehavior<C>,
    C: ?Sized,
{
    fn game_update(&mut self, context: &mut C) -> bool {
        self.item.game_update(context)
    }
}

/// Unordered active set updated once per frame.
///
/// Removal swaps the last member into the vacated slot, so relative order is
/// not preserved. Insertion requires `&mut self`, which a running pass holds,
/// so members spawned during a pass are necessarily added afterwards.
#[derive(Debug)]
pub struct BehaviorCollection<T> {
    behaviors: Vec<T>,
}

impl<T> Default for BehaviorCollection<T> {
    fn default() -> Self {
        Self {
            behaviors: Vec::new(),
        }
    }
}

impl<T> BehaviorCollection<T> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member that will be visited starting with the next pass.
    pub fn add(&mut self, behavior: T) {
        self.behaviors.push(behavior);
    }

    /// Reports whether the collection has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Member stored in the provided slot. Slots are stable between passes.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.behaviors.get(slot)
    }

    /// Mutable member stored in the provided slot.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.behaviors.get_mut(slot)
    }

    /// Iterator over the members in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.behaviors.iter()
    }

    /// Mutable iterator over the members in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.behaviors.iter_mut()
    }

    /// Visits every member once, handing finished members to `retire`.
    pub fn game_update<C, R>(&mut self, context: &mut C, mut retire: R)
    where
        T: GameBehavior<C>,
        C: ?Sized,
        R: FnMut(T),
    {
        let mut index = 0;
        while index < self.behaviors.len() {
            if self.behaviors[index].game_update(context) {
                index += 1;
            } else {
                retire(self.behaviors.swap_remove(index));
            }
        }
    }

    /// Removes every member, handing each to `retire`.
    pub fn clear<R>(&mut self, retire: R)
    where
        R: FnMut(T),
    {
        self.behaviors.drain(..).for_each(retire);
    }
}
