//! Ordered child lists
//!
//! A parent record (a purchase) owns an unordered set of children (models,
//! accessories). Display order comes from each child's zero-based
//! `position`. At rest the positions of a parent's children are exactly
//! `0..len`, and the parent caches `max_position == len - 1` (`-1` when
//! empty) so that appending does not need to scan its siblings.
//!
//! The three mutations below only rewrite the positions they must. Each
//! record is persisted as its own file, so every sibling left untouched is
//! a file that does not need rewriting on commit.
//!
//! Storage is reached through an explicit [`ChildContext`] handed to each
//! operation. Callers are expected to serialize all mutation of a given
//! parent; nothing here locks.

use std::fmt::Debug;

use thiserror::Error;

/// A record that lives at a position within its parent's children
pub trait OrderedChild {
    /// Stable identity of the child, used to address it for removal
    type Key: Ord + Debug;

    fn key(&self) -> &Self::Key;

    fn position(&self) -> i64;

    fn set_position(&mut self, position: i64);
}

/// Storage context children are created in and deleted from
pub trait ChildContext<C> {
    /// Create a new child belonging to the parent this context serves
    fn create(&mut self) -> C;

    /// Request deletion of a child that has already been detached
    fn delete(&mut self, child: C);
}

/// Invariant violations found in a list loaded from storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("negative position {0}")]
    NegativePosition(i64),

    #[error("position {0} is used more than once")]
    DuplicatePosition(i64),

    #[error("no child at position {0}")]
    Gap(i64),

    #[error("cached max position is {cached}, expected {expected}")]
    MaxPositionMismatch { cached: i64, expected: i64 },
}

/// The children of one parent, kept in contiguous position order
#[derive(Debug, Clone)]
pub struct ChildList<C> {
    members: Vec<C>,
    max_position: i64,
}

impl<C> Default for ChildList<C> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            max_position: -1,
        }
    }
}

impl<C: OrderedChild> ChildList<C> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a list from members read out of storage
    ///
    /// No checks are made; use [`ChildList::verify`] on data that may have
    /// been edited by hand.
    pub fn from_members(members: Vec<C>, max_position: i64) -> Self {
        Self {
            members,
            max_position,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Cached highest position, `-1` when empty
    pub fn max_position(&self) -> i64 {
        self.max_position
    }

    /// Members in storage order (not position order)
    pub fn members(&self) -> &[C] {
        &self.members
    }

    /// Members sorted by position
    pub fn ordered(&self) -> Vec<&C> {
        let mut ordered: Vec<&C> = self.members.iter().collect();
        ordered.sort_by(|a, b| {
            a.position()
                .cmp(&b.position())
                .then_with(|| a.key().cmp(b.key()))
        });
        ordered
    }

    /// Member currently at `position`
    pub fn at(&self, position: i64) -> Option<&C> {
        self.members.iter().find(|c| c.position() == position)
    }

    pub fn get(&self, key: &C::Key) -> Option<&C> {
        self.members.iter().find(|c| c.key() == key)
    }

    pub fn get_mut(&mut self, key: &C::Key) -> Option<&mut C> {
        self.members.iter_mut().find(|c| c.key() == key)
    }

    pub fn contains(&self, key: &C::Key) -> bool {
        self.get(key).is_some()
    }

    /// Append a new child after the current last one
    ///
    /// No sibling is touched.
    pub fn add(&mut self, ctx: &mut impl ChildContext<C>) -> &mut C {
        let position = self.max_position + 1;
        let mut child = ctx.create();
        child.set_position(position);
        tracing::trace!(?position, key = ?child.key(), "added child");

        self.members.push(child);
        self.max_position = position;

        let last = self.members.len() - 1;
        &mut self.members[last]
    }

    /// Detach a child, close the gap it leaves, and hand it to `ctx` for
    /// deletion
    ///
    /// # Panics
    ///
    /// Panics if `key` does not identify a member of this list.
    pub fn remove(&mut self, key: &C::Key, ctx: &mut impl ChildContext<C>) {
        let idx = match self.members.iter().position(|c| c.key() == key) {
            Some(idx) => idx,
            None => panic!("{key:?} is not a member of this list"),
        };

        let child = self.members.swap_remove(idx);
        let removed = child.position();

        for sibling in self.members.iter_mut() {
            let position = sibling.position();
            if position > removed {
                sibling.set_position(position - 1);
            }
        }
        self.max_position -= 1;

        tracing::trace!(position = removed, key = ?child.key(), "removed child");
        ctx.delete(child);
    }

    /// Move the child at `origin` to `destination`, shifting only the
    /// children in between
    ///
    /// Moving forward leaves the child after the one that was at
    /// `destination`; moving backward leaves it before.
    ///
    /// # Panics
    ///
    /// Panics if either position is outside `0..=max_position` or no child
    /// sits at `origin`.
    pub fn move_at(&mut self, origin: i64, destination: i64) {
        if origin == destination {
            return;
        }
        assert!(
            (0..=self.max_position).contains(&origin)
                && (0..=self.max_position).contains(&destination),
            "move from {origin} to {destination} outside 0..={}",
            self.max_position
        );

        let moved = match self.members.iter().position(|c| c.position() == origin) {
            Some(idx) => idx,
            None => panic!("no child at position {origin}"),
        };

        for (idx, sibling) in self.members.iter_mut().enumerate() {
            if idx == moved {
                continue;
            }
            let position = sibling.position();
            if destination > origin && position > origin && position <= destination {
                sibling.set_position(position - 1);
            } else if destination < origin && position >= destination && position < origin {
                sibling.set_position(position + 1);
            }
        }
        self.members[moved].set_position(destination);

        tracing::trace!(origin, destination, "moved child");
    }

    /// Check the list invariants without panicking
    pub fn verify(&self) -> Result<(), OrderingError> {
        let mut positions: Vec<i64> = self.members.iter().map(|c| c.position()).collect();
        positions.sort_unstable();

        if let Some(&first) = positions.first() {
            if first < 0 {
                return Err(OrderingError::NegativePosition(first));
            }
        }

        if let Some(pair) = positions.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(OrderingError::DuplicatePosition(pair[0]));
        }

        for (expected, &position) in (0i64..).zip(positions.iter()) {
            if position != expected {
                return Err(OrderingError::Gap(expected));
            }
        }

        let expected = self.members.len() as i64 - 1;
        if self.max_position != expected {
            return Err(OrderingError::MaxPositionMismatch {
                cached: self.max_position,
                expected,
            });
        }

        Ok(())
    }

    /// Restore the invariants, keeping the current relative order
    ///
    /// Ties are broken by key. Returns the number of children whose
    /// position was rewritten.
    pub fn renumber(&mut self) -> usize {
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&self.members[a], &self.members[b]);
            a.position()
                .cmp(&b.position())
                .then_with(|| a.key().cmp(b.key()))
        });

        let mut changed = 0;
        for (rank, idx) in (0i64..).zip(order) {
            let child = &mut self.members[idx];
            if child.position() != rank {
                child.set_position(rank);
                changed += 1;
            }
        }
        self.max_position = self.members.len() as i64 - 1;

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Child {
        id: u32,
        position: i64,
        writes: u32,
    }

    impl OrderedChild for Child {
        type Key = u32;

        fn key(&self) -> &u32 {
            &self.id
        }

        fn position(&self) -> i64 {
            self.position
        }

        fn set_position(&mut self, position: i64) {
            self.position = position;
            self.writes += 1;
        }
    }

    #[derive(Default)]
    struct Context {
        next_id: u32,
        deleted: Vec<u32>,
    }

    impl ChildContext<Child> for Context {
        fn create(&mut self) -> Child {
            let id = self.next_id;
            self.next_id += 1;
            Child {
                id,
                position: -1,
                writes: 0,
            }
        }

        fn delete(&mut self, child: Child) {
            self.deleted.push(child.id);
        }
    }

    fn list_of(count: usize, ctx: &mut Context) -> ChildList<Child> {
        let mut list: ChildList<Child> = ChildList::new();
        for _ in 0..count {
            list.add(ctx);
        }
        for child in list.members.iter_mut() {
            child.writes = 0;
        }
        list
    }

    fn position_of(list: &ChildList<Child>, id: u32) -> i64 {
        list.get(&id).map(|c| c.position).unwrap()
    }

    fn writes_of(list: &ChildList<Child>, id: u32) -> u32 {
        list.get(&id).map(|c| c.writes).unwrap()
    }

    #[test]
    fn test_add_to_empty() {
        let mut ctx = Context::default();
        let mut list: ChildList<Child> = ChildList::new();
        assert_eq!(list.max_position(), -1);

        let first = list.add(&mut ctx).id;
        assert_eq!(position_of(&list, first), 0);
        assert_eq!(list.max_position(), 0);

        let second = list.add(&mut ctx).id;
        assert_eq!(position_of(&list, second), 1);
        assert_eq!(position_of(&list, first), 0);
        assert_eq!(writes_of(&list, first), 1);
        assert_eq!(list.max_position(), 1);
        assert!(list.verify().is_ok());
    }

    #[test]
    fn test_remove_only_child() {
        let mut ctx = Context::default();
        let mut list = list_of(1, &mut ctx);

        list.remove(&0, &mut ctx);

        assert!(list.is_empty());
        assert_eq!(list.max_position(), -1);
        assert_eq!(ctx.deleted, vec![0]);
        assert!(list.verify().is_ok());
    }

    #[test]
    fn test_remove_first_of_three() {
        let mut ctx = Context::default();
        let mut list = list_of(3, &mut ctx);

        list.remove(&0, &mut ctx);

        assert_eq!(position_of(&list, 1), 0);
        assert_eq!(position_of(&list, 2), 1);
        assert_eq!(list.max_position(), 1);
        assert!(!list.contains(&0));
        assert!(list.verify().is_ok());
    }

    #[test]
    fn test_remove_leaves_earlier_siblings_alone() {
        let mut ctx = Context::default();
        let mut list = list_of(5, &mut ctx);

        list.remove(&2, &mut ctx);

        assert_eq!(writes_of(&list, 0), 0);
        assert_eq!(writes_of(&list, 1), 0);
        assert_eq!(position_of(&list, 3), 2);
        assert_eq!(position_of(&list, 4), 3);
    }

    #[test]
    #[should_panic(expected = "not a member")]
    fn test_remove_non_member_panics() {
        let mut ctx = Context::default();
        let mut list = list_of(2, &mut ctx);
        list.remove(&42, &mut ctx);
    }

    #[test]
    fn test_move_backward() {
        let mut ctx = Context::default();
        let mut list = list_of(6, &mut ctx);

        list.move_at(4, 2);

        assert_eq!(position_of(&list, 4), 2);
        assert_eq!(position_of(&list, 2), 3);
        assert_eq!(position_of(&list, 3), 4);
        assert_eq!(position_of(&list, 0), 0);
        assert_eq!(position_of(&list, 1), 1);
        assert_eq!(position_of(&list, 5), 5);
        for untouched in [0, 1, 5] {
            assert_eq!(writes_of(&list, untouched), 0);
        }
        assert!(list.verify().is_ok());
    }

    #[test]
    fn test_move_forward() {
        let mut ctx = Context::default();
        let mut list = list_of(6, &mut ctx);

        list.move_at(1, 3);

        assert_eq!(position_of(&list, 1), 3);
        assert_eq!(position_of(&list, 2), 1);
        assert_eq!(position_of(&list, 3), 2);
        assert_eq!(position_of(&list, 0), 0);
        assert_eq!(position_of(&list, 4), 4);
        assert_eq!(position_of(&list, 5), 5);
        for untouched in [0, 4, 5] {
            assert_eq!(writes_of(&list, untouched), 0);
        }
        assert!(list.verify().is_ok());
    }

    #[test]
    fn test_move_same_position_is_noop() {
        let mut ctx = Context::default();
        let mut list = list_of(3, &mut ctx);

        list.move_at(1, 1);

        assert!(list.members.iter().all(|c| c.writes == 0));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_move_out_of_range_panics() {
        let mut ctx = Context::default();
        let mut list = list_of(3, &mut ctx);
        list.move_at(0, 3);
    }

    #[test]
    fn test_ordered_view() {
        let mut ctx = Context::default();
        let mut list = list_of(4, &mut ctx);
        list.move_at(3, 0);

        let ids: Vec<u32> = list.ordered().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 0, 1, 2]);
        assert_eq!(list.at(0).map(|c| c.id), Some(3));
    }

    #[test]
    fn test_verify_reports_problems() {
        let child = |id, position| Child {
            id,
            position,
            writes: 0,
        };

        let list = ChildList::from_members(vec![child(0, 0), child(1, 0)], 1);
        assert_eq!(list.verify(), Err(OrderingError::DuplicatePosition(0)));

        let list = ChildList::from_members(vec![child(0, 0), child(1, 2)], 1);
        assert_eq!(list.verify(), Err(OrderingError::Gap(1)));

        let list = ChildList::from_members(vec![child(0, -1)], 0);
        assert_eq!(list.verify(), Err(OrderingError::NegativePosition(-1)));

        let list = ChildList::from_members(vec![child(0, 0), child(1, 1)], 4);
        assert_eq!(
            list.verify(),
            Err(OrderingError::MaxPositionMismatch {
                cached: 4,
                expected: 1
            })
        );

        let list: ChildList<Child> = ChildList::from_members(vec![], -1);
        assert!(list.verify().is_ok());
    }

    #[test]
    fn test_renumber_repairs_and_keeps_order() {
        let child = |id, position| Child {
            id,
            position,
            writes: 0,
        };
        let mut list =
            ChildList::from_members(vec![child(7, 10), child(3, 2), child(5, 2), child(1, 0)], 9);

        let changed = list.renumber();

        let ids: Vec<u32> = list.ordered().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3, 5, 7]);
        assert_eq!(changed, 2);
        assert_eq!(writes_of(&list, 1), 0);
        assert_eq!(writes_of(&list, 5), 0);
        assert_eq!(list.max_position(), 3);
        assert!(list.verify().is_ok());
    }
}
