// Pattern variable bindings
//
//  Copyright (C) 2014-2023 Ryan Specialty, LLC.
//
//  This file is part of retrace.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Bindings of pattern variables to parse nodes.
//!
//! Semantic actions may bind a node to a numbered variable so that later
//!   actions can retrieve it.
//! Every change returns the previous binding so that the parser can log
//!   it and restore it exactly when the change is undone.

use crate::tree::NodeId;
use fxhash::FxHashMap;

/// Identifier of a pattern variable.
pub type BindId = u32;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bindings {
    map: FxHashMap<BindId, NodeId>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: BindId) -> Option<NodeId> {
        self.map.get(&id).copied()
    }

    /// Bind `id` to `node`,
    ///   returning the previous binding.
    pub fn bind(&mut self, id: BindId, node: NodeId) -> Option<NodeId> {
        self.map.insert(id, node)
    }

    /// Restore a binding previously returned by [`Self::bind`].
    pub fn restore(&mut self, id: BindId, prev: Option<NodeId>) {
        match prev {
            Some(node) => self.map.insert(id, node),
            None => self.map.remove(&id),
        };
    }

    /// All bindings ordered by variable.
    pub fn sorted(&self) -> Vec<(BindId, NodeId)> {
        let mut all = self
            .map
            .iter()
            .map(|(id, node)| (*id, *node))
            .collect::<Vec<_>>();

        all.sort_unstable_by_key(|(id, _)| *id);
        all
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tree::{Node, Nodes};

    #[test]
    fn restore_undoes_bind() {
        let mut nodes = Nodes::new();
        let a = nodes.alloc(Node::artificial(1, b"a")).unwrap();
        let b = nodes.alloc(Node::artificial(1, b"b")).unwrap();

        let mut sut = Bindings::new();

        let prev_first = sut.bind(4, a);
        let prev_second = sut.bind(4, b);
        assert_eq!(Some(b), sut.get(4));

        sut.restore(4, prev_second);
        assert_eq!(Some(a), sut.get(4));

        sut.restore(4, prev_first);
        assert_eq!(None, sut.get(4));
        assert!(sut.is_empty());
    }

    #[test]
    fn sorted_by_variable() {
        let mut nodes = Nodes::new();
        let a = nodes.alloc(Node::artificial(1, b"a")).unwrap();

        let mut sut = Bindings::new();
        sut.bind(9, a);
        sut.bind(2, a);

        assert_eq!(vec![(2, a), (9, a)], sut.sorted());
    }
}
