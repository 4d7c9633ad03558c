// Parse tree nodes
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

//! Working nodes of the parser.
//!
//! Tokens and reduced nonterminals are both [`Node`]s stored in a
//!   [`Nodes`] pool and addressed by [`NodeId`].
//! A node is a member of at most one chain at a time through its
//!   [`Node::next`] link:
//!
//!   - the parse stack,
//!       where `next` points toward the bottom of the stack;
//!   - the children of a reduced node,
//!       where `next` points to the following sibling;
//!   - a chain of ignored tokens,
//!       where `next` points to the previously ignored token
//!       (the chain is newest-first).
//!
//! Moving a node between chains is therefore O(1) and never allocates,
//!   which is what makes shifting,
//!     reducing,
//!     and undoing either of those cheap.
//!
//! The parser inspects nothing of a node beyond its language element id,
//!   its links,
//!   and its flags;
//!     token text and spans are carried for the benefit of the caller.

use crate::{
    global,
    pool::{AllocError, Pool, PoolId},
    span::{Span, UNKNOWN_SPAN},
};
use std::ops::{Index, IndexMut};

/// Identifier of a language element (terminal or nonterminal).
pub type LangElId = global::LangElSize;

/// Identifier of a grammar production.
pub type ProdId = global::ProdSize;

/// Identifier of an automaton state.
pub type StateId = global::StateSize;

/// Opaque handle to a [`Node`] within [`Nodes`].
pub type NodeId = PoolId;

/// A token or reduced nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Language element of this node.
    pub id: LangElId,

    /// Production that produced this node,
    ///   if it is a reduced nonterminal.
    pub prod: Option<ProdId>,

    /// Matched text of a token.
    pub text: Box<[u8]>,

    pub span: Span,

    /// First child of a reduced nonterminal.
    pub child: Option<NodeId>,

    /// Link to the next node of whatever chain this node is a member of.
    ///
    /// See the [module-level documentation](self).
    pub next: Option<NodeId>,

    /// Newest-first chain of ignored tokens that preceded this token.
    pub ignore: Option<NodeId>,

    /// Automaton state entered when this node was shifted.
    pub state: StateId,

    /// This node was provided by the caller rather than scanned,
    ///   such as a fabricated token or a tree pushed into the input.
    pub artificial: bool,
}

impl Node {
    /// A token `id` with the given text.
    pub fn token(id: LangElId, text: &[u8], span: Span) -> Self {
        Self {
            id,
            prod: None,
            text: text.into(),
            span,
            child: None,
            next: None,
            ignore: None,
            state: 0,
            artificial: false,
        }
    }

    /// A token not originating from any input.
    pub fn artificial(id: LangElId, text: &[u8]) -> Self {
        Self {
            artificial: true,
            ..Self::token(id, text, UNKNOWN_SPAN)
        }
    }

    /// A nonterminal `id` produced by `prod` with children beginning at
    ///   `child`.
    pub fn reduced(
        id: LangElId,
        prod: ProdId,
        child: Option<NodeId>,
        span: Span,
    ) -> Self {
        Self {
            prod: Some(prod),
            child,
            ..Self::token(id, b"", span)
        }
    }
}

/// Pool of [`Node`]s.
#[derive(Debug, Default)]
pub struct Nodes {
    pool: Pool<Node>,
}

impl Nodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(pool: Pool<Node>) -> Self {
        Self { pool }
    }

    pub fn alloc(&mut self, node: Node) -> Result<NodeId, AllocError> {
        self.pool.alloc(node)
    }

    /// Release a single node,
    ///   not including its children or ignored tokens.
    pub fn free(&mut self, id: NodeId) -> Option<Node> {
        self.pool.free(id)
    }

    /// Release a node along with every node reachable from it through
    ///   child and ignore links.
    ///
    /// The `next` link of `id` itself is not followed,
    ///   since it belongs to whatever chain `id` is a member of.
    pub fn free_tree(&mut self, id: NodeId) {
        let mut pending = vec![id];

        while let Some(cur) = pending.pop() {
            if let Some(node) = self.pool.free(cur) {
                pending.extend(self.chain_owned(node.child));
                pending.extend(self.chain_owned(node.ignore));
            }
        }
    }

    fn chain_owned(&self, head: Option<NodeId>) -> Vec<NodeId> {
        self.chain(head).collect()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.pool.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.pool.get_mut(id)
    }

    /// Iterate over a chain of nodes linked through [`Node::next`].
    pub fn chain(&self, head: Option<NodeId>) -> Chain {
        Chain {
            nodes: self,
            cur: head,
        }
    }

    /// Children of `id` in order.
    pub fn children(&self, id: NodeId) -> Chain {
        self.chain(self[id].child)
    }

    /// Ignored tokens preceding `id` in input order.
    pub fn ignores(&self, id: NodeId) -> impl Iterator<Item = NodeId> {
        let mut chain = self.chain(self[id].ignore).collect::<Vec<_>>();
        chain.reverse();
        chain.into_iter()
    }

    /// Number of live nodes.
    pub fn live(&self) -> usize {
        self.pool.live()
    }
}

impl Index<NodeId> for Nodes {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.pool[id]
    }
}

impl IndexMut<NodeId> for Nodes {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.pool[id]
    }
}

/// Iterator over a chain of [`Node`]s.
///
/// See [`Nodes::chain`].
pub struct Chain<'a> {
    nodes: &'a Nodes,
    cur: Option<NodeId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.cur?;
        self.cur = self.nodes[cur].next;
        Some(cur)
    }
}
