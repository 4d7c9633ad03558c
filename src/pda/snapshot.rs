// Structural snapshots of a parser run
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

//! Structural snapshots of a [`PdaRun`].
//!
//! A [`Snapshot`] captures everything that undo must restore,
//!   with trees expanded into [`TreeShape`]s so that two snapshots compare
//!   equal whenever the runs are observably equivalent,
//!     regardless of which pool slots happen to hold their nodes.

use super::{bind::BindId, run::PdaRun, trace::ParserTrace};
use crate::{
    input::Unit,
    span::{Position, Span},
    tree::{LangElId, NodeId, Nodes, ProdId, StateId},
};

/// A node and everything beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeShape {
    pub id: LangElId,
    pub prod: Option<ProdId>,
    pub text: Box<[u8]>,
    pub span: Span,
    pub state: StateId,
    pub artificial: bool,
    pub children: Vec<TreeShape>,

    /// Ignored tokens in input order.
    pub ignore: Vec<TreeShape>,
}

impl TreeShape {
    pub fn of(nodes: &Nodes, id: NodeId) -> Self {
        let node = &nodes[id];

        Self {
            id: node.id,
            prod: node.prod,
            text: node.text.clone(),
            span: node.span,
            state: node.state,
            artificial: node.artificial,
            children: Self::all(nodes, nodes.children(id)),
            ignore: Self::all(nodes, nodes.ignores(id)),
        }
    }

    fn all(nodes: &Nodes, ids: impl Iterator<Item = NodeId>) -> Vec<Self> {
        ids.map(|id| Self::of(nodes, id)).collect()
    }
}

/// Buffered input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputShape {
    Text(Vec<u8>),
    Tree { tree: TreeShape, ignore: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub state: StateId,
    pub steps: usize,

    /// Parse stack from top to bottom.
    pub stack: Vec<TreeShape>,

    pub queue: Vec<TreeShape>,

    /// Ignored tokens awaiting the next terminal,
    ///   in input order.
    pub pending_ignore: Vec<TreeShape>,

    pub bindings: Vec<(BindId, TreeShape)>,

    /// Input buffered by an attached stream,
    ///   if any.
    pub input: Option<Vec<InputShape>>,
    pub position: Option<Position>,

    pub live_nodes: usize,
    pub log_len: usize,
    pub num_retry: usize,
    pub pre_eof_ran: bool,
}

impl<'t, T: ParserTrace> PdaRun<'t, T> {
    /// Capture the observable state of this run.
    pub fn snapshot(&self) -> Snapshot {
        let nodes = &self.nodes;
        let shape = |id| TreeShape::of(nodes, id);

        let mut pending_ignore = nodes
            .chain(self.accum_ignore)
            .map(shape)
            .collect::<Vec<_>>();
        pending_ignore.reverse();

        Snapshot {
            state: self.cs,
            steps: self.steps,
            stack: nodes.chain(self.stack).map(shape).collect(),
            queue: self.queue.iter().copied().map(shape).collect(),
            pending_ignore,
            bindings: self
                .bindings
                .sorted()
                .into_iter()
                .map(|(var, id)| (var, shape(id)))
                .collect(),
            input: self.scanner.stream().map(|stream| {
                stream.buffered().fold(Vec::new(), |mut acc, unit| {
                    match unit {
                        Unit::Byte(b) => match acc.last_mut() {
                            Some(InputShape::Text(text)) => text.push(b),
                            _ => acc.push(InputShape::Text(vec![b])),
                        },
                        Unit::Tree { node, ignore } => {
                            acc.push(InputShape::Tree {
                                tree: shape(node),
                                ignore,
                            })
                        }
                    }

                    acc
                })
            }),
            position: self.scanner.stream().map(|stream| stream.position()),
            live_nodes: nodes.live(),
            log_len: self.log.len(),
            num_retry: self.num_retry,
            pre_eof_ran: self.pre_eof_ran,
        }
    }
}
