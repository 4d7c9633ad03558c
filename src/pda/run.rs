// Resumable parser run
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

//! The parser state machine.
//!
//! See the [parent module](super) for an overview.

use super::{
    bind::{BindId, Bindings},
    error::{InternalError, PdaError},
    tables::{Action, PdaTables},
    trace::{DefaultTrace, ParserTrace},
    undo::{RevRecord, ReverseData, Undone},
};
use crate::{
    fmt::{DisplayWrapper, TtQuote},
    fsm::{FsmTables, RegionId, ScanResult, Scanner},
    global,
    input::InputStream,
    pool::Pool,
    rcode::{LogMark, ReverseLog},
    span::{Position, Span, UNKNOWN_SPAN},
    tree::{LangElId, Node, NodeId, Nodes, ProdId, StateId},
};
use std::{collections::VecDeque, fmt::Display};

/// Point at which the caller re-enters [`PdaRun::parse`].
///
/// The entry must correspond to the [`Continuation`] at which the run is
///   suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Begin parsing,
    ///   or continue after [`Status::Stopped`] or [`Status::Paused`].
    Start,

    /// Continue after the reduction action of [`Status::Reduction`].
    Reduction,

    /// Continue after the generation action of [`Status::Generation`].
    Generation,

    /// Continue after the end-of-input action of [`Status::PreEof`].
    PreEof,

    /// Continue undoing after the caller reversed the action of
    ///   [`Status::Reverse`].
    Reverse,
}

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Reduction => write!(f, "reduction"),
            Self::Generation => write!(f, "generation"),
            Self::PreEof => write!(f, "pre-eof"),
            Self::Reverse => write!(f, "reverse"),
        }
    }
}

/// What an in-progress undo is undoing toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Roll back to the boundary following the given step.
    Step(usize),

    /// Roll back to the most recent decision with untried alternatives.
    Backtrack,
}

/// Point at which a run is parked between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Start,

    /// Suspended for the action of a reduction by `prod`;
    ///   the step will be committed upon resumption if `commit`.
    Reduction { prod: ProdId, commit: bool },

    Generation,
    PreEof,
    Reverse(Goal),
    Done,
}

impl Display for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Reduction { prod, .. } => {
                write!(f, "reduction by production {prod}")
            }
            Self::Generation => write!(f, "generation"),
            Self::PreEof => write!(f, "pre-eof"),
            Self::Reverse(Goal::Step(step)) => {
                write!(f, "reverse to step {step}")
            }
            Self::Reverse(Goal::Backtrack) => write!(f, "backtrack"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// A reduction awaiting its action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionInfo {
    pub prod: ProdId,

    /// The new nonterminal,
    ///   at the head of the lookahead queue.
    pub lhs: NodeId,

    pub children: Vec<NodeId>,
}

/// A generation token awaiting its action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInfo {
    pub token: LangElId,
    pub text: Box<[u8]>,
    pub span: Span,
}

/// Reason that [`PdaRun::parse`] returned control to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The goal was reached;
    ///   see [`PdaRun::root`].
    Done,

    /// A stop requested via [`PdaRun::stop`] was honored.
    Stopped,

    /// The target set by [`PdaRun::set_target_steps`] was reached.
    Paused,

    /// Suspended for a reduction action;
    ///   resume with [`Entry::Reduction`].
    Reduction(ReductionInfo),

    /// Suspended for a generation action;
    ///   resume with [`Entry::Generation`].
    Generation(GenerationInfo),

    /// Suspended for the end-of-input action of `region`;
    ///   resume with [`Entry::PreEof`].
    PreEof { region: RegionId },

    /// Suspended while undoing so that the caller may reverse an action
    ///   using data it recorded with [`PdaRun::record_reverse`];
    ///     resume with [`Entry::Reverse`].
    Reverse(ReverseData),

    /// An undo requested by [`PdaRun::undo_to`] completed.
    Reverted { steps: usize },
}

/// Configuration of a [`PdaRun`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Pause after this many steps.
    pub target_steps: Option<usize>,

    /// Finish as soon as a node of this language element is alone on the
    ///   stack,
    ///     for parsing a fragment rather than an entire input.
    pub stop_target: Option<LangElId>,

    /// State in which to begin,
    ///   overriding the start state of the tables.
    pub start_state: Option<StateId>,

    /// Slots per block of the node pool;
    ///   `0` is treated as `1`.
    pub pool_block_len: usize,

    pub pool_max_blocks: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_steps: None,
            stop_target: None,
            start_state: None,
            pool_block_len: global::POOL_BLOCK_LEN,
            pool_max_blocks: usize::MAX,
        }
    }
}

enum Flow {
    Yield(Status),

    /// The continuation changed;
    ///   dispatch again.
    Continue,
}

enum Acquired {
    Queued,
    Suspend(Status),
    NoToken(RegionId),
}

/// A resumable,
///   reversible parse of a single input stream.
///
/// See the [parent module](super) for more information.
pub struct PdaRun<'t, T: ParserTrace = DefaultTrace> {
    pub(super) tables: &'t PdaTables,
    pub(super) scanner: Scanner<'t>,
    pub(super) nodes: Nodes,

    /// Current automaton state.
    pub(super) cs: StateId,
    pub(super) start_state: StateId,

    /// Top of the parse stack.
    pub(super) stack: Option<NodeId>,

    /// Lookahead.
    pub(super) queue: VecDeque<NodeId>,

    /// Ignored tokens awaiting the next shifted terminal,
    ///   newest first.
    pub(super) accum_ignore: Option<NodeId>,

    pub(super) log: ReverseLog<RevRecord>,
    pub(super) bindings: Bindings,

    pub(super) steps: usize,
    target_steps: Option<usize>,
    stop_target: Option<LangElId>,

    /// Number of decisions with untried alternatives above the commit
    ///   barrier.
    pub(super) num_retry: usize,

    /// Alternative to take at the next decision.
    pub(super) retry: usize,

    /// Backtracking never undoes records below this mark.
    pub(super) barrier: LogMark,

    pub(super) cont: Continuation,

    stop: bool,
    pub(super) parse_error: bool,
    aborted: bool,
    reject: bool,

    /// The end-of-input action has run and no token has been produced
    ///   since.
    pub(super) pre_eof_ran: bool,

    trace: T,
}

impl<'t, T: ParserTrace> PdaRun<'t, T> {
    pub fn new(
        pda: &'t PdaTables,
        fsm: &'t FsmTables,
        config: RunConfig,
    ) -> Self {
        Self::with_trace(pda, fsm, config, T::default())
    }

    pub fn with_trace(
        pda: &'t PdaTables,
        fsm: &'t FsmTables,
        config: RunConfig,
        trace: T,
    ) -> Self {
        let start_state = config.start_state.unwrap_or(pda.start_state);
        let pool =
            Pool::with_limits(config.pool_block_len, config.pool_max_blocks);

        Self {
            tables: pda,
            scanner: Scanner::new(fsm),
            nodes: Nodes::with_pool(pool),
            cs: start_state,
            start_state,
            stack: None,
            queue: VecDeque::new(),
            accum_ignore: None,
            log: ReverseLog::new(),
            bindings: Bindings::new(),
            steps: 0,
            target_steps: config.target_steps,
            stop_target: config.stop_target,
            num_retry: 0,
            retry: 0,
            barrier: LogMark::START,
            cont: Continuation::Start,
            stop: false,
            parse_error: false,
            aborted: false,
            reject: false,
            pre_eof_ran: false,
            trace,
        }
    }

    /// Attach the stream to be parsed.
    pub fn attach(&mut self, stream: InputStream) -> Result<(), PdaError> {
        Ok(self.scanner.attach(stream)?)
    }

    /// Detach the stream being parsed.
    ///
    /// Tokens already acquired from the stream remain in the run.
    pub fn detach(&mut self) -> Result<InputStream, PdaError> {
        Ok(self.scanner.detach()?)
    }

    /// Enter the parser at `entry`,
    ///   running until it finishes,
    ///   suspends,
    ///   or fails.
    pub fn parse(&mut self, entry: Entry) -> Result<Status, PdaError> {
        self.guarded(|run| run.enter(entry))
    }

    /// Roll the run back to the boundary following step `target`.
    ///
    /// Undo may suspend with [`Status::Reverse`] any number of times
    ///   before completing with [`Status::Reverted`].
    /// Undo is permitted after a parse error,
    ///   and clears it.
    pub fn undo_to(&mut self, target: usize) -> Result<Status, PdaError> {
        self.guarded(|run| {
            if target > run.steps {
                return Err(InternalError::UndoForward {
                    target,
                    steps: run.steps,
                }
                .into());
            }

            if let Continuation::Reverse(_) = run.cont {
                return Err(InternalError::BadEntry {
                    entry: Entry::Reverse,
                    cont: run.cont,
                }
                .into());
            }

            run.cont = Continuation::Reverse(Goal::Step(target));
            run.drive()
        })
    }

    fn guarded(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Status, PdaError>,
    ) -> Result<Status, PdaError> {
        if self.aborted {
            return Err(PdaError::Aborted);
        }

        let result = f(self);

        match &result {
            Ok(status) => self.trace.trace_suspend(status),
            Err(e) if e.is_fatal() => {
                self.aborted = true;
                self.trace.trace_error(e);
            }
            Err(_) => (),
        }

        result
    }

    fn enter(&mut self, entry: Entry) -> Result<Status, PdaError> {
        match (entry, self.cont) {
            (Entry::Start, Continuation::Done) => return Ok(Status::Done),
            (Entry::Reverse, Continuation::Reverse(_)) => (),

            _ if self.parse_error => return Err(PdaError::Halted),

            (Entry::Start, Continuation::Start) => (),

            (Entry::Reduction, Continuation::Reduction { prod, commit }) => {
                self.cont = Continuation::Start;

                if std::mem::take(&mut self.reject) {
                    let span = self
                        .queue
                        .front()
                        .map(|lhs| self.nodes[*lhs].span)
                        .unwrap_or(UNKNOWN_SPAN);

                    self.fail(PdaError::Rejected { prod, span })?;
                } else if let Some(status) = self.end_step(commit) {
                    return Ok(status);
                }
            }

            (Entry::Generation, Continuation::Generation)
            | (Entry::PreEof, Continuation::PreEof) => {
                self.cont = Continuation::Start;
            }

            (entry, cont) => {
                return Err(InternalError::BadEntry { entry, cont }.into())
            }
        }

        self.drive()
    }

    fn drive(&mut self) -> Result<Status, PdaError> {
        loop {
            let flow = match self.cont {
                Continuation::Start => self.forward()?,
                Continuation::Reverse(goal) => self.reverse(goal)?,
                Continuation::Done => Flow::Yield(Status::Done),

                cont @ (Continuation::Reduction { .. }
                | Continuation::Generation
                | Continuation::PreEof) => {
                    return Err(InternalError::BadEntry {
                        entry: Entry::Start,
                        cont,
                    }
                    .into())
                }
            };

            if let Flow::Yield(status) = flow {
                return Ok(status);
            }
        }
    }

    /// Run the automaton forward until it suspends or must backtrack.
    fn forward(&mut self) -> Result<Flow, PdaError> {
        let tables = self.tables;

        loop {
            let la = match self.queue.front() {
                Some(la) => *la,
                None => match self.acquire()? {
                    Acquired::Queued => continue,
                    Acquired::Suspend(status) => {
                        return Ok(Flow::Yield(status))
                    }
                    Acquired::NoToken(region) => {
                        let pos = self.position();
                        self.fail(PdaError::Lexical { region, pos })?;
                        return Ok(Flow::Continue);
                    }
                },
            };

            let (id, span) = (self.nodes[la].id, self.nodes[la].span);

            let Some(decision) = tables.decide(self.cs, id, self.retry) else {
                let state = self.cs;
                self.fail(PdaError::Syntax { token: id, state, span })?;
                return Ok(Flow::Continue);
            };

            self.trace.trace_action(self.cs, &self.nodes[la], &decision);

            self.retry = 0;
            if decision.more {
                self.num_retry += 1;
            }

            let commit = tables.commit_len[decision.trans] != 0;
            let target = tables.targs[decision.trans];
            let (alt, more) = (decision.alt, decision.more);

            let suspend = match decision.action {
                Action::Shift => {
                    self.shift(la, target, alt, more)?;
                    None
                }
                Action::Reduce(prod) => self.reduce(prod, alt, more, commit)?,
                Action::ShiftReduce(prod) => {
                    self.shift(la, target, alt, more)?;
                    self.reduce(prod, 0, false, commit)?
                }
            };

            if let Some(status) = suspend {
                return Ok(Flow::Yield(status));
            }

            if let Some(status) = self.end_step(commit) {
                return Ok(Flow::Yield(status));
            }
        }
    }

    /// Acquire the next lookahead token from the stream.
    fn acquire(&mut self) -> Result<Acquired, PdaError> {
        let tables = self.tables;

        'scan: loop {
            let mut first = None;

            for region in tables.regions(self.cs) {
                first.get_or_insert(region);

                match self.scanner.run(region)? {
                    ScanResult::NoToken => continue,
                    ScanResult::Eof => return self.end_of_input(region),

                    ScanResult::Tree { node, ignore } => {
                        self.scanner.stream_mut()?.take_tree();
                        self.produced();
                        self.log.append(RevRecord::TreeIn { node, ignore });
                        self.trace.trace_token(region, &self.nodes[node]);

                        if ignore {
                            self.push_ignore(node);
                            continue 'scan;
                        }

                        self.queue.push_back(node);
                        return Ok(Acquired::Queued);
                    }

                    ScanResult::Token { id, len } => {
                        let info = tables.lel_info.get(id as usize);
                        let ex = self.scanner.stream_mut()?.extract(len);
                        let span = Span::new(ex.start, ex.text.len());
                        self.produced();

                        if info.map(|i| i.generation).unwrap_or(false) {
                            self.log.append(RevRecord::Consume {
                                text: ex.text.clone(),
                                start: ex.start,
                            });

                            self.cont = Continuation::Generation;
                            return Ok(Acquired::Suspend(Status::Generation(
                                GenerationInfo {
                                    token: id,
                                    text: ex.text,
                                    span,
                                },
                            )));
                        }

                        let node =
                            self.nodes.alloc(Node::token(id, &ex.text, span))?;
                        self.trace.trace_token(region, &self.nodes[node]);

                        if info.map(|i| i.ignore).unwrap_or(false) {
                            self.push_ignore(node);
                            self.log.append(RevRecord::Ignore {
                                node,
                                start: ex.start,
                            });
                            continue 'scan;
                        }

                        self.queue.push_back(node);
                        self.log.append(RevRecord::Scan {
                            node,
                            start: ex.start,
                        });
                        return Ok(Acquired::Queued);
                    }
                }
            }

            return Ok(Acquired::NoToken(first.unwrap_or_default()));
        }
    }

    /// Handle the end of input while scanning `region`.
    fn end_of_input(&mut self, region: RegionId) -> Result<Acquired, PdaError> {
        let eof_action = self
            .tables
            .region_info
            .get(region as usize)
            .map(|info| info.eof_action)
            .unwrap_or(false);

        if eof_action && !self.pre_eof_ran {
            self.log.append(RevRecord::PreEofRan { prev: false });
            self.pre_eof_ran = true;
            self.cont = Continuation::PreEof;

            return Ok(Acquired::Suspend(Status::PreEof { region }));
        }

        let start = self.position();
        let eof = Node::token(self.tables.eof_id, b"", Span::new(start, 0));
        let node = self.nodes.alloc(eof)?;
        self.trace.trace_token(region, &self.nodes[node]);

        self.queue.push_back(node);
        self.log.append(RevRecord::Scan { node, start });

        Ok(Acquired::Queued)
    }

    /// A token was produced from the stream,
    ///   re-arming the end-of-input action.
    fn produced(&mut self) {
        if self.pre_eof_ran {
            self.log.append(RevRecord::PreEofRan { prev: true });
            self.pre_eof_ran = false;
        }
    }

    fn push_ignore(&mut self, node: NodeId) {
        self.nodes[node].next = self.accum_ignore;
        self.accum_ignore = Some(node);
    }

    fn shift(
        &mut self,
        la: NodeId,
        target: StateId,
        alt: usize,
        more: bool,
    ) -> Result<(), PdaError> {
        self.dequeue_front(la)?;

        // A node that already carries ignored tokens keeps them and the
        //   pending chain waits for the next terminal.
        let node = &self.nodes[la];
        let ignore = match node.ignore {
            None if self.tables.is_terminal(node.id) => {
                self.accum_ignore.take()
            }
            _ => None,
        };

        let node = &mut self.nodes[la];
        if ignore.is_some() {
            node.ignore = ignore;
        }
        node.state = target;
        node.next = self.stack;

        self.stack = Some(la);
        self.log.append(RevRecord::Shift {
            node: la,
            prev_state: self.cs,
            ignore,
            alt,
            more,
        });

        self.cs = target;
        Ok(())
    }

    /// Reduce by `prod`,
    ///   yielding a [`Status::Reduction`] if the production has an
    ///   action.
    fn reduce(
        &mut self,
        prod: ProdId,
        alt: usize,
        more: bool,
        commit: bool,
    ) -> Result<Option<Status>, PdaError> {
        let info = &self.tables.prod_info[prod as usize];

        let mut children = Vec::with_capacity(info.length);
        let mut below = self.stack;

        while children.len() < info.length {
            let node = below.ok_or(InternalError::StackUnderflow {
                prod,
                needed: info.length,
                found: children.len(),
            })?;

            children.push(node);
            below = self.nodes[node].next;
        }

        children.reverse();

        let span = children
            .iter()
            .fold(UNKNOWN_SPAN, |span, c| span.merge(self.nodes[*c].span));

        let lhs = self.nodes.alloc(Node::reduced(
            info.lhs,
            prod,
            children.first().copied(),
            span,
        ))?;

        // Stack links become sibling links.
        for (i, child) in children.iter().enumerate() {
            self.nodes[*child].next = children.get(i + 1).copied();
        }

        let prev_state = self.cs;
        self.stack = below;
        self.cs = below
            .map(|top| self.nodes[top].state)
            .unwrap_or(self.start_state);

        self.queue.push_front(lhs);
        self.log.append(RevRecord::Reduce {
            lhs,
            prev_state,
            alt,
            more,
        });

        if info.has_action {
            self.cont = Continuation::Reduction { prod, commit };

            return Ok(Some(Status::Reduction(ReductionInfo {
                prod,
                lhs,
                children,
            })));
        }

        Ok(None)
    }

    /// Complete a step,
    ///   yielding a [`Status`] if the caller is to regain control.
    fn end_step(&mut self, commit: bool) -> Option<Status> {
        if commit {
            self.commit();
        }

        self.log.append(RevRecord::StepEnd);
        self.steps += 1;

        if self.goal_reached() {
            self.cont = Continuation::Done;
            Some(Status::Done)
        } else if std::mem::take(&mut self.stop) {
            Some(Status::Stopped)
        } else if self.target_steps == Some(self.steps) {
            Some(Status::Paused)
        } else {
            None
        }
    }

    /// Prevent backtracking into anything done so far.
    fn commit(&mut self) {
        self.log.append(RevRecord::Commit {
            prev_barrier: self.barrier,
            prev_retry: self.num_retry,
        });

        self.barrier = self.log.mark();
        self.num_retry = 0;
    }

    fn goal_reached(&self) -> bool {
        match self.stack {
            Some(top) => {
                let node = &self.nodes[top];

                node.id == self.tables.eof_id
                    || (self.stop_target == Some(node.id)
                        && node.next.is_none())
            }
            None => false,
        }
    }

    /// Recover from `err` by backtracking if any alternatives remain.
    ///
    /// If backtracking is not possible,
    ///   the run is flagged and `err` is returned.
    fn fail(&mut self, err: PdaError) -> Result<(), PdaError> {
        self.trace.trace_error(&err);

        if self.num_retry > 0 {
            self.cont = Continuation::Reverse(Goal::Backtrack);
            Ok(())
        } else {
            self.parse_error = true;
            self.retry = 0;
            self.cont = Continuation::Start;
            Err(err)
        }
    }

    /// Interpret the reverse log toward `goal`.
    fn reverse(&mut self, goal: Goal) -> Result<Flow, PdaError> {
        loop {
            if let Goal::Step(target) = goal {
                let boundary =
                    matches!(self.log.last(), None | Some(RevRecord::StepEnd));

                if self.steps == target && boundary {
                    self.parse_error = false;
                    self.retry = 0;
                    self.reject = false;
                    self.cont = if self.goal_reached() {
                        Continuation::Done
                    } else {
                        Continuation::Start
                    };

                    return Ok(Flow::Yield(Status::Reverted { steps: target }));
                }
            }

            let Some(rec) = self.log.pop() else {
                let target = match goal {
                    Goal::Step(target) => target,
                    Goal::Backtrack => self.steps,
                };

                return Err(InternalError::UndoPastStart {
                    target,
                    steps: self.steps,
                }
                .into());
            };

            self.trace.trace_undo(&rec);

            match self.undo(rec)? {
                Undone::Decision { alt } if goal == Goal::Backtrack => {
                    self.retry = alt + 1;
                    self.cont = Continuation::Start;
                    return Ok(Flow::Continue);
                }

                Undone::Action(data) => {
                    return Ok(Flow::Yield(Status::Reverse(data)))
                }

                Undone::Plain | Undone::Decision { .. } => (),
            }
        }
    }

    fn position(&self) -> Position {
        self.scanner
            .stream()
            .map(InputStream::position)
            .unwrap_or(Position::START)
    }

    /// Push text onto the head of the stream.
    pub fn push_text(&mut self, text: &[u8]) -> Result<(), PdaError> {
        if !text.is_empty() {
            self.scanner.stream_mut()?.push_text(text);
            self.log.append(RevRecord::Push { units: text.len() });
        }

        Ok(())
    }

    /// Push a tree onto the head of the stream,
    ///   to be delivered to the automaton as a single token.
    ///
    /// If `ignore`,
    ///   the tree is instead attached to the next shifted terminal
    ///   as an ignored token would be.
    pub fn push_tree(
        &mut self,
        node: Node,
        ignore: bool,
    ) -> Result<NodeId, PdaError> {
        let stream = self.scanner.stream_mut()?;
        let id = self.nodes.alloc(node)?;

        stream.push_tree(id, ignore);
        self.log.append(RevRecord::PushTree { node: id });

        Ok(id)
    }

    /// Fabricate a token and queue it as lookahead,
    ///   optionally binding it to a pattern variable.
    pub fn send_token(
        &mut self,
        id: LangElId,
        text: &[u8],
        bind: Option<BindId>,
    ) -> Result<NodeId, PdaError> {
        let node = self.nodes.alloc(Node::artificial(id, text))?;

        self.queue.push_back(node);
        self.log.append(RevRecord::Send { node });

        if let Some(var) = bind {
            self.bind(var, node);
        }

        Ok(node)
    }

    /// Bind the pattern variable `id` to `node`.
    pub fn bind(&mut self, id: BindId, node: NodeId) {
        let prev = self.bindings.bind(id, node);
        self.log.append(RevRecord::Bind { id, prev });
    }

    /// Record data that will be returned via [`Status::Reverse`] when
    ///   this point is undone.
    pub fn record_reverse(&mut self, data: impl Into<ReverseData>) {
        self.log.append(RevRecord::Action(data.into()));
    }

    /// Discard the ignored tokens awaiting the next shifted terminal.
    pub fn discard_ignore(&mut self) {
        let chain = self.accum_ignore.take();
        self.log.append(RevRecord::DiscardIgnore { chain });
    }

    /// Reject the reduction for which the run is suspended.
    ///
    /// Upon resumption with [`Entry::Reduction`] the run backtracks to the
    ///   most recent untried alternative,
    ///     or fails with [`PdaError::Rejected`] if there is none.
    pub fn reject(&mut self) -> Result<(), InternalError> {
        match self.cont {
            Continuation::Reduction { .. } => {
                self.reject = true;
                Ok(())
            }
            _ => Err(InternalError::RejectOutsideReduction),
        }
    }

    /// Request that the run return [`Status::Stopped`] at the next step
    ///   boundary.
    pub fn stop(&mut self) {
        self.stop = true;
    }

    pub fn set_target_steps(&mut self, target: Option<usize>) {
        self.target_steps = target;
    }

    /// Discard the entire reverse log.
    ///
    /// Nothing done so far can be undone or backtracked into afterward.
    pub fn commit_full(&mut self) {
        let discarded = self
            .log
            .replay(LogMark::START)
            .filter_map(|rec| match rec {
                RevRecord::DiscardIgnore { chain } => chain,
                _ => None,
            })
            .collect::<Vec<_>>();

        for head in discarded {
            for node in self.nodes.chain(Some(head)).collect::<Vec<_>>() {
                self.nodes.free_tree(node);
            }
        }

        self.barrier = LogMark::START;
        self.num_retry = 0;
    }

    /// The parsed tree,
    ///   once [`Status::Done`] has been returned.
    ///
    /// This is the node beneath the shifted end-of-input token,
    ///   or the node matching the configured stop target.
    pub fn root(&self) -> Option<NodeId> {
        if self.cont != Continuation::Done {
            return None;
        }

        let top = self.stack?;

        if self.nodes[top].id == self.tables.eof_id {
            self.nodes[top].next
        } else {
            Some(top)
        }
    }

    pub fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    /// Mutable access to nodes.
    ///
    /// Changes made through this reference are not logged and will not be
    ///   undone.
    pub fn nodes_mut(&mut self) -> &mut Nodes {
        &mut self.nodes
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn tables(&self) -> &'t PdaTables {
        self.tables
    }

    pub fn stream(&self) -> Option<&InputStream> {
        self.scanner.stream()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn state(&self) -> StateId {
        self.cs
    }

    pub fn num_retry(&self) -> usize {
        self.num_retry
    }

    pub fn continuation(&self) -> Continuation {
        self.cont
    }

    /// Whether a parse error halted the run.
    pub fn is_halted(&self) -> bool {
        self.parse_error
    }

    /// Whether a fatal error aborted the run.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Number of records in the reverse log.
    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    pub fn trace(&self) -> &T {
        &self.trace
    }

    /// Render the tree rooted at `id` using the names of its language
    ///   elements,
    ///     e.g. `S(A B)`.
    pub fn render(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        let name = self.tables.lel_name(node.id);

        match node.prod {
            None => name.to_string(),
            Some(_) => format!(
                "{name}({})",
                self.nodes
                    .children(id)
                    .map(|child| self.render(child))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }
}

impl<'t, T: ParserTrace> std::fmt::Debug for PdaRun<'t, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdaRun")
            .field("cs", &self.cs)
            .field("steps", &self.steps)
            .field("cont", &self.cont)
            .field("num_retry", &self.num_retry)
            .field("stack", &self.stack)
            .field("queue", &self.queue)
            .field("log_len", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl Display for ReductionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "reduction by production {} producing {}",
            self.prod,
            TtQuote::wrap(self.lhs),
        )
    }
}
