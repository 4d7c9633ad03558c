// Tests for resumable, reversible pushdown automaton
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

use super::*;
use crate::{
    fsm::{FsmTables, RegionId},
    input::InputStream,
    test::tables::{char_scanner, PdaBuilder},
    tree::{LangElId, Node, NodeId, ProdId, StateId},
};
use Action::{Reduce, Shift};

type Sut<'t> = PdaRun<'t, DefaultTrace>;

mod ab {
    use super::*;

    pub const A: LangElId = 1;
    pub const B: LangElId = 2;
    pub const WS: LangElId = 3;
    pub const G: LangElId = 4;
    pub const EOF: LangElId = 5;
    pub const S: LangElId = 6;

    /// `S -> A B` with spaces ignored and `g` as a generation token.
    ///
    /// If `action`,
    ///   the reduction to `S` suspends for its action;
    ///     if `eof_action`,
    ///       so does the end of input.
    pub fn tables(action: bool, eof_action: bool) -> (PdaTables, FsmTables) {
        let mut b = PdaBuilder::new(5);

        assert_eq!(A, b.terminal("A"));
        assert_eq!(B, b.terminal("B"));
        assert_eq!(WS, b.ignore("WS"));
        assert_eq!(G, b.generation("G"));
        assert_eq!(EOF, b.eof());
        assert_eq!(S, b.nonterm("S"));

        let s_ab = b.prod(S, 2, action);
        b.region("main", eof_action);

        b.action(0, A, 1, &[Shift]);
        b.action(0, S, 3, &[Shift]);
        b.action(1, B, 2, &[Shift]);
        b.action(2, EOF, 0, &[Reduce(s_ab)]);
        b.action(3, EOF, 4, &[Shift]);

        let fsm = char_scanner(&[(b'a', A), (b'b', B), (b'g', G)], Some(WS));

        (b.build(), fsm)
    }
}

mod ambig {
    use super::*;

    pub const X: LangElId = 1;
    pub const EOF: LangElId = 2;
    pub const S: LangElId = 3;
    pub const P: LangElId = 4;
    pub const Q: LangElId = 5;

    pub const P_X: ProdId = 2;

    /// `S -> P | Q`,
    ///   `P -> X`,
    ///   `Q -> X`,
    ///   preferring `P`,
    ///   whose reduction suspends for its action.
    pub fn tables() -> (PdaTables, FsmTables) {
        let mut b = PdaBuilder::new(6);

        b.terminal("X");
        b.eof();
        b.nonterm("S");
        b.nonterm("P");
        b.nonterm("Q");

        let s_p = b.prod(S, 1, false);
        let s_q = b.prod(S, 1, false);
        assert_eq!(P_X, b.prod(P, 1, true));
        let q_x = b.prod(Q, 1, false);
        b.region("main", false);

        b.action(0, X, 1, &[Shift]);
        b.action(0, S, 2, &[Shift]);
        b.action(0, P, 3, &[Shift]);
        b.action(0, Q, 4, &[Shift]);
        b.action(1, EOF, 0, &[Reduce(P_X), Reduce(q_x)]);
        b.action(2, EOF, 5, &[Shift]);
        b.action(3, EOF, 0, &[Reduce(s_p)]);
        b.action(4, EOF, 0, &[Reduce(s_q)]);

        (b.build(), char_scanner(&[(b'x', X)], None))
    }
}

mod sr {
    use super::*;

    pub const D: LangElId = 4;

    /// `S -> a b c | T b d`,
    ///   `T -> a`,
    ///   where the shift of `b` is preferred over the reduction to `T`.
    ///
    /// If `commit`,
    ///   that decision is committed once taken.
    pub fn tables(commit: bool) -> (PdaTables, FsmTables) {
        let mut b = PdaBuilder::new(10);

        let a = b.terminal("a");
        let bb = b.terminal("b");
        let c = b.terminal("c");
        assert_eq!(D, b.terminal("d"));
        let eof = b.eof();
        let s = b.nonterm("S");
        let t = b.nonterm("T");

        let s_abc = b.prod(s, 3, false);
        let s_tbd = b.prod(s, 3, false);
        let t_a = b.prod(t, 1, false);
        b.region("main", false);

        b.action(0, a, 1, &[Shift]);
        b.action(0, s, 8, &[Shift]);
        b.action(0, t, 5, &[Shift]);

        if commit {
            b.commit(1, bb, 2, &[Shift, Reduce(t_a)]);
        } else {
            b.action(1, bb, 2, &[Shift, Reduce(t_a)]);
        }

        b.action(2, c, 3, &[Shift]);
        b.action(3, eof, 0, &[Reduce(s_abc)]);
        b.action(5, bb, 6, &[Shift]);
        b.action(6, D, 7, &[Shift]);
        b.action(7, eof, 0, &[Reduce(s_tbd)]);
        b.action(8, eof, 9, &[Shift]);

        let fsm =
            char_scanner(&[(b'a', a), (b'b', bb), (b'c', c), (b'd', D)], None);

        (b.build(), fsm)
    }
}

fn start<'t, T: ParserTrace>(
    pda: &'t PdaTables,
    fsm: &'t FsmTables,
    config: RunConfig,
    input: &str,
) -> PdaRun<'t, T> {
    let mut sut = PdaRun::new(pda, fsm, config);
    sut.attach(InputStream::from_bytes(input)).unwrap();
    sut
}

fn run<'t>(pda: &'t PdaTables, fsm: &'t FsmTables, input: &str) -> Sut<'t> {
    start(pda, fsm, RunConfig::default(), input)
}

fn rendered_root(sut: &Sut) -> String {
    sut.render(sut.root().expect("missing root"))
}

fn texts(sut: &Sut, ids: impl Iterator<Item = NodeId>) -> Vec<Vec<u8>> {
    ids.map(|id| sut.nodes()[id].text.to_vec()).collect()
}

#[test]
fn parses_sequence() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "ab");

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
    assert_eq!("S(A B)", rendered_root(&sut));
    assert_eq!(5, sut.steps());
    assert_eq!(Continuation::Done, sut.continuation());

    // Finished runs stay finished.
    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
}

#[test]
fn ignored_tokens_attach_to_next_terminal() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "  a b  ");

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));

    let root = sut.root().unwrap();
    let children = sut.nodes().children(root).collect::<Vec<_>>();
    let ignores = |id| texts(&sut, sut.nodes().ignores(id));

    assert_eq!(vec![b"  ".to_vec()], ignores(children[0]));
    assert_eq!(vec![b" ".to_vec()], ignores(children[1]));

    // Trailing ignored text attaches to the end-of-input token.
    let top = sut.snapshot().stack.remove(0);
    assert_eq!(ab::EOF, top.id);
    assert_eq!(b"  ".to_vec(), top.ignore[0].text.to_vec());
}

#[derive(Debug, Default)]
struct RecordingTrace {
    actions: Vec<(StateId, LangElId, Action)>,
}

impl ParserTrace for RecordingTrace {
    fn trace_token(&mut self, _region: RegionId, _tok: &Node) {}

    fn trace_action(&mut self, cs: StateId, la: &Node, decision: &Decision) {
        self.actions.push((cs, la.id, decision.action));
    }

    fn trace_suspend(&mut self, _status: &Status) {}

    fn trace_error(&mut self, _err: &PdaError) {}

    fn trace_undo(&mut self, _rec: &RevRecord) {}
}

#[test]
fn ignored_tokens_do_not_affect_actions() {
    let (pda, fsm) = ab::tables(false, false);

    let actions = |input: &str| {
        let mut sut: PdaRun<RecordingTrace> =
            start(&pda, &fsm, RunConfig::default(), input);

        assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
        sut.trace().actions.clone()
    };

    let plain = actions("ab");
    assert_eq!(5, plain.len());
    assert_eq!(plain, actions("  a  b  "));
}

#[test]
fn pause_and_resume_yields_same_tree() {
    let (pda, fsm) = ab::tables(false, false);

    let config = RunConfig {
        target_steps: Some(2),
        ..Default::default()
    };
    let mut sut: Sut = start(&pda, &fsm, config, "a b");

    assert_eq!(Ok(Status::Paused), sut.parse(Entry::Start).map_err(drop));
    assert_eq!(2, sut.steps());
    assert_eq!(None, sut.root());

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
    assert_eq!("S(A B)", rendered_root(&sut));
}

#[test]
fn undo_restores_every_step_exactly() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "a b");

    let mut snapshots = vec![sut.snapshot()];

    loop {
        sut.set_target_steps(Some(sut.steps() + 1));

        let status = sut.parse(Entry::Start).unwrap();
        snapshots.push(sut.snapshot());

        match status {
            Status::Paused => continue,
            Status::Done => break,
            other => panic!("unexpected {other:?}"),
        }
    }

    assert_eq!(6, snapshots.len());

    for k in (0..snapshots.len()).rev() {
        assert_eq!(
            Ok(Status::Reverted { steps: k }),
            sut.undo_to(k).map_err(drop),
        );
        assert_eq!(snapshots[k], sut.snapshot(), "at step {k}");
    }

    assert_eq!(0, sut.log_len());
    assert_eq!(0, sut.nodes().live());

    // Replay from the beginning.
    sut.set_target_steps(None);
    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
    assert_eq!("S(A B)", rendered_root(&sut));
    assert_eq!(snapshots[5], sut.snapshot());
}

#[test]
fn reduction_action_accepts() {
    let (pda, fsm) = ambig::tables();
    let mut sut = run(&pda, &fsm, "x");

    match sut.parse(Entry::Start) {
        Ok(Status::Reduction(info)) => {
            assert_eq!(ambig::P_X, info.prod);
            assert_eq!(ambig::P, sut.nodes()[info.lhs].id);
            assert_eq!(1, info.children.len());
        }
        other => panic!("unexpected {other:?}"),
    }

    assert_eq!(1, sut.num_retry());
    assert_eq!(Ok(Status::Done), sut.parse(Entry::Reduction).map_err(drop));
    assert_eq!("S(P(X))", rendered_root(&sut));
}

#[test]
fn rejected_reduction_takes_next_alternative() {
    let (pda, fsm) = ambig::tables();
    let mut sut = run(&pda, &fsm, "x");

    assert!(matches!(sut.parse(Entry::Start), Ok(Status::Reduction(_))));
    sut.reject().unwrap();

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Reduction).map_err(drop));
    assert_eq!("S(Q(X))", rendered_root(&sut));
    assert_eq!(0, sut.num_retry());
}

#[test]
fn backtracking_returns_reverse_data_and_restores_bindings() {
    let (pda, fsm) = ambig::tables();
    let mut sut = run(&pda, &fsm, "x");

    let lhs = match sut.parse(Entry::Start) {
        Ok(Status::Reduction(info)) => info.lhs,
        other => panic!("unexpected {other:?}"),
    };

    sut.record_reverse(&b"undo P"[..]);
    sut.bind(7, lhs);
    assert_eq!(Some(lhs), sut.bindings().get(7));

    sut.reject().unwrap();

    // The binding is undone silently before the action is asked to
    //   reverse itself.
    assert_eq!(
        Ok(Status::Reverse(b"undo P".to_vec().into())),
        sut.parse(Entry::Reduction).map_err(drop),
    );
    assert_eq!(None, sut.bindings().get(7));

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Reverse).map_err(drop));
    assert_eq!("S(Q(X))", rendered_root(&sut));
}

#[test]
fn bindings_survive_accepted_reduction() {
    let (pda, fsm) = ambig::tables();
    let mut sut = run(&pda, &fsm, "x");

    let lhs = match sut.parse(Entry::Start) {
        Ok(Status::Reduction(info)) => info.lhs,
        other => panic!("unexpected {other:?}"),
    };

    sut.bind(7, lhs);

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Reduction).map_err(drop));
    assert_eq!(vec![(7, lhs)], sut.bindings().sorted());
}

#[test]
fn stop_honored_at_step_boundary() {
    let (pda, fsm) = ambig::tables();
    let mut sut = run(&pda, &fsm, "x");

    assert!(matches!(sut.parse(Entry::Start), Ok(Status::Reduction(_))));
    sut.stop();

    assert_eq!(Ok(Status::Stopped), sut.parse(Entry::Reduction).map_err(drop));
    assert_eq!(2, sut.steps());

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
    assert_eq!("S(P(X))", rendered_root(&sut));
}

#[test]
fn reject_outside_reduction_fails() {
    let (pda, fsm) = ambig::tables();
    let mut sut = run(&pda, &fsm, "x");

    assert_eq!(Err(InternalError::RejectOutsideReduction), sut.reject());
}

#[test]
fn explicit_undo_yields_reverse_data() {
    let (pda, fsm) = ambig::tables();
    let mut sut = run(&pda, &fsm, "x");
    let initial = sut.snapshot();

    assert!(matches!(sut.parse(Entry::Start), Ok(Status::Reduction(_))));
    sut.record_reverse(&b"undo P"[..]);
    assert_eq!(Ok(Status::Done), sut.parse(Entry::Reduction).map_err(drop));

    assert_eq!(
        Ok(Status::Reverse(b"undo P".to_vec().into())),
        sut.undo_to(0).map_err(drop),
    );
    assert_eq!(
        Ok(Status::Reverted { steps: 0 }),
        sut.parse(Entry::Reverse).map_err(drop),
    );
    assert_eq!(initial, sut.snapshot());
}

#[test]
fn rejection_without_alternatives_halts_until_undone() {
    let (pda, fsm) = ab::tables(true, false);
    let mut sut = run(&pda, &fsm, "a b");

    assert!(matches!(sut.parse(Entry::Start), Ok(Status::Reduction(_))));
    assert_eq!(2, sut.steps());
    sut.reject().unwrap();

    match sut.parse(Entry::Reduction) {
        Err(PdaError::Rejected { prod: 0, span }) => {
            assert_eq!((0, 3), (span.offset(), span.len()));
        }
        other => panic!("unexpected {other:?}"),
    }

    assert!(sut.is_halted());
    assert!(matches!(sut.parse(Entry::Start), Err(PdaError::Halted)));

    assert_eq!(
        Ok(Status::Reverted { steps: 2 }),
        sut.undo_to(2).map_err(drop)
    );
    assert!(!sut.is_halted());

    // The same reduction is reached again and may now be accepted.
    assert!(matches!(sut.parse(Entry::Start), Ok(Status::Reduction(_))));
    assert_eq!(Ok(Status::Done), sut.parse(Entry::Reduction).map_err(drop));
    assert_eq!("S(A B)", rendered_root(&sut));
}

#[test]
fn syntax_error_backtracks_to_alternative() {
    let (pda, fsm) = sr::tables(false);

    let mut sut = run(&pda, &fsm, "abc");
    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
    assert_eq!("S(a b c)", rendered_root(&sut));

    let mut sut = run(&pda, &fsm, "abd");
    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
    assert_eq!("S(T(a) b d)", rendered_root(&sut));
    assert_eq!(0, sut.num_retry());
}

#[test]
fn commit_prevents_backtracking() {
    let (pda, fsm) = sr::tables(true);
    let mut sut = run(&pda, &fsm, "abd");
    let initial = sut.snapshot();

    match sut.parse(Entry::Start) {
        Err(PdaError::Syntax { token, state, span }) => {
            assert_eq!((sr::D, 2, 2), (token, state, span.offset()));
        }
        other => panic!("unexpected {other:?}"),
    }

    assert_eq!(0, sut.num_retry());
    assert!(sut.is_halted());
    assert!(matches!(sut.parse(Entry::Start), Err(PdaError::Halted)));

    // Explicit undo may still cross the commit.
    assert_eq!(
        Ok(Status::Reverted { steps: 0 }),
        sut.undo_to(0).map_err(drop)
    );
    assert_eq!(initial, sut.snapshot());
    assert!(!sut.is_halted());
}

#[test]
fn lexical_error_reports_position() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "a?");

    match sut.parse(Entry::Start) {
        Err(PdaError::Lexical { region: 1, pos }) => {
            assert_eq!((1, 1, 2), (pos.offset, pos.line, pos.col));
        }
        other => panic!("unexpected {other:?}"),
    }

    assert!(sut.is_halted());
    assert!(!sut.is_aborted());
}

#[test]
fn generation_token_replaced_by_pushed_text() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "ag");
    let initial = sut.snapshot();

    match sut.parse(Entry::Start) {
        Ok(Status::Generation(info)) => {
            assert_eq!(ab::G, info.token);
            assert_eq!(b"g".to_vec(), info.text.to_vec());
            assert_eq!(1, info.span.offset());
        }
        other => panic!("unexpected {other:?}"),
    }

    sut.push_text(b"b").unwrap();

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Generation).map_err(drop));
    assert_eq!("S(A B)", rendered_root(&sut));

    assert_eq!(
        Ok(Status::Reverted { steps: 0 }),
        sut.undo_to(0).map_err(drop)
    );
    assert_eq!(initial, sut.snapshot());
    assert_eq!(b"ag".to_vec(), sut.stream().unwrap().remaining_text());
}

#[test]
fn generation_token_replaced_by_sent_token() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "ag");
    let initial = sut.snapshot();

    assert!(matches!(sut.parse(Entry::Start), Ok(Status::Generation(_))));

    let sent = sut.send_token(ab::B, b"b", Some(3)).unwrap();
    assert!(sut.nodes()[sent].artificial);

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Generation).map_err(drop));
    assert_eq!("S(A B)", rendered_root(&sut));
    assert_eq!(Some(sent), sut.bindings().get(3));

    assert_eq!(
        Ok(Status::Reverted { steps: 0 }),
        sut.undo_to(0).map_err(drop)
    );
    assert_eq!(initial, sut.snapshot());
    assert!(sut.bindings().is_empty());
}

#[test]
fn pushed_tree_parsed_as_token() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "ag");
    let initial = sut.snapshot();

    assert!(matches!(sut.parse(Entry::Start), Ok(Status::Generation(_))));

    let tree = sut.push_tree(Node::artificial(ab::B, b"b"), false).unwrap();

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Generation).map_err(drop));
    assert_eq!("S(A B)", rendered_root(&sut));

    let root = sut.root().unwrap();
    assert_eq!(Some(tree), sut.nodes().children(root).nth(1));

    assert_eq!(
        Ok(Status::Reverted { steps: 0 }),
        sut.undo_to(0).map_err(drop)
    );
    assert_eq!(initial, sut.snapshot());
}

#[test]
fn undo_of_reinjected_subtree_keeps_its_children() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "ab");

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));

    let root = sut.root().unwrap();
    let live = sut.nodes().live();
    let steps = sut.steps();

    // The copy shares the children of the parsed tree.
    let copy = sut.nodes()[root].clone();
    sut.push_tree(copy, false).unwrap();
    assert_eq!(live + 1, sut.nodes().live());

    assert_eq!(
        Ok(Status::Reverted { steps }),
        sut.undo_to(steps).map_err(drop)
    );

    assert_eq!(live, sut.nodes().live());
    assert_eq!("S(A B)", sut.render(root));
}

#[test]
fn pre_eof_action_runs_once_per_end_of_input() {
    let (pda, fsm) = ab::tables(false, true);
    let mut sut = run(&pda, &fsm, "a");
    let initial = sut.snapshot();

    assert_eq!(
        Ok(Status::PreEof { region: 1 }),
        sut.parse(Entry::Start).map_err(drop)
    );

    sut.push_text(b"b").unwrap();

    // Input was produced since,
    //   so the new end of input runs the action again.
    assert_eq!(
        Ok(Status::PreEof { region: 1 }),
        sut.parse(Entry::PreEof).map_err(drop)
    );

    assert_eq!(Ok(Status::Done), sut.parse(Entry::PreEof).map_err(drop));
    assert_eq!("S(A B)", rendered_root(&sut));

    assert_eq!(
        Ok(Status::Reverted { steps: 0 }),
        sut.undo_to(0).map_err(drop)
    );
    assert_eq!(initial, sut.snapshot());
}

#[test]
fn discarded_ignore_freed_on_full_commit() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "a g");

    assert!(matches!(sut.parse(Entry::Start), Ok(Status::Generation(_))));
    assert_eq!(1, sut.snapshot().pending_ignore.len());

    sut.discard_ignore();
    sut.push_text(b"b").unwrap();

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Generation).map_err(drop));

    let root = sut.root().unwrap();
    let b = sut.nodes().children(root).nth(1).unwrap();
    assert_eq!(0, sut.nodes().ignores(b).count());

    let live = sut.nodes().live();
    sut.commit_full();

    assert_eq!(live - 1, sut.nodes().live());
    assert_eq!(0, sut.log_len());
    assert_eq!("S(A B)", rendered_root(&sut));
}

#[test]
fn undo_past_full_commit_fails() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "ab");

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
    sut.commit_full();

    match sut.undo_to(0) {
        Err(PdaError::Internal(InternalError::UndoPastStart {
            target: 0,
            steps: 5,
        })) => (),
        other => panic!("unexpected {other:?}"),
    }

    assert!(sut.is_aborted());
    assert!(matches!(sut.parse(Entry::Start), Err(PdaError::Aborted)));
}

#[test]
fn undo_forward_fails() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "ab");

    match sut.undo_to(3) {
        Err(PdaError::Internal(InternalError::UndoForward {
            target: 3,
            steps: 0,
        })) => (),
        other => panic!("unexpected {other:?}"),
    }

    assert!(sut.is_aborted());
}

#[test]
fn mismatched_entry_aborts() {
    let (pda, fsm) = ab::tables(false, false);
    let mut sut = run(&pda, &fsm, "ab");

    match sut.parse(Entry::Reduction) {
        Err(PdaError::Internal(InternalError::BadEntry {
            entry: Entry::Reduction,
            cont: Continuation::Start,
        })) => (),
        other => panic!("unexpected {other:?}"),
    }

    assert!(sut.is_aborted());
    assert!(matches!(sut.parse(Entry::Start), Err(PdaError::Aborted)));
}

#[test]
fn pool_exhaustion_aborts() {
    let (pda, fsm) = ab::tables(false, false);

    let config = RunConfig {
        pool_block_len: 1,
        pool_max_blocks: 1,
        ..Default::default()
    };
    let mut sut: Sut = start(&pda, &fsm, config, "a b");

    assert!(matches!(sut.parse(Entry::Start), Err(PdaError::Alloc(_))));
    assert!(sut.is_aborted());
    assert!(matches!(sut.parse(Entry::Start), Err(PdaError::Aborted)));
}

#[test]
fn zero_pool_block_len_still_parses() {
    let (pda, fsm) = ab::tables(false, false);

    let config = RunConfig {
        pool_block_len: 0,
        ..Default::default()
    };
    let mut sut: Sut = start(&pda, &fsm, config, "ab");

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
    assert_eq!("S(A B)", rendered_root(&sut));
}

#[test]
fn stop_target_finishes_fragment() {
    let (pda, fsm) = ab::tables(false, false);

    let config = RunConfig {
        stop_target: Some(ab::S),
        ..Default::default()
    };
    let mut sut: Sut = start(&pda, &fsm, config, "ab");

    assert_eq!(Ok(Status::Done), sut.parse(Entry::Start).map_err(drop));
    assert_eq!(4, sut.steps());
    assert_eq!("S(A B)", rendered_root(&sut));
}

#[test]
fn detach_returns_remaining_input() {
    let (pda, fsm) = ab::tables(false, false);

    let config = RunConfig {
        target_steps: Some(1),
        ..Default::default()
    };
    let mut sut: Sut = start(&pda, &fsm, config, "ab");

    assert_eq!(Ok(Status::Paused), sut.parse(Entry::Start).map_err(drop));

    let stream = sut.detach().unwrap();
    assert_eq!(b"b".to_vec(), stream.remaining_text());
    assert!(matches!(sut.detach(), Err(PdaError::Scan(_))));
}
