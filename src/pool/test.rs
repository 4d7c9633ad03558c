// Tests for the pool allocator
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

#[test]
fn alloc_returns_distinct_live_ids() {
    let mut sut = Pool::with_limits(4, 8);

    let a = sut.alloc("a").unwrap();
    let b = sut.alloc("b").unwrap();

    assert_ne!(a, b);
    assert_eq!("a", sut[a]);
    assert_eq!("b", sut[b]);
    assert_eq!(2, sut.live());
}

#[test]
fn zero_block_len_holds_one_slot_per_block() {
    let mut sut = Pool::with_limits(0, 2);

    sut.alloc(1).unwrap();
    sut.alloc(2).unwrap();

    assert_eq!(2, sut.blocks());
    assert!(matches!(sut.alloc(3), Err(AllocError::BlockLimit(2))));
}

#[test]
fn free_returns_value_and_recycles_slot() {
    let mut sut = Pool::with_limits(4, 8);

    let a = sut.alloc(1).unwrap();
    let _b = sut.alloc(2).unwrap();

    assert_eq!(Some(1), sut.free(a));
    assert_eq!(None, sut.get(a));
    assert_eq!(1, sut.live());

    // The freelist is LIFO,
    //   so the most recently freed slot is reused first.
    let c = sut.alloc(3).unwrap();
    assert_eq!(a, c);
    assert_eq!(3, sut[c]);
}

#[test]
fn double_free_is_refused() {
    let mut sut = Pool::with_limits(4, 8);

    let a = sut.alloc(1).unwrap();
    let b = sut.alloc(2).unwrap();

    assert_eq!(Some(1), sut.free(a));
    assert_eq!(None, sut.free(a));

    // The freelist must not have been corrupted by the second free:
    //   one allocation reuses `a` and the next carves a fresh slot.
    let c = sut.alloc(3).unwrap();
    let d = sut.alloc(4).unwrap();

    assert_eq!(a, c);
    assert_ne!(b, d);
    assert_ne!(c, d);
}

#[test]
fn allocates_new_block_when_current_is_full() {
    let mut sut = Pool::with_limits(2, 8);

    sut.alloc(()).unwrap();
    sut.alloc(()).unwrap();
    assert_eq!(1, sut.blocks());

    sut.alloc(()).unwrap();
    assert_eq!(2, sut.blocks());
    assert_eq!(4, sut.capacity());
}

#[test]
fn freelist_preferred_over_new_block() {
    let mut sut = Pool::with_limits(2, 1);

    let a = sut.alloc(()).unwrap();
    sut.alloc(()).unwrap();
    sut.free(a);

    assert_eq!(Ok(a), sut.alloc(()));
    assert_eq!(1, sut.blocks());
}

#[test]
fn exhaustion_is_an_alloc_error() {
    let mut sut = Pool::with_limits(2, 1);

    sut.alloc(()).unwrap();
    sut.alloc(()).unwrap();

    assert_eq!(Err(AllocError::BlockLimit(1)), sut.alloc(()));
}

#[test]
#[should_panic]
fn index_of_freed_slot_panics() {
    let mut sut = Pool::with_limits(2, 1);

    let a = sut.alloc(5).unwrap();
    sut.free(a);

    let _ = sut[a];
}

#[test]
fn ids_span_blocks() {
    let mut sut = Pool::with_limits(3, 4);

    let ids = (0..10)
        .map(|i| sut.alloc(i).unwrap())
        .collect::<Vec<_>>();

    ids.iter()
        .enumerate()
        .for_each(|(i, id)| assert_eq!(i, sut[*id]));
}
