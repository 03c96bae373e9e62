//! Element lifetime tests for TieredVec.
//!
//! `Tracked` values report constructions, clones and drops to a counter set
//! handed to each fixture, so every test observes only its own values.

use std::cell::Cell;
use std::rc::Rc;

use tiered_vec::TieredVec;

#[derive(Default, Debug)]
struct Calls {
    constructions: Cell<usize>,
    clones: Cell<usize>,
    drops: Cell<usize>,
}

impl Calls {
    fn snapshot(&self) -> (usize, usize, usize) {
        (self.constructions.get(), self.clones.get(), self.drops.get())
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

#[derive(Debug)]
struct Tracked {
    calls: Rc<Calls>,
    id: usize,
}

impl Tracked {
    fn new(calls: &Rc<Calls>, id: usize) -> Self {
        bump(&calls.constructions);
        Self {
            calls: Rc::clone(calls),
            id,
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        bump(&self.calls.clones);
        Self {
            calls: Rc::clone(&self.calls),
            id: self.id,
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        bump(&self.calls.drops);
    }
}

fn filled<const N: u32>(calls: &Rc<Calls>, count: usize) -> TieredVec<Tracked, N> {
    let mut vec = TieredVec::new();
    for id in 0..count {
        vec.push(Tracked::new(calls, id));
    }
    vec
}

#[test]
fn test_push_moves_in() {
    let calls = Rc::new(Calls::default());
    let mut vec: TieredVec<Tracked> = TieredVec::new();

    vec.push(Tracked::new(&calls, 0));
    assert_eq!(calls.snapshot(), (1, 0, 0));

    // crossing block boundaries never copies or drops stored values
    for id in 1..200 {
        vec.push(Tracked::new(&calls, id));
    }
    assert_eq!(calls.snapshot(), (200, 0, 0));
}

#[test]
fn test_pop_moves_out() {
    let calls = Rc::new(Calls::default());
    let mut vec = filled::<0>(&calls, 5);

    let popped = vec.pop().expect("vector is not empty");
    assert_eq!(popped.id, 4);
    assert_eq!(calls.snapshot(), (5, 0, 0));

    drop(popped);
    assert_eq!(calls.drops.get(), 1);

    drop(vec);
    assert_eq!(calls.snapshot(), (5, 0, 5));
}

#[test]
fn test_drop_destroys_live_elements_once() {
    for count in [0, 1, 2, 3, 4, 7, 8, 33, 100, 257] {
        let calls = Rc::new(Calls::default());
        let vec = filled::<0>(&calls, count);
        drop(vec);
        assert_eq!(calls.drops.get(), count, "count {}", count);

        let calls = Rc::new(Calls::default());
        let vec = filled::<2>(&calls, count);
        drop(vec);
        assert_eq!(calls.drops.get(), count, "count {} with 4-slot segments", count);
    }
}

#[test]
fn test_drop_after_pops() {
    let calls = Rc::new(Calls::default());
    let mut vec = filled::<1>(&calls, 100);
    for _ in 0..37 {
        vec.pop();
    }
    assert_eq!(calls.drops.get(), 37);
    drop(vec);
    assert_eq!(calls.snapshot(), (100, 0, 100));
}

#[test]
fn test_clear_and_truncate() {
    let calls = Rc::new(Calls::default());
    let mut vec = filled::<0>(&calls, 50);

    vec.truncate(20);
    assert_eq!(calls.drops.get(), 30);
    assert_eq!(vec.back().map(|t| t.id), Some(19));

    vec.clear();
    assert_eq!(calls.drops.get(), 50);
    assert!(vec.is_empty());

    vec.push(Tracked::new(&calls, 50));
    drop(vec);
    assert_eq!(calls.snapshot(), (51, 0, 51));
}

#[test]
fn test_clone_copies_each_element() {
    let calls = Rc::new(Calls::default());
    let vec = filled::<0>(&calls, 12);
    let copy = vec.clone();
    assert_eq!(calls.clones.get(), 12);
    assert!(copy.iter().map(|t| t.id).eq(0..12));

    drop(vec);
    drop(copy);
    assert_eq!(calls.drops.get(), 24);
}

#[test]
fn test_into_element_drops_the_rest() {
    let calls = Rc::new(Calls::default());
    let vec = filled::<0>(&calls, 10);

    let kept = vec.into_element(6).expect("index in bounds");
    assert_eq!(kept.id, 6);
    assert_eq!(calls.drops.get(), 9);

    drop(kept);
    assert_eq!(calls.snapshot(), (10, 0, 10));
}

#[test]
fn test_access_forms_share_addressing() {
    let calls = Rc::new(Calls::default());
    let mut vec = filled::<1>(&calls, 9);

    let shared = vec.get(5).map(|t| t as *const Tracked);
    let exclusive = vec.get_mut(5).map(|t| t as *mut Tracked as *const Tracked);
    assert_eq!(shared, exclusive);

    let owned = vec.into_element(5).map(|t| t.id);
    assert_eq!(owned, Some(5));
    assert_eq!(calls.snapshot(), (9, 0, 9));
}
