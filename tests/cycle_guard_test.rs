//! Termination on cyclic host graphs.

mod common;

use rstest::rstest;
use treewalk::domain::{MaxLevel, Walker, WalkerResult};
use treewalk::util::testing;

use common::{RingNode, RingWalker};

/// Follow first children from the root until a node has none.
fn chain_length(walker: &mut Walker<RingWalker>) -> WalkerResult<usize> {
    let mut current = walker.root();
    let mut length = 1;
    while let Some(child) = walker.child(current, 0)? {
        current = child;
        length += 1;
    }
    Ok(length)
}

fn ring(size: u64) -> RingNode {
    RingNode { id: 0, size }
}

#[rstest]
#[case(0, 4)]
#[case(1, 7)]
#[case(2, 10)]
#[case(5, 19)]
fn given_ring_of_three_when_walking_unbounded_then_budget_limits_revisits(
    #[case] budget: usize,
    #[case] expected_length: usize,
) -> WalkerResult<()> {
    testing::init_test_setup();
    let mut walker = Walker::<RingWalker>::builder()
        .item(ring(3))
        .revisit_budget(budget)
        .build();

    assert_eq!(chain_length(&mut walker)?, expected_length);
    Ok(())
}

#[test]
fn given_default_guard_when_walking_ring_then_terminates() -> WalkerResult<()> {
    testing::init_test_setup();
    let mut walker = Walker::<RingWalker>::build(Some(ring(2)), None, MaxLevel::Unbounded, None);

    let length = chain_length(&mut walker)?;

    assert_eq!(length, 7, "two items, each expanding three times");
    let guard = walker.cycle_guard().expect("guard installed by default");
    assert_eq!(guard.revisits(&ring(2)), Some(3));
    Ok(())
}

#[test]
fn given_self_loop_when_walking_then_refused_after_budget() -> WalkerResult<()> {
    testing::init_test_setup();
    let mut walker = Walker::<RingWalker>::builder()
        .item(ring(1))
        .revisit_budget(1)
        .build();

    assert_eq!(chain_length(&mut walker)?, 3);
    Ok(())
}

#[test]
fn given_no_guard_and_depth_bound_when_walking_ring_then_depth_limits_walk() -> WalkerResult<()> {
    testing::init_test_setup();
    let mut walker = Walker::<RingWalker>::builder()
        .item(ring(3))
        .max_level(MaxLevel::Bounded(20))
        .without_cycle_guard()
        .build();

    assert_eq!(chain_length(&mut walker)?, 21);
    assert!(walker.cycle_guard().is_none());
    Ok(())
}

#[test]
fn given_depth_bound_below_cycle_when_walking_then_guard_never_triggers() -> WalkerResult<()> {
    testing::init_test_setup();
    let mut walker = Walker::<RingWalker>::builder()
        .item(ring(10))
        .max_level(MaxLevel::Bounded(4))
        .revisit_budget(0)
        .build();

    assert_eq!(chain_length(&mut walker)?, 5);
    let guard = walker.cycle_guard().expect("guard installed");
    assert_eq!(guard.revisits(&ring(10)), Some(0));
    Ok(())
}
