//! Property tests: any mix of operations leaves every sibling set dense
//!
//! Each case replays random operations against the repository and a plain
//! `Vec` model, then compares order and positions after every step.

mod common;

use common::fixtures::{add_sequences, empty_project, with_acts, Fixture};
use proptest::prelude::*;
use scriptwright_core::{ActId, NewAct, SequenceId};

#[derive(Debug, Clone)]
enum ActOp {
    Append,
    MoveLeft(usize),
    MoveRight(usize),
    Delete(usize),
    Rotate(usize),
}

fn act_op() -> impl Strategy<Value = ActOp> {
    prop_oneof![
        2 => Just(ActOp::Append),
        1 => any::<usize>().prop_map(ActOp::MoveLeft),
        1 => any::<usize>().prop_map(ActOp::MoveRight),
        1 => any::<usize>().prop_map(ActOp::Delete),
        1 => any::<usize>().prop_map(ActOp::Rotate),
    ]
}

fn stored_acts(fx: &Fixture) -> Vec<(ActId, i64)> {
    fx.repo
        .acts(&fx.scope)
        .unwrap()
        .into_iter()
        .map(|a| (a.id, a.position))
        .collect()
}

fn expected(model: &[ActId]) -> Vec<(ActId, i64)> {
    model
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as i64 + 1))
        .collect()
}

fn stored_sequences(fx: &Fixture, act: ActId) -> Vec<(SequenceId, i64)> {
    fx.repo
        .sequences_in_act(&fx.scope, act)
        .unwrap()
        .into_iter()
        .map(|s| (s.id, s.position))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_act_operations_match_model(ops in prop::collection::vec(act_op(), 1..25)) {
        let mut fx = empty_project();
        let mut model: Vec<ActId> = Vec::new();

        for op in ops {
            match op {
                ActOp::Append => {
                    let act = fx.repo.create_act(&fx.scope, NewAct::new("Act")).unwrap();
                    model.push(act.id);
                }
                _ if model.is_empty() => continue,
                ActOp::MoveLeft(i) => {
                    let i = i % model.len();
                    let outcome = fx.repo.move_act_left(&fx.scope, model[i]).unwrap();
                    prop_assert_eq!(outcome.is_noop(), i == 0);
                    if i > 0 {
                        model.swap(i, i - 1);
                    }
                }
                ActOp::MoveRight(i) => {
                    let i = i % model.len();
                    let outcome = fx.repo.move_act_right(&fx.scope, model[i]).unwrap();
                    prop_assert_eq!(outcome.is_noop(), i + 1 == model.len());
                    if i + 1 < model.len() {
                        model.swap(i, i + 1);
                    }
                }
                ActOp::Delete(i) => {
                    let id = model.remove(i % model.len());
                    fx.repo.delete_act(&fx.scope, id).unwrap();
                }
                ActOp::Rotate(k) => {
                    let k = k % model.len();
                    model.rotate_left(k);
                    fx.repo.reorder_acts(&fx.scope, &model).unwrap();
                }
            }
            prop_assert_eq!(stored_acts(&fx), expected(&model));
        }
    }

    #[test]
    fn test_sequence_moves_conserve_and_stay_dense(
        moves in prop::collection::vec((any::<usize>(), any::<bool>(), any::<usize>()), 1..15)
    ) {
        let (mut fx, acts) = with_acts(2);
        add_sequences(&mut fx, acts[0], 3);
        add_sequences(&mut fx, acts[1], 2);

        for (pick, to_first, slot) in moves {
            let source = if to_first { acts[1] } else { acts[0] };
            let target = if to_first { acts[0] } else { acts[1] };
            let candidates = stored_sequences(&fx, source);
            if candidates.is_empty() {
                continue;
            }
            let (sequence, _) = candidates[pick % candidates.len()];
            let room = stored_sequences(&fx, target).len() + 1;
            let position = (slot % room) as i64 + 1;

            let outcome = fx
                .repo
                .move_sequence_to_act(&fx.scope, sequence, target, Some(position))
                .unwrap();
            prop_assert_eq!(outcome.report().unwrap().to.position, position);

            let in_source = stored_sequences(&fx, source);
            let in_target = stored_sequences(&fx, target);
            prop_assert_eq!(in_source.len() + in_target.len(), 5);
            for list in [&in_source, &in_target] {
                let positions: Vec<i64> = list.iter().map(|(_, p)| *p).collect();
                prop_assert_eq!(positions, (1..=list.len() as i64).collect::<Vec<_>>());
            }
            prop_assert!(in_target.contains(&(sequence, position)));
        }
        prop_assert!(fx.repo.check_integrity().unwrap().is_clean());
    }
}
