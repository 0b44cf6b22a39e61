//! Moving sequences between acts and scenes between sequences

mod common;

use common::fixtures::{add_scenes, add_sequences, assert_dense, ids, with_acts, Fixture};
use scriptwright_core::{
    ActId, NewProject, NodeKind, OwnerId, OwnershipGate, ReparentOutcome, SceneId, ScriptError,
    SequenceId, ValidationError,
};

fn sequence_order(fx: &Fixture, act: ActId) -> Vec<(SequenceId, i64)> {
    fx.repo
        .sequences_in_act(&fx.scope, act)
        .unwrap()
        .into_iter()
        .map(|s| (s.id, s.position))
        .collect()
}

fn scene_order(fx: &Fixture, sequence: SequenceId) -> Vec<(SceneId, i64)> {
    fx.repo
        .scenes_in_sequence(&fx.scope, sequence)
        .unwrap()
        .into_iter()
        .map(|s| (s.id, s.position))
        .collect()
}

/// Act A with three sequences (the middle one holding two scenes), act B
/// with two sequences
fn two_acts() -> (Fixture, ActId, ActId, Vec<SequenceId>, Vec<SequenceId>) {
    let (mut fx, acts) = with_acts(2);
    let in_a = add_sequences(&mut fx, acts[0], 3);
    let in_b = add_sequences(&mut fx, acts[1], 2);
    add_scenes(&mut fx, in_a[1], 2);
    (fx, acts[0], acts[1], in_a, in_b)
}

#[test]
fn test_sequence_moves_to_front_of_other_act() {
    let (mut fx, act_a, act_b, in_a, in_b) = two_acts();
    let moved = in_a[1];

    let outcome = fx
        .repo
        .move_sequence_to_act(&fx.scope, moved, act_b, Some(1))
        .unwrap();

    let report = outcome.report().expect("sequence should have moved");
    assert_eq!((report.from.parent, report.from.position), (act_a, 2));
    assert_eq!((report.to.parent, report.to.position), (act_b, 1));
    assert_eq!(report.descendants_synced, 2);
    assert_eq!(ids(&report.source_siblings), [in_a[0], in_a[2]]);
    assert_dense(&report.source_siblings);
    assert_eq!(ids(&report.target_siblings), [moved, in_b[0], in_b[1]]);
    assert_dense(&report.target_siblings);

    assert_eq!(sequence_order(&fx, act_a), [(in_a[0], 1), (in_a[2], 2)]);
    assert_eq!(
        sequence_order(&fx, act_b),
        [(moved, 1), (in_b[0], 2), (in_b[1], 3)]
    );

    let sequence = fx.repo.get_sequence(&fx.scope, moved).unwrap();
    assert_eq!(sequence.act_id, act_b);
    for scene in fx.repo.scenes_in_sequence(&fx.scope, moved).unwrap() {
        assert_eq!(scene.act_id, act_b);
        assert_eq!(scene.project_id, fx.scope.project_id());
    }
    assert!(fx.repo.check_integrity().unwrap().is_clean());
}

#[test]
fn test_sequence_appends_without_position() {
    let (mut fx, _, act_b, in_a, in_b) = two_acts();

    fx.repo
        .move_sequence_to_act(&fx.scope, in_a[0], act_b, None)
        .unwrap();

    assert_eq!(
        sequence_order(&fx, act_b),
        [(in_b[0], 1), (in_b[1], 2), (in_a[0], 3)]
    );
}

#[test]
fn test_position_one_past_end_is_allowed() {
    let (mut fx, _, act_b, in_a, _) = two_acts();

    let outcome = fx
        .repo
        .move_sequence_to_act(&fx.scope, in_a[2], act_b, Some(3))
        .unwrap();

    assert_eq!(outcome.report().unwrap().to.position, 3);
}

#[test]
fn test_position_beyond_end_is_rejected() {
    let (mut fx, act_a, act_b, in_a, in_b) = two_acts();

    let err = fx
        .repo
        .move_sequence_to_act(&fx.scope, in_a[0], act_b, Some(4))
        .unwrap_err();

    assert!(matches!(
        err,
        ScriptError::Validation(ValidationError::PositionOutOfRange { position: 4, max: 3 })
    ));
    assert_eq!(sequence_order(&fx, act_a).len(), 3);
    assert_eq!(sequence_order(&fx, act_b), [(in_b[0], 1), (in_b[1], 2)]);
}

#[test]
fn test_non_positive_position_is_rejected() {
    let (mut fx, _, act_b, in_a, _) = two_acts();

    for position in [0, -3] {
        let err = fx
            .repo
            .move_sequence_to_act(&fx.scope, in_a[0], act_b, Some(position))
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Validation(ValidationError::NonPositivePosition(p)) if p == position
        ));
    }
}

#[test]
fn test_same_parent_is_unchanged() {
    let (mut fx, act_a, _, in_a, _) = two_acts();
    let before = sequence_order(&fx, act_a);

    let outcome = fx
        .repo
        .move_sequence_to_act(&fx.scope, in_a[1], act_a, None)
        .unwrap();

    match outcome {
        ReparentOutcome::Unchanged { slot } => {
            assert_eq!((slot.parent, slot.position), (act_a, 2));
        }
        other => panic!("expected unchanged, got {other:?}"),
    }
    assert_eq!(sequence_order(&fx, act_a), before);
}

#[test]
fn test_missing_target_act_is_not_found() {
    let (mut fx, act_a, _, in_a, _) = two_acts();

    let err = fx
        .repo
        .move_sequence_to_act(&fx.scope, in_a[0], ActId::new(), None)
        .unwrap_err();

    assert!(matches!(
        err,
        ScriptError::NotFound {
            kind: NodeKind::Act,
            ..
        }
    ));
    assert_eq!(sequence_order(&fx, act_a).len(), 3);
}

#[test]
fn test_target_act_in_other_project_is_not_found() {
    let (mut fx, act_a, _, in_a, _) = two_acts();

    let stranger = OwnerId::new("writer-2");
    let theirs = fx
        .repo
        .create_project(NewProject::new(stranger.clone(), "Other"))
        .unwrap();
    let their_scope = fx.repo.authorize(&stranger, theirs.id).unwrap();
    let their_act = fx
        .repo
        .create_act(&their_scope, scriptwright_core::NewAct::new("Theirs"))
        .unwrap();

    let err = fx
        .repo
        .move_sequence_to_act(&fx.scope, in_a[0], their_act.id, None)
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(sequence_order(&fx, act_a).len(), 3);
    assert!(fx
        .repo
        .sequences_in_act(&their_scope, their_act.id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_failed_cascade_rolls_back_everything() {
    let (mut fx, act_a, act_b, in_a, in_b) = two_acts();
    let before_a = sequence_order(&fx, act_a);
    let before_b = sequence_order(&fx, act_b);

    // Abort the scene cascade after the sequence itself has been rewritten
    fx.repo
        .connection()
        .execute_batch(
            "CREATE TRIGGER block_scene_sync BEFORE UPDATE OF act_id ON scenes
             BEGIN SELECT RAISE(ABORT, 'scene sync blocked'); END;",
        )
        .unwrap();

    let err = fx
        .repo
        .move_sequence_to_act(&fx.scope, in_a[1], act_b, Some(1))
        .unwrap_err();
    assert!(matches!(err, ScriptError::ConstraintViolation(_)), "{err:?}");

    assert_eq!(sequence_order(&fx, act_a), before_a);
    assert_eq!(sequence_order(&fx, act_b), before_b);
    assert_eq!(before_b, [(in_b[0], 1), (in_b[1], 2)]);
    for scene in fx.repo.scenes_in_sequence(&fx.scope, in_a[1]).unwrap() {
        assert_eq!(scene.act_id, act_a);
    }
    assert!(fx.repo.check_integrity().unwrap().is_clean());
}

#[test]
fn test_scene_moves_across_acts() {
    let (mut fx, _, act_b, in_a, in_b) = two_acts();
    let scenes = fx.repo.scenes_in_sequence(&fx.scope, in_a[1]).unwrap();
    let target_scenes = add_scenes(&mut fx, in_b[0], 2);

    let outcome = fx
        .repo
        .move_scene_to_sequence(&fx.scope, scenes[0].id, in_b[0], Some(2))
        .unwrap();

    let report = outcome.report().unwrap();
    assert_eq!(report.descendants_synced, 0);
    assert_eq!(
        ids(&report.target_siblings),
        [target_scenes[0], scenes[0].id, target_scenes[1]]
    );
    assert_eq!(ids(&report.source_siblings), [scenes[1].id]);
    assert_dense(&report.source_siblings);

    let moved = fx.repo.get_scene(&fx.scope, scenes[0].id).unwrap();
    assert_eq!(moved.sequence_id, in_b[0]);
    assert_eq!(moved.act_id, act_b);
    assert_eq!(moved.position, 2);
}

#[test]
fn test_scene_into_empty_sequence() {
    let (mut fx, _, _, in_a, in_b) = two_acts();
    let scenes = fx.repo.scenes_in_sequence(&fx.scope, in_a[1]).unwrap();

    let outcome = fx
        .repo
        .move_scene_to_sequence(&fx.scope, scenes[1].id, in_b[1], Some(1))
        .unwrap();

    let report = outcome.report().unwrap();
    assert_eq!(ids(&report.target_siblings), [scenes[1].id]);
    assert_eq!(report.to.position, 1);

    let err = fx
        .repo
        .move_scene_to_sequence(&fx.scope, scenes[0].id, in_b[1], Some(3))
        .unwrap_err();
    assert!(matches!(
        err,
        ScriptError::Validation(ValidationError::PositionOutOfRange { .. })
    ));
}

#[test]
fn test_scene_same_sequence_is_unchanged() {
    let (mut fx, _, _, in_a, _) = two_acts();
    let before = scene_order(&fx, in_a[1]);

    let outcome = fx
        .repo
        .move_scene_to_sequence(&fx.scope, before[1].0, in_a[1], Some(1))
        .unwrap();
    match outcome {
        ReparentOutcome::Unchanged { slot } => {
            assert_eq!((slot.parent, slot.position), (in_a[1], 2));
        }
        other => panic!("expected unchanged, got {other:?}"),
    }

    let err = fx
        .repo
        .move_scene_to_sequence(&fx.scope, before[0].0, in_a[1], Some(3))
        .unwrap_err();
    assert!(matches!(
        err,
        ScriptError::Validation(ValidationError::PositionOutOfRange { position: 3, max: 2 })
    ));
    assert_eq!(scene_order(&fx, in_a[1]), before);
}

#[test]
fn test_failed_scene_move_rolls_back_everything() {
    let (mut fx, act_a, _, in_a, in_b) = two_acts();
    let target = add_scenes(&mut fx, in_b[0], 2);
    let before_source = scene_order(&fx, in_a[1]);
    let before_target = scene_order(&fx, in_b[0]);

    // Abort the parent change after the destination has made room
    fx.repo
        .connection()
        .execute_batch(
            "CREATE TRIGGER block_scene_move BEFORE UPDATE OF sequence_id ON scenes
             BEGIN SELECT RAISE(ABORT, 'scene move blocked'); END;",
        )
        .unwrap();

    let err = fx
        .repo
        .move_scene_to_sequence(&fx.scope, before_source[0].0, in_b[0], Some(1))
        .unwrap_err();
    assert!(matches!(err, ScriptError::ConstraintViolation(_)), "{err:?}");

    assert_eq!(scene_order(&fx, in_a[1]), before_source);
    assert_eq!(scene_order(&fx, in_b[0]), before_target);
    assert_eq!(before_target, [(target[0], 1), (target[1], 2)]);
    let scene = fx.repo.get_scene(&fx.scope, before_source[0].0).unwrap();
    assert_eq!(scene.sequence_id, in_a[1]);
    assert_eq!(scene.act_id, act_a);
    assert!(fx.repo.check_integrity().unwrap().is_clean());
}
