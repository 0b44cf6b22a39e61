//! Shared project fixtures

use scriptwright_core::{
    ActId, EntityId, NewAct, NewProject, NewScene, NewSequence, OwnerId, OwnershipGate,
    Placement, ProjectScope, Repository, SceneId, SequenceId,
};

/// An empty project and the scope to work in it
pub struct Fixture {
    pub repo: Repository,
    pub scope: ProjectScope,
    #[allow(dead_code)]
    pub owner: OwnerId,
}

pub fn empty_project() -> Fixture {
    let mut repo = Repository::in_memory().expect("in-memory repository");
    let owner = OwnerId::new("writer-1");
    let project = repo
        .create_project(NewProject::new(owner.clone(), "Fixture"))
        .expect("create project");
    let scope = repo.authorize(&owner, project.id).expect("authorize");
    Fixture { repo, scope, owner }
}

/// Project with `count` acts titled "Act 1".."Act n"
#[allow(dead_code)]
pub fn with_acts(count: usize) -> (Fixture, Vec<ActId>) {
    let mut fx = empty_project();
    let ids = (1..=count)
        .map(|n| {
            fx.repo
                .create_act(&fx.scope, NewAct::new(format!("Act {n}")))
                .expect("create act")
                .id
        })
        .collect();
    (fx, ids)
}

/// `count` sequences appended to `act`
#[allow(dead_code)]
pub fn add_sequences(fx: &mut Fixture, act: ActId, count: usize) -> Vec<SequenceId> {
    (1..=count)
        .map(|n| {
            fx.repo
                .create_sequence(&fx.scope, act, NewSequence::new(format!("Sequence {n}")))
                .expect("create sequence")
                .id
        })
        .collect()
}

/// `count` scenes appended to `sequence`
#[allow(dead_code)]
pub fn add_scenes(fx: &mut Fixture, sequence: SequenceId, count: usize) -> Vec<SceneId> {
    (1..=count)
        .map(|n| {
            fx.repo
                .create_scene(&fx.scope, sequence, NewScene::new(format!("Scene {n}")))
                .expect("create scene")
                .id
        })
        .collect()
}

/// Ids in placement order
#[allow(dead_code)]
pub fn ids<I: EntityId>(placements: &[Placement<I>]) -> Vec<I> {
    placements.iter().map(|p| p.id).collect()
}

/// Positions are exactly 1..=n in order
#[allow(dead_code)]
pub fn assert_dense<I: EntityId>(placements: &[Placement<I>]) {
    let positions: Vec<i64> = placements.iter().map(|p| p.position).collect();
    let expected: Vec<i64> = (1..=placements.len() as i64).collect();
    assert_eq!(positions, expected, "positions are not dense");
}
