use std::fs;
use std::sync::Arc;

use scout_core::{MapDimensions, Position, Sighting, UnitId, UnitReport, VisionOracle};
use scout_runtime::{
    BoardKey, BoardRepository, FileBoardRepository, InMemoryBoardRepository, Runtime,
    RuntimeConfig,
};

struct TowerAt(Position);

impl VisionOracle for TowerAt {
    fn sighting(&self, position: Position) -> Sighting {
        if position == self.0 {
            Sighting::Tower
        } else {
            Sighting::Empty
        }
    }
}

const DIMS: MapDimensions = MapDimensions::new(12, 12);
const START: Position = Position::new(2, 2);

fn units() -> [(UnitId, Position); 1] {
    [(UnitId(1), START)]
}

/// Runs a short episode that sees a tower at (3, 3) and takes one hit.
fn play(runtime: &Runtime) -> scout_core::ProbabilityGrid {
    let mut episode = runtime.start_episode(DIMS, &units()).unwrap();
    let vision = TowerAt(Position::new(3, 3));
    for health in [20, 20, 16] {
        episode
            .observe(&[UnitReport::new(UnitId(1), START, health)], &vision)
            .unwrap();
        episode.advance();
    }
    runtime.finish_episode(episode).unwrap()
}

#[test]
fn learned_board_seeds_the_next_episode() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig {
        persistent: true,
        save_dir: Some(dir.path().to_path_buf()),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::new(config).unwrap();

    let learned = play(&runtime);
    assert_eq!(learned.probability(Position::new(3, 3)).unwrap(), 1.0);

    let resumed = runtime.start_episode(DIMS, &units()).unwrap();
    assert!(resumed.resumed());
    assert!(!resumed.tracker().is_exploring());
    assert_eq!(resumed.grid(), &learned);
    assert_eq!(resumed.grid().cell(START).unwrap().hit_count(), 1);
    assert_eq!(resumed.grid().cell(START).unwrap().visit_count(), 3);
}

#[test]
fn different_units_do_not_share_a_board() {
    let repository = Arc::new(InMemoryBoardRepository::new());
    let runtime = Runtime::with_repository(RuntimeConfig::default(), repository.clone());
    play(&runtime);

    let other = [(UnitId(2), START)];
    let episode = runtime.start_episode(DIMS, &other).unwrap();
    assert!(episode.tracker().is_exploring());
    assert_eq!(repository.list_keys().unwrap(), vec!["12x12_4"]);
}

#[test]
fn corrupted_board_falls_back_to_a_fresh_prior() {
    let dir = tempfile::tempdir().unwrap();
    let repository = Arc::new(FileBoardRepository::new(dir.path()).unwrap());
    let runtime = Runtime::with_repository(RuntimeConfig::default(), repository.clone());
    play(&runtime);

    let key = BoardKey::new(DIMS, units());
    let path = dir.path().join(format!("board_{}.bin", key));
    fs::write(&path, b"not a board").unwrap();

    let episode = runtime.start_episode(DIMS, &units()).unwrap();
    assert!(episode.tracker().is_exploring());
    assert_eq!(
        episode.grid().probability(Position::new(3, 3)).unwrap(),
        RuntimeConfig::default().scout.initial_tower_density
    );
}

#[test]
fn board_with_other_dimensions_is_ignored() {
    let repository = Arc::new(InMemoryBoardRepository::new());
    let key = BoardKey::new(DIMS, units());
    repository
        .save(&key, &scout_core::ProbabilityGrid::new(MapDimensions::new(3, 3), 0.5))
        .unwrap();

    let runtime = Runtime::with_repository(RuntimeConfig::default(), repository);
    let episode = runtime.start_episode(DIMS, &units()).unwrap();
    assert_eq!(episode.grid().dimensions(), DIMS);
    assert!(episode.tracker().is_exploring());
}
