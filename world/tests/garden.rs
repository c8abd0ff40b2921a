use garden_planner_core::{
    Command, Coord, Event, GridSize, LockError, MoveError, PlacementError, PlacementId,
    RemovalError, UnlockError,
};
use garden_planner_world::{self as world, query, Garden};

fn run(garden: &mut Garden, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(garden, command, &mut events);
    events
}

fn unlocked_block(rows: u32, columns: u32) -> Garden {
    let mut garden = Garden::new();
    for row in 0..rows {
        for column in 0..columns {
            let events = run(
                &mut garden,
                Command::UnlockCell {
                    cell: Coord::new(row, column),
                },
            );
            assert!(
                matches!(events.as_slice(), [Event::CellUnlocked { .. }]),
                "row-major unlocks of a block are always adjacent: {events:?}"
            );
        }
    }
    garden
}

fn place(garden: &mut Garden, origin: Coord, size: u32) -> PlacementId {
    let events = run(
        garden,
        Command::PlaceItem {
            item_type: "carrot".to_owned(),
            origin,
            size,
        },
    );
    match events.as_slice() {
        [Event::PlacementCreated { placement }] => placement.id,
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn unlock_requires_adjacency_after_seed() {
    let mut garden = Garden::new();

    assert_eq!(
        run(
            &mut garden,
            Command::UnlockCell {
                cell: Coord::new(4, 4)
            }
        ),
        vec![Event::CellUnlocked {
            cell: Coord::new(4, 4)
        }],
        "the seed cell unlocks unconditionally"
    );

    assert_eq!(
        run(
            &mut garden,
            Command::UnlockCell {
                cell: Coord::new(5, 5)
            }
        ),
        vec![Event::UnlockRejected {
            cell: Coord::new(5, 5),
            reason: UnlockError::NotAdjacent,
        }],
        "diagonal cells are not adjacent"
    );

    assert_eq!(
        run(
            &mut garden,
            Command::UnlockCell {
                cell: Coord::new(4, 4)
            }
        ),
        vec![Event::UnlockRejected {
            cell: Coord::new(4, 4),
            reason: UnlockError::AlreadyUnlocked,
        }]
    );

    assert_eq!(
        run(
            &mut garden,
            Command::UnlockCell {
                cell: Coord::new(4, 10)
            }
        ),
        vec![Event::UnlockRejected {
            cell: Coord::new(4, 10),
            reason: UnlockError::OutOfBounds,
        }]
    );

    assert_eq!(query::unlocked_cells(&garden).len(), 1);
}

#[test]
fn placement_requires_unlocked_footprint() {
    let mut garden = unlocked_block(2, 2);

    let events = run(
        &mut garden,
        Command::PlaceItem {
            item_type: "pumpkin".to_owned(),
            origin: Coord::new(1, 1),
            size: 2,
        },
    );

    assert_eq!(
        events,
        vec![Event::PlacementRejected {
            origin: Coord::new(1, 1),
            size: 2,
            reason: PlacementError::LockedCell,
        }]
    );
    assert!(query::placements(&garden).is_empty());

    let id = place(&mut garden, Coord::new(0, 0), 2);
    assert_eq!(
        query::placement_at(&garden, Coord::new(1, 1)).map(|placement| placement.id),
        Some(id)
    );
}

#[test]
fn locking_an_occupied_cell_is_rejected() {
    let mut garden = unlocked_block(3, 3);
    let id = place(&mut garden, Coord::new(1, 1), 1);

    assert_eq!(
        run(
            &mut garden,
            Command::LockCell {
                cell: Coord::new(1, 1)
            }
        ),
        vec![Event::LockRejected {
            cell: Coord::new(1, 1),
            reason: LockError::Occupied { placement: id },
        }]
    );

    assert_eq!(
        run(
            &mut garden,
            Command::LockCell {
                cell: Coord::new(2, 2)
            }
        ),
        vec![Event::CellLocked {
            cell: Coord::new(2, 2)
        }]
    );
    assert!(!query::is_unlocked(&garden, Coord::new(2, 2)));

    assert_eq!(
        run(
            &mut garden,
            Command::LockCell {
                cell: Coord::new(2, 2)
            }
        ),
        vec![Event::LockRejected {
            cell: Coord::new(2, 2),
            reason: LockError::NotUnlocked,
        }]
    );
}

#[test]
fn moving_onto_a_neighbor_is_rejected_as_overlap() {
    let mut garden = unlocked_block(4, 4);
    let first = place(&mut garden, Coord::new(2, 2), 1);
    let _second = place(&mut garden, Coord::new(2, 3), 1);

    let events = run(
        &mut garden,
        Command::MovePlacement {
            placement: first,
            origin: Coord::new(2, 3),
        },
    );

    assert_eq!(
        events,
        vec![Event::MoveRejected {
            placement: first,
            origin: Coord::new(2, 3),
            reason: MoveError::Invalid(PlacementError::Overlap),
        }]
    );
    assert_eq!(
        query::placement(&garden, first).map(|placement| placement.position),
        Some(Coord::new(2, 2)),
        "rejected moves leave the item in place"
    );
}

#[test]
fn moving_into_own_footprint_is_allowed() {
    let mut garden = unlocked_block(4, 4);
    let id = place(&mut garden, Coord::new(0, 0), 2);

    let events = run(
        &mut garden,
        Command::MovePlacement {
            placement: id,
            origin: Coord::new(1, 1),
        },
    );

    assert_eq!(
        events,
        vec![Event::PlacementMoved {
            placement: id,
            from: Coord::new(0, 0),
            to: Coord::new(1, 1),
        }]
    );
}

#[test]
fn missing_placements_are_reported() {
    let mut garden = unlocked_block(2, 2);
    let ghost = PlacementId::new(99);

    assert_eq!(
        run(
            &mut garden,
            Command::MovePlacement {
                placement: ghost,
                origin: Coord::new(0, 0),
            }
        ),
        vec![Event::MoveRejected {
            placement: ghost,
            origin: Coord::new(0, 0),
            reason: MoveError::MissingPlacement,
        }]
    );

    assert_eq!(
        run(&mut garden, Command::RemovePlacement { placement: ghost }),
        vec![Event::RemovalRejected {
            placement: ghost,
            reason: RemovalError::MissingPlacement,
        }]
    );
}

#[test]
fn removal_frees_the_footprint() {
    let mut garden = unlocked_block(2, 2);
    let id = place(&mut garden, Coord::new(0, 0), 2);

    let events = run(&mut garden, Command::RemovePlacement { placement: id });
    assert!(
        matches!(events.as_slice(), [Event::PlacementRemoved { placement, .. }] if *placement == id)
    );

    let replacement = place(&mut garden, Coord::new(0, 0), 2);
    assert_ne!(replacement, id, "identifiers are never reused");
}

#[test]
fn snapshot_mirrors_queries() {
    let mut garden = unlocked_block(3, 3);
    let _ = place(&mut garden, Coord::new(0, 0), 2);
    let _ = place(&mut garden, Coord::new(2, 2), 1);

    let snapshot = query::snapshot(&garden);

    assert_eq!(snapshot.grid, query::grid(&garden));
    assert_eq!(&snapshot.unlocked, query::unlocked_cells(&garden));
    assert_eq!(snapshot.placements.as_slice(), query::placements(&garden));
}

#[test]
fn replaying_a_script_is_deterministic() {
    let script = || {
        let mut commands = vec![Command::ConfigureGrid {
            size: GridSize::new(6),
        }];
        commands.extend((0..6).map(|column| Command::UnlockCell {
            cell: Coord::new(0, column),
        }));
        commands.extend((0..6).map(|column| Command::UnlockCell {
            cell: Coord::new(1, column),
        }));
        commands.extend([
            Command::PlaceItem {
                item_type: "pumpkin".to_owned(),
                origin: Coord::new(0, 0),
                size: 2,
            },
            Command::PlaceItem {
                item_type: "carrot".to_owned(),
                origin: Coord::new(1, 3),
                size: 1,
            },
            Command::MovePlacement {
                placement: PlacementId::new(0),
                origin: Coord::new(0, 4),
            },
            Command::LockCell {
                cell: Coord::new(0, 0),
            },
            Command::UnlockCell {
                cell: Coord::new(3, 3),
            },
        ]);
        commands
    };

    let replay = || {
        let mut garden = Garden::new();
        let mut events = Vec::new();
        for command in script() {
            world::apply(&mut garden, command, &mut events);
        }
        (events, query::snapshot(&garden))
    };

    let (first_events, first_snapshot) = replay();
    let (second_events, second_snapshot) = replay();

    assert_eq!(first_events, second_events);
    assert_eq!(first_snapshot, second_snapshot);
    assert_eq!(first_snapshot.placements.len(), 2);
    assert!(!first_snapshot.unlocked.contains(Coord::new(0, 0)));
    assert!(
        first_events.contains(&Event::UnlockRejected {
            cell: Coord::new(3, 3),
            reason: UnlockError::NotAdjacent,
        }),
        "isolated unlocks are rejected on every replay"
    );
}
