use proptest::prelude::*;

use tui_2048::core::{Alea, Game, TurnOutcome};
use tui_2048::engine::Replay;
use tui_2048::types::Direction;

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn seed() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<u32>().prop_map(|n| n.to_string()),
        "[a-z]{1,12}",
    ]
}

fn board_value(game: &Game) -> u64 {
    game.grid().cells().iter().flatten().map(|t| t.value()).sum()
}

proptest! {
    #[test]
    fn prng_is_deterministic(seed in seed(), n in 1usize..64) {
        let mut a = Alea::new(&seed);
        let mut b = Alea::new(&seed);
        for _ in 0..n {
            let x = a.next_f64();
            prop_assert!((0.0..1.0).contains(&x));
            prop_assert_eq!(x.to_bits(), b.next_f64().to_bits());
        }
        prop_assert_eq!(a.state(), b.state());
    }

    #[test]
    fn score_counts_tiles_stamped_this_turn(
        size in 2usize..=5,
        seed in seed(),
        moves in prop::collection::vec(direction(), 0..60),
    ) {
        let mut game = Game::with_seed(size, &seed).unwrap();
        game.run();
        for d in moves {
            let before = game.score();
            let report = game.step(d);
            let stamped: u64 = game
                .grid()
                .cells()
                .iter()
                .flatten()
                .filter(|t| t.turn() == report.turn)
                .map(|t| t.value())
                .sum();
            match report.outcome {
                TurnOutcome::Moved => {
                    prop_assert_eq!(report.gained, stamped);
                    prop_assert_eq!(report.score, before + stamped);
                }
                _ => {
                    prop_assert_eq!(report.gained, 0);
                    prop_assert_eq!(report.score, before);
                }
            }
        }
    }

    #[test]
    fn occupancy_tracks_merges_and_spawns(
        size in 2usize..=5,
        seed in seed(),
        moves in prop::collection::vec(direction(), 0..60),
    ) {
        let mut game = Game::with_seed(size, &seed).unwrap();
        game.run();
        for d in moves {
            let occupied = game.grid().occupied_count();
            let value = board_value(&game);
            let report = game.step(d);
            let spawned = report.spawned.map_or(0, |_| 1);
            prop_assert_eq!(
                game.grid().occupied_count(),
                occupied - report.merges + spawned
            );
            // Slides conserve value; only the spawned tile adds to it.
            let spawned_value = report
                .spawned
                .and_then(|i| game.grid().tile(i))
                .map_or(0, |t| t.value());
            prop_assert_eq!(board_value(&game), value + spawned_value);
        }
    }

    #[test]
    fn game_over_only_when_stuck(
        seed in seed(),
        moves in prop::collection::vec(direction(), 0..200),
    ) {
        let mut game = Game::with_seed(2, &seed).unwrap();
        game.run();
        for d in moves {
            let was_over = game.is_game_over();
            let stuck_before = game.grid().is_stuck();
            let report = game.step(d);
            match report.outcome {
                TurnOutcome::GameOver => {
                    prop_assert!(stuck_before);
                    prop_assert!(!was_over);
                }
                TurnOutcome::Ignored => prop_assert!(was_over),
                TurnOutcome::Blocked => prop_assert!(!stuck_before),
                _ => {}
            }
            prop_assert_eq!(game.is_game_over(), was_over || report.outcome == TurnOutcome::GameOver);
        }
    }

    #[test]
    fn replay_reproduces_the_game(
        size in 2usize..=6,
        seed in seed(),
        moves in prop::collection::vec(direction(), 0..40),
    ) {
        let mut game = Game::with_seed(size, &seed).unwrap();
        game.run();
        for &d in &moves {
            game.step(d);
        }
        let replay = Replay {
            grid_size: size,
            seed,
            resume: None,
            moves,
        };
        prop_assert!(replay.verify(&game.snapshot()));
    }
}
