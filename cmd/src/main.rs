use rand_chacha::rand_core::SeedableRng;
use starhunt::board::{Board, Roster};
use starhunt::{Game, Options};
use rand::seq::SliceRandom;
use rand::{RngCore, thread_rng};

const GAMES: u64 = 100;
const MAX_STEPS: usize = 10_000;

fn main() {
    env_logger::init();

    let board = Board::demo();
    let home = board.starting.iter().next().copied().expect("a starting tile");
    let roster = vec![
        Roster::new("Ada", "red", home),
        Roster::new("Bo", "blue", home),
        Roster::new("Cy", "green", home),
        Roster::new("Di", "yellow", home),
    ];

    let mut finished = 0;

    for n in 0..GAMES {
        let seed = thread_rng().next_u64();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
        let mut game = match Game::new(rand_chacha::ChaCha8Rng::seed_from_u64(seed), &board, &roster, &Options::default()) {
            Ok(game) => game,
            Err(err) => {
                log::error!("could not set up game {n}: {err}");
                return;
            }
        };

        for _ in 0..MAX_STEPS {
            if game.is_finished() {
                break;
            }

            let actions = game.actions();
            let Some(action) = actions.choose(&mut rng) else {
                println!("{}", game);
                panic!("out of stuff {n}")
            };

            match game.apply_action(*action) {
                Ok(outcome) => log::debug!("{}", outcome),
                Err(err) => {
                    println!("{}", game);
                    panic!("game {n} (seed {seed}) refused {action}: {err}");
                }
            }
        }

        match game.winner() {
            Some(winner) => {
                finished += 1;
                log::info!("game {n} (seed {seed}): {} wins on turn {}", winner.name, game.turn());
            }
            None => log::info!("game {n} (seed {seed}): no winner after {MAX_STEPS} steps"),
        }
    }

    println!("{finished} of {GAMES} games finished with a winner");
}
