//! Self-play game generation for the reference games.
//!
//! Plays MCTS against MCTS, one engine per player, and optionally saves
//! each game in MessagePack format. Games run in parallel; every game owns
//! its engines so searches themselves stay single-threaded.

use anyhow::{ensure, Context, Result};
use arbor_mcts::{
    games::{ConnectFour, Player, TicTacToe, TwoInARow},
    Domain, Mcts, MctsConfig, RolloutPolicyKind, State, DEFAULT_EXPLORATION_CONSTANT,
};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// MCTS self-play tool.
#[derive(Parser, Debug)]
#[command(name = "arbor-selfplay")]
#[command(about = "Play MCTS against itself on the reference games")]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play self-play games and report the outcomes.
    Play {
        /// Game to play.
        #[arg(long, value_enum, default_value = "tictactoe")]
        game: GameKind,

        /// Number of games to play.
        #[arg(short, long, default_value = "10")]
        games: usize,

        /// Search iterations per move.
        #[arg(short, long, default_value = "1000")]
        iterations: usize,

        /// Search for this many milliseconds per move instead.
        #[arg(long)]
        millis: Option<u64>,

        /// Rollout policy.
        #[arg(long, value_enum, default_value = "random")]
        policy: PolicyArg,

        /// UCB1 exploration constant.
        #[arg(long, default_value_t = DEFAULT_EXPLORATION_CONSTANT)]
        exploration: f64,

        /// Random seed for reproducibility.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Directory for MessagePack game records.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GameKind {
    Tictactoe,
    ConnectFour,
    TwoInARow,
}

impl GameKind {
    fn name(self) -> &'static str {
        match self {
            GameKind::Tictactoe => "tictactoe",
            GameKind::ConnectFour => "connect-four",
            GameKind::TwoInARow => "two-in-a-row",
        }
    }
}

/// Rollout policies selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Default,
    Random,
}

impl From<PolicyArg> for RolloutPolicyKind {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Default => RolloutPolicyKind::Default,
            PolicyArg::Random => RolloutPolicyKind::Random,
        }
    }
}

/// How long each engine searches before moving.
#[derive(Clone, Copy, Debug)]
enum Budget {
    Iterations(usize),
    Duration(Duration),
}

/// Settings shared by every game of a run.
#[derive(Clone, Copy, Debug)]
struct PlaySettings {
    budget: Budget,
    policy: RolloutPolicyKind,
    exploration: f64,
}

/// Reference games playable from the command line.
trait SelfPlayGame: Domain + Copy {
    /// The game scored for `player`.
    fn for_player(player: Player) -> Self;

    fn to_move(state: &Self::State) -> Player;

    fn winner(state: &Self::State) -> Option<Player>;

    /// Compact action encoding for records.
    fn action_index(action: &Self::Action) -> u8;
}

impl SelfPlayGame for TicTacToe {
    fn for_player(player: Player) -> Self {
        TicTacToe::new(player)
    }

    fn to_move(state: &Self::State) -> Player {
        state.agent()
    }

    fn winner(state: &Self::State) -> Option<Player> {
        state.winner()
    }

    fn action_index(action: &Self::Action) -> u8 {
        action.0
    }
}

impl SelfPlayGame for ConnectFour {
    fn for_player(player: Player) -> Self {
        ConnectFour::new(player)
    }

    fn to_move(state: &Self::State) -> Player {
        state.agent()
    }

    fn winner(state: &Self::State) -> Option<Player> {
        state.winner()
    }

    fn action_index(action: &Self::Action) -> u8 {
        action.0
    }
}

impl SelfPlayGame for TwoInARow {
    fn for_player(player: Player) -> Self {
        TwoInARow::new(player)
    }

    fn to_move(state: &Self::State) -> Player {
        state.agent()
    }

    fn winner(state: &Self::State) -> Option<Player> {
        state.winner()
    }

    fn action_index(action: &Self::Action) -> u8 {
        action.0
    }
}

/// A single move in a game trajectory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct GameStep {
    /// Player that moved ("X" or "O").
    player: String,

    /// Encoded action (cell or column index).
    action: u8,

    /// Visits of the chosen action at decision time.
    visits: u32,

    /// Average value of the chosen action for the mover.
    value: f64,

    /// Search iterations run before the move.
    iterations: usize,
}

/// A complete game trajectory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct GameRecord {
    steps: Vec<GameStep>,

    /// Game outcome: +1 (X wins), -1 (O wins), 0 (draw).
    outcome: f32,

    /// Optional metadata.
    metadata: HashMap<String, serde_json::Value>,
}

/// Build the engine playing `player` in game number `seed`.
fn engine_for<G: SelfPlayGame>(
    player: Player,
    settings: &PlaySettings,
    seed: u64,
) -> Result<Mcts<G>> {
    let config = MctsConfig {
        exploration_constant: settings.exploration,
        rollout_policy: settings.policy,
        seed: Some(match player {
            Player::X => seed,
            Player::O => seed.wrapping_add(1),
        }),
    };
    Mcts::from_config(G::for_player(player), config)
        .with_context(|| format!("Failed to build engine for player {player}"))
}

/// Play one game with an engine per player.
///
/// Both engines commit every move, so each keeps its own statistics for
/// the positions it has searched.
fn play_game<G: SelfPlayGame>(settings: &PlaySettings, seed: u64) -> Result<GameRecord> {
    let mut x = engine_for::<G>(Player::X, settings, seed)?;
    let mut o = engine_for::<G>(Player::O, settings, seed)?;
    let mut steps = Vec::new();

    while !x.current_state().is_terminal() && !x.domain().is_terminal(x.current_state()) {
        let mover = G::to_move(x.current_state());
        let engine = match mover {
            Player::X => &mut x,
            Player::O => &mut o,
        };

        let iterations = match settings.budget {
            Budget::Iterations(n) => {
                engine.search_for_iterations(n);
                n
            }
            Budget::Duration(duration) => engine.search_for_duration(duration),
        };

        let stats = engine.action_stats();
        let best = stats
            .first()
            .context("Search offered no action for a non-terminal state")?;
        debug!(player = %mover, action = ?best.action, visits = best.visits, "move chosen");

        steps.push(GameStep {
            player: mover.to_string(),
            action: G::action_index(&best.action),
            visits: best.visits,
            value: best.average_value,
            iterations,
        });

        x.take_action(&best.action)?;
        o.take_action(&best.action)?;
    }

    let outcome = match G::winner(x.current_state()) {
        Some(Player::X) => 1.0,
        Some(Player::O) => -1.0,
        None => 0.0,
    };

    let mut metadata = HashMap::new();
    metadata.insert("seed".to_string(), serde_json::json!(seed));
    metadata.insert("moves".to_string(), serde_json::json!(steps.len()));
    metadata.insert("nodes_x".to_string(), serde_json::json!(x.node_count()));
    metadata.insert("nodes_o".to_string(), serde_json::json!(o.node_count()));
    metadata.insert(
        "exploration".to_string(),
        serde_json::json!(settings.exploration),
    );

    Ok(GameRecord {
        steps,
        outcome,
        metadata,
    })
}

/// Play `games` games in parallel. Game `i` is seeded from `seed + i * 1000`.
fn play_games<G: SelfPlayGame>(
    games: usize,
    settings: &PlaySettings,
    seed: u64,
) -> Result<Vec<GameRecord>> {
    (0..games)
        .into_par_iter()
        .map(|i| {
            let game_seed = seed.wrapping_add(i as u64 * 1000);
            play_game::<G>(settings, game_seed)
                .with_context(|| format!("Game {i} (seed {game_seed}) failed"))
        })
        .collect()
}

/// Save each game to a separate MessagePack file.
fn save_records(output: &Path, game: GameKind, records: &[GameRecord]) -> Result<()> {
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {:?}", output))?;

    for (i, record) in records.iter().enumerate() {
        let filename = output.join(format!("{}_{:06}.msgpack", game.name(), i));
        let file = File::create(&filename)
            .with_context(|| format!("Failed to create file: {:?}", filename))?;
        let mut writer = BufWriter::new(file);
        // Named fields serialize structs as maps
        rmp_serde::encode::write_named(&mut writer, record)
            .with_context(|| format!("Failed to serialize game {}", i))?;
    }
    Ok(())
}

/// Run the play command.
#[allow(clippy::too_many_arguments)]
fn cmd_play(
    game: GameKind,
    games: usize,
    iterations: usize,
    millis: Option<u64>,
    policy: PolicyArg,
    exploration: f64,
    seed: u64,
    output: Option<PathBuf>,
) -> Result<()> {
    ensure!(
        exploration.is_finite() && exploration >= 0.0,
        "Exploration constant must be a non-negative number, got {exploration}"
    );

    let budget = match millis {
        Some(ms) => Budget::Duration(Duration::from_millis(ms)),
        None => Budget::Iterations(iterations),
    };
    let settings = PlaySettings {
        budget,
        policy: policy.into(),
        exploration,
    };

    info!(
        game = game.name(),
        games,
        ?budget,
        ?policy,
        seed,
        "starting self-play"
    );
    let start = Instant::now();

    let records = match game {
        GameKind::Tictactoe => play_games::<TicTacToe>(games, &settings, seed)?,
        GameKind::ConnectFour => play_games::<ConnectFour>(games, &settings, seed)?,
        GameKind::TwoInARow => play_games::<TwoInARow>(games, &settings, seed)?,
    };

    if let Some(output) = &output {
        save_records(output, game, &records)?;
        info!(directory = ?output, files = records.len(), "saved game records");
    }

    let elapsed = start.elapsed();
    let total_moves: usize = records.iter().map(|r| r.steps.len()).sum();
    let x_wins = records.iter().filter(|r| r.outcome > 0.5).count();
    let o_wins = records.iter().filter(|r| r.outcome < -0.5).count();
    let draws = records.len() - x_wins - o_wins;

    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());
    println!("Games played: {}", records.len());
    if !records.is_empty() {
        println!(
            "Average game length: {:.1} moves",
            total_moves as f64 / records.len() as f64
        );
    }
    println!(
        "Outcomes: X wins: {}, O wins: {}, Draws: {}",
        x_wins, o_wins, draws
    );

    Ok(())
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Play {
            game,
            games,
            iterations,
            millis,
            policy,
            exploration,
            seed,
            output,
        } => cmd_play(
            game,
            games,
            iterations,
            millis,
            policy,
            exploration,
            seed,
            output,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(iterations: usize, policy: RolloutPolicyKind) -> PlaySettings {
        PlaySettings {
            budget: Budget::Iterations(iterations),
            policy,
            exploration: DEFAULT_EXPLORATION_CONSTANT,
        }
    }

    #[test]
    fn test_play_game_alternates_players() {
        let record = play_game::<TicTacToe>(&settings(50, RolloutPolicyKind::Random), 42).unwrap();

        assert!(record.steps.len() >= 5 && record.steps.len() <= 9);
        for (i, step) in record.steps.iter().enumerate() {
            let expected = if i % 2 == 0 { "X" } else { "O" };
            assert_eq!(step.player, expected);
            assert!(step.action < 9);
            assert_eq!(step.iterations, 50);
        }
        assert!(record.outcome >= -1.0 && record.outcome <= 1.0);
    }

    #[test]
    fn test_play_games_is_reproducible() {
        let settings = settings(30, RolloutPolicyKind::Random);

        let first = play_games::<ConnectFour>(3, &settings, 7).unwrap();
        let second = play_games::<ConnectFour>(3, &settings, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duration_budget() {
        let settings = PlaySettings {
            budget: Budget::Duration(Duration::from_millis(2)),
            policy: RolloutPolicyKind::Default,
            exploration: DEFAULT_EXPLORATION_CONSTANT,
        };

        let record = play_game::<TwoInARow>(&settings, 1).unwrap();
        assert!(!record.steps.is_empty());
        assert!(record.steps.iter().all(|step| step.iterations > 0));
    }

    #[test]
    fn test_save_records() {
        let output = std::env::temp_dir().join(format!("arbor-selfplay-{}", std::process::id()));
        let settings = settings(20, RolloutPolicyKind::Default);
        let records = play_games::<TwoInARow>(2, &settings, 3).unwrap();

        save_records(&output, GameKind::TwoInARow, &records).unwrap();

        let file = File::open(output.join("two-in-a-row_000001.msgpack")).unwrap();
        let decoded: GameRecord = rmp_serde::from_read(file).unwrap();
        assert_eq!(decoded, records[1]);

        fs::remove_dir_all(&output).unwrap();
    }

    #[test]
    fn test_cli_parses_play() {
        let cli = Cli::try_parse_from([
            "arbor-selfplay",
            "play",
            "--game",
            "connect-four",
            "--games",
            "4",
            "--policy",
            "default",
            "--millis",
            "25",
        ])
        .unwrap();

        match cli.command {
            Commands::Play {
                game,
                games,
                policy,
                millis,
                iterations,
                ..
            } => {
                assert_eq!(game, GameKind::ConnectFour);
                assert_eq!(games, 4);
                assert_eq!(policy, PolicyArg::Default);
                assert_eq!(millis, Some(25));
                assert_eq!(iterations, 1000);
            }
        }
    }
}
