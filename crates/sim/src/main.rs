mod bot;
mod config;
mod room;

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};

use baize::PacketLossSimulation;
use baize::state::{CaromRegion, GameMode, TimerMode};
use config::SimConfig;
use room::Room;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    EightBall,
    NineBall,
    FourBall,
}

impl From<Mode> for GameMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::EightBall => GameMode::EightBall,
            Mode::NineBall => GameMode::NineBall,
            Mode::FourBall => GameMode::FourBall,
        }
    }
}

#[derive(Parser)]
#[command(name = "baize-sim")]
#[command(about = "Headless billiards match between simulated peers")]
struct Args {
    #[arg(short, long, default_value_t = 2)]
    peers: usize,

    #[arg(short, long, value_enum, default_value_t = Mode::EightBall)]
    mode: Mode,

    #[arg(long, default_value_t = 0, help = "Turn time limit in seconds (0, 30 or 60)")]
    time_limit: u32,

    #[arg(long)]
    teams: bool,

    #[arg(long, help = "Play carom with the Korean scoring rule")]
    korean: bool,

    #[arg(short, long, default_value_t = 1)]
    games: u32,

    #[arg(long, default_value_t = 200)]
    max_shots: u32,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    #[arg(long, help = "Enable packet loss simulation on the shared channel")]
    simulate_packet_loss: bool,

    #[arg(long, default_value_t = 0.0, help = "Packet loss percentage (0-100)")]
    loss_percent: f32,

    #[arg(long, default_value_t = 0, help = "Minimum latency in ms")]
    min_latency: u32,

    #[arg(long, default_value_t = 0, help = "Maximum latency in ms")]
    max_latency: u32,

    #[arg(long, default_value_t = 0, help = "Jitter in ms")]
    jitter: u32,
}

fn time_limit(seconds: u32) -> Result<TimerMode> {
    match seconds {
        0 => Ok(TimerMode::Off),
        30 => Ok(TimerMode::Thirty),
        60 => Ok(TimerMode::Sixty),
        other => Err(anyhow!("unsupported time limit {other}s")),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let packet_loss = args.simulate_packet_loss.then(|| PacketLossSimulation {
        enabled: true,
        loss_percent: args.loss_percent,
        min_latency_ms: args.min_latency,
        max_latency_ms: args.max_latency,
        jitter_ms: args.jitter,
    });

    let config = SimConfig {
        peers: args.peers,
        mode: args.mode.into(),
        timer: time_limit(args.time_limit)?,
        teams: args.teams,
        region: if args.korean {
            CaromRegion::Korean
        } else {
            CaromRegion::Japanese
        },
        games: args.games,
        max_shots: args.max_shots,
        seed: args.seed,
        packet_loss,
        ..Default::default()
    };
    config.validate().map_err(|e| anyhow!("invalid configuration: {e}"))?;

    let games = config.games;
    let mut room = Room::new(config);
    room.assemble()?;

    for _ in 0..games {
        let report = room.play_game()?;
        match report.winner {
            Some(winner) => log::info!(
                "game {} won by team {} after {} shots ({}-{})",
                report.game_id,
                winner,
                report.shots,
                report.scores[0],
                report.scores[1]
            ),
            None => log::info!(
                "game {} abandoned after {} shots",
                report.game_id,
                report.shots
            ),
        }
    }

    let stats = room.stats();
    log::info!(
        "channel: {} published, {} delivered, {} dropped ({:.1}%), {} resynced, {} lobby bytes",
        stats.published,
        stats.delivered,
        stats.dropped,
        stats.loss_percent(),
        stats.resynced,
        stats.lobby_bytes
    );
    Ok(())
}
