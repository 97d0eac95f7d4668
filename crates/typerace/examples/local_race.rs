//! A complete words-mode race between three simulated players, in one
//! process: room creation, keystroke routing, winner selection, and the
//! persisted leaderboard.
//!
//! Run with `cargo run --example local_race`.

use std::sync::Arc;
use std::time::Duration;

use typerace::prelude::*;
use typerace::score;

/// Simulated typist: characters per burst and how many of them land.
struct Bot {
    id: &'static str,
    name: &'static str,
    burst: u32,
    flubs_per_burst: u32,
}

const BOTS: [Bot; 3] = [
    Bot { id: "bot-ada", name: "Ada", burst: 18, flubs_per_burst: 0 },
    Bot { id: "bot-lin", name: "Lin", burst: 24, flubs_per_burst: 3 },
    Bot { id: "bot-rob", name: "Rob", burst: 12, flubs_per_burst: 1 },
];

#[tokio::main]
async fn main() -> Result<(), TypeRaceError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    let mut rooms = RoomManager::new(store.clone());

    let owner = PlayerId::new(BOTS[0].id);
    let config = RoomConfig {
        mode: GameMode::Words,
        word_limit: 30,
        ..RoomConfig::default()
    };
    let code = rooms.create_room(owner.clone(), BOTS[0].name, "", config)?;
    for bot in &BOTS[1..] {
        rooms.join_room(PlayerId::new(bot.id), bot.name, &code).await?;
    }
    rooms.start_game(&owner).await?;

    let text_len = rooms.room_state(&code).await?.text.len() as u32;
    println!("race text is {text_len} characters — go!");

    // Everyone types in bursts until the text runs out.
    let mut typed: Vec<(PlayerId, u32, u32)> = BOTS
        .iter()
        .map(|b| (PlayerId::new(b.id), 0, 0))
        .collect();
    loop {
        let mut anyone_typing = false;
        for (bot, (id, input, correct)) in BOTS.iter().zip(typed.iter_mut()) {
            if *input >= text_len {
                continue;
            }
            anyone_typing = true;
            *input = (*input + bot.burst).min(text_len);
            *correct = (*input).saturating_sub(bot.flubs_per_burst);
            rooms.apply_keystroke(id, *input, *correct).await?;
        }
        if !anyone_typing {
            break;
        }
        tokio::time::sleep(Duration::from_millis(120)).await;
    }

    let state = rooms.room_state(&code).await?;
    println!("\nstatus: {} — winner: {:?}", state.status, state.winner);
    println!("final standings:");
    for (rank, p) in score::live_ranking(&state).into_iter().enumerate() {
        println!(
            "  #{} {:<4} {:>3} wpm  {:>3}% accuracy  score {:.1}",
            rank + 1,
            p.name,
            p.wpm,
            p.accuracy,
            score::final_score(p),
        );
    }

    let daily = store.get("leaderboard/daily").await?;
    let entries = daily.and_then(|v| v.as_object().map(|m| m.len())).unwrap_or(0);
    println!("\n{entries} entries on today's leaderboard");

    Ok(())
}
