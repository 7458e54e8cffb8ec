//! Headless demo driver
//!
//! Stands in for the presentation layer: owns the tick loop, issues
//! commands through the public surface, and reads snapshots only. A naive
//! auto-player places towers whenever mana allows.

use glam::Vec2;

use wardline::catalog::{JsonFileStore, StaticCatalog, SystemClock};
use wardline::consts::SIM_DT;
use wardline::{CardCatalog, CommandError, GameSession, LibraryStore, Tuning};

/// Four simulated minutes at 60 Hz; the default timer expires well before
const MAX_TICKS: u32 = 4 * 60 * 60;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let catalog = StaticCatalog;
    if !catalog.is_available() {
        log::error!("card catalog unavailable");
        return Ok(());
    }
    let pool = catalog.load()?;

    let store = JsonFileStore::new("wardline_library.json");
    let library = store.load();

    let mut session = GameSession::new(
        "demo",
        pool,
        library,
        Tuning::default(),
        0xC0FFEE,
        Box::new(SystemClock),
    )?;
    session.start_game()?;

    let mut ended = None;
    for tick in 0..MAX_TICKS {
        if let Some(reason) = session.update(SIM_DT) {
            ended = Some(reason);
            break;
        }
        for event in session.drain_events() {
            log::debug!("event: {event:?}");
        }
        // Roughly twice a second, let the auto-player try to build
        if tick % 30 == 0 {
            auto_build(&mut session);
        }
    }

    let snapshot = session.snapshot();
    match ended {
        Some(reason) => println!(
            "run over ({reason}): score {}, base {}/{}, {} towers placed",
            snapshot.score,
            snapshot.base_current,
            snapshot.base_max,
            snapshot.towers.len()
        ),
        None => println!("tick budget exhausted with the run still going"),
    }

    store.save(session.library())?;
    Ok(())
}

/// Play the cheapest affordable card: place it if it builds a tower,
/// otherwise play it for the discovery log.
fn auto_build(session: &mut GameSession) {
    let snapshot = session.snapshot();
    let Some(card) = snapshot.hand.iter().min_by_key(|c| (c.cost, c.id.clone())) else {
        return;
    };
    if card.cost > snapshot.mana_current {
        return;
    }

    for pos in placement_scan() {
        match session.play_card_and_place_tower(&card.id, pos) {
            Ok(_) => return,
            Err(CommandError::NotATowerCard(_)) => {
                if let Err(err) = session.play_card(&card.id) {
                    log::warn!("auto-player could not play `{}`: {err}", card.id);
                }
                return;
            }
            Err(CommandError::InvalidPlacement(_)) => continue,
            Err(err) => {
                log::debug!("auto-player skipped `{}`: {err}", card.id);
                return;
            }
        }
    }
}

/// Candidate positions on a coarse grid across the field
fn placement_scan() -> impl Iterator<Item = Vec2> {
    (0..8).flat_map(|row| {
        (0..13).map(move |col| Vec2::new(60.0 + col as f32 * 70.0, 50.0 + row as f32 * 62.0))
    })
}
