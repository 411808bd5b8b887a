//! Discount Rocket entry point
//!
//! The browser build is driven from JavaScript through `discount_rocket::web`.
//! Natively this runs a headless autopilot session at simulated time.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use discount_rocket::sim::SettleKind;
    use discount_rocket::{Discount, GameEvent, MemoryHighScore, Session, Settings};

    const DEMO_ROUNDS: u64 = 10;
    const DEMO_TARGET: Discount = Discount::from_points(2);

    env_logger::init();
    log::info!("Discount Rocket (native) starting...");

    let settings = Settings::load();
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut session = match Session::new(&settings, seed, MemoryHighScore::default()) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Invalid settings: {}", e);
            std::process::exit(1);
        }
    };
    session.set_autopilot(Some(DEMO_TARGET));

    let mut settled = 0;
    while settled < DEMO_ROUNDS {
        for event in session.update(settings.tick_period_ms as f64) {
            if let GameEvent::Settled { kind, at, .. } = event {
                settled += 1;
                match kind {
                    SettleKind::CashedOut => println!("round {settled:>2}: cashed out at {at}"),
                    SettleKind::Crashed => println!("round {settled:>2}: crashed at {at}"),
                }
            }
        }
    }

    let ledger = session.snapshot().ledger;
    println!(
        "total {} / best {} (seed {})",
        ledger.accumulated_total, ledger.high_score, seed
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
