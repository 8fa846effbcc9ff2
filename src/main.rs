//! Times Tables engines demo
//!
//! Native: runs every engine headless with an autopilot and logs a summary.
//! Web: mounts the arcade on `#game-canvas` with keyboard controls.

use std::cell::RefCell;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use times_tables_engines::consts::{FIRST_TABLE, LAST_TABLE};
use times_tables_engines::services::{Question, QuestionService};

/// Random drill across all tables, with three distractors
struct TableDrill {
    rng: RefCell<Pcg32>,
}

impl TableDrill {
    fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(Pcg32::seed_from_u64(seed)),
        }
    }
}

impl QuestionService for TableDrill {
    fn next_question(&self, difficulty: u8) -> Question {
        let mut rng = self.rng.borrow_mut();
        let table = rng.random_range(FIRST_TABLE..=LAST_TABLE);
        let top = (5 + difficulty.min(5) as u32).min(12) as u8;
        let multiplier = rng.random_range(1..=top);
        let answer = table as u32 * multiplier as u32;

        let mut options = vec![answer];
        while options.len() < 4 {
            let offset = rng.random_range(1..=table as u32);
            let candidate = if rng.random::<bool>() {
                answer + offset
            } else {
                answer.saturating_sub(offset)
            };
            if candidate > 0 && !options.contains(&candidate) {
                options.push(candidate);
            }
        }
        let slot = rng.random_range(0..options.len());
        options.swap(0, slot);

        Question {
            table,
            multiplier,
            answer,
            options,
            difficulty,
        }
    }

    fn validate(&self, question: &Question, answer: u32) -> bool {
        question.answer == answer
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::Cell;
    use std::rc::Rc;

    use times_tables_engines::arcade::{ArcadeCallbacks, ArcadeEngine};
    use times_tables_engines::battle::{BattleCallbacks, BattleEngine, Outcome};
    use times_tables_engines::consts::FRAME_DT;
    use times_tables_engines::engine::{Engine, run_frame, run_headless};
    use times_tables_engines::orbital::OrbitalEngine;
    use times_tables_engines::platform::headless::{HeadlessHost, ManualTimers};
    use times_tables_engines::sim::Combatant;
    use times_tables_engines::{ArcadeConfig, BattleConfig, OrbitalConfig, Services};

    use super::TableDrill;

    const ARCADE_FRAMES: usize = 60 * 60;

    pub fn run() {
        let host = HeadlessHost::new();
        let arcade_log = host.add_surface("arcade", 800.0, 600.0);
        let orbital_log = host.add_surface("galaxy", 1024.0, 768.0);
        host.add_surface("battle", 800.0, 600.0);

        let timers = Rc::new(ManualTimers::default());
        let services = Services::new(Rc::new(TableDrill::new(7)), timers.clone());

        run_arcade(&host, services.clone());
        log::info!("arcade issued {} draw calls", arcade_log.len());

        let mut galaxy =
            OrbitalEngine::new("galaxy", &host, services.clone(), OrbitalConfig::default());
        galaxy.set_streak(4);
        galaxy.start();
        let frames = run_headless(&mut galaxy, 300, FRAME_DT);
        let first_planet = galaxy
            .planets()
            .first()
            .map(|p| galaxy.scene().planet_position(p));
        let hovered = first_planet.and_then(|pos| galaxy.hover_at(pos));
        log::info!(
            "galaxy ran {frames} frames ({} draw calls), hovering table {:?}",
            orbital_log.len(),
            hovered
        );

        run_battle(&host, services);
        timers.advance(10_000);
    }

    fn run_arcade(host: &HeadlessHost, services: Services) {
        let final_score = Rc::new(Cell::new(None));
        let callbacks = ArcadeCallbacks {
            on_game_over: Some(Rc::new({
                let final_score = final_score.clone();
                move |score| final_score.set(Some(score))
            })),
            on_life_lost: Some(Rc::new(|left| log::info!("life lost, {left} left"))),
            ..Default::default()
        };
        let mut arcade =
            ArcadeEngine::new("arcade", host, services, ArcadeConfig::default(), callbacks);
        arcade.init();
        arcade.start();

        let mut frame = 0;
        while frame < ARCADE_FRAMES && arcade.is_running() {
            // Autopilot: drift toward the nearest asteroid and keep shooting
            let target = arcade
                .ship()
                .and_then(|ship| {
                    arcade
                        .asteroids()
                        .iter()
                        .min_by(|a, b| {
                            a.pos
                                .distance(ship.pos)
                                .total_cmp(&b.pos.distance(ship.pos))
                        })
                        .map(|a| (a.pos.x - ship.pos.x).signum())
                })
                .unwrap_or(0.0);
            arcade.steer(target);
            arcade.fire_laser();

            if frame % 90 == 0 {
                let answer = arcade.present_question().map(|q| q.answer);
                if let Some(answer) = answer {
                    // Miss every fourth question
                    let given = if frame % 360 == 0 { answer + 1 } else { answer };
                    arcade.submit_answer(given);
                }
            }

            run_frame(&mut arcade, FRAME_DT);
            frame += 1;
        }

        log::info!(
            "arcade: {} frames, score {}, level {}, lives {}, game over: {:?}",
            frame,
            arcade.score(),
            arcade.level(),
            arcade.lives(),
            final_score.get()
        );
    }

    fn run_battle(host: &HeadlessHost, services: Services) {
        let outcome = Rc::new(Cell::new(None));
        let callbacks = BattleCallbacks {
            on_boss_defeated: Some(Rc::new({
                let outcome = outcome.clone();
                move || outcome.set(Some(Outcome::BossDefeated))
            })),
            on_player_defeated: Some(Rc::new({
                let outcome = outcome.clone();
                move || outcome.set(Some(Outcome::PlayerDefeated))
            })),
        };
        let mut battle =
            BattleEngine::new("battle", host, services, BattleConfig::default(), callbacks);
        battle.init();
        battle.start();
        battle.start_battle(
            Combatant::new("Captain Nebula", "👾", 150),
            Combatant::new("Cadet", "🧑‍🚀", 100),
        );

        let mut turn = 0u32;
        while outcome.get().is_none() && turn < 100 {
            battle.arm_super_attack();
            let answer = battle.present_question().map(|q| q.answer);
            let Some(answer) = answer else { break };
            let given = if turn % 5 == 4 { answer + 1 } else { answer };
            battle.submit_answer(given);
            for _ in 0..20 {
                run_frame(&mut battle, FRAME_DT);
            }
            if battle.resolve_attack().is_none() {
                battle.next_turn();
            }
            turn += 1;
        }

        log::info!(
            "battle: {:?} after {} turns, boss {}/{}, player {}",
            outcome.get(),
            turn,
            battle.boss_health(),
            battle.max_boss_health(),
            battle.player_health()
        );
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::KeyboardEvent;

    use times_tables_engines::arcade::{ArcadeCallbacks, ArcadeEngine};
    use times_tables_engines::engine::Engine;
    use times_tables_engines::platform::audio::WebAudio;
    use times_tables_engines::platform::web::{WebHost, WebTimers, run_loop};
    use times_tables_engines::{ArcadeConfig, Services};

    use super::TableDrill;

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }
        log::info!("Times Tables starting...");

        let Some(host) = WebHost::new() else {
            log::error!("no document");
            return;
        };
        let questions = Rc::new(TableDrill::new(js_sys::Date::now() as u64));
        let services =
            Services::new(questions, Rc::new(WebTimers)).with_audio(Rc::new(WebAudio::new()));
        let callbacks = ArcadeCallbacks {
            on_game_over: Some(Rc::new(|score| log::info!("Game over! Score: {score}"))),
            ..Default::default()
        };

        let mut engine = ArcadeEngine::new(
            "game-canvas",
            &host,
            services,
            ArcadeConfig::default(),
            callbacks,
        );
        engine.init();
        engine.start();
        let engine = Rc::new(RefCell::new(engine));
        setup_keyboard(engine.clone());
        run_loop(engine);
    }

    fn setup_keyboard(engine: Rc<RefCell<ArcadeEngine>>) {
        let Some(window) = web_sys::window() else { return };

        let down = {
            let engine = engine.clone();
            Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut restarted = false;
                {
                    let mut arcade = engine.borrow_mut();
                    match event.key().as_str() {
                        "ArrowLeft" | "a" => arcade.steer(-1.0),
                        "ArrowRight" | "d" => arcade.steer(1.0),
                        " " => {
                            arcade.fire_laser();
                        }
                        "p" | "Escape" => {
                            if arcade.is_paused() {
                                arcade.resume();
                            } else {
                                arcade.pause();
                            }
                        }
                        "Enter" if !arcade.is_running() && !arcade.has_error() => {
                            arcade.init();
                            arcade.start();
                            restarted = true;
                        }
                        _ => {}
                    }
                }
                // The previous frame loop ended with the last run
                if restarted {
                    run_loop(engine.clone());
                }
            })
        };
        let _ = window.add_event_listener_with_callback("keydown", down.as_ref().unchecked_ref());
        down.forget();

        let up = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if matches!(event.key().as_str(), "ArrowLeft" | "ArrowRight" | "a" | "d") {
                engine.borrow_mut().steer(0.0);
            }
        });
        let _ = window.add_event_listener_with_callback("keyup", up.as_ref().unchecked_ref());
        up.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Times Tables engines (native headless demo)");
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
