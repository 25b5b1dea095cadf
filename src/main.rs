//! Paradox Protocol entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::KeyboardEvent;

    use paradox_protocol::consts::*;
    use paradox_protocol::format_time;
    use paradox_protocol::levels::builtin_levels;
    use paradox_protocol::persistence::load_custom_level;
    use paradox_protocol::platform::{InputState, LocalStorage, MemoryStorage, Storage};
    use paradox_protocol::sim::{GamePhase, Session, SessionEvent, tick};

    /// Game instance holding all state
    struct Game {
        session: Session,
        input: InputState,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        fn new(session: Session) -> Self {
            Self {
                session,
                input: InputState::new(),
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.snapshot();
                tick(&mut self.session, &input);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Pressed edges belong to exactly one tick
                self.input.end_tick();
            }

            for event in self.session.drain_events() {
                match event {
                    SessionEvent::LevelCompleted { loops, new_best, .. } if new_best => {
                        log::info!("New best: {} loops", loops)
                    }
                    SessionEvent::GameCompleted => log::info!("Thanks for playing"),
                    other => log::debug!("{:?}", other),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("timer") {
                el.set_text_content(Some(&format_time(self.session.remaining_ms())));
            }

            if let Some(el) = document.get_element_by_id("loopCounter") {
                el.set_text_content(Some(&format!("Loop {}", self.session.current_loop)));
            }

            if let Some(el) = document.get_element_by_id("ghostCounter") {
                el.set_text_content(Some(&self.session.ghosts.len().to_string()));
            }

            if let Some(el) = document.get_element_by_id("levelCounter") {
                el.set_text_content(Some(&format!(
                    "Level {}/{}",
                    self.session.level_index + 1,
                    self.session.level_count()
                )));
            }

            if let Some(el) = document.get_element_by_id("status") {
                let status = match self.session.phase {
                    GamePhase::Playing => "",
                    GamePhase::LevelCompleted { .. } => "Level complete!",
                    GamePhase::GameCompleted => "All levels complete! Press T to play again",
                };
                el.set_text_content(Some(status));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Paradox Protocol starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let storage: Box<dyn Storage> = match LocalStorage::open() {
            Some(storage) => Box::new(storage),
            None => {
                log::warn!("LocalStorage unavailable, progress will not be saved");
                Box::new(MemoryStorage::new())
            }
        };

        // A saved custom level is played before the built-in set
        let mut levels = builtin_levels();
        if let Some(custom) = load_custom_level(storage.as_ref()) {
            log::info!("Custom level found");
            levels.insert(0, custom);
        }

        let game = Rc::new(RefCell::new(Game::new(Session::from_storage(levels, storage))));

        setup_input_handlers(game.clone());
        request_animation_frame(game);
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_up(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: keyups are lost, so release everything
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().input.clear();
                log::debug!("Input cleared (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Paradox Protocol (native) starting...");
    log::info!("Native mode runs a scripted headless demo - build for wasm32 to play");

    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless scripted playthrough of the first level
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use paradox_protocol::consts::SIM_HZ;
    use paradox_protocol::levels::builtin_levels;
    use paradox_protocol::persistence::load_recordings;
    use paradox_protocol::platform::MemoryStorage;
    use paradox_protocol::sim::{GamePhase, Session, SessionEvent, TickInput, tick};
    use paradox_protocol::{Settings, format_time, ticks_to_ms};

    /// Where the first level's button sits
    const BUTTON_STAND_X: f32 = 215.0;
    /// Give up after this many simulated minutes
    const MAX_MINUTES: u64 = 2;

    /// Loop 1 parks on the button; later loops run for the exit
    fn scripted_input(session: &Session) -> TickInput {
        let first_loop = session.current_loop == 1;
        let on_button = session.player.body.position.x >= BUTTON_STAND_X;
        TickInput {
            move_right: !(first_loop && on_button),
            interact: first_loop && on_button,
            ..Default::default()
        }
    }

    pub fn run() {
        let mut session = Session::new(
            builtin_levels(),
            Settings::default(),
            Box::new(MemoryStorage::new()),
        );
        let max_ticks = MAX_MINUTES * 60 * u64::from(SIM_HZ);

        while session.level_index == 0 && session.time_ticks < max_ticks {
            let input = scripted_input(&session);
            tick(&mut session, &input);

            for event in session.drain_events() {
                match event {
                    SessionEvent::LoopEnded { loop_number, ghost_spawned } => {
                        println!("loop {} ended (ghost spawned: {})", loop_number, ghost_spawned)
                    }
                    SessionEvent::LevelCompleted { index, loops, .. } => {
                        println!(
                            "level {} solved in {} loops at {}",
                            index + 1,
                            loops,
                            format_time(ticks_to_ms(session.time_ticks))
                        )
                    }
                    other => log::debug!("{:?}", other),
                }
            }

            if matches!(session.phase, GamePhase::GameCompleted) {
                break;
            }
        }

        let saved = load_recordings(session.storage());
        println!(
            "finished on level {} after {} ticks, {} recordings persisted",
            session.level_index + 1,
            session.time_ticks,
            saved.len()
        );
    }
}
