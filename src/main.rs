//! Lane Dash entry point
//!
//! Browser host: drives the simulation from requestAnimationFrame, maps DOM
//! input to commands, publishes render frames to the page's renderer hook,
//! and bridges coin pickups to the backend cash endpoint. The frame loop is
//! only armed while a run is in progress; pause, game over, and the ready
//! screen leave it parked.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_host {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, MouseEvent};

    use lane_dash::awarder::{AwardError, CashSink, CoinAwarder};
    use lane_dash::consts::*;
    use lane_dash::input::{Command, command_for_key};
    use lane_dash::settings::Settings;
    use lane_dash::sim::{GameState, RenderFrame, RunPhase, tick};

    // Page hooks: the renderer and the cash endpoint live in JS. Both are
    // optional so the wasm module also runs on a bare page.
    #[wasm_bindgen(inline_js = "
        export function render_frame(json) {
            if (window.__laneDashRender) {
                window.__laneDashRender(JSON.parse(json));
            }
        }
        export function award_coin() {
            if (window.__laneDashAwardCoin) {
                return Promise.resolve(window.__laneDashAwardCoin());
            }
            return Promise.resolve();
        }
    ")]
    extern "C" {
        fn render_frame(json: &str);
        fn award_coin() -> js_sys::Promise;
    }

    /// Sink that forwards unit awards to the page's cash endpoint, keeping
    /// the promises so the batch can be settled as one unit.
    #[derive(Default)]
    struct JsCashSink {
        batch: Vec<js_sys::Promise>,
    }

    impl JsCashSink {
        fn take_batch(&mut self) -> Vec<js_sys::Promise> {
            std::mem::take(&mut self.batch)
        }
    }

    impl CashSink for JsCashSink {
        fn award_one(&mut self) {
            self.batch.push(award_coin());
        }
    }

    /// Everything the browser host owns
    struct Game {
        state: GameState,
        awarder: CoinAwarder<JsCashSink>,
        settings: Settings,
        /// Previous rAF timestamp (ms); 0 means "no frame reference", so the
        /// next frame contributes no elapsed time
        last_time: f64,
        loop_armed: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                state: GameState::new(seed),
                awarder: CoinAwarder::new(JsCashSink::default()),
                settings: Settings::load(),
                last_time: 0.0,
                loop_armed: false,
            }
        }

        /// Send the current frame to the page renderer and refresh the HUD
        fn publish_frame(&self) {
            let frame = RenderFrame::capture(&self.state);
            match serde_json::to_string(&frame) {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("failed to serialize frame: {e}"),
            }
            self.update_hud();
        }

        /// Update HUD elements in the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            set_text(
                &document,
                "hud-distance",
                &format!("{}m", self.state.stats.distance.floor() as u64),
            );
            set_text(
                &document,
                "hud-coins",
                &self.state.stats.coins_this_run.to_string(),
            );
            if self.settings.show_speed {
                set_text(&document, "hud-speed", &format!("{:.0}", self.state.speed));
            }

            set_visible(&document, "ready-overlay", self.state.phase == RunPhase::Ready);
            set_visible(&document, "pause-overlay", self.state.phase == RunPhase::Paused);

            let over = self.state.phase == RunPhase::GameOver;
            set_visible(&document, "game-over", over);
            if over {
                set_text(
                    &document,
                    "final-distance",
                    &format!("{}m", self.state.stats.distance.floor() as u64),
                );
                set_text(
                    &document,
                    "final-coins",
                    &self.state.stats.coins_this_run.to_string(),
                );
            }
        }

        /// Apply persisted preferences to the page chrome
        fn apply_settings(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("touch-controls") {
                let _ = el.set_attribute("data-mode", self.settings.touch_controls.as_str());
            }
            if !self.settings.show_speed {
                set_visible(&document, "hud-speed-item", false);
            }
            if self.settings.reduced_motion {
                if let Some(body) = document.body() {
                    let _ = body.set_attribute("class", "reduced-motion");
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, value: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(value));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lane Dash starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Session initialized with seed: {}", seed);

        game.borrow().apply_settings();
        game.borrow().publish_frame();

        setup_keyboard(game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(game.clone());
        setup_award_pump(game.clone());

        log::info!("Lane Dash ready");
    }

    /// Route a command into the simulation and manage the frame loop
    fn dispatch(game: &Rc<RefCell<Game>>, cmd: Command) {
        let run_after = {
            let mut g = game.borrow_mut();
            g.state.apply(cmd);
            if g.state.phase != RunPhase::Running {
                // Wall-clock time spent outside Running must never reach the
                // simulation: forget the frame reference.
                g.last_time = 0.0;
            }
            g.publish_frame();
            g.state.phase == RunPhase::Running
        };
        if run_after {
            arm_loop(game.clone());
        }
    }

    /// Arm the frame loop if it is not already scheduled
    fn arm_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.loop_armed {
                return;
            }
            g.loop_armed = true;
        }
        request_frame(game);
    }

    fn request_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            frame(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(game: Rc<RefCell<Game>>, time: f64) {
        let keep_running = {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                (((time - g.last_time) / 1000.0) as f32).min(MAX_FRAME_DT)
            } else {
                0.0
            };
            g.last_time = time;

            tick(&mut g.state, dt);
            g.publish_frame();
            g.state.phase == RunPhase::Running
        };

        if keep_running {
            request_frame(game);
        } else {
            // Loop parks here; the next command that enters Running re-arms it
            let mut g = game.borrow_mut();
            g.loop_armed = false;
            g.last_time = 0.0;
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(cmd) = command_for_key(&event.key()) {
                event.prevent_default();
                dispatch(&game, cmd);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Touch/pointer controls are plain buttons wired to the same commands
    /// as the keyboard
    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let bindings = [
            ("btn-left", Command::MoveLeft),
            ("btn-right", Command::MoveRight),
            ("btn-jump", Command::Jump),
            ("btn-slide", Command::Slide),
            ("start-btn", Command::Start),
            ("restart-btn", Command::Restart),
            ("pause-btn", Command::TogglePause),
            ("resume-btn", Command::TogglePause),
        ];

        for (id, cmd) in bindings {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                dispatch(&game, cmd);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Pause when the tab is hidden or the window loses focus, so wall-clock
    /// time away from the game never turns into distance
    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && game.borrow().state.phase == RunPhase::Running
                {
                    log::info!("Auto-paused (tab hidden)");
                    dispatch(&game, Command::TogglePause);
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if game.borrow().state.phase == RunPhase::Running {
                    log::info!("Auto-paused (window blur)");
                    dispatch(&game, Command::TogglePause);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// The awarder runs outside the frame loop so pickups from a run that
    /// just ended still get flushed. A coarse interval checks the debounce
    /// deadline and settles batches as their promises resolve.
    fn setup_award_pump(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut()>::new(move || {
            let now = js_sys::Date::now() / 1000.0;
            let batch = {
                let mut g = game.borrow_mut();
                let coins = g.state.stats.coins_lifetime;
                g.awarder.observe(coins, now);
                g.awarder.poll(now);

                if let Some(err) = g.awarder.take_error() {
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        set_visible(&document, "award-error", true);
                        set_text(&document, "award-error", &err.to_string());
                    }
                }

                g.awarder.sink_mut().take_batch()
            };

            if !batch.is_empty() {
                settle_batch(game.clone(), batch);
            }
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            100,
        );
        closure.forget();
    }

    /// Wait for every unit call in the batch, then report the outcome. Award
    /// failures are advisory; the run is never interrupted.
    fn settle_batch(game: Rc<RefCell<Game>>, batch: Vec<js_sys::Promise>) {
        wasm_bindgen_futures::spawn_local(async move {
            let all = js_sys::Array::new();
            for promise in &batch {
                all.push(promise);
            }
            let outcome = wasm_bindgen_futures::JsFuture::from(js_sys::Promise::all(&all)).await;

            let now = js_sys::Date::now() / 1000.0;
            let mut g = game.borrow_mut();
            match outcome {
                Ok(_) => {
                    g.awarder.on_batch_settled(Ok(()), now);
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        set_visible(&document, "award-error", false);
                    }
                }
                Err(e) => {
                    let message = e
                        .as_string()
                        .unwrap_or_else(|| "cash endpoint unreachable".to_string());
                    g.awarder.on_batch_settled(Err(AwardError::new(message)), now);
                }
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_host::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lane_dash::awarder::{CashSink, CoinAwarder};
    use lane_dash::input::Command;
    use lane_dash::sim::{GameState, RunPhase, tick};

    env_logger::init();
    log::info!("Lane Dash (native) starting...");

    /// Sink that just tallies awards for the headless demo
    #[derive(Default)]
    struct LogSink {
        awarded: u32,
    }

    impl CashSink for LogSink {
        fn award_one(&mut self) {
            self.awarded += 1;
        }
    }

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut state = GameState::new(seed);
    let mut awarder = CoinAwarder::new(LogSink::default());
    state.apply(Command::Start);

    // Headless demo: a reflex bot plays one run at 120 ticks per second
    let dt = 1.0 / 120.0f32;
    let mut now = 0.0f64;
    while state.phase == RunPhase::Running && now < 120.0 {
        if let Some(cmd) = reflex_bot(&state) {
            state.apply(cmd);
        }
        tick(&mut state, dt);
        now += dt as f64;

        awarder.observe(state.stats.coins_lifetime, now);
        awarder.poll(now);
        if awarder.is_in_flight() {
            // The demo sink completes synchronously
            awarder.on_batch_settled(Ok(()), now);
        }
    }

    println!(
        "Run finished after {:.1}s: {:.0}m traveled, {} coins collected, {} awarded",
        now,
        state.stats.distance,
        state.stats.coins_this_run,
        awarder.sink_mut().awarded,
    );
}

/// Dodge the nearest threatening obstacle; otherwise drift toward coins
#[cfg(not(target_arch = "wasm32"))]
fn reflex_bot(state: &lane_dash::sim::GameState) -> Option<lane_dash::input::Command> {
    use lane_dash::input::Command;
    use lane_dash::sim::{EntityKind, ObstacleHeight, Stance};

    let player = &state.player;

    // React to the closest obstacle bearing down on our lane
    let threat = state
        .entities
        .iter()
        .filter(|e| e.lane == player.lane && (-8.0..0.0).contains(&e.z))
        .filter_map(|e| match e.kind {
            EntityKind::Obstacle { height } => Some((e.z, height)),
            EntityKind::Coin => None,
        })
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    if let Some((_, height)) = threat {
        if player.stance == Stance::Upright {
            return Some(match height {
                ObstacleHeight::Low => Command::Jump,
                ObstacleHeight::High => Command::Slide,
            });
        }
        return None;
    }

    // No threat: sidle toward a nearby coin
    let coin = state
        .entities
        .iter()
        .filter(|e| e.is_coin() && (-20.0..-5.0).contains(&e.z))
        .min_by(|a, b| {
            a.z.abs()
                .partial_cmp(&b.z.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;

    match coin.lane.offset() - player.lane.offset() {
        d if d < 0 => Some(Command::MoveLeft),
        d if d > 0 => Some(Command::MoveRight),
        _ => None,
    }
}
