//! Cave Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, TouchEvent};

    use cave_runner::consts::*;
    use cave_runner::platform::default_store;
    use cave_runner::renderer::canvas::CanvasRenderer;
    use cave_runner::renderer::{scene, scores_panel};
    use cave_runner::services::Services;
    use cave_runner::services::http::{HttpLeaderboard, HttpTelemetry};
    use cave_runner::sim::{GamePhase, TickInput};
    use cave_runner::{App, Tuning};

    /// Game instance holding all state
    struct Game {
        app: App,
        renderer: CanvasRenderer,
        input: TickInput,
        /// Name being typed on the start screen
        name_buffer: String,
        last_time: f64,
        idle_mode: bool,
    }

    impl Game {
        fn update(&mut self, dt: f32) {
            self.input.idle_mode = self.idle_mode;
            let input = std::mem::take(&mut self.input);
            self.app.frame(&input, dt);

            // Attract loop restarts on its own
            if self.idle_mode && self.app.state.phase == GamePhase::GameOver {
                self.input.confirm = true;
            }
        }

        fn render(&self) {
            let mut commands = scene(&self.app.state);
            if matches!(
                self.app.state.phase,
                GamePhase::StartScreen | GamePhase::GameOver
            ) {
                let global = self.app.global_scores();
                commands.extend(scores_panel(
                    &self.app.high_scores,
                    global.as_deref(),
                    glam::Vec2::new(FIELD_WIDTH - 120.0, 120.0),
                ));
            }
            if let Some(n) = self.app.active_players() {
                commands.push(cave_runner::renderer::DrawCommand::text(
                    glam::Vec2::new(16.0, FIELD_HEIGHT - 12.0),
                    format!("{} playing now", n),
                    12.0,
                    cave_runner::renderer::Color::WHITE,
                    cave_runner::renderer::Align::Left,
                ));
            }
            self.renderer.draw(&commands);
        }

        fn key_down(&mut self, event: &KeyboardEvent) {
            let key = event.key();
            match self.app.state.phase {
                GamePhase::StartScreen => match key.as_str() {
                    "ArrowLeft" => {
                        self.input.select_character = Some(self.app.state.character.prev());
                    }
                    "ArrowRight" => {
                        self.input.select_character = Some(self.app.state.character.next());
                    }
                    "Enter" => {
                        self.input.player_name = Some(self.name_buffer.clone());
                        self.input.confirm = true;
                    }
                    "Backspace" => {
                        self.name_buffer.pop();
                        self.input.player_name = Some(self.name_buffer.clone());
                    }
                    k if k.chars().count() == 1 => {
                        self.name_buffer.push_str(k);
                        self.input.player_name = Some(self.name_buffer.clone());
                    }
                    _ => {}
                },
                GamePhase::GameOver => {
                    if key == "Enter" {
                        self.input.confirm = true;
                    }
                }
                _ => match key.as_str() {
                    "1" | "2" | "3" | "4" => {
                        self.input.jump = key.parse().ok();
                    }
                    " " | "ArrowUp" | "w" => self.input.jump = Some(1),
                    "p" | "P" | "Escape" => self.input.pause = true,
                    _ => return,
                },
            }
            event.prevent_default();
        }

        fn touch(&mut self) {
            match self.app.state.phase {
                GamePhase::StartScreen | GamePhase::GameOver => {
                    if self.name_buffer.is_empty() && self.app.state.player_name.is_empty() {
                        self.name_buffer = "Runner".into();
                    }
                    if !self.name_buffer.is_empty() {
                        self.input.player_name = Some(self.name_buffer.clone());
                    }
                    self.input.confirm = true;
                }
                _ => self.input.jump = Some(2),
            }
        }
    }

    fn query_param(name: &str) -> Option<String> {
        let search = web_sys::window()?.location().search().ok()?;
        search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|kv| kv.split_once('=').or(Some((kv, ""))))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
    }

    fn build_services() -> Services {
        let services = Services::local();
        match query_param("api").filter(|url| !url.is_empty()) {
            Some(url) => {
                log::info!("Using remote services at {}", url);
                services
                    .with_leaderboard(Box::new(HttpLeaderboard::new(url.clone())))
                    .with_telemetry(Box::new(HttpTelemetry::new(url)))
            }
            None => services,
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Cave Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .expect("getContext failed")
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let app = App::new(seed, Tuning::default(), default_store(), build_services());

        // Canvas size from the saved scale
        let dpr = window.device_pixel_ratio();
        let scale = app.settings.canvas_scale as f64;
        let width = (FIELD_WIDTH as f64 * scale * dpr) as u32;
        let height = (FIELD_HEIGHT as f64 * scale * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let mut renderer = CanvasRenderer::new(ctx);
        renderer.resize(width, height);

        let name_buffer = app.state.player_name.clone();
        let game = Rc::new(RefCell::new(Game {
            app,
            renderer,
            input: TickInput::default(),
            name_buffer,
            last_time: 0.0,
            idle_mode: query_param("demo").is_some(),
        }));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_auto_pause(game.clone());
        request_animation_frame(game);

        log::info!("Cave Runner running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().key_down(&event);
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if event.touches().length() > 0 {
                    game.borrow_mut().touch();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                1.0 / 60.0
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    if g.app.state.phase == GamePhase::Playing {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                    // Do not count hidden time toward the next frame's dt
                    g.last_time = 0.0;
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.app.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window
                .add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Close the telemetry session when the page goes away
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().app.shutdown();
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cave_runner::platform::MemoryStore;
    use cave_runner::services::Services;
    use cave_runner::sim::{GamePhase, TickInput};
    use cave_runner::{App, Tuning};

    env_logger::init();
    log::info!("Cave Runner (native) starting...");
    log::info!(
        "Native mode runs a headless autopilot demo - use `trunk serve` for the web version"
    );

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                Tuning::default()
            }),
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let mut app = App::new(seed, tuning, Box::new(MemoryStore::new()), Services::local());
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let dt = 1.0 / 60.0;
    let max_ticks = 60 * 60 * 5;
    let mut ticks = 0;
    while ticks < max_ticks {
        app.frame(&input, dt);
        ticks += 1;
        if app.state.phase == GamePhase::GameOver {
            break;
        }
    }
    app.shutdown();

    let s = app.state.summary();
    println!(
        "\nseed {}: score {} | level {} | {} obstacles | best combo {} | {:.1}s played",
        seed, s.score, s.level, s.obstacles_cleared, s.max_combo, s.time
    );
}
