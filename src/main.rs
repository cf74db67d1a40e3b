//! Arcade Plinko entry point
//!
//! In the browser this mounts the board and runs the animation loop. Natively
//! it predicts the featured game for weekly seeds.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Element, HtmlElement, KeyboardEvent, MouseEvent, Response};

    use arcade_plinko::audio::{AudioManager, SoundEffect};
    use arcade_plinko::renderer::CanvasRenderer;
    use arcade_plinko::seed::{self, SeedSource};
    use arcade_plinko::{
        Catalog, PlinkoError, PlinkoEvent, PlinkoSession, PlinkoSettings, SelectionHistory,
        Sequencer,
    };

    const CONTAINER_ID: &str = "game-container";
    const RESULT_ID: &str = "score";
    const RANDOMIZE_ID: &str = "randomize-button";
    const CATALOG_URL: &str = "gamelist.txt";

    /// Page-level state: the round plus what it is drawn on
    struct Board {
        sequencer: Sequencer,
        renderer: CanvasRenderer,
        container: Element,
        settings: PlinkoSettings,
        /// Countdown label currently shown over the board
        overlay: Rc<Cell<Option<&'static str>>>,
    }

    impl Board {
        fn render(&self) {
            self.renderer
                .draw(self.sequencer.session(), self.overlay.get());
        }

        /// Keep the falling ball in the middle of the viewport
        fn follow_ball(&self) {
            if !self.settings.follow_ball {
                return;
            }
            let Some(window) = web_sys::window() else { return };
            let container_top =
                self.container.get_bounding_client_rect().top() + window.scroll_y().unwrap_or(0.0);
            let viewport = window
                .inner_height()
                .ok()
                .and_then(|h| h.as_f64())
                .unwrap_or(0.0);
            if let Some(top) = self
                .sequencer
                .scroll_target(container_top as f32, viewport as f32)
            {
                let options = web_sys::ScrollToOptions::new();
                options.set_top(top as f64);
                options.set_behavior(web_sys::ScrollBehavior::Smooth);
                window.scroll_to_with_scroll_to_options(&options);
            }
        }

        fn update_controls(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(button) = document
                .get_element_by_id(RANDOMIZE_ID)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let display = if self.sequencer.randomize_visible() {
                    "block"
                } else {
                    "none"
                };
                let _ = button.style().set_property("display", display);
            }
        }

        fn log_error(result: Result<Vec<PlinkoEvent>, PlinkoError>) {
            if let Err(e) = result {
                log::error!("Round error: {}", e);
            }
        }
    }

    /// Fetch a text resource relative to the page
    async fn fetch_text(url: &str) -> Result<String, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let response: Response = JsFuture::from(window.fetch_with_str(url))
            .await?
            .dyn_into()?;
        if !response.ok() {
            return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
        }
        let text = JsFuture::from(response.text()?).await?;
        text.as_string()
            .ok_or_else(|| JsValue::from_str("response is not text"))
    }

    async fn load_catalog() -> Catalog {
        let result = fetch_text(CATALOG_URL)
            .await
            .map(|text| Catalog::parse(&text))
            .map_err(|e| PlinkoError::Catalog(format!("{}: {:?}", CATALOG_URL, e)));
        let catalog = Catalog::or_empty(result);
        log::info!("Catalog has {} titles", catalog.len());
        catalog
    }

    /// Local calendar date from the browser clock
    fn browser_today() -> chrono::NaiveDate {
        let now = js_sys::Date::new_0();
        chrono::NaiveDate::from_ymd_opt(
            now.get_full_year() as i32,
            now.get_month() + 1,
            now.get_date(),
        )
        .unwrap_or_else(seed::today)
    }

    /// The `seed` query parameter; a `Redirect` has already reloaded the page
    fn seed_source(window: &web_sys::Window) -> SeedSource {
        let location = window.location();
        let search = location.search().unwrap_or_default();
        let params = web_sys::UrlSearchParams::new_with_str(&search).ok();
        let raw = params.as_ref().and_then(|p| p.get("seed"));
        let source = SeedSource::from_param(raw.as_deref(), browser_today());
        if let (SeedSource::Redirect(concrete), Some(params)) = (&source, &params) {
            log::info!("Seed {:?} resolves to {}, redirecting", raw, concrete);
            params.set("seed", concrete);
            let query: String = params.to_string().into();
            let _ = location.set_search(&query);
        }
        source
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Arcade Plinko starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let seed = match seed_source(&window) {
            SeedSource::Redirect(_) => return,
            SeedSource::Param(seed) => Some(seed),
            SeedSource::Absent => None,
        };

        let settings = PlinkoSettings::load();
        let catalog = load_catalog().await;

        let config = settings.board_config();
        let session = match &seed {
            Some(seed) => PlinkoSession::seeded(seed, catalog, config),
            None => {
                let week = seed::get_seed(None, browser_today());
                log::info!("No seed parameter, interactive round on week {}", week);
                PlinkoSession::interactive(&week, catalog, config)
            }
        };
        let session = match session {
            Ok(session) => session,
            Err(e) => {
                log::error!("Cannot build board: {}", e);
                return;
            }
        };

        let container = document
            .get_element_by_id(CONTAINER_ID)
            .expect("no game container");
        let renderer = CanvasRenderer::mount(&container, config.width, config.height)
            .expect("Failed to create canvas");

        let mut sequencer = Sequencer::new(session)
            .with_timing(settings.countdown_step_ms, settings.reset_delay_ms);

        // Result text
        {
            let document = document.clone();
            sequencer.subscribe(move |event| {
                if let Some(text) = event.result_text() {
                    if let Some(el) = document.get_element_by_id(RESULT_ID) {
                        el.set_text_content(Some(&text));
                    }
                }
            });
        }

        // Sounds
        {
            let mut audio = AudioManager::new();
            audio.set_volume(settings.effective_volume());
            audio.set_muted(!settings.sound);
            sequencer.subscribe(move |event| {
                if let Some(effect) = SoundEffect::for_event(event) {
                    audio.play(effect);
                }
            });
        }

        // Session history of picks
        sequencer.subscribe(|event| {
            if let PlinkoEvent::Resolved(title) = event {
                let mut history = SelectionHistory::load();
                history.push(title);
                history.save();
            }
        });

        // Countdown overlay
        let overlay = Rc::new(Cell::new(None));
        {
            let overlay = overlay.clone();
            sequencer.subscribe(move |event| match event {
                PlinkoEvent::Countdown(label) => overlay.set(Some(*label)),
                PlinkoEvent::CountdownCancelled
                | PlinkoEvent::Collision(_)
                | PlinkoEvent::Reset => overlay.set(None),
                _ => {}
            });
        }

        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        sequencer.start(now);
        window.scroll_to_with_x_and_y(0.0, 0.0);

        let board = Rc::new(RefCell::new(Board {
            sequencer,
            renderer,
            container,
            settings,
            overlay,
        }));

        setup_input_handlers(board.clone());
        setup_randomize_button(board.clone());
        setup_resize(board.clone());

        board.borrow().update_controls();
        request_animation_frame(board);

        log::info!("Arcade Plinko running!");
    }

    fn setup_input_handlers(board: Rc<RefCell<Board>>) {
        let canvas = board.borrow().renderer.canvas().clone();

        // Preview follows the pointer
        {
            let board = board.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut b = board.borrow_mut();
                if let Err(e) = b.sequencer.pointer_move(event.offset_x() as f32) {
                    log::error!("Preview failed: {}", e);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let board = board.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                board.borrow_mut().sequencer.pointer_leave();
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click drops (or skips the countdown)
        {
            let board = board.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut b = board.borrow_mut();
                let result = b.sequencer.click(event.offset_x() as f32);
                Board::log_error(result);
                b.update_controls();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Space drops at the centre
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() != " " {
                    return;
                }
                event.prevent_default();
                let mut b = board.borrow_mut();
                let result = b.sequencer.key_drop();
                Board::log_error(result);
                b.update_controls();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_randomize_button(board: Rc<RefCell<Board>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id(RANDOMIZE_ID) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut b = board.borrow_mut();
                b.sequencer.randomize();
                b.render();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(board: Rc<RefCell<Board>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
            let mut b = board.borrow_mut();
            let available = b.container.client_width() as f32;
            let width = if available > 0.0 {
                available.min(b.settings.board_width)
            } else {
                b.settings.board_width
            };
            let height = b.settings.board_height;
            b.sequencer.resize(now, width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(board: Rc<RefCell<Board>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            board_loop(board, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn board_loop(board: Rc<RefCell<Board>>, time: f64) {
        {
            let mut b = board.borrow_mut();
            let width_before = b.sequencer.session().layout().width;
            let result = b.sequencer.frame(time);
            let resized = b.sequencer.session().layout().width != width_before;
            if resized {
                let layout = b.sequencer.session().layout();
                b.renderer.resize(layout.width, layout.height);
            }
            let changed = result
                .as_ref()
                .map(|events| {
                    events
                        .iter()
                        .any(|e| matches!(e, PlinkoEvent::Reset | PlinkoEvent::Dropped { .. }))
                })
                .unwrap_or(false);
            Board::log_error(result);

            b.render();
            b.follow_ball();
            if changed {
                b.update_controls();
            }
        }

        request_animation_frame(board);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use arcade_plinko::seed::{self, SeedParam};
    use arcade_plinko::{Catalog, PlinkoSettings, predict};

    /// Predict the featured game for weekly Plinko seeds
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    pub struct CliArgs {
        /// Game list: one title per line, `#` starts a comment
        #[arg(short, long, default_value = "gamelist.txt")]
        catalog: PathBuf,

        /// Seed to run; `now` and `next` name the current and the next week
        #[arg(short, long, conflicts_with = "weeks")]
        seed: Option<String>,

        /// Number of consecutive weeks to predict, starting this week
        #[arg(short, long, default_value_t = 1)]
        weeks: usize,

        /// Settings JSON overriding the reference board
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Give up on a round after this many physics steps
        #[arg(long, default_value_t = 20_000)]
        max_steps: usize,

        /// Print full predictions as JSON lines
        #[arg(long)]
        json: bool,
    }

    pub fn run(args: CliArgs) -> Result<()> {
        let settings = match &args.settings {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading settings {}", path.display()))?;
                PlinkoSettings::from_json(&json)
                    .with_context(|| format!("parsing settings {}", path.display()))?
            }
            None => PlinkoSettings::default(),
        };
        let config = settings.board_config();

        let catalog = Catalog::from_file(&args.catalog)
            .with_context(|| format!("loading catalog {}", args.catalog.display()))?;
        if catalog.is_empty() {
            log::warn!("Catalog is empty, every zone is a placeholder");
        }

        let today = seed::today();
        let seeds = match &args.seed {
            Some(raw) => vec![SeedParam::parse(raw).resolve(today)],
            None => seed::week_seeds(today, args.weeks),
        };
        if seeds.is_empty() {
            bail!("nothing to predict");
        }

        for seed in seeds {
            let prediction = predict(&seed, &catalog, &config, args.max_steps)
                .with_context(|| format!("running seed {}", seed))?;
            if args.json {
                println!("{}", serde_json::to_string(&prediction)?);
            } else {
                match &prediction.title {
                    Some(title) => println!("{}: {}", seed, title),
                    None => println!("{}: (no selection after {} steps)", seed, prediction.steps),
                }
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    cli::run(cli::CliArgs::parse())
}
