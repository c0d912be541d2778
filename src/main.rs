//! Function Aim entry point
//!
//! Handles platform-specific initialization and wires the controller to the
//! page. Drawing is done by the page's own renderer, which reads the scene
//! JSON published on the canvas element.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement};

    use function_aim::sim::{GameState, LevelCatalog, Trace};
    use function_aim::{GameConfig, GameController};

    /// Latest trace for the level on the board
    type LatestTrace = Rc<RefCell<Option<Trace>>>;

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn update_hud(document: &Document, catalog: &LevelCatalog, state: &GameState) {
        set_text(document, "status", &state.status_message());
        set_text(
            document,
            "level",
            &format!("Level: {} / {}", state.level_index + 1, catalog.len()),
        );
        set_text(
            document,
            "hint",
            &format!("Hint: {}", catalog.clamped(state.level_index).hint),
        );
        if let Some(input) = document
            .get_element_by_id("function-input")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&state.expression);
        }
    }

    /// Hand the current scene to the page renderer
    fn publish_scene(document: &Document, controller: &GameController, latest: &LatestTrace) {
        let scene = controller.scene(latest.borrow().as_ref());
        match scene.to_json() {
            Ok(json) => {
                if let Some(canvas) = document.get_element_by_id("canvas") {
                    let _ = canvas.set_attribute("data-scene", &json);
                }
            }
            Err(e) => log::warn!("Scene serialization failed: {}", e),
        }
    }

    /// Optional `<script id="game-config" type="application/json">` override,
    /// then an optional `data-collision` attribute on the canvas
    fn load_config(document: &Document) -> GameConfig {
        let json = document
            .get_element_by_id("game-config")
            .and_then(|el| el.text_content());
        let config = match json.map(|json| GameConfig::from_json(&json)) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("Ignoring page config: {}", e);
                GameConfig::default()
            }
            None => GameConfig::default(),
        };

        let Some(mode) = document
            .get_element_by_id("canvas")
            .and_then(|canvas| canvas.get_attribute("data-collision"))
        else {
            return config;
        };
        match config.clone().with_collision_name(&mode) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring canvas collision mode: {}", e);
                config
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Function Aim starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let catalog = LevelCatalog::standard();
        let seed = js_sys::Date::now() as u64;
        let controller = GameController::new(catalog.clone(), load_config(&document), seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let controller = Rc::new(RefCell::new(controller));
        let latest: LatestTrace = Rc::new(RefCell::new(None));

        {
            let hud_document = document.clone();
            let hud_latest = latest.clone();
            let mut c = controller.borrow_mut();
            c.subscribe(move |state, trace| {
                update_hud(&hud_document, &catalog, state);
                *hud_latest.borrow_mut() = trace.cloned();
            });
            update_hud(&document, c.catalog(), c.state());
            publish_scene(&document, &c, &latest);
        }

        setup_submit_form(&document, controller, latest)?;
        Ok(())
    }

    fn setup_submit_form(
        document: &Document,
        controller: Rc<RefCell<GameController>>,
        latest: LatestTrace,
    ) -> Result<(), JsValue> {
        let form = document
            .get_element_by_id("function-form")
            .ok_or("missing #function-form")?;

        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            let Some(input) = doc
                .get_element_by_id("function-input")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let mut c = controller.borrow_mut();
            c.submit(&input.value());
            publish_scene(&doc, &c, &latest);
        });
        form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Function Aim (native) starting...");
    log::info!("Native mode is a smoke run - build for wasm32 to play in the browser");

    if let Err(e) = play_hints() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play each level's example function until the game is completed or the
/// attempts run out
///
/// `FUNCTION_AIM_COLLISION` (`line` or `segment`) picks the collision mode.
#[cfg(not(target_arch = "wasm32"))]
fn play_hints() -> Result<(), function_aim::ConfigError> {
    use function_aim::{GameConfig, GameController, LevelCatalog};

    let mut config = GameConfig::default();
    if let Ok(mode) = std::env::var("FUNCTION_AIM_COLLISION") {
        config = config.with_collision_name(&mode)?;
    }
    let mut controller = GameController::new(LevelCatalog::standard(), config, 2024)?;
    let attempts = controller.catalog().len() * 3;

    for _ in 0..attempts {
        let level = controller.state().level_index;
        let hint = controller.level().example_expression().to_string();
        let shot = controller.submit(&hint);
        let samples = shot.trace.as_ref().map_or(0, |t| t.points.len());
        println!(
            "Level {:>2} | {:<26} | {:>3} samples | {}",
            level + 1,
            hint,
            samples,
            controller.status_message()
        );
        if controller.state().is_completed() {
            break;
        }
    }
    Ok(())
}
