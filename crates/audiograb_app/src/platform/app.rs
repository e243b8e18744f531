use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use audiograb_core::{update, AppState, AppViewModel, Msg};
use audiograb_engine::{AppPaths, EngineConfig, EngineHandle};
use eframe::egui;
use grab_logging::{grab_debug, grab_info};

use super::ui::constants::{APP_ID, DRAIN_INTERVAL, WINDOW_SIZE, WINDOW_TITLE};
use super::{effects, settings, ui};

pub fn run_app(paths: AppPaths) -> anyhow::Result<()> {
    let form = settings::load(&paths.settings_file()).into_form(&paths);
    let config = EngineConfig {
        paths: paths.clone(),
        ..EngineConfig::for_base_dir(paths.base())
    };
    let engine = EngineHandle::new(config).context("starting engine")?;
    let app = AudiograbApp::new(AppState::with_form(form), engine, paths.settings_file());
    grab_info!("window starting in {}", paths.base().display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };
    eframe::run_native(APP_ID, options, Box::new(|_cc| Box::new(app)))
        .map_err(|err| anyhow::anyhow!("window closed with error: {err}"))
}

struct AudiograbApp {
    state: AppState,
    view: AppViewModel,
    engine: EngineHandle,
    settings_path: PathBuf,
    last_drain: Instant,
}

impl AudiograbApp {
    fn new(state: AppState, engine: EngineHandle, settings_path: PathBuf) -> Self {
        let view = state.view();
        Self {
            state,
            view,
            engine,
            settings_path,
            last_drain: Instant::now(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects::run(&self.engine, effects);
    }

    /// Rebuilds the view model at most once per frame; the log is read from the state directly.
    fn refresh_view(&mut self) {
        if self.state.consume_dirty() {
            self.view = self.state.view();
        }
    }

    fn drain_engine(&mut self) {
        let mut drained = 0usize;
        while let Some(event) = self.engine.try_recv() {
            self.dispatch(effects::to_msg(event));
            drained += 1;
        }
        if drained > 0 {
            grab_debug!("drained {drained} engine events");
        }
    }
}

impl eframe::App for AudiograbApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.last_drain.elapsed() >= DRAIN_INTERVAL {
            self.drain_engine();
            self.dispatch(Msg::Tick);
            self.last_drain = Instant::now();
        }

        self.refresh_view();
        for msg in ui::render::render(ctx, &self.view, self.state.log()) {
            self.dispatch(msg);
        }

        ctx.request_repaint_after(DRAIN_INTERVAL);
    }
}

impl Drop for AudiograbApp {
    fn drop(&mut self) {
        self.engine.shutdown();
        settings::save(
            &self.settings_path,
            &settings::Settings::from_form(self.state.form()),
        );
        grab_info!("window closed");
    }
}
