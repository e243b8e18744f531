use crate::{number_jobs, parse_urls, AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.form_mut().urls_text = text;
            Vec::new()
        }
        Msg::OutputDirChanged(dir) => {
            state.form_mut().output_dir = dir;
            Vec::new()
        }
        Msg::AudioFormatSelected(format) => {
            state.form_mut().audio_format = format;
            Vec::new()
        }
        Msg::PlaylistModeSelected(mode) => {
            state.form_mut().playlist_mode = mode;
            Vec::new()
        }
        Msg::ArchiveToggled(enabled) => {
            state.form_mut().use_archive = enabled;
            Vec::new()
        }
        Msg::StartClicked => start_batch(&mut state),
        Msg::LogAppended(text) => {
            state.append_log(text);
            Vec::new()
        }
        Msg::JobStatusChanged { index, status } => {
            state.apply_status(index, status);
            Vec::new()
        }
        Msg::BatchDone(summary) => {
            state.finish_batch(summary);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn start_batch(state: &mut AppState) -> Vec<Effect> {
    // A running batch keeps the start control locked until its Done arrives.
    if state.is_running() {
        return Vec::new();
    }

    let urls = parse_urls(&state.form().urls_text);
    if urls.is_empty() {
        state.set_notice("Paste at least one URL.");
        return Vec::new();
    }
    if state.form().output_dir.trim().is_empty() {
        state.set_notice("Choose an output directory.");
        return Vec::new();
    }

    let options = state.form().batch_options();
    let jobs = number_jobs(urls);
    state.begin_batch(&jobs);

    vec![Effect::StartBatch { jobs, options }]
}
