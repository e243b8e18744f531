use audiograb_core::{AppViewModel, AudioFormat, JobStatus, Msg, PlaylistMode};
use eframe::egui;

use super::constants::{JOB_TABLE_HEIGHT, URL_COLUMN_WIDTH, URL_INPUT_ROWS};

/// Draws one frame from the view model and returns the user's input as messages.
pub(crate) fn render(ctx: &egui::Context, view: &AppViewModel, log: &[String]) -> Vec<Msg> {
    let mut msgs = Vec::new();

    egui::TopBottomPanel::top("form").show(ctx, |ui| {
        ui.add_space(6.0);
        form(ui, view, &mut msgs);
        ui.add_space(6.0);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Jobs");
        job_table(ui, view);
        ui.separator();
        ui.heading("Log");
        log_view(ui, log);
    });

    msgs
}

fn form(ui: &mut egui::Ui, view: &AppViewModel, msgs: &mut Vec<Msg>) {
    ui.label("URLs (one per line):");
    let mut urls = view.urls_text.clone();
    let input = egui::TextEdit::multiline(&mut urls)
        .desired_rows(URL_INPUT_ROWS)
        .desired_width(f32::INFINITY)
        .hint_text("https://www.youtube.com/watch?v=...");
    if ui.add(input).changed() {
        msgs.push(Msg::InputChanged(urls));
    }

    ui.horizontal(|ui| {
        ui.label("Output folder:");
        let mut dir = view.output_dir.clone();
        if ui.text_edit_singleline(&mut dir).changed() {
            msgs.push(Msg::OutputDirChanged(dir));
        }
        if ui.button("Browse...").clicked() {
            let mut dialog = rfd::FileDialog::new();
            if !view.output_dir.trim().is_empty() {
                dialog = dialog.set_directory(view.output_dir.trim());
            }
            if let Some(path) = dialog.pick_folder() {
                msgs.push(Msg::OutputDirChanged(path.display().to_string()));
            }
        }
    });

    ui.horizontal(|ui| {
        ui.label("Format:");
        egui::ComboBox::from_id_source("audio_format")
            .selected_text(view.audio_format.as_str())
            .show_ui(ui, |ui| {
                for format in AudioFormat::ALL {
                    if ui
                        .selectable_label(format == view.audio_format, format.as_str())
                        .clicked()
                    {
                        msgs.push(Msg::AudioFormatSelected(format));
                    }
                }
            });

        ui.add_space(16.0);
        for mode in [PlaylistMode::Single, PlaylistMode::Playlist] {
            if ui.radio(view.playlist_mode == mode, mode.label()).clicked() {
                msgs.push(Msg::PlaylistModeSelected(mode));
            }
        }

        if view.archive_available {
            ui.add_space(16.0);
            let mut use_archive = view.use_archive;
            if ui
                .checkbox(&mut use_archive, "Skip already downloaded")
                .changed()
            {
                msgs.push(Msg::ArchiveToggled(use_archive));
            }
        }
    });

    ui.horizontal(|ui| {
        if ui
            .add_enabled(view.start_enabled, egui::Button::new("Download"))
            .clicked()
        {
            msgs.push(Msg::StartClicked);
        }
        if let Some(notice) = &view.notice {
            ui.colored_label(ui.visuals().warn_fg_color, notice);
        }
        if let Some(summary) = &view.last_summary {
            ui.label(format!(
                "Finished: {} ok, {} failed, {} errors in {:.1}s",
                summary.succeeded,
                summary.failed,
                summary.errored,
                summary.elapsed.as_secs_f64()
            ));
        }
    });
}

fn job_table(ui: &mut egui::Ui, view: &AppViewModel) {
    egui::ScrollArea::vertical()
        .id_source("jobs")
        .max_height(JOB_TABLE_HEIGHT)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            egui::Grid::new("job_grid")
                .num_columns(3)
                .striped(true)
                .show(ui, |ui| {
                    ui.strong("#");
                    ui.strong("Status");
                    ui.strong("URL");
                    ui.end_row();
                    for row in &view.jobs {
                        ui.label(row.index.to_string());
                        ui.colored_label(status_color(ui, row.status), row.status.to_string());
                        ui.add(egui::Label::new(&row.url).truncate(true))
                            .on_hover_text(&row.url);
                        ui.end_row();
                    }
                });
            ui.set_min_width(URL_COLUMN_WIDTH);
        });
}

/// Lays out only the rows in view, so frame cost does not grow with the log.
fn log_view(ui: &mut egui::Ui, lines: &[String]) {
    let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
    egui::ScrollArea::vertical()
        .id_source("log")
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show_rows(ui, row_height, lines.len(), |ui, rows| {
            for line in &lines[rows] {
                ui.monospace(line);
            }
        });
}

fn status_color(ui: &egui::Ui, status: JobStatus) -> egui::Color32 {
    let visuals = ui.visuals();
    match status {
        JobStatus::Done => egui::Color32::from_rgb(80, 170, 90),
        JobStatus::Failed(_) | JobStatus::Error => visuals.error_fg_color,
        JobStatus::Progress(audiograb_core::StatusTag::Warning) => visuals.warn_fg_color,
        _ => visuals.text_color(),
    }
}
