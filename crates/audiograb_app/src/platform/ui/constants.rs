use std::time::Duration;

pub const APP_ID: &str = "audiograb";
pub const WINDOW_TITLE: &str = "Audiograb";
pub const WINDOW_SIZE: [f32; 2] = [900.0, 680.0];

/// How often the engine channel is drained.
pub const DRAIN_INTERVAL: Duration = Duration::from_millis(200);

pub const URL_INPUT_ROWS: usize = 6;
pub const JOB_TABLE_HEIGHT: f32 = 160.0;
pub const URL_COLUMN_WIDTH: f32 = 520.0;
