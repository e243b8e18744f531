use audiograb_core::{Effect, Msg};
use audiograb_engine::{EngineEvent, EngineHandle};
use grab_logging::grab_info;

pub(crate) fn run(engine: &EngineHandle, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::StartBatch { jobs, options } => {
                grab_info!(
                    "StartBatch jobs={} out={} format={} mode={}",
                    jobs.len(),
                    options.output_dir.display(),
                    options.audio_format,
                    options.playlist_mode
                );
                engine.start_batch(jobs, options);
            }
        }
    }
}

pub(crate) fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Log(line) => Msg::LogAppended(line),
        EngineEvent::Status { index, status } => Msg::JobStatusChanged { index, status },
        EngineEvent::Done(summary) => Msg::BatchDone(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiograb_core::{BatchSummary, JobStatus};

    #[test]
    fn engine_events_map_one_to_one() {
        assert_eq!(
            to_msg(EngineEvent::Log("[1] x".into())),
            Msg::LogAppended("[1] x".into())
        );
        assert_eq!(
            to_msg(EngineEvent::Status {
                index: 2,
                status: JobStatus::Failed(3)
            }),
            Msg::JobStatusChanged {
                index: 2,
                status: JobStatus::Failed(3)
            }
        );
        let summary = BatchSummary::default();
        assert_eq!(to_msg(EngineEvent::Done(summary)), Msg::BatchDone(summary));
    }
}
