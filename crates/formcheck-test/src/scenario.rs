//! End-to-end session scenarios

use formcheck_core::{Detection, FormcheckError, PipelineConfig};
use formcheck_runtime::{ComparisonPipeline, PlaybackCommand, SessionReport};

use crate::{RecordingSink, ScriptedEstimator, ScriptedSource};

/// Everything observable after a scenario ran
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub report: SessionReport,
    pub sink: RecordingSink,
    pub performed_reads: u64,
    pub reference_reads: u64,
    pub detectors_released: u32,
}

/// A scenario that stopped with an error
#[derive(Debug)]
pub struct ScenarioFailure {
    pub error: FormcheckError,
    pub detectors_released: u32,
}

/// Builder for a two-stream comparison session
pub struct ScenarioBuilder {
    config: PipelineConfig,
    performed: Vec<Option<Detection>>,
    reference: Vec<Option<Detection>>,
    performed_failures: Vec<u64>,
    reference_unavailable: bool,
    commands: Vec<(u64, PlaybackCommand)>,
}

impl ScenarioBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            performed: Vec::new(),
            reference: Vec::new(),
            performed_failures: Vec::new(),
            reference_unavailable: false,
            commands: Vec::new(),
        }
    }

    pub fn performed(mut self, track: Vec<Option<Detection>>) -> Self {
        self.performed = track;
        self
    }

    pub fn reference(mut self, track: Vec<Option<Detection>>) -> Self {
        self.reference = track;
        self
    }

    /// Make the performed-side estimator error on these frame indices
    pub fn performed_failures(mut self, indices: Vec<u64>) -> Self {
        self.performed_failures = indices;
        self
    }

    /// Make the reference source fail to open
    pub fn reference_unavailable(mut self) -> Self {
        self.reference_unavailable = true;
        self
    }

    /// Deliver a command on the given poll
    pub fn command(mut self, poll: u64, command: PlaybackCommand) -> Self {
        self.commands.push((poll, command));
        self
    }

    /// Build the pipeline and run it to termination
    pub fn run(self) -> Result<ScenarioOutcome, ScenarioFailure> {
        let performed = ScriptedSource::new(self.performed);
        let reference = if self.reference_unavailable {
            ScriptedSource::unavailable()
        } else {
            ScriptedSource::new(self.reference)
        };
        let performed_reads = performed.read_counter();
        let reference_reads = reference.read_counter();

        let performed_estimator = ScriptedEstimator::new().failing_on(self.performed_failures);
        let reference_estimator = ScriptedEstimator::new();
        let performed_released = performed_estimator.release_counter();
        let reference_released = reference_estimator.release_counter();

        let mut sink = self
            .commands
            .into_iter()
            .fold(RecordingSink::new(), |sink, (poll, command)| {
                sink.with_command(poll, command)
            });

        let released = || performed_released.get() + reference_released.get();
        let report = ComparisonPipeline::new(
            self.config,
            performed,
            reference,
            performed_estimator,
            reference_estimator,
        )
        .and_then(|pipeline| pipeline.run(&mut sink))
        .map_err(|error| ScenarioFailure {
            error,
            detectors_released: released(),
        })?;

        Ok(ScenarioOutcome {
            report,
            sink,
            performed_reads: performed_reads.get(),
            reference_reads: reference_reads.get(),
            detectors_released: released(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PoseGenerator, PoseNoise};
    use formcheck_core::{SimilarityBand, SkeletonLayout, StreamSide};
    use formcheck_runtime::{SessionOutcome, TerminationReason};
    use proptest::prelude::*;

    fn generator() -> PoseGenerator {
        PoseGenerator::with_seed(SkeletonLayout::MediaPipe, 42)
    }

    #[test]
    fn test_identical_single_frame_streams() {
        let pose = generator().base_pose(0.0);
        let outcome = ScenarioBuilder::new(PipelineConfig::default())
            .performed(vec![Some(pose.clone())])
            .reference(vec![Some(pose)])
            .run()
            .unwrap();

        let rendered = outcome.sink.rendered();
        assert_eq!(rendered.len(), 1);
        assert!((rendered[0].result.similarity - 1.0).abs() < 1e-9);
        assert!(rendered[0].result.problematic_joints.is_empty());
        assert!(rendered[0].result.both_detected);
        assert_eq!(rendered[0].band, SimilarityBand::Good);

        let stats = outcome.report.outcome.stats().copied().unwrap();
        assert_eq!(stats.count, 1);
        for value in [stats.mean, stats.max, stats.min] {
            assert!((value - 1.0).abs() < 1e-9);
        }
        assert_eq!(outcome.report.reason, TerminationReason::EndOfStream);
    }

    #[test]
    fn test_no_body_on_performed_side_is_empty_session() {
        let reference = generator().track(5, &PoseNoise::none());
        let outcome = ScenarioBuilder::new(PipelineConfig::default())
            .performed(vec![None; 5])
            .reference(reference)
            .run()
            .unwrap();

        assert_eq!(outcome.report.outcome, SessionOutcome::Empty);
        assert_eq!(outcome.report.frames_advanced, 5);
        assert_eq!(outcome.report.frames_compared, 0);
        assert!(outcome
            .sink
            .rendered()
            .iter()
            .all(|r| !r.result.both_detected && r.result.similarity == 0.0));
    }

    #[test]
    fn test_shorter_stream_terminates_session() {
        let mut generator = generator();
        let performed = generator.track(3, &PoseNoise::none());
        let reference = generator.track(8, &PoseNoise::none());
        let outcome = ScenarioBuilder::new(PipelineConfig::default())
            .performed(performed)
            .reference(reference)
            .run()
            .unwrap();

        assert_eq!(outcome.report.frames_advanced, 3);
        // Call N_A + 1 reads both sides once more, then nothing is drained
        assert_eq!(outcome.performed_reads, 4);
        assert_eq!(outcome.reference_reads, 4);
        assert_eq!(outcome.sink.rendered()[0].total_frames, 3);
    }

    #[test]
    fn test_pause_holds_sources() {
        let track = generator().track(4, &PoseNoise::none());
        let outcome = ScenarioBuilder::new(PipelineConfig::default())
            .performed(track.clone())
            .reference(track)
            .command(2, PlaybackCommand::Pause)
            .command(6, PlaybackCommand::Resume)
            .run()
            .unwrap();

        assert_eq!(
            outcome.sink.rendered_indices(),
            vec![0, 1, 1, 1, 1, 1, 2, 3]
        );
        let rendered = outcome.sink.rendered();
        assert!(rendered
            .iter()
            .all(|r| r.performed_index == r.result.frame_index
                && r.reference_index == r.result.frame_index));
        assert_eq!(outcome.report.frames_advanced, 4);
        assert_eq!(outcome.performed_reads, 5);
        assert_eq!(outcome.report.outcome.stats().unwrap().count, 4);
    }

    #[test]
    fn test_quit_while_paused() {
        let track = generator().track(10, &PoseNoise::none());
        let outcome = ScenarioBuilder::new(PipelineConfig::default())
            .performed(track.clone())
            .reference(track)
            .command(1, PlaybackCommand::TogglePause)
            .command(3, PlaybackCommand::Quit)
            .run()
            .unwrap();

        assert_eq!(outcome.report.reason, TerminationReason::Quit);
        assert_eq!(outcome.report.frames_advanced, 1);
        assert_eq!(outcome.performed_reads, 1);
        assert_eq!(outcome.sink.rendered_indices(), vec![0, 0, 0]);
        assert_eq!(outcome.sink.polls(), 3);
        assert_eq!(outcome.detectors_released, 2);
    }

    #[test]
    fn test_estimator_failure_counts_as_no_detection() {
        let track = generator().track(4, &PoseNoise::none());
        let outcome = ScenarioBuilder::new(PipelineConfig::default())
            .performed(track.clone())
            .reference(track)
            .performed_failures(vec![1, 2])
            .run()
            .unwrap();

        assert_eq!(outcome.report.frames_advanced, 4);
        assert_eq!(outcome.report.frames_compared, 2);
        let detected: Vec<bool> = outcome
            .sink
            .rendered()
            .iter()
            .map(|r| r.result.both_detected)
            .collect();
        assert_eq!(detected, vec![true, false, false, true]);
    }

    #[test]
    fn test_wrong_layout_aborts_session() {
        let coco = PoseGenerator::with_seed(SkeletonLayout::Coco, 1).track(2, &PoseNoise::none());
        let err = ScenarioBuilder::new(PipelineConfig::default())
            .performed(coco.clone())
            .reference(coco)
            .run()
            .unwrap_err();
        assert_eq!(
            err.error,
            FormcheckError::LandmarkCount {
                expected: 33,
                actual: 17
            }
        );
        assert_eq!(err.detectors_released, 2);
    }

    #[test]
    fn test_unavailable_source_never_starts() {
        let track = generator().track(3, &PoseNoise::none());
        let err = ScenarioBuilder::new(PipelineConfig::default())
            .performed(track)
            .reference_unavailable()
            .run()
            .unwrap_err();
        assert!(matches!(
            err.error,
            FormcheckError::SourceUnavailable {
                side: StreamSide::Reference,
                ..
            }
        ));
        assert!(err.error.is_fatal());
        assert_eq!(err.detectors_released, 2);
    }

    #[test]
    fn test_sloppy_form_scores_lower() {
        let mut generator = generator();
        let reference = generator.track(60, &PoseNoise::none());
        let steady = generator.track(60, &PoseNoise::steady());
        let sloppy = generator.track(60, &PoseNoise::sloppy());

        let run = |performed| {
            ScenarioBuilder::new(PipelineConfig::default())
                .performed(performed)
                .reference(reference.clone())
                .run()
                .unwrap()
        };
        let steady = run(steady);
        let sloppy = run(sloppy);

        let steady_stats = steady.report.outcome.stats().copied().unwrap();
        let sloppy_stats = sloppy.report.outcome.stats().copied().unwrap();
        assert_eq!(steady_stats.count, 60);
        assert!(sloppy_stats.count < 60);
        assert!(steady_stats.mean > sloppy_stats.mean);

        let steady_issues: usize = steady.sink.rendered().iter().map(|r| r.result.issue_count()).sum();
        let sloppy_issues: usize = sloppy.sink.rendered().iter().map(|r| r.result.issue_count()).sum();
        assert_eq!(steady_issues, 0);
        assert!(sloppy_issues > 0);
    }

    #[test]
    fn test_labels_reach_sink() {
        let pose = generator().base_pose(0.0);
        let config = PipelineConfig {
            performed_label: "YOU".into(),
            reference_label: "COACH".into(),
            ..PipelineConfig::default()
        };
        let outcome = ScenarioBuilder::new(config)
            .performed(vec![Some(pose.clone())])
            .reference(vec![Some(pose)])
            .run()
            .unwrap();
        let rendered = &outcome.sink.rendered()[0];
        assert_eq!(rendered.performed_label, "YOU");
        assert_eq!(rendered.reference_label, "COACH");
    }

    fn command() -> impl Strategy<Value = PlaybackCommand> {
        prop_oneof![
            Just(PlaybackCommand::Pause),
            Just(PlaybackCommand::Resume),
            Just(PlaybackCommand::TogglePause),
        ]
    }

    proptest! {
        #[test]
        fn prop_pausing_never_skips_or_duplicates_source_frames(
            schedule in prop::collection::vec((1u64..40, command()), 0..12),
        ) {
            let track = PoseGenerator::with_seed(SkeletonLayout::Coco, 9).track(10, &PoseNoise::none());
            let mut builder = ScenarioBuilder::new(PipelineConfig::coco())
                .performed(track.clone())
                .reference(track)
                // Keeps sessions that end paused finite
                .command(60, PlaybackCommand::Quit);
            for (poll, command) in schedule {
                builder = builder.command(poll, command);
            }
            let outcome = builder.run().unwrap();

            let indices = outcome.sink.rendered_indices();
            for pair in indices.windows(2) {
                prop_assert!(pair[1] == pair[0] || pair[1] == pair[0] + 1);
            }
            if let Some(first) = indices.first() {
                prop_assert_eq!(*first, 0);
            }
            let advanced = outcome.report.frames_advanced;
            let ended = outcome.report.reason == TerminationReason::EndOfStream;
            prop_assert_eq!(outcome.performed_reads, advanced + u64::from(ended));
            prop_assert_eq!(outcome.reference_reads, outcome.performed_reads);
        }
    }
}
