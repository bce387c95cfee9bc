//! Comparison pipeline - per-tick orchestration

use formcheck_compare::{
    pose_similarity, DeviationDetector, KeypointExtractor, LimbAlignment, SessionAggregator,
};
use formcheck_core::{
    ComparisonResult, FormcheckError, FormcheckResult, KeypointSet, PipelineConfig, SessionStats,
    StreamSide,
};

use crate::{
    DetectorHandle, FrameLabels, FrameSource, FrameSynchronizer, Overlay, PlaybackCommand,
    PlaybackState, PlaybackStateMachine, PoseEstimator, RenderInstruction, RenderSink, SyncStep,
    TerminationReason,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub ticks: u64,
    pub frames_advanced: u64,
    /// Frames where both sides had a detection
    pub frames_compared: u64,
    /// Ticks that re-rendered the last pair while paused
    pub redisplays: u64,
    pub commands_applied: u64,
}

/// What the caller should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Terminated,
}

/// Session-level summary
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed(SessionStats),
    /// No frame pair had a detection on both sides
    Empty,
    /// A fatal error stopped the session; partial statistics are discarded
    Aborted(FormcheckError),
}

impl SessionOutcome {
    pub fn stats(&self) -> Option<&SessionStats> {
        match self {
            SessionOutcome::Completed(stats) => Some(stats),
            SessionOutcome::Empty | SessionOutcome::Aborted(_) => None,
        }
    }
}

/// The session's single terminal report
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub reason: TerminationReason,
    pub frames_advanced: u64,
    pub frames_compared: u64,
    pub outcome: SessionOutcome,
}

/// Last fetched frame pair and its analysis, kept for redisplay while paused
struct FrameSlot<F> {
    performed: F,
    reference: F,
    performed_pose: Option<KeypointSet>,
    reference_pose: Option<KeypointSet>,
    result: ComparisonResult,
}

/// Dual-stream pose comparison pipeline
pub struct ComparisonPipeline<A, B, E>
where
    A: FrameSource,
    B: FrameSource<Frame = A::Frame>,
    E: PoseEstimator<Frame = A::Frame>,
{
    config: PipelineConfig,
    labels: FrameLabels,
    sync: FrameSynchronizer<A, B>,
    performed_detector: DetectorHandle<E>,
    reference_detector: DetectorHandle<E>,
    extractor: KeypointExtractor,
    deviation: DeviationDetector,
    limbs: Option<LimbAlignment>,
    playback: PlaybackStateMachine,
    aggregator: SessionAggregator,
    current: Option<FrameSlot<A::Frame>>,
    total_frames: u64,
    stats: PipelineStats,
    failure: Option<FormcheckError>,
}

impl<A, B, E> ComparisonPipeline<A, B, E>
where
    A: FrameSource,
    B: FrameSource<Frame = A::Frame>,
    E: PoseEstimator<Frame = A::Frame>,
{
    /// Build a pipeline over two sources with one estimator per stream.
    ///
    /// Fails with `SourceUnavailable` if either source did not open and with
    /// `InvalidConfig` for out-of-domain settings. The estimators are
    /// released before the error is returned.
    pub fn new(
        config: PipelineConfig,
        performed: A,
        reference: B,
        performed_estimator: E,
        reference_estimator: E,
    ) -> FormcheckResult<Self> {
        let performed_detector = DetectorHandle::acquire(StreamSide::Performed, performed_estimator);
        let reference_detector = DetectorHandle::acquire(StreamSide::Reference, reference_estimator);

        config.validate()?;

        let sync = FrameSynchronizer::new(performed, reference);
        if let Some(side) = sync.unopened_side() {
            tracing::error!(%side, "source failed to open");
            return Err(FormcheckError::SourceUnavailable {
                side,
                reason: "source failed to open".to_string(),
            });
        }

        let (performed_meta, reference_meta) = sync.metadata();
        tracing::info!(
            performed_fps = performed_meta.fps,
            performed_frames = performed_meta.frame_count,
            reference_fps = reference_meta.fps,
            reference_frames = reference_meta.frame_count,
            layout = %config.layout,
            threshold = config.deviation_threshold,
            "comparison pipeline started"
        );

        let limbs = config
            .limb_angle_threshold
            .map(|angle| LimbAlignment::new(config.layout, angle));

        Ok(Self {
            labels: FrameLabels::from_config(&config),
            extractor: KeypointExtractor::new(config.layout),
            deviation: DeviationDetector::new(config.deviation_threshold),
            total_frames: sync.display_frame_count(),
            limbs,
            config,
            sync,
            performed_detector,
            reference_detector,
            playback: PlaybackStateMachine::new(),
            aggregator: SessionAggregator::new(),
            current: None,
            stats: PipelineStats::default(),
            failure: None,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Result of the most recently fetched frame pair
    pub fn last_result(&self) -> Option<&ComparisonResult> {
        self.current.as_ref().map(|slot| &slot.result)
    }

    /// Execute one tick.
    ///
    /// Returns `Terminated` once the session is over; further ticks do
    /// nothing. An input validation error aborts the session: the pipeline
    /// terminates, no source is read again, and every later tick returns
    /// the same error.
    pub fn tick<S>(&mut self, sink: &mut S) -> FormcheckResult<TickOutcome>
    where
        S: RenderSink<A::Frame> + ?Sized,
    {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if self.playback.is_terminated() {
            return Ok(TickOutcome::Terminated);
        }
        self.stats.ticks += 1;

        // Stage 1-2: advance only while running
        if self.playback.should_advance() {
            match self.sync.advance() {
                SyncStep::Frames {
                    index,
                    performed,
                    reference,
                } => {
                    self.stats.frames_advanced += 1;
                    // Stage 3-6
                    match self.compare(index, performed, reference) {
                        Ok(slot) => self.current = Some(slot),
                        Err(err) => return Err(self.abort(index, err)),
                    }
                }
                SyncStep::EndOfStream(end) => {
                    tracing::info!(
                        ended = ?end.ended_sides(),
                        frames = end.frames_advanced,
                        "end of stream reached"
                    );
                    self.playback.end_of_stream();
                    return Ok(TickOutcome::Terminated);
                }
            }
        } else {
            self.stats.redisplays += 1;
        }

        // Stage 7: render (the same pair again while paused)
        if let Some(slot) = &self.current {
            let instruction = RenderInstruction {
                performed_frame: &slot.performed,
                reference_frame: &slot.reference,
                performed_pose: slot.performed_pose.as_ref(),
                reference_pose: slot.reference_pose.as_ref(),
                result: &slot.result,
                overlay: Overlay::new(&slot.result, self.total_frames, &self.config),
                labels: &self.labels,
                highlight: StreamSide::Reference,
            };
            sink.render(&instruction);
        }

        // Stage 8: one command per tick
        if let Some(command) = sink.poll_command() {
            self.stats.commands_applied += 1;
            self.playback.apply(command);
        }

        Ok(if self.playback.is_terminated() {
            TickOutcome::Terminated
        } else {
            TickOutcome::Continue
        })
    }

    /// Tick until the session terminates, then produce the report
    pub fn run<S>(mut self, sink: &mut S) -> FormcheckResult<SessionReport>
    where
        S: RenderSink<A::Frame> + ?Sized,
    {
        while self.tick(sink)? == TickOutcome::Continue {}
        Ok(self.finish())
    }

    /// End the session and finalize statistics exactly once.
    ///
    /// A session that is still running or paused counts as quit; an aborted
    /// session reports its error instead of statistics. Both detector
    /// handles are released when the pipeline is consumed.
    pub fn finish(mut self) -> SessionReport {
        if !self.playback.is_terminated() {
            self.playback.apply(PlaybackCommand::Quit);
        }
        let reason = self
            .playback
            .termination_reason()
            .unwrap_or(TerminationReason::Quit);

        let frames_compared = self.aggregator.count();
        let finalized = match self.failure.take() {
            Some(err) => Err(err),
            None => self.aggregator.finalize(),
        };
        let outcome = match finalized {
            Ok(stats) => {
                tracing::info!(
                    mean = stats.mean,
                    max = stats.max,
                    min = stats.min,
                    count = stats.count,
                    "session finalized"
                );
                SessionOutcome::Completed(stats)
            }
            Err(FormcheckError::EmptySession) => {
                tracing::info!("session finalized with no comparable frames");
                SessionOutcome::Empty
            }
            Err(err) => {
                tracing::info!(error = %err, "session finalized after abort");
                SessionOutcome::Aborted(err)
            }
        };

        SessionReport {
            reason,
            frames_advanced: self.sync.frames_advanced(),
            frames_compared,
            outcome,
        }
    }

    fn abort(&mut self, frame: u64, err: FormcheckError) -> FormcheckError {
        tracing::error!(frame, error = %err, "session aborted");
        self.playback.abort();
        self.failure = Some(err.clone());
        err
    }

    fn compare(
        &mut self,
        index: u64,
        performed: A::Frame,
        reference: A::Frame,
    ) -> FormcheckResult<FrameSlot<A::Frame>> {
        let performed_detection = self.performed_detector.detect(&performed);
        let reference_detection = self.reference_detector.detect(&reference);

        let performed_set = self.extractor.extract(performed_detection.as_ref())?;
        let reference_set = self.extractor.extract(reference_detection.as_ref())?;
        let performed_pose = performed_detection.map(|_| performed_set);
        let reference_pose = reference_detection.map(|_| reference_set);

        // Empty unless both sides were detected
        let problematic_joints = self
            .deviation
            .detect(performed_pose.as_ref(), reference_pose.as_ref())?;

        let result = match (&performed_pose, &reference_pose) {
            (Some(performed_set), Some(reference_set)) => {
                let similarity = pose_similarity(performed_set, reference_set)?;
                let misaligned_bones = match &self.limbs {
                    Some(limbs) => limbs.misaligned_bones(performed_set, reference_set)?,
                    None => Vec::new(),
                };
                self.aggregator.record(similarity);
                self.stats.frames_compared += 1;
                ComparisonResult {
                    frame_index: index,
                    similarity,
                    problematic_joints,
                    misaligned_bones,
                    both_detected: true,
                }
            }
            _ => ComparisonResult::no_comparison(index),
        };
        let both_detected = result.both_detected;

        tracing::debug!(
            frame = index,
            similarity = result.similarity,
            issues = result.issue_count(),
            both_detected,
            "frame compared"
        );

        Ok(FrameSlot {
            performed,
            reference,
            performed_pose,
            reference_pose,
            result,
        })
    }
}
