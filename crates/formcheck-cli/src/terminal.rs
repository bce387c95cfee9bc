//! Terminal render sink
//!
//! Prints one status line per displayed frame pair and reads playback keys
//! from the keyboard. Headless sinks never poll, so the session runs to the
//! end of the shorter track as fast as the pipeline ticks.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal;

use formcheck_core::{SimilarityBand, SkeletonLayout, StreamSide};
use formcheck_runtime::{PlaybackCommand, RenderInstruction, RenderSink};

use crate::track::TrackFrame;

/// Map a key press to a playback command
pub fn command_for_key(key: &KeyEvent) -> Option<PlaybackCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(PlaybackCommand::Quit)
        }
        KeyCode::Char(' ') => Some(PlaybackCommand::TogglePause),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(PlaybackCommand::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(PlaybackCommand::Resume),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(PlaybackCommand::Quit),
        _ => None,
    }
}

/// Status line for one frame pair, without styling
pub fn status_line(instruction: &RenderInstruction<'_, TrackFrame>, layout: SkeletonLayout) -> String {
    let overlay = &instruction.overlay;
    let mut line = format!(
        "[{:>5}/{}] similarity {:.3} ({})",
        overlay.frame_number,
        overlay.total_frames,
        overlay.similarity,
        band_name(overlay.band),
    );

    if !instruction.result.both_detected {
        let missing: Vec<&str> = StreamSide::both()
            .into_iter()
            .filter(|side| instruction.pose(*side).is_none())
            .map(|side| instruction.labels.for_side(side))
            .collect();
        line.push_str(&format!(" no pose: {}", missing.join(", ")));
        return line;
    }

    if overlay.issue_count > 0 {
        let joints: Vec<String> = instruction
            .result
            .problematic_joints
            .iter()
            .map(|&joint| joint_label(layout, joint))
            .collect();
        line.push_str(&format!(
            " issues {} on {}: {}",
            overlay.issue_count,
            instruction.labels.for_side(instruction.highlight),
            joints.join(", ")
        ));
    }
    if !instruction.result.misaligned_bones.is_empty() {
        let bones: Vec<String> = instruction
            .result
            .misaligned_bones
            .iter()
            .map(|bone| format!("{}-{}", joint_label(layout, bone.from), joint_label(layout, bone.to)))
            .collect();
        line.push_str(&format!(" misaligned: {}", bones.join(", ")));
    }
    line
}

fn joint_label(layout: SkeletonLayout, joint: usize) -> String {
    layout
        .joint_name(joint)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", joint))
}

fn band_name(band: SimilarityBand) -> &'static str {
    match band {
        SimilarityBand::Good => "good",
        SimilarityBand::Fair => "fair",
        SimilarityBand::Poor => "poor",
    }
}

pub struct TerminalSink {
    out: Stdout,
    layout: SkeletonLayout,
    interactive: bool,
    poll_timeout: Duration,
    last_frame: Option<u64>,
}

impl TerminalSink {
    /// Create a sink. Interactive sinks switch the terminal to raw mode
    /// until dropped.
    pub fn new(layout: SkeletonLayout, interactive: bool, poll_timeout: Duration) -> io::Result<Self> {
        if interactive {
            terminal::enable_raw_mode()?;
        }
        Ok(Self {
            out: io::stdout(),
            layout,
            interactive,
            poll_timeout,
            last_frame: None,
        })
    }

    fn read_key(&mut self) -> io::Result<Option<PlaybackCommand>> {
        if !event::poll(self.poll_timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(command_for_key(&key)),
            _ => Ok(None),
        }
    }

    fn write_line(&mut self, line: &str, band: SimilarityBand) -> io::Result<()> {
        // Raw mode does not translate \n
        let ending = if self.interactive { "\r\n" } else { "\n" };
        if self.interactive {
            let styled = match band {
                SimilarityBand::Good => line.green(),
                SimilarityBand::Fair => line.yellow(),
                SimilarityBand::Poor => line.red(),
            };
            write!(self.out, "{}{}", styled, ending)?;
        } else {
            write!(self.out, "{}{}", line, ending)?;
        }
        self.out.flush()
    }
}

impl RenderSink<TrackFrame> for TerminalSink {
    fn render(&mut self, instruction: &RenderInstruction<'_, TrackFrame>) {
        // Paused ticks resend the same pair; print it once
        let frame = instruction.frame(StreamSide::Performed).index;
        if self.last_frame == Some(frame) {
            return;
        }
        self.last_frame = Some(frame);

        let line = status_line(instruction, self.layout);
        if let Err(e) = self.write_line(&line, instruction.overlay.band) {
            tracing::warn!(error = %e, "failed to write status line");
        }
    }

    fn poll_command(&mut self) -> Option<PlaybackCommand> {
        if !self.interactive {
            return None;
        }
        match self.read_key() {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(error = %e, "keyboard poll failed, quitting");
                Some(PlaybackCommand::Quit)
            }
        }
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        if self.interactive {
            let _ = terminal::disable_raw_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::{Bone, ComparisonResult, KeypointSet, PipelineConfig};
    use formcheck_runtime::{FrameLabels, Overlay};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(command_for_key(&key(KeyCode::Char(' '))), Some(PlaybackCommand::TogglePause));
        assert_eq!(command_for_key(&key(KeyCode::Char('p'))), Some(PlaybackCommand::Pause));
        assert_eq!(command_for_key(&key(KeyCode::Char('r'))), Some(PlaybackCommand::Resume));
        assert_eq!(command_for_key(&key(KeyCode::Char('q'))), Some(PlaybackCommand::Quit));
        assert_eq!(command_for_key(&key(KeyCode::Esc)), Some(PlaybackCommand::Quit));
        assert_eq!(command_for_key(&key(KeyCode::Char('x'))), None);
        assert_eq!(command_for_key(&key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for_key(&event), Some(PlaybackCommand::Quit));
        assert_eq!(command_for_key(&key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_status_line() {
        let config = PipelineConfig::default();
        let labels = FrameLabels::from_config(&config);
        let frame = TrackFrame {
            index: 4,
            detection: None,
        };
        let pose = KeypointSet::zeros(33);
        let mut result = ComparisonResult::no_comparison(4);
        result.similarity = 0.92;
        result.both_detected = true;
        result.problematic_joints.extend([13, 15]);
        let overlay = Overlay::new(&result, 10, &config);

        let instruction = RenderInstruction {
            performed_frame: &frame,
            reference_frame: &frame,
            performed_pose: Some(&pose),
            reference_pose: Some(&pose),
            result: &result,
            overlay,
            labels: &labels,
            highlight: StreamSide::Reference,
        };

        let line = status_line(&instruction, SkeletonLayout::MediaPipe);
        assert!(line.contains("5/10"));
        assert!(line.contains("0.920 (good)"));
        assert!(line.contains("issues 2 on PERFECT VIDEO: left_elbow, left_wrist"));
        assert!(!line.contains("misaligned"));
    }

    #[test]
    fn test_status_line_names_misaligned_bones() {
        let config = PipelineConfig::coco();
        let labels = FrameLabels::from_config(&config);
        let frame = TrackFrame {
            index: 0,
            detection: None,
        };
        let pose = KeypointSet::zeros(17);
        let mut result = ComparisonResult::no_comparison(0);
        result.similarity = 0.7;
        result.both_detected = true;
        result.misaligned_bones = vec![Bone::new(7, 9)];
        let overlay = Overlay::new(&result, 1, &config);

        let instruction = RenderInstruction {
            performed_frame: &frame,
            reference_frame: &frame,
            performed_pose: Some(&pose),
            reference_pose: Some(&pose),
            result: &result,
            overlay,
            labels: &labels,
            highlight: StreamSide::Reference,
        };

        let line = status_line(&instruction, SkeletonLayout::Coco);
        assert!(line.contains("(fair)"));
        assert!(line.ends_with("misaligned: left_elbow-left_wrist"));
    }

    #[test]
    fn test_status_line_missing_pose() {
        let config = PipelineConfig::default();
        let labels = FrameLabels::from_config(&config);
        let frame = TrackFrame {
            index: 0,
            detection: None,
        };
        let pose = KeypointSet::zeros(33);
        let result = ComparisonResult::no_comparison(0);
        let overlay = Overlay::new(&result, 3, &config);

        let instruction = RenderInstruction {
            performed_frame: &frame,
            reference_frame: &frame,
            performed_pose: None,
            reference_pose: Some(&pose),
            result: &result,
            overlay,
            labels: &labels,
            highlight: StreamSide::Reference,
        };

        let line = status_line(&instruction, SkeletonLayout::MediaPipe);
        assert!(line.contains("(poor)"));
        assert!(line.ends_with("no pose: USER VIDEO"));
    }
}
