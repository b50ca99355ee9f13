//! Round-by-round tracing of cipher execution.
//!
//! The labels mirror the FIPS-197 Appendix C listings so a trace can be
//! compared line for line with the published examples.

use core::fmt;

use crate::block::{to_hex, Block};

/// Names the intermediate value captured by a [`TraceStep`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepLabel {
    /// Cipher input block.
    Input,
    /// State at the start of a round.
    Start,
    /// After SubBytes.
    SBox,
    /// After ShiftRows.
    SRow,
    /// After MixColumns.
    MCol,
    /// Round key used by AddRoundKey.
    KSch,
    /// Cipher output block.
    Output,
    /// Inverse cipher input block.
    IInput,
    /// State at the start of an inverse round.
    IStart,
    /// After InvSubBytes.
    ISBox,
    /// After InvShiftRows.
    ISRow,
    /// After InvMixColumns.
    IMCol,
    /// Round key used by an inverse AddRoundKey.
    IKSch,
    /// State right after an inverse AddRoundKey.
    IKAdd,
    /// Inverse cipher output block.
    IOutput,
}

impl StepLabel {
    /// Appendix C spelling of the label.
    pub const fn as_str(self) -> &'static str {
        match self {
            StepLabel::Input => "input",
            StepLabel::Start => "start",
            StepLabel::SBox => "s_box",
            StepLabel::SRow => "s_row",
            StepLabel::MCol => "m_col",
            StepLabel::KSch => "k_sch",
            StepLabel::Output => "output",
            StepLabel::IInput => "iinput",
            StepLabel::IStart => "istart",
            StepLabel::ISBox => "is_box",
            StepLabel::ISRow => "is_row",
            StepLabel::IMCol => "im_col",
            StepLabel::IKSch => "ik_sch",
            StepLabel::IKAdd => "ik_add",
            StepLabel::IOutput => "ioutput",
        }
    }
}

impl fmt::Display for StepLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One traced intermediate value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceStep {
    /// Round number as printed in Appendix C (inverse paths count up from 0).
    pub round: usize,
    /// What the bytes represent.
    pub label: StepLabel,
    /// State or round key at this point.
    pub bytes: Block,
}

impl TraceStep {
    /// Hex rendering of the traced bytes.
    pub fn hex(&self) -> String {
        to_hex(&self.bytes)
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "round[{:>2}].{:<10}{}",
            self.round,
            self.label.as_str(),
            self.hex()
        )
    }
}

/// Receives every intermediate step of a traced cipher call.
pub trait RoundTracer {
    /// Called once per traced step, in execution order.
    fn record(&mut self, step: &TraceStep);
}

/// Discards every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl RoundTracer for NoopTracer {
    #[inline]
    fn record(&mut self, _step: &TraceStep) {}
}

/// Collects steps in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingTracer {
    steps: Vec<TraceStep>,
}

impl RecordingTracer {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps recorded so far.
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// Bytes recorded for `(round, label)`, if that step was traced.
    pub fn find(&self, round: usize, label: StepLabel) -> Option<&Block> {
        self.steps
            .iter()
            .find(|step| step.round == round && step.label == label)
            .map(|step| &step.bytes)
    }

    /// Consumes the recorder, returning the steps.
    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

impl RoundTracer for RecordingTracer {
    fn record(&mut self, step: &TraceStep) {
        self.steps.push(*step);
    }
}

/// Emits each step as a `tracing` debug event.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTracer;

impl RoundTracer for LogTracer {
    fn record(&mut self, step: &TraceStep) {
        tracing::debug!(round = step.round, step = %step.label, state = %step.hex(), "aes round");
    }
}

impl<F> RoundTracer for F
where
    F: FnMut(&TraceStep),
{
    fn record(&mut self, step: &TraceStep) {
        self(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_appendix_layout() {
        let step = TraceStep {
            round: 1,
            label: StepLabel::SBox,
            bytes: [0xd4; 16],
        };
        assert_eq!(
            step.to_string(),
            format!("round[ 1].s_box     {}", "d4".repeat(16))
        );
    }

    #[test]
    fn recorder_finds_steps() {
        let mut recorder = RecordingTracer::new();
        recorder.record(&TraceStep {
            round: 3,
            label: StepLabel::KSch,
            bytes: [1; 16],
        });
        assert_eq!(recorder.find(3, StepLabel::KSch), Some(&[1; 16]));
        assert_eq!(recorder.find(3, StepLabel::Start), None);
        assert_eq!(recorder.steps().len(), 1);
    }

    #[test]
    fn closures_are_tracers() {
        let mut count = 0;
        let mut tracer = |_: &TraceStep| count += 1;
        for _ in 0..3 {
            tracer.record(&TraceStep {
                round: 0,
                label: StepLabel::Input,
                bytes: [0; 16],
            });
        }
        assert_eq!(count, 3);
    }
}
