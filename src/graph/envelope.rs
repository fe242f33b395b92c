use crate::graph::node::{Rate, Signal, UgenNode};

/*
ADSR Envelope
=============

The envelope shapes each voice's amplitude over the life of a note and,
just as importantly, decides when the voice dies on the engine.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

Gate
----
While `gate` is positive the envelope runs attack → decay and then holds at
the release node (the sustain level). Dropping `gate` to 0 jumps to the
release segment from wherever it is.

Done action
-----------
When the last segment finishes, `EnvGen` performs its done action.
`DoneAction::FreeSelf` frees the whole synth on the engine. That is the
only way a voice's engine-side resources are reclaimed: the controller
never frees voices itself, it only closes their gate.

Engine layout
-------------
`EnvGen` inputs are:

  gate, levelScale, levelBias, timeScale, doneAction,
  initLevel, numStages, releaseNode, loopNode,
  (level, time, shape, curve) × numStages

Shape 5 means "curve" with the per-segment curvature value that follows.
*/

/// What `EnvGen` does when its envelope completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneAction {
    Nothing = 0,
    PauseSelf = 1,
    FreeSelf = 2,
}

const SHAPE_CURVE: f32 = 5.0;
const NO_LOOP: f32 = -99.0;

/// Attack/decay/sustain/release envelope description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub peak: f32,
    pub curve: f32,
}

impl Adsr {
    /// Times in seconds, sustain as a fraction of peak.
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
            peak: 1.0,
            curve: -4.0,
        }
    }

    /// Flattened envelope array as `EnvGen` expects it.
    pub fn to_array(&self) -> Vec<f32> {
        let segments = [
            (self.peak, self.attack),
            (self.peak * self.sustain, self.decay),
            (0.0, self.release),
        ];

        let mut arr = vec![0.0, segments.len() as f32, 2.0, NO_LOOP];
        for (level, time) in segments {
            arr.extend_from_slice(&[level, time, SHAPE_CURVE, self.curve]);
        }
        arr
    }
}

/// Envelope generator driven by a gate signal.
pub struct EnvGen {
    pub env: Adsr,
    pub gate: Signal,
    pub done: DoneAction,
}

impl EnvGen {
    pub fn new(env: Adsr, gate: impl Into<Signal>) -> Self {
        Self {
            env,
            gate: gate.into(),
            done: DoneAction::Nothing,
        }
    }

    pub fn with_done(mut self, done: DoneAction) -> Self {
        self.done = done;
        self
    }

    /// Control-rate envelope signal.
    pub fn kr(self) -> Signal {
        let mut inputs = vec![
            self.gate,
            Signal::Constant(1.0), // levelScale
            Signal::Constant(0.0), // levelBias
            Signal::Constant(1.0), // timeScale
            Signal::Constant(self.done as i32 as f32),
        ];
        inputs.extend(self.env.to_array().into_iter().map(Signal::Constant));

        UgenNode::new("EnvGen", Rate::Control, inputs).into_signal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adsr_array_layout() {
        let arr = Adsr::new(0.01, 1.0, 1.0, 1.0).to_array();
        assert_eq!(
            arr,
            vec![
                0.0, 3.0, 2.0, -99.0, //
                1.0, 0.01, 5.0, -4.0, //
                1.0, 1.0, 5.0, -4.0, //
                0.0, 1.0, 5.0, -4.0,
            ]
        );
    }

    #[test]
    fn sustain_scales_with_peak() {
        let mut env = Adsr::new(0.1, 0.2, 0.5, 0.3);
        env.peak = 0.8;
        let arr = env.to_array();
        assert_eq!(arr[4], 0.8);
        assert!((arr[8] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn done_action_is_fifth_input() {
        let sig = EnvGen::new(Adsr::new(0.01, 1.0, 1.0, 1.0), 1.0)
            .with_done(DoneAction::FreeSelf)
            .kr();
        match sig {
            Signal::Output { node, .. } => {
                assert_eq!(node.class(), "EnvGen");
                assert_eq!(node.rate(), Rate::Control);
                assert_eq!(node.inputs()[4].as_constant(), Some(2.0));
                assert_eq!(node.inputs().len(), 5 + 4 + 3 * 4);
            }
            other => panic!("expected EnvGen, got {other:?}"),
        }
    }
}
