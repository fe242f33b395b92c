use crate::graph::{
    bus::{In, Out},
    dynamics::Limiter,
    SynthDef,
};
use crate::voices::param;

pub const MASTER_DEF: &str = "organ_master";

/// Master bus: stereo `in` bus through a peak limiter to `out`.
pub fn organ_master() -> SynthDef {
    SynthDef::new(MASTER_DEF, |params| {
        let input = params.add(param::IN, 0.0);
        let out = params.add(param::OUT, 0.0);

        let limited = In::ar(input, 2).into_iter().map(Limiter::ar).collect();
        Out::ar(out, limited)
    })
}
