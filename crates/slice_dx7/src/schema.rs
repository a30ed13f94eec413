//! Parameter-range schema for a DX7 bank, and the bounds it induces.
//!
//! A bank may carry a `dx7_parameter_spec` object overriding any
//! subset of the ranges; everything it leaves out falls back to the
//! defaults below, per key.

use serde::Deserialize;
use slice_core::Bounds;

use crate::layout::{
    GLOBAL_KEYS, OPERATOR_COUNT, OP_SCALAR_KEYS, SIZE_MATRIX, SIZE_MIXER, SIZE_PEG,
};

/// A closed `[min, max]` range as it appears in bank JSON.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ParamRange {
    pub range: [f64; 2],
}

impl ParamRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { range: [min, max] }
    }

    pub fn min(&self) -> f64 {
        self.range[0]
    }

    pub fn max(&self) -> f64 {
        self.range[1]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobalSpec {
    pub transpose: ParamRange,
    pub lfo_speed: ParamRange,
    pub lfo_delay: ParamRange,
    pub pitch_mod_depth: ParamRange,
    pub amp_mod_depth: ParamRange,
    pub pitch_eg_levels: ParamRange,
    /// Modulation-matrix entries, 0 to 4*pi.
    pub wiring: ParamRange,
}

impl Default for GlobalSpec {
    fn default() -> Self {
        Self {
            transpose: ParamRange::new(-24.0, 24.0),
            lfo_speed: ParamRange::new(0.06, 50.0),
            lfo_delay: ParamRange::new(0.0, 3.0),
            pitch_mod_depth: ParamRange::new(0.0, 99.0),
            amp_mod_depth: ParamRange::new(0.0, 42.0),
            pitch_eg_levels: ParamRange::new(-48.0, 48.0),
            wiring: ParamRange::new(0.0, 12.57),
        }
    }
}

/// Rate/level ranges shared by all four envelope stages.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EnvelopeRanges {
    pub rate: ParamRange,
    pub level: ParamRange,
}

impl Default for EnvelopeRanges {
    fn default() -> Self {
        Self {
            rate: ParamRange::new(0.0, 99.0),
            level: ParamRange::new(0.0, 12.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OperatorSpec {
    pub frequency_ratio_mode: ParamRange,
    pub frequency_fixed_mode: ParamRange,
    pub detune: ParamRange,
    /// Bank JSON writes this as a one-element array; only the first
    /// entry is consulted.
    pub envelope: Vec<EnvelopeRanges>,
}

impl Default for OperatorSpec {
    fn default() -> Self {
        Self {
            frequency_ratio_mode: ParamRange::new(0.5, 61.69),
            frequency_fixed_mode: ParamRange::new(1.0, 9772.0),
            detune: ParamRange::new(-20.0, 20.0),
            envelope: vec![EnvelopeRanges::default()],
        }
    }
}

impl OperatorSpec {
    fn scalar_range(&self, key: &str) -> ParamRange {
        match key {
            "frequency_ratio_mode" => self.frequency_ratio_mode,
            "frequency_fixed_mode" => self.frequency_fixed_mode,
            _ => self.detune,
        }
    }

    fn envelope_ranges(&self) -> EnvelopeRanges {
        self.envelope.first().copied().unwrap_or_default()
    }
}

/// The full range schema. `Default` reproduces the stock DX7 ranges.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Dx7Spec {
    pub global: GlobalSpec,
    pub operator: OperatorSpec,
}

impl Dx7Spec {
    fn global_range(&self, key: &str) -> ParamRange {
        match key {
            "transpose" => self.global.transpose,
            "lfo_speed" => self.global.lfo_speed,
            "lfo_delay" => self.global.lfo_delay,
            "pitch_mod_depth" => self.global.pitch_mod_depth,
            _ => self.global.amp_mod_depth,
        }
    }

    /// The 117-dimensional bounds induced by this schema, in flat
    /// vector order.
    pub fn build_bounds(&self) -> slice_core::Result<Bounds> {
        let mut bounds = Bounds::new();

        for key in GLOBAL_KEYS {
            let range = self.global_range(key);
            bounds.add_dimension(key, range.min(), range.max())?;
        }

        let wiring = self.global.wiring;
        for i in 0..SIZE_MATRIX {
            bounds.add_dimension(&format!("wiring_{i}"), wiring.min(), wiring.max())?;
        }

        for i in 0..SIZE_MIXER {
            bounds.add_dimension(&format!("out_mix_{i}"), 0.0, 1.0)?;
        }

        let peg = self.global.pitch_eg_levels;
        for stage in 1..=SIZE_PEG {
            bounds.add_dimension(&format!("pitch_eg_level_{stage}"), peg.min(), peg.max())?;
        }

        let env = self.operator.envelope_ranges();
        for op_id in (1..=OPERATOR_COUNT).rev() {
            let prefix = format!("op{op_id}");
            for key in OP_SCALAR_KEYS {
                let range = self.operator.scalar_range(key);
                bounds.add_dimension(&format!("{prefix}_{key}"), range.min(), range.max())?;
            }
            for stage in 1..=4 {
                bounds.add_dimension(
                    &format!("{prefix}_eg_rate_{stage}"),
                    env.rate.min(),
                    env.rate.max(),
                )?;
                bounds.add_dimension(
                    &format!("{prefix}_eg_level_{stage}"),
                    env.level.min(),
                    env.level.max(),
                )?;
            }
        }

        Ok(bounds)
    }
}
