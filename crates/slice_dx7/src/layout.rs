//! Flat-vector layout shared by the bank loader and the synth-update
//! encoder. Both sides slice the same offsets, so a schema change here
//! changes them together.
//!
//! Vector order: global scalars, algorithm wiring matrix, output
//! mixer, pitch-EG levels, then the six operators stored op6 down to
//! op1 (each: scalars followed by interleaved rate/level envelope
//! stages).

/// Global scalar dimension names, in vector order.
pub const GLOBAL_KEYS: [&str; 5] = [
    "transpose",
    "lfo_speed",
    "lfo_delay",
    "pitch_mod_depth",
    "amp_mod_depth",
];

/// Per-operator scalar keys, in vector order. Output level is absent:
/// it is baked into the wiring matrix and envelopes upstream.
pub const OP_SCALAR_KEYS: [&str; 3] = ["frequency_ratio_mode", "frequency_fixed_mode", "detune"];

pub const OPERATOR_COUNT: usize = 6;
pub const ENVELOPE_STAGES: usize = 4;

pub const SIZE_GLOBALS: usize = GLOBAL_KEYS.len();
pub const SIZE_MATRIX: usize = OPERATOR_COUNT * OPERATOR_COUNT;
pub const SIZE_MIXER: usize = OPERATOR_COUNT;
pub const SIZE_PEG: usize = ENVELOPE_STAGES;
pub const SIZE_OP_PARAMS: usize = OP_SCALAR_KEYS.len() + 2 * ENVELOPE_STAGES;

pub const OFFSET_GLOBALS: usize = 0;
pub const OFFSET_MATRIX: usize = OFFSET_GLOBALS + SIZE_GLOBALS;
pub const OFFSET_MIXER: usize = OFFSET_MATRIX + SIZE_MATRIX;
pub const OFFSET_PEG: usize = OFFSET_MIXER + SIZE_MIXER;
pub const OFFSET_OPS: usize = OFFSET_PEG + SIZE_PEG;

/// Total length of a flattened patch vector.
pub const VECTOR_LEN: usize = OFFSET_OPS + OPERATOR_COUNT * SIZE_OP_PARAMS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_partition_the_vector() {
        assert_eq!(OFFSET_MATRIX, 5);
        assert_eq!(OFFSET_MIXER, 41);
        assert_eq!(OFFSET_PEG, 47);
        assert_eq!(OFFSET_OPS, 51);
        assert_eq!(SIZE_OP_PARAMS, 11);
        assert_eq!(VECTOR_LEN, 117);
    }
}
