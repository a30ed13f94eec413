//! Bank JSON parsing, patch flattening and the outbound synth-update
//! payload.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use anyhow::{bail, ensure, Context};
use nalgebra::DVector;
use serde::Deserialize;
use slice_core::{Bounds, Rgb, Seed, SliceSpace};

use crate::layout::{
    ENVELOPE_STAGES, GLOBAL_KEYS, OFFSET_MATRIX, OFFSET_MIXER, OFFSET_OPS, OPERATOR_COUNT,
    SIZE_MATRIX, SIZE_MIXER, SIZE_OP_PARAMS, SIZE_PEG, VECTOR_LEN,
};
use crate::schema::Dx7Spec;

/// A bank file: optional range-schema override plus the patches.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchBank {
    #[serde(default)]
    pub dx7_parameter_spec: Option<Dx7Spec>,
    #[serde(default)]
    pub patches: Vec<Patch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub global: PatchGlobals,
    #[serde(default)]
    pub operators: Vec<PatchOperator>,
}

impl Patch {
    pub fn name(&self) -> &str {
        self.identity.name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Identity {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchGlobals {
    pub transpose: Option<f64>,
    pub lfo_speed: Option<f64>,
    pub lfo_delay: Option<f64>,
    pub pitch_mod_depth: Option<f64>,
    pub amp_mod_depth: Option<f64>,
    pub algorithm_matrix: Option<Vec<f64>>,
    pub output_mixer: Option<Vec<f64>>,
    pub pitch_eg_levels: Option<Vec<f64>>,
}

impl PatchGlobals {
    fn scalar(&self, key: &str) -> Option<f64> {
        match key {
            "transpose" => self.transpose,
            "lfo_speed" => self.lfo_speed,
            "lfo_delay" => self.lfo_delay,
            "pitch_mod_depth" => self.pitch_mod_depth,
            _ => self.amp_mod_depth,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatchOperator {
    pub id: usize,
    pub frequency_ratio_mode: Option<f64>,
    pub frequency_fixed_mode: Option<f64>,
    pub detune: Option<f64>,
    #[serde(default)]
    pub envelope: Vec<EnvelopeStage>,
}

impl PatchOperator {
    fn scalar(&self, key: &str) -> Option<f64> {
        match key {
            "frequency_ratio_mode" => self.frequency_ratio_mode,
            "frequency_fixed_mode" => self.frequency_fixed_mode,
            _ => self.detune,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnvelopeStage {
    pub stage: usize,
    pub rate: f64,
    pub level: f64,
}

/// Flattens one patch into layout order. Missing scalars default to
/// the dimension minimum; missing blocks default to zeros; an operator
/// with the wrong number of envelope stages is an error, not a guess.
pub fn flatten_patch(patch: &Patch, bounds: &Bounds) -> anyhow::Result<DVector<f64>> {
    let mut vector: Vec<f64> = Vec::with_capacity(VECTOR_LEN);
    let dim_min = |i: usize| bounds.dimension(i).map_or(0.0, |d| d.min);

    for key in GLOBAL_KEYS {
        let value = patch.global.scalar(key).unwrap_or_else(|| dim_min(vector.len()));
        vector.push(value);
    }

    push_block(
        &mut vector,
        patch.global.algorithm_matrix.as_deref(),
        SIZE_MATRIX,
        "algorithm_matrix",
    )?;
    push_block(
        &mut vector,
        patch.global.output_mixer.as_deref(),
        SIZE_MIXER,
        "output_mixer",
    )?;
    push_block(
        &mut vector,
        patch.global.pitch_eg_levels.as_deref(),
        SIZE_PEG,
        "pitch_eg_levels",
    )?;

    let by_id: HashMap<usize, &PatchOperator> =
        patch.operators.iter().map(|op| (op.id, op)).collect();

    for op_id in (1..=OPERATOR_COUNT).rev() {
        let op = by_id.get(&op_id).copied();
        for key in crate::layout::OP_SCALAR_KEYS {
            let value = op
                .and_then(|op| op.scalar(key))
                .unwrap_or_else(|| dim_min(vector.len()));
            vector.push(value);
        }

        let mut stages: Vec<EnvelopeStage> =
            op.map(|op| op.envelope.clone()).unwrap_or_default();
        if stages.is_empty() {
            for _ in 0..ENVELOPE_STAGES {
                let rate_min = dim_min(vector.len());
                vector.push(rate_min);
                let level_min = dim_min(vector.len());
                vector.push(level_min);
            }
            continue;
        }
        stages.sort_by_key(|s| s.stage);
        if stages.len() != ENVELOPE_STAGES {
            bail!(
                "patch '{}' operator {op_id} has {} envelope stages, expected {ENVELOPE_STAGES}",
                patch.name(),
                stages.len()
            );
        }
        for stage in &stages {
            vector.push(stage.rate);
            vector.push(stage.level);
        }
    }

    ensure!(
        vector.len() == VECTOR_LEN,
        "patch '{}' flattened to {} values, expected {VECTOR_LEN}",
        patch.name(),
        vector.len()
    );
    Ok(DVector::from_vec(vector))
}

fn push_block(
    vector: &mut Vec<f64>,
    block: Option<&[f64]>,
    size: usize,
    label: &str,
) -> anyhow::Result<()> {
    match block {
        Some(values) => {
            ensure!(
                values.len() == size,
                "{label} has {} entries, expected {size}",
                values.len()
            );
            vector.extend_from_slice(values);
        }
        None => vector.extend(std::iter::repeat(0.0).take(size)),
    }
    Ok(())
}

/// Deterministic pastel color from a patch name, so reloading a bank
/// keeps every marker's color.
pub fn name_color(name: &str) -> Rgb {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    name.hash(&mut hasher);
    let h = hasher.finish();
    let channel = |byte: u64| (((byte & 0xff) as u16 + 255) / 2) as u8;
    Rgb::new(channel(h), channel(h >> 8), channel(h >> 16))
}

/// Parses a bank and builds a ready-to-explore space: bounds from the
/// bank's schema (or the stock one), one preset per patch. Any
/// out-of-range value rejects the whole load.
pub fn load_bank(json: &str) -> anyhow::Result<SliceSpace> {
    let bank: PatchBank = serde_json::from_str(json).context("parsing DX7 patch bank")?;
    let spec = bank.dx7_parameter_spec.unwrap_or_default();
    let bounds = spec.build_bounds().context("building bounds from parameter spec")?;
    let mut space = SliceSpace::new(bounds);

    for patch in &bank.patches {
        let name = patch.name();
        let values = flatten_patch(patch, space.bounds())
            .with_context(|| format!("flattening patch '{name}'"))?;
        space
            .add_preset(name, Some(name_color(name)), Seed::Values(values))
            .with_context(|| format!("loading patch '{name}'"))?;
    }
    space.clear_focus();

    tracing::info!(
        dimensions = space.dim(),
        presets = space.store().len(),
        "loaded DX7 patch bank"
    );
    Ok(space)
}

/// The per-operator view a synth consumer wants: operators reordered
/// op1 first, envelopes split into rate and level planes.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthUpdate {
    pub wiring: Vec<f64>,
    pub mixer: Vec<f64>,
    pub ratios: [f64; OPERATOR_COUNT],
    pub detunes: [f64; OPERATOR_COUNT],
    pub envelope_rates: [[f64; ENVELOPE_STAGES]; OPERATOR_COUNT],
    pub envelope_levels: [[f64; ENVELOPE_STAGES]; OPERATOR_COUNT],
}

impl SynthUpdate {
    pub fn from_vector(vector: &DVector<f64>) -> anyhow::Result<Self> {
        ensure!(
            vector.len() == VECTOR_LEN,
            "synth update needs a {VECTOR_LEN}-value vector, got {}",
            vector.len()
        );
        let data = vector.as_slice();

        let mut update = Self {
            wiring: data[OFFSET_MATRIX..OFFSET_MATRIX + SIZE_MATRIX].to_vec(),
            mixer: data[OFFSET_MIXER..OFFSET_MIXER + SIZE_MIXER].to_vec(),
            ratios: [0.0; OPERATOR_COUNT],
            detunes: [0.0; OPERATOR_COUNT],
            envelope_rates: [[0.0; ENVELOPE_STAGES]; OPERATOR_COUNT],
            envelope_levels: [[0.0; ENVELOPE_STAGES]; OPERATOR_COUNT],
        };

        // Stored op6 first; consumers index op1 first.
        for slot in 0..OPERATOR_COUNT {
            let chunk = &data[OFFSET_OPS + slot * SIZE_OP_PARAMS..][..SIZE_OP_PARAMS];
            let op = OPERATOR_COUNT - 1 - slot;
            update.ratios[op] = chunk[0];
            update.detunes[op] = chunk[2];
            for stage in 0..ENVELOPE_STAGES {
                update.envelope_rates[op][stage] = chunk[3 + 2 * stage];
                update.envelope_levels[op][stage] = chunk[4 + 2 * stage];
            }
        }
        Ok(update)
    }
}
