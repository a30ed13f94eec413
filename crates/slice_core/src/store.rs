//! Named, colored D-dimensional preset vectors with selection state.

use std::collections::BTreeSet;

use nalgebra::DVector;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::error::{Result, SliceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self::new(rng.random(), rng.random(), rng.random())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub color: Rgb,
    pub values: DVector<f64>,
}

/// What the UI is focused on. A non-empty selection and an unsaved
/// exploration point are mutually exclusive by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Focus {
    #[default]
    None,
    Selected(BTreeSet<usize>),
    Unsaved(DVector<f64>),
}

/// Initial values for a newly added preset.
#[derive(Debug, Clone)]
pub enum Seed {
    /// Uniform-random within each dimension's bounds.
    Random,
    /// Midpoint of every dimension.
    Midpoint,
    /// An explicit raw vector, hard-validated against the bounds.
    Values(DVector<f64>),
}

#[derive(Debug, Clone, Default)]
pub struct PresetStore {
    presets: Vec<Preset>,
    focus: Focus,
}

impl PresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.presets.iter().position(|p| p.name == name)
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn set_unsaved(&mut self, values: DVector<f64>) {
        self.focus = Focus::Unsaved(values);
    }

    pub fn clear_focus(&mut self) {
        self.focus = Focus::None;
    }

    /// Adds a preset and selects it. Name collisions are resolved by
    /// auto-suffixing; explicit vectors are validated against the
    /// bounds and rejected (never clamped) when out of range.
    pub fn add(
        &mut self,
        bounds: &Bounds,
        name: &str,
        color: Option<Rgb>,
        seed: Seed,
    ) -> Result<usize> {
        let values = match seed {
            Seed::Random => random_in_bounds(bounds),
            Seed::Midpoint => bounds.midpoint(),
            Seed::Values(values) => {
                bounds.validate(name, &values)?;
                values
            }
        };

        let fallback = format!("vec{}", self.presets.len());
        let base = if name.is_empty() { &fallback } else { name };
        let name = self.unique_name(base);

        let index = self.presets.len();
        self.presets.push(Preset {
            name,
            color: color.unwrap_or_else(Rgb::random),
            values,
        });
        self.focus = Focus::Selected(BTreeSet::from([index]));
        Ok(index)
    }

    /// Copies a preset under a fresh `_copy` name. Selection is left
    /// untouched.
    pub fn duplicate(&mut self, name: &str) -> Result<usize> {
        let index = self
            .index_of(name)
            .ok_or_else(|| SliceError::UnknownPreset(name.to_string()))?;
        let source = self.presets[index].clone();
        let copy_name = self.unique_name(&format!("{name}_copy"));
        let new_index = self.presets.len();
        self.presets.push(Preset {
            name: copy_name,
            ..source
        });
        Ok(new_index)
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let index = self
            .index_of(old)
            .ok_or_else(|| SliceError::UnknownPreset(old.to_string()))?;
        if self.index_of(new).is_some() {
            return Err(SliceError::DuplicatePreset(new.to_string()));
        }
        self.presets[index].name = new.to_string();
        Ok(())
    }

    /// Deletes the named presets; unknown names are ignored. Surviving
    /// selection indices are remapped to the compacted store.
    pub fn delete(&mut self, names: &[&str]) {
        let mut doomed: Vec<usize> = names.iter().filter_map(|n| self.index_of(n)).collect();
        doomed.sort_unstable();
        doomed.dedup();
        if doomed.is_empty() {
            return;
        }
        for &index in doomed.iter().rev() {
            self.presets.remove(index);
        }
        if let Focus::Selected(selected) = &self.focus {
            let remapped: BTreeSet<usize> = selected
                .iter()
                .filter(|i| !doomed.contains(i))
                .map(|&i| i - doomed.iter().filter(|&&d| d < i).count())
                .collect();
            self.focus = if remapped.is_empty() {
                Focus::None
            } else {
                Focus::Selected(remapped)
            };
        }
    }

    /// Plain select replaces the selection; additive select toggles
    /// membership (and displaces any unsaved exploration point).
    pub fn select(&mut self, index: usize, additive: bool) {
        if index >= self.presets.len() {
            return;
        }
        if additive {
            let mut selected = match std::mem::take(&mut self.focus) {
                Focus::Selected(s) => s,
                _ => BTreeSet::new(),
            };
            if !selected.insert(index) {
                selected.remove(&index);
            }
            self.focus = if selected.is_empty() {
                Focus::None
            } else {
                Focus::Selected(selected)
            };
        } else {
            self.focus = Focus::Selected(BTreeSet::from([index]));
        }
    }

    pub fn selected(&self) -> Option<&BTreeSet<usize>> {
        match &self.focus {
            Focus::Selected(selected) => Some(selected),
            _ => None,
        }
    }

    /// The distinguished three-selected state that can define a plane.
    pub fn selected_triple(&self) -> Option<[usize; 3]> {
        let selected = self.selected()?;
        if selected.len() != 3 {
            return None;
        }
        let mut iter = selected.iter().copied();
        Some([iter.next()?, iter.next()?, iter.next()?])
    }

    pub(crate) fn set_values(&mut self, index: usize, values: DVector<f64>) {
        if let Some(preset) = self.presets.get_mut(index) {
            preset.values = values;
        }
    }

    /// Appends `value` to every preset vector (and any unsaved focus
    /// vector) for a newly added dimension.
    pub(crate) fn extend_dimension(&mut self, value: f64) {
        let extend = |v: &DVector<f64>| {
            let mut out = DVector::zeros(v.len() + 1);
            out.rows_mut(0, v.len()).copy_from(v);
            out[v.len()] = value;
            out
        };
        for preset in &mut self.presets {
            preset.values = extend(&preset.values);
        }
        if let Focus::Unsaved(values) = &mut self.focus {
            let grown = extend(values);
            *values = grown;
        }
    }

    fn unique_name(&self, base: &str) -> String {
        if self.index_of(base).is_none() {
            return base.to_string();
        }
        let mut i = 1;
        loop {
            let candidate = format!("{base}_{i}");
            if self.index_of(&candidate).is_none() {
                return candidate;
            }
            i += 1;
        }
    }
}

fn random_in_bounds(bounds: &Bounds) -> DVector<f64> {
    let mut rng = rand::rng();
    DVector::from_iterator(
        bounds.len(),
        bounds.dimensions().iter().map(|dim| {
            if dim.is_degenerate() {
                dim.min
            } else {
                rng.random_range(dim.min..=dim.max)
            }
        }),
    )
}
