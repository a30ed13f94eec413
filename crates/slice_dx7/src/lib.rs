//! DX7 bridge for the slice engine: the flat parameter-vector layout,
//! the bank range schema, patch-bank loading into a [`SliceSpace`],
//! and the reordered per-operator payload a synth consumer reads.

pub mod layout;
pub mod patch;
pub mod schema;

pub use patch::{flatten_patch, load_bank, name_color, Patch, PatchBank, SynthUpdate};
pub use schema::{Dx7Spec, ParamRange};

pub use slice_core::SliceSpace;
