use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 8-bit-per-channel RGBA color, the renderer's native color format.
pub type Rgba8 = [u8; 4];

/// Per-object colors of one model, in the model's own object order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelColors {
    /// One color per atom.
    pub atoms: Vec<Rgba8>,
    /// One color per bond.
    pub bonds: Vec<Rgba8>,
    /// One color per residue ribbon segment.
    pub ribbons: Vec<Rgba8>,
    /// One color per filled ring.
    pub rings: Vec<Rgba8>,
    /// Pseudobond colors keyed by pseudobond group name.
    pub pseudobonds: BTreeMap<String, Vec<Rgba8>>,
}

/// Display flags of one pseudobond group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PseudobondVisibility {
    /// Whether each pseudobond is shown.
    pub display: Vec<bool>,
    /// Whether each pseudobond is drawn in two halves colored by its atoms.
    pub halfbonds: Vec<bool>,
}

/// Per-object visibility of one model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelVisibility {
    /// Model-level display flag.
    pub display: bool,
    /// Whether each atom is shown.
    pub atoms: Vec<bool>,
    /// Whether each bond is shown.
    pub bonds: Vec<bool>,
    /// Whether each bond is drawn in two halves colored by its atoms.
    pub halfbonds: Vec<bool>,
    /// Whether each residue's ribbon is shown.
    pub ribbons: Vec<bool>,
    /// Whether each ring is filled.
    pub rings: Vec<bool>,
    /// Pseudobond display flags keyed by group name.
    pub pseudobonds: BTreeMap<String, PseudobondVisibility>,
}

impl Default for ModelVisibility {
    fn default() -> Self {
        Self {
            display: true,
            atoms: Vec::new(),
            bonds: Vec::new(),
            halfbonds: Vec::new(),
            ribbons: Vec::new(),
            rings: Vec::new(),
            pseudobonds: BTreeMap::new(),
        }
    }
}

impl ModelColors {
    /// Array lengths per category, used to check two captures describe the
    /// same objects.
    pub(crate) fn shape(&self) -> (Vec<usize>, Vec<(&str, usize)>) {
        (
            vec![
                self.atoms.len(),
                self.bonds.len(),
                self.ribbons.len(),
                self.rings.len(),
            ],
            self.pseudobonds
                .iter()
                .map(|(name, colors)| (name.as_str(), colors.len()))
                .collect(),
        )
    }
}

impl ModelVisibility {
    /// Array lengths per category, used to check two captures describe the
    /// same objects.
    pub(crate) fn shape(&self) -> (Vec<usize>, Vec<(&str, usize, usize)>) {
        (
            vec![
                self.atoms.len(),
                self.bonds.len(),
                self.halfbonds.len(),
                self.ribbons.len(),
                self.rings.len(),
            ],
            self.pseudobonds
                .iter()
                .map(|(name, vis)| {
                    (name.as_str(), vis.display.len(), vis.halfbonds.len())
                })
                .collect(),
        )
    }
}
