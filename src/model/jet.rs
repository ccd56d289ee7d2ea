// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::model::Vector2;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A reconstructed jet as delivered by the event source.
///
/// Besides the four-momentum the record carries the inputs needed to apply
/// systematic variations: the relative jet energy correction uncertainty and
/// the resolution smearing factors for the up and down variations, both
/// relative to the nominal jet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub energy: f64,
    #[serde(default)]
    pub btag: f64,
    #[serde(default = "default_true")]
    pub passes_id: bool,
    #[serde(default)]
    pub jec_uncertainty: f64,
    #[serde(default)]
    pub jer_up: Option<f64>,
    #[serde(default)]
    pub jer_down: Option<f64>,
}

impl Jet {
    pub fn new(pt: f64, eta: f64, phi: f64, energy: f64) -> Self {
        Self {
            pt,
            eta,
            phi,
            energy,
            btag: 0.0,
            passes_id: true,
            jec_uncertainty: 0.0,
            jer_up: None,
            jer_down: None,
        }
    }

    /// Massless jet with the energy implied by its pt and pseudorapidity.
    pub fn massless(pt: f64, eta: f64, phi: f64) -> Self {
        Self::new(pt, eta, phi, pt * eta.cosh())
    }

    pub fn px(&self) -> f64 {
        self.pt * self.phi.cos()
    }

    pub fn py(&self) -> f64 {
        self.pt * self.phi.sin()
    }

    /// Transverse momentum as a vector.
    pub fn pt_vec(&self) -> Vector2 {
        Vector2::from_polar(self.pt, self.phi)
    }

    /// Copy of the jet with its four-momentum multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            pt: self.pt * factor,
            energy: self.energy * factor,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_keeps_direction() {
        let jet = Jet::massless(40.0, 1.1, -0.4);
        let up = jet.scaled(1.1);

        assert!((up.pt - 44.0).abs() < 1e-12);
        assert!((up.energy - jet.energy * 1.1).abs() < 1e-9);
        assert_eq!(up.eta, jet.eta);
        assert_eq!(up.phi, jet.phi);
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let jet: Jet =
            serde_json::from_str(r#"{"pt": 35.0, "eta": 0.2, "phi": 1.0, "energy": 36.0}"#)
                .unwrap();

        assert!(jet.passes_id);
        assert_eq!(jet.jec_uncertainty, 0.0);
        assert_eq!(jet.jer_up, None);
    }
}
