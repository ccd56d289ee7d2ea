// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::path::PathBuf;

/// Immutable description of one group of input files.
///
/// Simulated datasets carry the cross-section (pb) and the number of generated
/// events, from which the per-dataset normalization weight is derived. Collision
/// data leave both unset and get a unit weight.
///
/// # Example
/// ```yaml
/// name: QCD-Ht-200-300
/// is_simulation: true
/// process: qcd
/// generator: madgraph
/// cross_section: 1717000
/// generated_events: 18784379
/// files: ["input/QCD-Ht-200-300.jsonl"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dataset {
    name: String,
    #[serde(default)]
    files: Vec<PathBuf>,
    #[serde(default)]
    process: String,
    #[serde(default)]
    generator: String,
    #[serde(default)]
    is_simulation: bool,
    #[serde(default)]
    cross_section: Option<f64>,
    #[serde(default)]
    generated_events: Option<u64>,
}

impl Dataset {
    /// Collision data.
    pub fn data(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            process: "ppData".to_string(),
            generator: "nature".to_string(),
            is_simulation: false,
            cross_section: None,
            generated_events: None,
        }
    }

    /// Simulated sample with its normalization inputs.
    pub fn simulation(name: impl Into<String>, cross_section: f64, generated_events: u64) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            process: String::new(),
            generator: String::new(),
            is_simulation: true,
            cross_section: Some(cross_section),
            generated_events: Some(generated_events),
        }
    }

    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn with_tags(mut self, process: impl Into<String>, generator: impl Into<String>) -> Self {
        self.process = process.into();
        self.generator = generator.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn process(&self) -> &str {
        &self.process
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn is_simulation(&self) -> bool {
        self.is_simulation
    }

    pub fn cross_section(&self) -> Option<f64> {
        self.cross_section
    }

    pub fn generated_events(&self) -> Option<u64> {
        self.generated_events
    }

    /// Cross-section divided by the number of generated events for simulation,
    /// 1 for data or when the normalization inputs are incomplete.
    pub fn normalization_weight(&self) -> f64 {
        if !self.is_simulation {
            return 1.0;
        }

        match (self.cross_section, self.generated_events) {
            (Some(cross_section), Some(events)) if events > 0 => cross_section / events as f64,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_weight() {
        struct TestCase {
            name: &'static str,
            dataset: Dataset,
            expected: f64,
        }

        let test_cases = vec![
            TestCase {
                name: "data has unit weight",
                dataset: Dataset::data("JetHT-Run2016E"),
                expected: 1.0,
            },
            TestCase {
                name: "simulation uses cross-section over events",
                dataset: Dataset::simulation("QCD-Ht-1500-2000", 120.4, 3_939_077),
                expected: 120.4 / 3_939_077.0,
            },
            TestCase {
                name: "zero generated events falls back to one",
                dataset: Dataset::simulation("empty", 10.0, 0),
                expected: 1.0,
            },
        ];

        for test_case in test_cases {
            let weight = test_case.dataset.normalization_weight();
            assert!(
                (weight - test_case.expected).abs() < 1e-15,
                "Test case '{}': expected {}, got {}",
                test_case.name,
                test_case.expected,
                weight
            );
        }
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
name: QCD-Ht-200-300
is_simulation: true
process: qcd
generator: madgraph
cross_section: 1717000
generated_events: 18784379
files: ["input/a.jsonl", "input/b.jsonl"]
"#;
        let dataset: Dataset = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(dataset.name(), "QCD-Ht-200-300");
        assert!(dataset.is_simulation());
        assert_eq!(dataset.files().len(), 2);
        assert_eq!(dataset.generated_events(), Some(18_784_379));
    }
}
