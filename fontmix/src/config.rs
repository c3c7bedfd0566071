//! Run configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, mix::EmptyUnionPolicy};

pub const DEFAULT_FAMILY: &str = "MixedFont";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// How cut positions are chosen for each letter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CutMethod {
    /// Fresh random cuts for every letter.
    #[default]
    Random,
    /// Cuts evenly spaced between the sources.
    Equidistant,
    /// The cuts listed in the configuration.
    Custom,
}

/// Everything needed for one generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    /// Source fonts, in mixing order.
    pub sources: Vec<PathBuf>,
    pub cut_method: CutMethod,
    /// Row cut fractions for [`CutMethod::Custom`].
    pub h_cuts: Vec<f64>,
    /// Column cut fractions for [`CutMethod::Custom`].
    pub v_cuts: Vec<f64>,
    pub normalize: bool,
    /// Mix on a checkerboard of rows and columns instead of strips.
    pub vertical_cuts: bool,
    pub family_name: String,
    pub output_dir: PathBuf,
    /// Seed for [`CutMethod::Random`]; unseeded runs differ every time.
    pub seed: Option<u64>,
    pub empty_union: EmptyUnionPolicy,
}

impl Default for MixConfig {
    fn default() -> Self {
        MixConfig {
            sources: Vec::new(),
            cut_method: CutMethod::Random,
            h_cuts: Vec::new(),
            v_cuts: Vec::new(),
            normalize: true,
            vertical_cuts: false,
            family_name: DEFAULT_FAMILY.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            seed: None,
            empty_union: EmptyUnionPolicy::FirstSource,
        }
    }
}

impl MixConfig {
    pub fn new(sources: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        MixConfig {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Where the font is written: `<output_dir>/<family_name>.ttf`.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.ttf", self.family_name))
    }

    /// Check the configuration before a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "at least 2 source fonts are needed, got {}",
                self.sources.len()
            )));
        }
        self.validate_options()
    }

    /// Check everything except the source list.
    pub fn validate_options(&self) -> Result<(), ConfigError> {
        if self.family_name.trim().is_empty() {
            return Err(ConfigError::Invalid("family name is blank".into()));
        }
        for (axis, cuts) in [("horizontal", &self.h_cuts), ("vertical", &self.v_cuts)] {
            if let Some(cut) = cuts.iter().find(|cut| !(**cut > 0.0 && **cut < 1.0)) {
                return Err(ConfigError::Invalid(format!(
                    "{axis} cut {cut} is outside (0, 1)"
                )));
            }
        }
        Ok(())
    }
}
