use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use magcross::{DetectionConfig, PairGrouping, DEFAULT_MAX_DIST};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub max_dist: f64,
    pub grouping: PairGrouping,
    pub parallel: bool,
    /// CRS assigned to input data that does not declare one.
    pub crs: Option<String>,
    pub generator: Option<GeneratorConfig>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_dist: DEFAULT_MAX_DIST,
            grouping: PairGrouping::default(),
            parallel: true,
            crs: None,
            generator: None,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(max_dist: f64, directed: bool, sequential: bool) -> Self {
        Self {
            max_dist,
            grouping: if directed {
                PairGrouping::Directed
            } else {
                PairGrouping::LinePair
            },
            parallel: !sequential,
            ..Default::default()
        }
    }

    pub fn to_detection_config(&self) -> DetectionConfig {
        DetectionConfig {
            max_dist: self.max_dist,
            grouping: self.grouping,
            parallel: self.parallel,
        }
    }
}
