use crate::generator::profile::build_survey;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use magcross::{CrossingDetector, LineCrossings, MagData};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Reads `input`, or builds a synthetic survey when there is none.
    pub fn load_survey(&self, input: Option<&Path>) -> anyhow::Result<MagData> {
        let mut data = match input {
            Some(path) => MagData::load(path)
                .with_context(|| format!("loading survey {}", path.display()))?,
            None => build_survey(&self.config.generator.clone().unwrap_or_default())
                .context("generating synthetic survey")?,
        };

        if data.meta().crs.is_none() {
            data.meta_mut().crs = self.config.crs.clone();
        }
        log::info!(
            "survey {} holds {} points on {} lines",
            data.meta().filename.as_deref().unwrap_or("<unnamed>"),
            data.len(),
            data.lines().len()
        );
        Ok(data)
    }

    pub fn execute<'d>(&self, data: &'d MagData) -> anyhow::Result<LineCrossings<'d>> {
        CrossingDetector::new(self.config.to_detection_config())
            .detect(data)
            .context("running line-crossing detection")
    }

    pub fn write_crossings(&self, crossings: &LineCrossings<'_>, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("creating crossings file {}", path.display()))?;
        crossings
            .write_csv(BufWriter::new(file))
            .with_context(|| format!("writing crossings to {}", path.display()))?;
        log::info!("wrote {} crossings to {}", crossings.len(), path.display());
        Ok(())
    }
}
