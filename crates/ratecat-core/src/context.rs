//! Per-business-line state compiled once and shared by every document.

use tracing::debug;

use ratecat_config::{BusinessLineConfig, ConfigRegistry};
use ratecat_ingest::HeaderAliases;
use ratecat_rules::{Classifier, FieldNormalizer, RateParser, ServiceIdGenerator};

use crate::error::{PipelineError, Result};

/// Compiled business-line configuration.
///
/// Building it performs every configuration check that can fail, so a
/// document never starts parsing against a broken bundle.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub config: BusinessLineConfig,
    pub aliases: HeaderAliases,
    pub classifier: Classifier,
    pub rates: RateParser,
    pub service_ids: ServiceIdGenerator,
    pub fields: FieldNormalizer,
}

impl PipelineContext {
    pub fn new(config: BusinessLineConfig) -> Result<Self> {
        let line = config.business_line.clone();
        config
            .validate()
            .map_err(|source| PipelineError::configuration(&line, source))?;
        let classifier =
            Classifier::new(&config).map_err(|error| PipelineError::from_rules(&line, error))?;
        let rates = RateParser::from_config(&config.rates, &line)
            .map_err(|source| PipelineError::configuration(&line, source))?;
        let aliases = HeaderAliases::new(&config.headers);
        debug!(
            business_line = %line,
            aliases = aliases.len(),
            rules = config.classification.rules.len(),
            "pipeline context ready"
        );
        Ok(Self {
            aliases,
            classifier,
            rates,
            service_ids: ServiceIdGenerator::new(&config.service_ids),
            fields: FieldNormalizer::new(&config.tax, &config.frequencies),
            config,
        })
    }

    /// Looks up `business_line` in `registry` and compiles it.
    pub fn from_registry(registry: &ConfigRegistry, business_line: &str) -> Result<Self> {
        let config = registry
            .get(business_line)
            .map_err(|source| PipelineError::configuration(business_line, source))?;
        Self::new(config.clone())
    }

    pub fn business_line(&self) -> &str {
        &self.config.business_line
    }
}
