//! collab::catalog
//!
//! Module listing for `run --list`.
//!
//! The configured `[catalog] modules` list wins. Without one, the modules
//! published with bioshed are offered.

use std::collections::BTreeSet;

use super::traits::{CollabError, ModuleCatalog};
use crate::core::config::Settings;
use crate::core::types::normalize_module_name;

/// Modules published with bioshed.
pub const BUILTIN_MODULES: &[&str] = &[
    "bcftools",
    "bowtie2",
    "bwa",
    "fastqc",
    "gatk",
    "multiqc",
    "picard",
    "salmon",
    "samtools",
    "star",
    "test",
    "trimmomatic",
];

/// A catalog fixed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCatalog {
    modules: BTreeSet<String>,
}

impl StaticCatalog {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            modules: modules
                .into_iter()
                .map(|m| normalize_module_name(m.as_ref()))
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_MODULES)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        match settings.catalog_modules() {
            Some(modules) => Self::new(modules),
            None => Self::builtin(),
        }
    }
}

impl ModuleCatalog for StaticCatalog {
    fn list_available_modules(&self) -> Result<BTreeSet<String>, CollabError> {
        Ok(self.modules.clone())
    }
}
