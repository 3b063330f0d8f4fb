//! Section templates and their search-path resolution.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConversionError, Result};

/// Environment variable listing extra template directories.
pub const TEMPLATES_PATH_ENV_VAR: &str = "CCDA_TEMPLATES_PATH";

/// Default system for observation category codings.
pub const OBSERVATION_CATEGORY_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/observation-category";

/// Templates compiled into the binary, as `(name, json)`.
pub const BUILTIN_TEMPLATES: [(&str, &str); 1] = [("CCD", include_str!("../templates/CCD.json"))];

const TEMPLATE_EXTENSION: &str = "json";

/// Which CCDA sections yield observations, and the category they get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sections: Vec<SectionRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRule {
    #[serde(default)]
    pub name: Option<String>,
    /// Section `templateId/@root` values that select this rule.
    #[serde(default)]
    pub template_ids: Vec<String>,
    /// Section `code/@code` values (LOINC) that select this rule.
    #[serde(default)]
    pub codes: Vec<String>,
    pub category: String,
    #[serde(default = "default_category_system")]
    pub category_system: String,
    #[serde(default)]
    pub category_display: Option<String>,
}

fn default_category_system() -> String {
    OBSERVATION_CATEGORY_SYSTEM.to_string()
}

impl ConversionTemplate {
    /// Parses and checks a template document.
    pub fn from_json(origin: &str, json: &str) -> Result<Self> {
        let template: Self =
            serde_json::from_str(json).map_err(|source| ConversionError::TemplateParse {
                origin: origin.to_string(),
                source,
            })?;
        template.check(origin)?;
        Ok(template)
    }

    fn check(&self, origin: &str) -> Result<()> {
        let rule_error = |reason: String| ConversionError::TemplateRule {
            origin: origin.to_string(),
            reason,
        };
        for (idx, rule) in self.sections.iter().enumerate() {
            if rule.category.trim().is_empty() {
                return Err(rule_error(format!("section {idx} has an empty category")));
            }
            if rule.template_ids.is_empty() && rule.codes.is_empty() {
                return Err(rule_error(format!(
                    "section {idx} has neither templateIds nor codes"
                )));
            }
        }
        Ok(())
    }

    /// First rule whose template ids or codes match a section.
    pub fn rule_for<'a>(
        &self,
        template_ids: impl IntoIterator<Item = &'a str>,
        code: Option<&str>,
    ) -> Option<&SectionRule> {
        let template_ids: Vec<&str> = template_ids.into_iter().collect();
        self.sections.iter().find(|rule| {
            rule.template_ids
                .iter()
                .any(|id| template_ids.contains(&id.as_str()))
                || code.is_some_and(|code| rule.codes.iter().any(|known| known == code))
        })
    }
}

/// Resolves template names against a search path, then the built-ins.
///
/// Resolved templates are cached by name for the lifetime of the loader.
#[derive(Debug, Default)]
pub struct TemplateLoader {
    search_path: Vec<PathBuf>,
    cache: Mutex<HashMap<String, Arc<ConversionTemplate>>>,
}

impl TemplateLoader {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Builds a loader from a platform path list (`:` or `;` separated).
    pub fn from_search_path(paths: &OsStr) -> Self {
        Self::new(std::env::split_paths(paths).collect())
    }

    /// Appends the directories listed in [`TEMPLATES_PATH_ENV_VAR`], if set.
    #[must_use]
    pub fn with_env_search_path(mut self) -> Self {
        if let Some(extra) = std::env::var_os(TEMPLATES_PATH_ENV_VAR) {
            self.search_path.extend(std::env::split_paths(&extra));
        }
        self
    }

    pub fn load(&self, name: &str) -> Result<Arc<ConversionTemplate>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(template) = cache.get(name) {
            return Ok(Arc::clone(template));
        }
        let template = Arc::new(self.resolve(name)?);
        cache.insert(name.to_string(), Arc::clone(&template));
        Ok(template)
    }

    fn resolve(&self, name: &str) -> Result<ConversionTemplate> {
        for dir in &self.search_path {
            if let Some(path) = find_in_dir(dir, name) {
                debug!(template = name, path = %path.display(), "loading template file");
                let json = std::fs::read_to_string(&path).map_err(|source| {
                    ConversionError::TemplateRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                return ConversionTemplate::from_json(&path.display().to_string(), &json);
            }
        }

        let builtin = BUILTIN_TEMPLATES
            .iter()
            .find(|(builtin, _)| builtin.eq_ignore_ascii_case(name));
        match builtin {
            Some((builtin, json)) => {
                debug!(template = name, "using built-in template");
                ConversionTemplate::from_json(&format!("built-in {builtin}"), json)
            }
            None => Err(ConversionError::TemplateNotFound {
                name: name.to_string(),
                searched: self.search_path.clone(),
            }),
        }
    }
}

fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let with_extension = dir.join(format!("{name}.{TEMPLATE_EXTENSION}"));
    if with_extension.is_file() {
        return Some(with_extension);
    }
    let exact = dir.join(name);
    let has_extension = exact
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION));
    (has_extension && exact.is_file()).then_some(exact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CUSTOM: &str = r#"{
        "name": "Labs",
        "sections": [{"codes": ["30954-2"], "category": "laboratory"}]
    }"#;

    #[test]
    fn test_builtin_ccd_is_valid() {
        let loader = TemplateLoader::default();
        let template = loader.load("ccd").unwrap();
        assert_eq!(template.name, "CCD");
        let results = template
            .rule_for(["2.16.840.1.113883.10.20.22.2.3.1"], None)
            .unwrap();
        assert_eq!(results.category, "laboratory");
        assert_eq!(results.category_system, OBSERVATION_CATEGORY_SYSTEM);
        let vitals = template.rule_for([], Some("8716-3")).unwrap();
        assert_eq!(vitals.category, "vital-signs");
        assert!(template.rule_for(["1.2.3"], Some("11450-4")).is_none());
    }

    #[test]
    fn test_search_path_wins_over_builtin() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("CCD.json"), CUSTOM).unwrap();
        let loader = TemplateLoader::new(vec![dir.path().to_path_buf()]);
        let template = loader.load("CCD").unwrap();
        assert_eq!(template.name, "Labs");
        assert!(Arc::ptr_eq(&template, &loader.load("CCD").unwrap()));
    }

    #[test]
    fn test_later_directories_are_searched() {
        let empty = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Labs.json"), CUSTOM).unwrap();
        let joined = std::env::join_paths([empty.path(), dir.path()]).unwrap();
        let loader = TemplateLoader::from_search_path(&joined);
        assert_eq!(loader.search_path.len(), 2);
        assert_eq!(loader.load("Labs.json").unwrap().name, "Labs");
        assert_eq!(loader.load("Labs").unwrap().name, "Labs");
    }

    #[test]
    fn test_unknown_template() {
        let loader = TemplateLoader::new(vec![PathBuf::from("/nowhere")]);
        assert!(matches!(
            loader.load("Discharge"),
            Err(ConversionError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_templates() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Broken.json"), "{ not json").unwrap();
        std::fs::write(
            dir.path().join("Empty.json"),
            r#"{"name": "Empty", "sections": [{"category": "laboratory"}]}"#,
        )
        .unwrap();
        let loader = TemplateLoader::new(vec![dir.path().to_path_buf()]);
        assert!(matches!(
            loader.load("Broken"),
            Err(ConversionError::TemplateParse { .. })
        ));
        assert!(matches!(
            loader.load("Empty"),
            Err(ConversionError::TemplateRule { .. })
        ));
    }
}
