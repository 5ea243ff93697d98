use std::collections::BTreeSet;

use poster_finder_common::CropSide;
use serde::{Deserialize, Serialize};

use crate::{definitions::DEFAULT_MAX_FANART, RulesError};

/// Per-site overrides that take priority over automatic poster detection.
///
/// Labels are compared case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideRules {
    crop_by_label: Vec<(String, CropSide)>,
    force_reference: BTreeSet<String>,
    max_fanart: usize,
}

impl Default for OverrideRules {
    fn default() -> Self {
        Self {
            crop_by_label: vec![],
            force_reference: BTreeSet::new(),
            max_fanart: DEFAULT_MAX_FANART,
        }
    }
}

impl OverrideRules {
    /// Builds rules from their textual configuration.
    ///
    /// `crop_rules` holds `LABEL:l|r|c` entries separated by newlines or commas. Blank
    /// entries and lines starting with `#` are ignored. `force_reference` is a comma or
    /// whitespace separated label list.
    pub fn parse(
        crop_rules: &str,
        force_reference: &str,
        max_fanart: usize,
    ) -> Result<Self, RulesError> {
        let mut rules = Self::default().with_max_fanart(max_fanart);

        let entries = crop_rules
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            .flat_map(|line| line.split(','))
            .map(str::trim)
            .filter(|entry| !entry.is_empty());

        for entry in entries {
            let (label, side) = entry
                .split_once(':')
                .ok_or_else(|| RulesError::MalformedCropRule(entry.to_string()))?;

            let label = label.trim();
            if label.is_empty() {
                return Err(RulesError::EmptyLabel(entry.to_string()));
            }

            let side = CropSide::from_code(side).ok_or_else(|| RulesError::UnknownCropSide {
                rule: entry.to_string(),
                side: side.trim().to_string(),
            })?;

            rules = rules.with_crop_rule(label, side);
        }

        for label in force_reference
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|label| !label.is_empty())
        {
            rules = rules.with_forced_reference(label);
        }

        Ok(rules)
    }

    /// A later rule for the same label replaces an earlier one.
    #[must_use]
    pub fn with_crop_rule(mut self, label: &str, side: CropSide) -> Self {
        let label = label.trim().to_ascii_uppercase();
        self.crop_by_label.retain(|(existing, _)| *existing != label);
        self.crop_by_label.push((label, side));
        self
    }

    #[must_use]
    pub fn with_forced_reference(mut self, label: &str) -> Self {
        self.force_reference.insert(label.trim().to_ascii_uppercase());
        self
    }

    #[must_use]
    pub fn with_max_fanart(mut self, max_fanart: usize) -> Self {
        self.max_fanart = max_fanart;
        self
    }

    /// Crop side for the longest configured label that prefixes `label`.
    pub fn forced_crop(&self, label: &str) -> Option<CropSide> {
        let label = label.trim().to_ascii_uppercase();
        self.crop_by_label
            .iter()
            .filter(|(prefix, _)| label.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, side)| *side)
    }

    pub fn forces_reference(&self, label: &str) -> bool {
        self.force_reference
            .contains(&label.trim().to_ascii_uppercase())
    }

    /// Zero disables fan-art.
    pub fn max_fanart_count(&self) -> usize {
        self.max_fanart
    }
}
