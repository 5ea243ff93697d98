use serde::{Deserialize, Serialize};

/// Per-site switches that select alternate resolution branches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    pub id: String,
    /// False for sites that never publish a small reference thumbnail.
    pub publishes_reference: bool,
    /// Cut the poster out of 800x436..446 package images without comparing anything.
    pub vendor_strip: bool,
}

impl SiteProfile {
    /// Built-in defaults for a site id. Unknown sites are assumed to publish references.
    pub fn for_site(id: &str) -> Self {
        let id = id.trim().to_ascii_lowercase();
        let vendor_strip = matches!(id.as_str(), "dmm" | "fanza");
        Self {
            id,
            publishes_reference: true,
            vendor_strip,
        }
    }

    #[must_use]
    pub fn without_reference(mut self) -> Self {
        self.publishes_reference = false;
        self
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::for_site("generic")
    }
}
