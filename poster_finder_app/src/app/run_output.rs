use itertools::Itertools;
use poster_finder_lib::*;
use serde::Serialize;

use super::OutputFormat;

/// What one run prints: the bare decision when nothing is delivered, or the delivered values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RunOutput {
    Decision {
        poster_mode: PosterMode,
        poster: Option<ImageSource>,
        landscape: Option<ImageSource>,
        fanart: Vec<ImageSource>,
    },
    Delivered(FinalImages),
}

impl RunOutput {
    pub fn from_decision(decision: &ImageDecision) -> Self {
        Self::Decision {
            poster_mode: decision.poster_mode(),
            poster: decision.poster_source(),
            landscape: decision.landscape.clone(),
            fanart: decision.fanart.clone(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Normal => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let or_none = |value: Option<String>| value.unwrap_or_else(|| "(none)".to_string());

        match self {
            Self::Decision {
                poster_mode,
                poster,
                landscape,
                fanart,
            } => {
                let poster = match poster {
                    Some(poster) => format!("{poster} ({poster_mode})"),
                    None => "(none)".to_string(),
                };
                format!(
                    "poster:    {poster}\nlandscape: {}\nfanart:    {}",
                    or_none(landscape.as_ref().map(ToString::to_string)),
                    fanart.iter().join("\n           ")
                )
            }
            Self::Delivered(images) => format!(
                "poster:    {}\nlandscape: {}\nfanart:    {}",
                or_none(images.poster.clone()),
                or_none(images.landscape.clone()),
                images.fanart.iter().join("\n           ")
            ),
        }
    }
}
