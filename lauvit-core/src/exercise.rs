//! User-defined exercises kept alongside the built-in plan exercises.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LauvitError, Result};

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://[^\s/]+\S*$").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualExercise {
    pub id: String,
    pub name: String,
    /// Free text, e.g. "Incline, Wide Grip".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDraft {
    pub name: String,
    #[serde(default)]
    pub variations: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// A validated exercise ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewManualExercise {
    pub name: String,
    pub variations: Option<String>,
    pub image_url: Option<String>,
    pub instructions: Option<String>,
}

impl NewManualExercise {
    pub fn into_exercise(self, id: String) -> ManualExercise {
        ManualExercise {
            id,
            name: self.name,
            variations: self.variations,
            image_url: self.image_url,
            instructions: self.instructions,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ExerciseDraft {
    /// Trims every field. A blank image url counts as absent.
    pub fn validate(self) -> Result<NewManualExercise> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(LauvitError::validation("exercise name is required"));
        }

        let image_url = non_blank(self.image_url);
        if let Some(url) = &image_url {
            if !URL_RE.is_match(url) {
                return Err(LauvitError::validation(format!(
                    "image url must be a valid URL, got {url:?}"
                )));
            }
        }

        Ok(NewManualExercise {
            name,
            variations: non_blank(self.variations),
            image_url,
            instructions: non_blank(self.instructions),
        })
    }
}

impl From<ManualExercise> for ExerciseDraft {
    fn from(exercise: ManualExercise) -> Self {
        Self {
            name: exercise.name,
            variations: exercise.variations,
            image_url: exercise.image_url,
            instructions: exercise.instructions,
        }
    }
}
