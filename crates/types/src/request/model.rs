use serde::{Deserialize, Serialize};
use snowy_constants::{MODEL_SNOWY_BASE, MODEL_SNOWY_CODE, MODEL_SNOWY_MEME};
use std::{fmt, str::FromStr};

/// Error parsing a [`ModelKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model {0}. supported models: snowy-base, snowy-meme, snowy-code")]
pub struct ParseModelError(pub String);

/// The models served by the router.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// General purpose model.
    SnowyBase,
    /// Meme model.
    SnowyMeme,
    /// Code model.
    SnowyCode,
}

impl ModelKind {
    /// Every supported model.
    pub const ALL: [Self; 3] = [Self::SnowyBase, Self::SnowyMeme, Self::SnowyCode];

    /// The wire name of the model.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SnowyBase => MODEL_SNOWY_BASE,
            Self::SnowyMeme => MODEL_SNOWY_MEME,
            Self::SnowyCode => MODEL_SNOWY_CODE,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| ParseModelError(s.to_owned()))
    }
}

impl From<ModelKind> for String {
    fn from(model: ModelKind) -> Self {
        model.as_str().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        for model in ModelKind::ALL {
            let json = serde_json::to_string(&model).unwrap();
            assert_eq!(json, format!("\"{model}\""));
            assert_eq!(model.as_str().parse::<ModelKind>().unwrap(), model);
        }
        assert_eq!(ModelKind::SnowyCode.as_str(), "snowy-code");
    }

    #[test]
    fn parsing_is_exact() {
        assert!("Snowy-Base".parse::<ModelKind>().is_err());
        assert!(" snowy-base".parse::<ModelKind>().is_err());
        assert_eq!(
            "gpt".parse::<ModelKind>().unwrap_err(),
            ParseModelError("gpt".to_owned())
        );
    }
}
