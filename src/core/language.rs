//! Language codes and normalization
//!
//! Callers speak in short codes (`hi`, `bn`, ...). The model expects
//! `<iso639-3>_<script>` tags (`hin_Deva`, `ben_Beng`, ...). Anything that
//! cannot be resolved degrades to English instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::core::errors::BridgeError;

/// Language + script tag in the backend's canonical form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LanguageTag {
    #[serde(rename = "asm_Beng")]
    AsmBeng,
    #[serde(rename = "ben_Beng")]
    BenBeng,
    #[serde(rename = "brx_Deva")]
    BrxDeva,
    #[serde(rename = "doi_Deva")]
    DoiDeva,
    #[serde(rename = "eng_Latn")]
    EngLatn,
    #[serde(rename = "gom_Deva")]
    GomDeva,
    #[serde(rename = "guj_Gujr")]
    GujGujr,
    #[serde(rename = "hin_Deva")]
    HinDeva,
    #[serde(rename = "kan_Knda")]
    KanKnda,
    #[serde(rename = "kas_Arab")]
    KasArab,
    #[serde(rename = "kas_Deva")]
    KasDeva,
    #[serde(rename = "mai_Deva")]
    MaiDeva,
    #[serde(rename = "mal_Mlym")]
    MalMlym,
    #[serde(rename = "mar_Deva")]
    MarDeva,
    #[serde(rename = "mni_Beng")]
    MniBeng,
    #[serde(rename = "mni_Mtei")]
    MniMtei,
    #[serde(rename = "npi_Deva")]
    NpiDeva,
    #[serde(rename = "ory_Orya")]
    OryOrya,
    #[serde(rename = "pan_Guru")]
    PanGuru,
    #[serde(rename = "san_Deva")]
    SanDeva,
    #[serde(rename = "sat_Olck")]
    SatOlck,
    #[serde(rename = "snd_Arab")]
    SndArab,
    #[serde(rename = "snd_Deva")]
    SndDeva,
    #[serde(rename = "tam_Taml")]
    TamTaml,
    #[serde(rename = "tel_Telu")]
    TelTelu,
    #[serde(rename = "urd_Arab")]
    UrdArab,
}

/// Tag used when a code cannot be resolved
pub const DEFAULT_TAG: LanguageTag = LanguageTag::EngLatn;

/// Every tag the backend understands
pub const ALL_TAGS: &[LanguageTag] = &[
    LanguageTag::AsmBeng,
    LanguageTag::BenBeng,
    LanguageTag::BrxDeva,
    LanguageTag::DoiDeva,
    LanguageTag::EngLatn,
    LanguageTag::GomDeva,
    LanguageTag::GujGujr,
    LanguageTag::HinDeva,
    LanguageTag::KanKnda,
    LanguageTag::KasArab,
    LanguageTag::KasDeva,
    LanguageTag::MaiDeva,
    LanguageTag::MalMlym,
    LanguageTag::MarDeva,
    LanguageTag::MniBeng,
    LanguageTag::MniMtei,
    LanguageTag::NpiDeva,
    LanguageTag::OryOrya,
    LanguageTag::PanGuru,
    LanguageTag::SanDeva,
    LanguageTag::SatOlck,
    LanguageTag::SndArab,
    LanguageTag::SndDeva,
    LanguageTag::TamTaml,
    LanguageTag::TelTelu,
    LanguageTag::UrdArab,
];

/// Short code -> tag. Sindhi, Manipuri and Kashmiri resolve to their
/// Devanagari/Bengali script variants; the Arabic/Meitei variants are only
/// reachable by passing the full tag.
const ALIASES: &[(&str, LanguageTag)] = &[
    ("hi", LanguageTag::HinDeva),
    ("bn", LanguageTag::BenBeng),
    ("te", LanguageTag::TelTelu),
    ("mr", LanguageTag::MarDeva),
    ("ta", LanguageTag::TamTaml),
    ("gu", LanguageTag::GujGujr),
    ("kn", LanguageTag::KanKnda),
    ("ml", LanguageTag::MalMlym),
    ("pa", LanguageTag::PanGuru),
    ("or", LanguageTag::OryOrya),
    ("as", LanguageTag::AsmBeng),
    ("ur", LanguageTag::UrdArab),
    ("ne", LanguageTag::NpiDeva),
    ("kok", LanguageTag::GomDeva),
    ("mni", LanguageTag::MniBeng),
    ("sd", LanguageTag::SndDeva),
    ("mai", LanguageTag::MaiDeva),
    ("brx", LanguageTag::BrxDeva),
    ("sat", LanguageTag::SatOlck),
    ("doi", LanguageTag::DoiDeva),
    ("ks", LanguageTag::KasDeva),
    ("gom", LanguageTag::GomDeva),
    ("san", LanguageTag::SanDeva),
    ("en", LanguageTag::EngLatn),
];

impl LanguageTag {
    /// Canonical tag string, e.g. `hin_Deva`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AsmBeng => "asm_Beng",
            Self::BenBeng => "ben_Beng",
            Self::BrxDeva => "brx_Deva",
            Self::DoiDeva => "doi_Deva",
            Self::EngLatn => "eng_Latn",
            Self::GomDeva => "gom_Deva",
            Self::GujGujr => "guj_Gujr",
            Self::HinDeva => "hin_Deva",
            Self::KanKnda => "kan_Knda",
            Self::KasArab => "kas_Arab",
            Self::KasDeva => "kas_Deva",
            Self::MaiDeva => "mai_Deva",
            Self::MalMlym => "mal_Mlym",
            Self::MarDeva => "mar_Deva",
            Self::MniBeng => "mni_Beng",
            Self::MniMtei => "mni_Mtei",
            Self::NpiDeva => "npi_Deva",
            Self::OryOrya => "ory_Orya",
            Self::PanGuru => "pan_Guru",
            Self::SanDeva => "san_Deva",
            Self::SatOlck => "sat_Olck",
            Self::SndArab => "snd_Arab",
            Self::SndDeva => "snd_Deva",
            Self::TamTaml => "tam_Taml",
            Self::TelTelu => "tel_Telu",
            Self::UrdArab => "urd_Arab",
        }
    }

    /// Human-readable language name
    pub fn name(&self) -> &'static str {
        match self {
            Self::AsmBeng => "Assamese",
            Self::BenBeng => "Bengali",
            Self::BrxDeva => "Bodo",
            Self::DoiDeva => "Dogri",
            Self::EngLatn => "English",
            Self::GomDeva => "Konkani",
            Self::GujGujr => "Gujarati",
            Self::HinDeva => "Hindi",
            Self::KanKnda => "Kannada",
            Self::KasArab | Self::KasDeva => "Kashmiri",
            Self::MaiDeva => "Maithili",
            Self::MalMlym => "Malayalam",
            Self::MarDeva => "Marathi",
            Self::MniBeng | Self::MniMtei => "Manipuri",
            Self::NpiDeva => "Nepali",
            Self::OryOrya => "Odia",
            Self::PanGuru => "Punjabi",
            Self::SanDeva => "Sanskrit",
            Self::SatOlck => "Santali",
            Self::SndArab | Self::SndDeva => "Sindhi",
            Self::TamTaml => "Tamil",
            Self::TelTelu => "Telugu",
            Self::UrdArab => "Urdu",
        }
    }

    /// Preferred short code for this tag, if one exists.
    ///
    /// `gom_Deva` has two aliases (`kok`, `gom`); the later table entry wins.
    pub fn alias(&self) -> Option<&'static str> {
        ALIASES
            .iter()
            .rev()
            .find(|(_, tag)| tag == self)
            .map(|(code, _)| *code)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageTag {
    type Err = BridgeError;

    /// Parse a canonical tag (case-insensitive). Short codes are not accepted here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TAGS
            .iter()
            .copied()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| BridgeError::UnsupportedLanguage {
                code: s.to_string(),
            })
    }
}

/// Resolve a short code or canonical tag, without falling back
pub fn resolve(code: &str) -> Option<LanguageTag> {
    let code = code.trim();
    let lower = code.to_ascii_lowercase();

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, tag)| *tag)
        .or_else(|| code.parse().ok())
}

/// Map a caller-supplied code to a backend tag. Never fails: unknown codes
/// become [`DEFAULT_TAG`].
pub fn normalize(code: &str) -> LanguageTag {
    match resolve(code) {
        Some(tag) => tag,
        None => {
            debug!("Unknown language code '{}', defaulting to {}", code, DEFAULT_TAG);
            DEFAULT_TAG
        }
    }
}

/// Whether `code` is a known short code or canonical tag
pub fn is_supported(code: &str) -> bool {
    resolve(code).is_some()
}

/// Known short codes, in table order
pub fn supported_codes() -> Vec<&'static str> {
    ALIASES.iter().map(|(code, _)| *code).collect()
}

/// Short code -> tag pairs, in table order
pub fn aliases() -> impl Iterator<Item = (&'static str, LanguageTag)> {
    ALIASES.iter().copied()
}
