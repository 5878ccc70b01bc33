//! Language tag resolution.
//!
//! Callers may pass a concrete tag (`"en"`, `"hi"`, `"pt-BR"`) or ask for
//! detection with `"auto"` / an empty tag.

use tracing::debug;

use crate::constants::{AUTO_LANGUAGE, DEFAULT_LANGUAGE};

/// Resolves the tag every downstream capability receives.
///
/// Concrete tags are trimmed and lowercased. `"auto"` and blank tags run
/// detection over `text`; detection failure yields `"en"`.
pub fn resolve_language(tag: &str, text: &str) -> String {
    let tag = tag.trim();
    if !tag.is_empty() && !tag.eq_ignore_ascii_case(AUTO_LANGUAGE) {
        return tag.to_ascii_lowercase();
    }

    match detect_language(text) {
        Some(code) => {
            debug!(language = code, "Detected input language");
            code.to_string()
        }
        None => {
            debug!("Language detection failed, using default");
            DEFAULT_LANGUAGE.to_string()
        }
    }
}

/// Detects the language of `text`, as ISO 639-1 where a two-letter code exists.
pub fn detect_language(text: &str) -> Option<&'static str> {
    let info = whatlang::detect(text)?;
    let code = info.lang().code();
    Some(iso639_1(code).unwrap_or(code))
}

/// Primary subtag of a BCP-47 style tag (`"pt-BR"` -> `"pt"`).
pub fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

fn iso639_1(code: &str) -> Option<&'static str> {
    Some(match code {
        "eng" => "en",
        "hin" => "hi",
        "ben" => "bn",
        "mar" => "mr",
        "tam" => "ta",
        "tel" => "te",
        "guj" => "gu",
        "kan" => "kn",
        "mal" => "ml",
        "pan" => "pa",
        "ori" => "or",
        "urd" => "ur",
        "nep" => "ne",
        "sin" => "si",
        "spa" => "es",
        "fra" => "fr",
        "deu" => "de",
        "ita" => "it",
        "por" => "pt",
        "nld" => "nl",
        "swe" => "sv",
        "dan" => "da",
        "nob" => "nb",
        "fin" => "fi",
        "pol" => "pl",
        "ces" => "cs",
        "slk" => "sk",
        "hun" => "hu",
        "ron" => "ro",
        "bul" => "bg",
        "hrv" => "hr",
        "srp" => "sr",
        "slv" => "sl",
        "ell" => "el",
        "rus" => "ru",
        "ukr" => "uk",
        "bel" => "be",
        "tur" => "tr",
        "ara" => "ar",
        "heb" => "he",
        "pes" => "fa",
        "cmn" => "zh",
        "jpn" => "ja",
        "kor" => "ko",
        "vie" => "vi",
        "tha" => "th",
        "ind" => "id",
        "tgl" => "tl",
        _ => return None,
    })
}
