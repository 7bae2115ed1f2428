//! Built-in Spanish correction tables

use super::{ContextualPattern, NormalizerConfig};

/// Punctuation kept by the allow-list filter, besides letters, digits and whitespace
pub const DEFAULT_ALLOWED_PUNCTUATION: &str = ".,;:()[]{}¡!¿?@#$%&*+-/\\\"'<>=_";

/// Typographic glyphs the recognizer emits for plain ASCII
const GLYPH_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("\u{2014}", "-"), // em dash
    ("\u{2013}", "-"), // en dash
    ("\u{2018}", "'"),
    ("\u{2019}", "'"),
    ("`", "'"),
    ("\u{201C}", "\""),
    ("\u{201D}", "\""),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("|", "l"),
];

/// Whole words commonly misread, mostly dropped accents and rn/m confusion
const WORD_CORRECTIONS: &[(&str, &str)] = &[
    ("informacion", "información"),
    ("numero", "número"),
    ("telefono", "teléfono"),
    ("pagina", "página"),
    ("direccion", "dirección"),
    ("tambien", "también"),
    ("articulo", "artículo"),
    ("codigo", "código"),
    ("senor", "señor"),
    ("senora", "señora"),
    ("compania", "compañía"),
    ("cornpañía", "compañía"),
    ("rnás", "más"),
    ("rnismo", "mismo"),
    ("tarnbién", "también"),
    ("nurnero", "número"),
];

const PREPOSITIONS: &str = "[Ee]n|[Dd]e|[Cc]on|[Pp]or|[Pp]ara|[Ss]obre|[Dd]esde|[Hh]asta|[Ee]ntre";

/// Spanish defaults used when no corrections file is given.
pub fn spanish() -> NormalizerConfig {
    NormalizerConfig {
        glyph_substitutions: pairs(GLYPH_SUBSTITUTIONS),
        word_corrections: pairs(WORD_CORRECTIONS),
        contextual_patterns: vec![
            // "en l casa" -> "en la casa"
            ContextualPattern {
                pattern: format!(r"\b({}) l\b", PREPOSITIONS),
                replacement: "${1} la".to_string(),
            },
            // "con u amigo" -> "con un amigo"
            ContextualPattern {
                pattern: format!(r"\b({}) u\b", PREPOSITIONS),
                replacement: "${1} un".to_string(),
            },
            // "por e camino" -> "por el camino"
            ContextualPattern {
                pattern: r"\b([Ee]n|[Cc]on|[Pp]or|[Pp]ara|[Ss]obre) e\b".to_string(),
                replacement: "${1} el".to_string(),
            },
        ],
        allowed_punctuation: DEFAULT_ALLOWED_PUNCTUATION.to_string(),
    }
}

fn pairs(table: &[(&str, &str)]) -> Vec<(String, String)> {
    table
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}
