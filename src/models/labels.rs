//! Label tables for states and free-text normalization

/// Mexican federal entities as `(value, label)` pairs
pub const STATES: &[(&str, &str)] = &[
    ("aguascalientes", "Aguascalientes"),
    ("baja_california", "Baja California"),
    ("baja_california_sur", "Baja California Sur"),
    ("campeche", "Campeche"),
    ("chiapas", "Chiapas"),
    ("chihuahua", "Chihuahua"),
    ("ciudad_de_mexico", "Ciudad de México"),
    ("coahuila", "Coahuila"),
    ("colima", "Colima"),
    ("durango", "Durango"),
    ("guanajuato", "Guanajuato"),
    ("guerrero", "Guerrero"),
    ("hidalgo", "Hidalgo"),
    ("jalisco", "Jalisco"),
    ("mexico", "Estado de México"),
    ("michoacan", "Michoacán"),
    ("morelos", "Morelos"),
    ("nayarit", "Nayarit"),
    ("nuevo_leon", "Nuevo León"),
    ("oaxaca", "Oaxaca"),
    ("puebla", "Puebla"),
    ("queretaro", "Querétaro"),
    ("quintana_roo", "Quintana Roo"),
    ("san_luis_potosi", "San Luis Potosí"),
    ("sinaloa", "Sinaloa"),
    ("sonora", "Sonora"),
    ("tabasco", "Tabasco"),
    ("tamaulipas", "Tamaulipas"),
    ("tlaxcala", "Tlaxcala"),
    ("veracruz", "Veracruz"),
    ("yucatan", "Yucatán"),
    ("zacatecas", "Zacatecas"),
];

/// Common abbreviations and official long names
const STATE_ALIASES: &[(&str, &str)] = &[
    ("cdmx", "ciudad_de_mexico"),
    ("df", "ciudad_de_mexico"),
    ("distrito_federal", "ciudad_de_mexico"),
    ("edomex", "mexico"),
    ("edo_mex", "mexico"),
    ("coahuila_de_zaragoza", "coahuila"),
    ("michoacan_de_ocampo", "michoacan"),
    ("veracruz_de_ignacio_de_la_llave", "veracruz"),
    ("bcs", "baja_california_sur"),
    ("bc", "baja_california"),
    ("nl", "nuevo_leon"),
    ("qroo", "quintana_roo"),
    ("slp", "san_luis_potosi"),
];

/// Label for a canonical state value
pub fn state_label(value: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
}

/// Fold text for comparison: lowercase, strip Spanish accents, and collapse
/// every run of non-alphanumerics into a single underscore.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.trim().chars().flat_map(char::to_lowercase) {
        let c = match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        };
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Resolve free-text state names ("Nuevo Leon", "CDMX", "jalisco") to a
/// canonical state value. Unresolvable input is returned trimmed so that
/// validation still sees the user's value.
pub fn normalize_state(text: &str) -> String {
    let folded = fold(text);
    if folded.is_empty() {
        return text.trim().to_string();
    }

    if let Some((value, _)) = STATES
        .iter()
        .find(|(value, label)| *value == folded || fold(label) == folded)
    {
        return value.to_string();
    }

    if let Some((_, value)) = STATE_ALIASES.iter().find(|(alias, _)| *alias == folded) {
        return value.to_string();
    }

    // Loose match: the longest state whose folded label or value appears in
    // the input, e.g. "Estado de Baja California Sur".
    if folded.len() >= 4 {
        let best = STATES
            .iter()
            .filter_map(|(value, label)| {
                let label = fold(label);
                [label.as_str(), *value]
                    .iter()
                    .filter(|candidate| contains_words(&folded, candidate))
                    .map(|candidate| candidate.len())
                    .max()
                    .map(|len| (len, *value))
            })
            .max_by_key(|(len, _)| *len);
        if let Some((_, value)) = best {
            return value.to_string();
        }
    }

    text.trim().to_string()
}

/// Whether `needle` occurs in `haystack` on word (underscore) boundaries
fn contains_words(haystack: &str, needle: &str) -> bool {
    let padded = format!("_{}_", haystack);
    padded.contains(&format!("_{}_", needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("  Nuevo León "), "nuevo_leon");
        assert_eq!(fold("San Luis Potosí"), "san_luis_potosi");
        assert_eq!(fold("baja-california__sur"), "baja_california_sur");
    }

    #[test]
    fn test_normalize_state_exact() {
        assert_eq!(normalize_state("Jalisco"), "jalisco");
        assert_eq!(normalize_state("nuevo_leon"), "nuevo_leon");
        assert_eq!(normalize_state("Ciudad de Mexico"), "ciudad_de_mexico");
        assert_eq!(normalize_state("Estado de México"), "mexico");
    }

    #[test]
    fn test_normalize_state_aliases_and_loose() {
        assert_eq!(normalize_state("CDMX"), "ciudad_de_mexico");
        assert_eq!(normalize_state("Edomex"), "mexico");
        assert_eq!(
            normalize_state("Estado de Baja California Sur"),
            "baja_california_sur"
        );
        assert_eq!(normalize_state("Municipio de Querétaro"), "queretaro");
    }

    #[test]
    fn test_normalize_state_unknown_passes_through() {
        assert_eq!(normalize_state("  Atlantis "), "Atlantis");
        assert_eq!(normalize_state(""), "");
    }

    #[test]
    fn test_state_label() {
        assert_eq!(state_label("yucatan"), Some("Yucatán"));
        assert_eq!(state_label("atlantis"), None);
    }
}
