//! Process locale as an SAP language tag.

use std::env;

/// Language used when no locale variable is usable.
pub const FALLBACK_LANGUAGE: &str = "EN";

const LOCALE_VARIABLES: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// The `sap-language` value for this process, e.g. `DE-DE` for `de_DE.UTF-8`.
#[must_use]
pub fn language_tag() -> String {
    LOCALE_VARIABLES
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find_map(|value| tag_from_locale(&value))
        .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
}

/// Convert a POSIX locale (`language[_territory][.codeset][@modifier]`) to an
/// uppercased tag. `C` and `POSIX` carry no language.
#[must_use]
pub fn tag_from_locale(locale: &str) -> Option<String> {
    let name = locale
        .split(['.', '@'])
        .next()
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() || name == "C" || name == "POSIX" {
        return None;
    }

    Some(name.replace('_', "-").to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn posix_locales() {
        check!(tag_from_locale("de_DE.UTF-8").as_deref() == Some("DE-DE"));
        check!(tag_from_locale("fr_FR@euro").as_deref() == Some("FR-FR"));
        check!(tag_from_locale("en").as_deref() == Some("EN"));
        check!(tag_from_locale("pt_BR.ISO-8859-1@latin").as_deref() == Some("PT-BR"));
    }

    #[test]
    fn locales_without_language() {
        check!(tag_from_locale("").is_none());
        check!(tag_from_locale("C").is_none());
        check!(tag_from_locale("C.UTF-8").is_none());
        check!(tag_from_locale("POSIX").is_none());
    }

    #[test]
    fn language_tag_is_never_empty() {
        check!(!language_tag().is_empty());
    }
}
