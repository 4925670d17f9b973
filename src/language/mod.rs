//! Deterministic caption language selection.

/// Pick one language from `available` for the ordered `preferred` list.
///
/// Exact matches win over regional variants (`en` matches `en-GB`), and when nothing in the
/// preference list matches the first available language is returned. `None` only when
/// `available` is empty. `available` order is the provider's order and decides ties.
pub fn pick_language<S, P>(available: &[S], preferred: &[P]) -> Option<String>
where
    S: AsRef<str>,
    P: AsRef<str>,
{
    let first = available.first()?;

    for wanted in preferred {
        let wanted = wanted.as_ref();
        if let Some(hit) = available.iter().find(|tag| tag.as_ref() == wanted) {
            return Some(hit.as_ref().to_string());
        }
    }

    for wanted in preferred {
        let prefix = format!("{}-", wanted.as_ref());
        if let Some(hit) = available
            .iter()
            .find(|tag| tag.as_ref().len() > prefix.len() && tag.as_ref().starts_with(&prefix))
        {
            return Some(hit.as_ref().to_string());
        }
    }

    Some(first.as_ref().to_string())
}

/// Parse a comma separated language list (`"tr, en,en-GB"`) into tags
pub fn parse_language_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
