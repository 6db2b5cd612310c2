use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// One tag as supplied by a caller: freeform text or a label-bearing object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    Raw(String),
    Labelled { label: String },
}

impl TagInput {
    pub fn text(&self) -> &str {
        match self {
            TagInput::Raw(s) => s,
            TagInput::Labelled { label } => label,
        }
    }
}

impl From<&str> for TagInput {
    fn from(s: &str) -> Self {
        TagInput::Raw(s.to_string())
    }
}

impl From<String> for TagInput {
    fn from(s: String) -> Self {
        TagInput::Raw(s)
    }
}

impl From<&String> for TagInput {
    fn from(s: &String) -> Self {
        TagInput::Raw(s.clone())
    }
}

/// Convert freeform tag text into its canonical slug.
///
/// `"#Client: Acme Co"` becomes `"client:acme-co"`. A leading `#` is dropped,
/// the text is split on the first `:` into a type and a value, and each part
/// is lower-cased, decomposed (accents stripped) and hyphenated. An empty
/// value yields just the type.
pub fn to_slug(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let (kind, value) = trimmed.split_once(':').unwrap_or((trimmed, ""));

    let kind = slug_part(kind);
    let value = slug_part(value);
    if value.is_empty() {
        kind
    } else {
        format!("{}:{}", kind, value)
    }
}

fn slug_part(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
    {
        if c.is_alphanumeric() || c == ':' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Format a slug for display: `"client:acme-co"` becomes `"Client: Acme Co"`.
pub fn label_from_slug(slug: &str) -> String {
    match slug.split_once(':') {
        Some((kind, value)) if !value.is_empty() => {
            format!("{}: {}", title_case(kind), title_case(value))
        }
        Some((kind, _)) => title_case(kind),
        None => title_case(slug),
    }
}

fn title_case(part: &str) -> String {
    part.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Slug every input, drop empties and de-duplicate keeping first-seen order.
pub fn normalize_tags<I>(inputs: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<TagInput>,
{
    let mut out: Vec<String> = Vec::new();
    for input in inputs {
        let slug = to_slug(input.into().text());
        if !slug.is_empty() && !out.contains(&slug) {
            out.push(slug);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_with_type_and_value() {
        assert_eq!(to_slug("#Client: Acme Co"), "client:acme-co");
        assert_eq!(to_slug("client:acme-co"), "client:acme-co");
    }

    #[test]
    fn slug_without_value() {
        assert_eq!(to_slug("Urgent"), "urgent");
        assert_eq!(to_slug("#Home Office:"), "home-office");
    }

    #[test]
    fn slug_empty_input() {
        assert_eq!(to_slug(""), "");
        assert_eq!(to_slug("   "), "");
        assert_eq!(to_slug("#"), "");
    }

    #[test]
    fn slug_collapses_and_trims_hyphens() {
        assert_eq!(to_slug("  --Deep   work!!  "), "deep-work");
        assert_eq!(to_slug("a -- b"), "a-b");
    }

    #[test]
    fn slug_is_accent_and_case_insensitive() {
        assert_eq!(to_slug("Café: Crème"), to_slug("cafe:creme"));
        assert_eq!(to_slug("ＡＢＣ"), "abc");
    }

    #[test]
    fn slug_keeps_later_colons_in_value() {
        assert_eq!(to_slug("time: 10:30"), "time:10:30");
    }

    #[test]
    fn label_round_trip() {
        assert_eq!(label_from_slug("client:acme-co"), "Client: Acme Co");
        assert_eq!(label_from_slug("deep-work"), "Deep Work");
        assert_eq!(label_from_slug("urgent:"), "Urgent");
    }

    #[test]
    fn normalize_dedupes_case_insensitively() {
        let slugs = normalize_tags(["Client: Acme", "client:acme", "Client: Acme"]);
        assert_eq!(slugs, vec!["client:acme"]);
    }

    #[test]
    fn normalize_mixed_inputs_keeps_first_seen_order() {
        let inputs: Vec<TagInput> =
            serde_json::from_str(r##"["Zeta", {"label": "Alpha"}, "", "zeta", {"label": "#beta"}]"##)
                .unwrap();
        assert_eq!(normalize_tags(inputs), vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    fn normalize_scalar() {
        assert_eq!(normalize_tags(std::iter::once("#Focus")), vec!["focus"]);
    }
}
