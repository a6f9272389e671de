use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::Locale;
use crate::error::ParseError;
use crate::model::LocaleVariant;

/// How a text provider is asked to lay out its answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyFormat {
    /// A single JSON object keyed by locale tag.
    Json,
    /// `[tag]` sections with `HOOK:`/`CAPTION:`/`HASHTAGS:`/`EMOJIS:` lines.
    LabeledBlocks,
}

const FIELDS: [&str; 4] = ["hook", "caption", "hashtags", "emojis"];

pub fn build_prompt(product_name: &str, channel: &str, locales: &[Locale], format: ReplyFormat) -> String {
    let languages = locales
        .iter()
        .map(|locale| locale.language.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let mut prompt = format!(
        "Create social media content for the product \"{product_name}\" specifically for the platform: {channel}.\n\
The tone should be exciting, modern, and engaging.\n\
Please provide the output in {count} languages: {languages}.\n\
For each language, provide a 'hook' (a short, attention-grabbing opening line), \
a 'caption' (the main text), and a list of relevant 'hashtags'.\n\
Also include 2-3 relevant emojis for each language.\n\n",
        count = locales.len(),
    );
    match format {
        ReplyFormat::Json => {
            let mut example = Map::new();
            for locale in locales {
                let mut fields = Map::new();
                fields.insert("hook".into(), Value::from("..."));
                fields.insert("caption".into(), Value::from("..."));
                fields.insert("hashtags".into(), Value::from("#..."));
                fields.insert("emojis".into(), Value::from("..."));
                example.insert(locale.tag.clone(), Value::Object(fields));
            }
            let example = serde_json::to_string_pretty(&Value::Object(example)).unwrap_or_default();
            prompt.push_str("Format the output strictly as a JSON object like this, keyed by language code:\n");
            prompt.push_str(&example);
            prompt.push_str("\nReturn only the JSON object.");
        }
        ReplyFormat::LabeledBlocks => {
            prompt.push_str("Format the output strictly as the blocks below, one per language, with nothing else:\n");
            for locale in locales {
                prompt.push_str(&format!(
                    "[{tag}]\nHOOK: ...\nCAPTION: ...\nHASHTAGS: #...\nEMOJIS: ...\n",
                    tag = locale.tag
                ));
            }
            prompt.push_str(&format!(
                "The code in brackets selects the language ({}).",
                locales
                    .iter()
                    .map(|locale| format!("{} = {}", locale.tag, locale.language))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
    }
    prompt
}

pub fn parse_reply(
    raw: &str,
    locales: &[Locale],
    format: ReplyFormat,
) -> Result<BTreeMap<String, LocaleVariant>, ParseError> {
    match format {
        ReplyFormat::Json => parse_json_reply(raw, locales),
        ReplyFormat::LabeledBlocks => parse_labeled_reply(raw, locales),
    }
}

/// Takes the outermost `{...}` so fenced or chatty replies still parse.
fn extract_json_block(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn parse_json_reply(raw: &str, locales: &[Locale]) -> Result<BTreeMap<String, LocaleVariant>, ParseError> {
    let block = extract_json_block(raw).ok_or(ParseError::NoStructuredBlock)?;
    let parsed: Value = serde_json::from_str(block)?;
    let mut variants = BTreeMap::new();
    for locale in locales {
        let object = parsed
            .get(&locale.tag)
            .and_then(Value::as_object)
            .ok_or_else(|| ParseError::MissingLocale(locale.tag.clone()))?;
        let field = |name: &str| -> String {
            match object.get(name) {
                Some(Value::String(text)) => text.trim().to_string(),
                // Some models answer hashtags as an array.
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => String::new(),
            }
        };
        let variant = LocaleVariant {
            hook: field("hook"),
            caption: field("caption"),
            hashtags: field("hashtags"),
            emojis: field("emojis"),
        };
        check_variant(&locale.tag, &variant)?;
        variants.insert(locale.tag.clone(), variant);
    }
    Ok(variants)
}

fn parse_labeled_reply(raw: &str, locales: &[Locale]) -> Result<BTreeMap<String, LocaleVariant>, ParseError> {
    let mut sections: BTreeMap<String, BTreeMap<&'static str, String>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim().trim_start_matches(['*', '-']).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(tag) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let tag = tag.trim().to_string();
            sections.entry(tag.clone()).or_default();
            current = Some(tag);
            continue;
        }
        let Some(section) = current.as_ref().and_then(|tag| sections.get_mut(tag)) else {
            continue;
        };
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim().trim_matches('*').to_ascii_lowercase();
        if let Some(field) = FIELDS.iter().find(|field| **field == label) {
            section.insert(*field, value.trim().trim_start_matches('*').trim().to_string());
        }
    }

    if sections.is_empty() {
        return Err(ParseError::NoStructuredBlock);
    }

    let mut variants = BTreeMap::new();
    for locale in locales {
        let mut section = sections
            .remove(&locale.tag)
            .ok_or_else(|| ParseError::MissingLocale(locale.tag.clone()))?;
        let mut take = |name: &'static str| section.remove(name).unwrap_or_default();
        let variant = LocaleVariant {
            hook: take("hook"),
            caption: take("caption"),
            hashtags: take("hashtags"),
            emojis: take("emojis"),
        };
        check_variant(&locale.tag, &variant)?;
        variants.insert(locale.tag.clone(), variant);
    }
    Ok(variants)
}

fn check_variant(tag: &str, variant: &LocaleVariant) -> Result<(), ParseError> {
    if variant.hook.is_empty() {
        return Err(ParseError::MissingField {
            locale: tag.to_string(),
            field: "hook",
        });
    }
    if variant.caption.is_empty() {
        return Err(ParseError::MissingField {
            locale: tag.to_string(),
            field: "caption",
        });
    }
    Ok(())
}
