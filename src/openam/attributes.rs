//! Parsers for the OpenAM identity REST text responses.

use super::ProviderError;
use crate::profile::RawAttributes;

const TOKEN_ID: &str = "userdetails.token.id=";
const ATTRIBUTE_NAME: &str = "userdetails.attribute.name=";
const ATTRIBUTE_VALUE: &str = "userdetails.attribute.value=";

/// Parse an `isTokenValid` body (`boolean=true`).
pub fn parse_validity(body: &str) -> Result<bool, ProviderError> {
    let value = body
        .trim()
        .strip_prefix("boolean=")
        .ok_or_else(|| ProviderError::Malformed(format!("unexpected validity body: {body}")))?;
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ProviderError::Malformed(format!(
            "unexpected validity value: {other}"
        ))),
    }
}

/// Parse an `attributes` body into a map.
///
/// The token id lands under `tokenid`. Each `attribute.value` line belongs to
/// the most recent `attribute.name`; repeated values become a list. Role
/// lines and anything unrecognised are skipped.
pub fn parse_attributes(body: &str) -> RawAttributes {
    let mut attributes = RawAttributes::new();
    let mut current: Option<&str> = None;

    for line in body.lines().map(str::trim) {
        if let Some(token) = line.strip_prefix(TOKEN_ID) {
            attributes.insert("tokenid", token);
        } else if let Some(name) = line.strip_prefix(ATTRIBUTE_NAME) {
            current = Some(name);
        } else if let Some(value) = line.strip_prefix(ATTRIBUTE_VALUE)
            && let Some(name) = current
        {
            attributes.append(name, value);
        }
    }

    attributes
}
