//! Category suggestion for free-text expense descriptions.
//!
//! The suggestion itself comes from an external collaborator implementing
//! [`CategorySuggester`]. Its answer is advisory: [`resolve_suggestion`] maps
//! it onto the caller's existing categories and falls back to local matching
//! when the collaborator is unavailable or names an unknown category.

use std::future::Future;

use thiserror::Error;

use crate::util::normalize_key;

const FALLBACK_CATEGORY: &str = "Other";

/// Failure reported by a suggestion collaborator.
#[derive(Debug, Error)]
#[error("category suggestion failed: {0}")]
pub struct SuggestError(pub String);

/// External service proposing a category name for a description.
pub trait CategorySuggester: Send + Sync {
    /// `categories` are the caller's category names; the answer may or may
    /// not be one of them.
    fn suggest(
        &self,
        description: &str,
        categories: &[String],
    ) -> impl Future<Output = Result<Option<String>, SuggestError>> + Send;
}

/// Picks the category to suggest.
///
/// Order of preference:
/// 1. the collaborator answer, if it names an existing category (ignoring case);
/// 2. the first category whose name contains, or is contained in, the answer;
/// 3. the first category whose name appears as whole words in the description;
/// 4. a category named `Other`;
/// 5. the first category.
///
/// Returns `None` only when `categories` is empty.
#[must_use]
pub fn resolve_suggestion(
    answer: Option<&str>,
    description: &str,
    categories: &[String],
) -> Option<String> {
    let answer = answer.map(str::trim).filter(|a| !a.is_empty());
    let keyed: Vec<(&String, String)> = categories
        .iter()
        .map(|name| (name, normalize_key(name)))
        .collect();

    if let Some(answer) = answer {
        if let Some(name) = categories.iter().find(|name| name.trim().eq_ignore_ascii_case(answer))
        {
            return Some(name.clone());
        }

        let answer_key = normalize_key(answer);
        if !answer_key.is_empty()
            && let Some((name, _)) = keyed.iter().find(|(_, key)| {
                !key.is_empty() && (key.contains(&answer_key) || answer_key.contains(key.as_str()))
            })
        {
            return Some((*name).clone());
        }
    }

    let description_key = format!(" {} ", normalize_key(description));
    if let Some((name, _)) = keyed
        .iter()
        .find(|(_, key)| !key.is_empty() && description_key.contains(&format!(" {key} ")))
    {
        return Some((*name).clone());
    }

    categories
        .iter()
        .find(|name| name.trim().eq_ignore_ascii_case(FALLBACK_CATEGORY))
        .or_else(|| categories.first())
        .cloned()
}
