//! Merging and paginating fan-out results

use std::collections::BTreeSet;

use packages_core::{PaginationOptions, Status};

/// Concatenate per-binding results in registry order, then stable-sort by
/// `identifier`.
///
/// Items with equal identifiers keep registry order.
pub fn merge_by_identifier<T>(
    per_binding: impl IntoIterator<Item = Vec<T>>,
    identifier: impl Fn(&T) -> &str,
) -> Vec<T> {
    let mut merged: Vec<T> = per_binding.into_iter().flatten().collect();
    merged.sort_by(|a, b| identifier(a).cmp(identifier(b)));
    merged
}

/// Deduplicated, ascending union of category lists
pub fn merge_categories(per_binding: impl IntoIterator<Item = Vec<String>>) -> Vec<String> {
    per_binding
        .into_iter()
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parse a page token into a zero-based page number (empty → 0)
///
/// # Errors
///
/// Returns `InvalidArgument` for a token that is not a decimal page number.
pub fn parse_page_token(token: &str) -> Result<usize, Status> {
    if token.is_empty() {
        return Ok(0);
    }
    token.parse::<usize>().map_err(|e| {
        Status::invalid_argument(format!("unable to interpret page token {token:?}: {e}"))
    })
}

/// Slice one page out of the merged set.
///
/// The token names the page, so the page starts at `token * page_size`.
/// A full page carries the next page number as its token; a short or empty
/// page ends the listing with an empty token. A page size of zero returns
/// everything.
///
/// # Errors
///
/// Returns `InvalidArgument` for a malformed page token.
pub fn paginate<T>(
    items: Vec<T>,
    pagination: Option<&PaginationOptions>,
) -> Result<(Vec<T>, String), Status> {
    let Some(pagination) = pagination.filter(|p| p.page_size > 0) else {
        return Ok((items, String::new()));
    };

    let page_number = parse_page_token(&pagination.page_token)?;
    let page_size = usize::try_from(pagination.page_size).unwrap_or(usize::MAX);
    let offset = page_number.saturating_mul(page_size);

    let page: Vec<T> = items.into_iter().skip(offset).take(page_size).collect();
    let next_page_token = if page.len() == page_size {
        page_number.saturating_add(1).to_string()
    } else {
        String::new()
    };

    Ok((page, next_page_token))
}
