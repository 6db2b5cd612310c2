use crate::model::board::Board;
use crate::model::tags::TagCatalog;
use crate::util::slug::{TagInput, normalize_tags, to_slug};

/// Add tags to the catalog. Returns the normalized slugs that were supplied.
pub fn ensure_tags<I>(catalog: &mut TagCatalog, tags: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<TagInput>,
{
    let slugs = normalize_tags(tags);
    catalog.slugs.extend(slugs.iter().cloned());
    slugs
}

/// Rename a tag in the catalog: the new slug is added and the old removed.
/// Returns false when either side normalizes to nothing or both are equal.
pub fn rename_tag(catalog: &mut TagCatalog, from: &str, to: &str) -> bool {
    let (old, new) = (to_slug(from), to_slug(to));
    if old.is_empty() || new.is_empty() || old == new {
        return false;
    }
    catalog.slugs.insert(new);
    catalog.slugs.remove(&old);
    true
}

/// Remove a tag from the catalog. Returns true if it was present.
pub fn delete_tag(catalog: &mut TagCatalog, tag: &str) -> bool {
    let slug = to_slug(tag);
    !slug.is_empty() && catalog.slugs.remove(&slug)
}

/// Point every task tagged `from` at `to` instead. Returns the number of
/// tasks changed.
pub fn rename_tag_in_board(board: &mut Board, from: &str, to: &str) -> usize {
    let (old, new) = (to_slug(from), to_slug(to));
    if old.is_empty() || new.is_empty() || old == new {
        return 0;
    }
    retag(board, &old, Some(new))
}

/// Clear the tag from every task carrying it. Returns the number of tasks changed.
pub fn remove_tag_from_board(board: &mut Board, tag: &str) -> usize {
    let slug = to_slug(tag);
    if slug.is_empty() {
        return 0;
    }
    retag(board, &slug, None)
}

fn retag(board: &mut Board, old: &str, new: Option<String>) -> usize {
    let mut changed = 0;
    for task in board.columns.values_mut().flatten() {
        if task.tag.as_deref().is_some_and(|t| to_slug(t) == old) {
            task.tag = new.clone();
            changed += 1;
        }
    }
    changed
}
