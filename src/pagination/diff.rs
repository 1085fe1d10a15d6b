//! Page-level diff between two paginations, for incremental redraws

use crate::pagination::Pagination;
use serde::Serialize;

/// Pages that differ between an old and a new pagination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDiff {
    /// Indices present in both paginations whose content changed
    pub changed_pages: Vec<usize>,
    /// Pages only present in the new pagination
    pub inserted_pages: usize,
    /// Pages only present in the old pagination
    pub removed_pages: usize,
}

impl PaginationDiff {
    pub fn between(old: &Pagination, new: &Pagination) -> Self {
        let old_count = old.page_count();
        let new_count = new.page_count();

        let changed_pages = old
            .pages()
            .iter()
            .zip(new.pages())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(index, _)| index)
            .collect();

        Self {
            changed_pages,
            inserted_pages: new_count.saturating_sub(old_count),
            removed_pages: old_count.saturating_sub(new_count),
        }
    }

    /// First page a renderer has to redraw
    pub fn first_changed_page(&self, old_count: usize) -> Option<usize> {
        let first_resized = (self.inserted_pages > 0 || self.removed_pages > 0)
            .then(|| old_count - self.removed_pages);
        match (self.changed_pages.first().copied(), first_resized) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.changed_pages.is_empty() || self.inserted_pages > 0 || self.removed_pages > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Paginator;
    use crate::screenplay::{Line, LineType};

    fn actions(count: usize) -> Vec<Line> {
        (0..count)
            .flat_map(|i| {
                [
                    Line::new(LineType::Action, format!("Action number {i}.")),
                    Line::new(LineType::Empty, ""),
                ]
            })
            .collect()
    }

    #[test]
    fn test_no_changes() {
        let paginator = Paginator::default();
        let a = paginator.paginate(&actions(40));
        let b = paginator.paginate(&actions(40));
        let diff = PaginationDiff::between(&a, &b);
        assert!(!diff.has_changes());
        assert_eq!(diff.first_changed_page(a.page_count()), None);
    }

    #[test]
    fn test_appended_page() {
        let paginator = Paginator::default();
        let old = paginator.paginate(&actions(20));
        let new = paginator.paginate(&actions(40));
        let diff = PaginationDiff::between(&old, &new);

        assert_eq!(diff.inserted_pages, 1);
        assert_eq!(diff.removed_pages, 0);
        // the first page gained lines
        assert_eq!(diff.changed_pages, vec![0]);
        assert_eq!(diff.first_changed_page(old.page_count()), Some(0));
    }
}
