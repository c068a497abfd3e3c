//! Offset pagination for report tables.

use serde::Serialize;
use utoipa::ToSchema;

pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Slice `items` into 1-based page `page` of size `limit`.
///
/// `page` is raised to at least 1 and `limit` clamped to
/// `1..=MAX_PAGE_SIZE`. A page past the end is empty.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let total = items.len();
    let total_pages = total.div_ceil(limit);
    let start = (page - 1).saturating_mul(limit);

    let items: Vec<T> = items.into_iter().skip(start).take(limit).collect();

    Page {
        items,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
        },
    }
}
