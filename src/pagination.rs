use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Raw `?page=&perPage=` query. Values stay strings so garbage falls back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Paged { page: i64, per_page: i64 },
    /// Everything in one response.
    Unbounded,
}

impl PageRequest {
    /// Resolves a query; `page=0` means "no pagination" only when `allow_unbounded` is set,
    /// otherwise it is treated like any other invalid page.
    pub fn resolve(query: &PageQuery, allow_unbounded: bool) -> Self {
        let page = query.page.as_deref().and_then(|p| p.trim().parse::<i64>().ok());
        if allow_unbounded && page == Some(0) {
            return PageRequest::Unbounded;
        }
        let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let per_page = query
            .per_page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PER_PAGE);
        PageRequest::Paged { page, per_page }
    }

    pub fn limit(&self) -> Option<i64> {
        match self {
            PageRequest::Paged { per_page, .. } => Some(*per_page),
            PageRequest::Unbounded => None,
        }
    }

    pub fn offset(&self) -> i64 {
        match self {
            PageRequest::Paged { page, per_page } => (page - 1).saturating_mul(*per_page),
            PageRequest::Unbounded => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub page_count: i64,
    pub next_page: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageMeta {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let (page, per_page, page_count) = match request {
            PageRequest::Paged { page, per_page } => {
                let page_count = total / per_page + i64::from(total % per_page != 0);
                (page, per_page, page_count)
            }
            PageRequest::Unbounded => (1, total, if total > 0 { 1 } else { 0 }),
        };
        let has_next_page = page < page_count;
        Self {
            page,
            per_page,
            total,
            page_count,
            next_page: if has_next_page { page + 1 } else { 0 },
            has_next_page,
            has_prev_page: page > 1,
        }
    }
}
