use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Only "desc" (any case) sorts descending; anything else, including no value, is ascending.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some(dir) if dir.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

/// A collection that can be ordered by a fixed set of named fields.
pub trait Sortable {
    type Field: Copy;

    /// Resolve a client-supplied field name. Unknown names yield `None`.
    fn parse_field(name: &str) -> Option<Self::Field>;

    fn compare_by(&self, other: &Self, field: Self::Field) -> Ordering;

    /// Stable order used when no usable field is requested.
    fn default_order(&self, other: &Self) -> Ordering;
}

/// Lowercase and drop separators so `fullName`, `full_name` and `FullName` all match.
pub fn normalize_field_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Paging and sorting parameters as a caller supplied them, before clamping.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Clamp raw query values: page and size below 1 become 1, size above `max_size` becomes `max_size`.
    pub fn new(page: Option<i64>, page_size: Option<i64>, default_size: u32, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let page_size = page_size
            .unwrap_or(default_size as i64)
            .clamp(1, max_size as i64) as u32;

        PageRequest { page, page_size }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> PagedResult<T> {
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}

/// Order an already filtered collection in place.
pub fn apply_ordering<T: Sortable>(items: &mut [T], sort_by: Option<&str>, sort_dir: Option<&str>) {
    items.sort_by(T::default_order);

    let Some(field) = sort_by.and_then(T::parse_field) else {
        return;
    };

    // Stable sort: ties keep the default order.
    match SortDirection::parse(sort_dir) {
        SortDirection::Asc => items.sort_by(|a, b| a.compare_by(b, field)),
        SortDirection::Desc => items.sort_by(|a, b| b.compare_by(a, field)),
    }
}

/// Count, order, then cut one page out of an already filtered collection.
pub fn paginate<T: Sortable>(
    mut items: Vec<T>,
    sort_by: Option<&str>,
    sort_dir: Option<&str>,
    request: PageRequest,
) -> PagedResult<T> {
    let total = items.len() as u64;

    apply_ordering(&mut items, sort_by, sort_dir);

    let items = items
        .into_iter()
        .skip(request.offset())
        .take(request.page_size as usize)
        .collect();

    PagedResult {
        items,
        page: request.page,
        page_size: request.page_size,
        total,
    }
}
