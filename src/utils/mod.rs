pub mod paging;

pub use paging::{
    ListParams, PageRequest, PagedResult, SortDirection, Sortable, apply_ordering,
    normalize_field_name, paginate,
};
