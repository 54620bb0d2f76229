pub mod contiguous;
pub mod paging;
