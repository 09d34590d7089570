pub mod bulk_fetch;
pub mod paging;
pub mod ranking;
pub mod sorting;

pub use bulk_fetch::BulkFetchCoordinator;
pub use paging::{PageView, PagingView};
pub use ranking::{RankedRecord, RankedSequence, RankingEngine};
pub use sorting::*;
