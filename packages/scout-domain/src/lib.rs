pub mod cart;
pub mod feedback;
pub mod history;
pub mod location;
pub mod pagination;
pub mod query;
pub mod record;

pub use cart::{CartEntry, LocalCart, SharedCart, SharedCartHistory};
pub use feedback::{FeedbackBook, FeedbackDraft};
pub use history::{RankedEntry, SearchHistory, SearchHistoryEntry};
pub use location::{Location, LocationRequest, ParamEdit, ROOT_PATH};
pub use pagination::{Pager, corrected_offset, needs_correction};
pub use query::{Facets, PageSizes, QueryState, SortKey};
pub use record::{
	CartReceipt, CreateCartRequest, FacetCount, FeedbackSubmission, Sample, SamplePage, Study,
	StudyPage, StudyQuery, TermMatch,
};
