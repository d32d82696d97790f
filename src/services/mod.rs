pub mod cancellation;
pub mod debounce;
pub mod liked;
pub mod providers;
pub mod recommendations;
pub mod search;
pub mod toggle;

pub use cancellation::{CancelScope, ScopeSlot, TaskHandle};
pub use debounce::{QueryDebouncer, Settled};
pub use liked::{LikedSetSynchronizer, LikedView};
pub use recommendations::{Suggestion, SuggestionService};
pub use search::{SearchFetcher, SearchSession, SearchState};
pub use toggle::{LikeState, LikeToggler, Notice, NoticeKind};
