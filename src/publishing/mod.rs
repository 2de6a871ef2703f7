//! Publishing pipeline: record translation, page rendering, site index
//! maintenance and the post-publish collaborators

pub mod index;
pub mod notify;
pub mod publisher;
pub mod sync;
pub mod templates;
pub mod translator;

pub use index::{SiteIndex, SiteIndexWriter};
pub use notify::{Notice, Notifier, NotifyError, WebhookNotifier};
pub use publisher::{BatchItem, BatchReport, PublishError, PublishReceipt, Publisher, RebuildReport};
pub use sync::{GitSync, SiteSync, SyncError, SyncOutcome};
pub use translator::{translate, WebRecipeView};
