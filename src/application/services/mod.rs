//! Application services - Business logic orchestration

pub mod command_service;
pub mod command_sync;
pub mod tag_codec;
pub mod tag_service;
pub mod tag_store;

pub use command_service::{TagCommandService, TAGS_COMMAND};
pub use command_sync::{CommandSynchronizer, TAG_COMMAND_OWNER};
pub use tag_codec::TagCodec;
pub use tag_service::TagService;
pub use tag_store::TagStore;
