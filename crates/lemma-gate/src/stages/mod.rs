pub mod bot;
pub mod ownership;
pub mod parents;
pub mod payload;
pub mod search;

pub use bot::BotCheckStage;
pub use ownership::OwnershipStage;
pub use parents::ParentRefStage;
pub use payload::PayloadStage;
pub use search::SearchStage;
