pub mod gateway;
pub mod gateways;
pub mod models;
pub mod prompt;

pub use gateway::StylistGateway;
pub use models::BackendKind;
pub use prompt::StylistPrompt;
