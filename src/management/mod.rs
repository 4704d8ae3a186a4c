mod state;
mod store;
mod token;

pub use state::STATE_KEY_PREFIX;
pub use state::StateManager;
pub use store::FileStore;
pub use store::KvStore;
pub use store::MemoryStore;
pub use store::StoreError;
pub use token::DEFAULT_USER;
pub use token::TokenManager;
