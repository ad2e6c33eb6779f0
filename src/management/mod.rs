mod backend;
mod token;

pub use backend::FileBackend;
pub use backend::MemoryBackend;
pub use backend::StorageBackend;
pub use token::Tier;
pub use token::TokenKey;
pub use token::TokenState;
pub use token::TokenStore;
