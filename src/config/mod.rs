pub mod settings;

pub use settings::{
    AdminSeed, AppConfig, JwtConfig, ScyllaConfig, ServerConfig, Settings, StoreBackend,
};
