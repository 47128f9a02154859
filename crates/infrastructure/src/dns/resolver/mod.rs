pub mod answer;
pub mod builder;
pub mod core;
pub mod state;

pub use builder::ResolverBuilder;
pub use self::core::IterativeResolver;
pub use state::Nameserver;
