pub mod env_config;
pub mod error;
pub mod http;
pub mod ids;
pub mod jwt;
pub mod misc;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
