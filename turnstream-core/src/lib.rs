pub mod boundary;
pub mod config;
pub mod decode;
pub mod driver;
pub mod error;
pub mod http_client;
pub mod model;
pub mod normalize;
pub mod packet;
pub mod registry;
pub mod session;
pub mod sink;
pub mod speech;
pub mod telemetry;
#[cfg(test)]
pub mod test_util;
