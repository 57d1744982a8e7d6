//! 网络访问：远端数据源抽象与 reqwest 实现。

pub mod client;
pub mod error;

pub use client::{GeoClient, RemoteSource};
pub use error::FetchError;

#[cfg(test)]
pub(crate) mod memory;
