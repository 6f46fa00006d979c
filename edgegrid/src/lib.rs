#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use edgegrid_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

pub mod eg1;
#[cfg(feature = "default-context")]
pub use eg1::default_signer;

mod client;
pub use client::Client;
