#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod compose;
mod error;
mod health;
pub mod model;
pub mod product;

pub use crate::compose::{ContextComposer, MissingProductPolicy, compose_prompt};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::health::{ServiceHealth, ServiceStatus};
pub use crate::model::{CompletionProvider, CompletionService};
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use crate::model::{MockConfig, MockProvider};
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use crate::product::MemoryStore;
pub use crate::product::{ProductLookup, ProductRecord, ProductStore};
