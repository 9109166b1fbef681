//! Social login gateway: verify Kakao, Naver, Google, and Apple credentials, map them onto
//! stable local accounts, and hand out rotating, revocable session tokens.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod identity;
pub mod obs;
pub mod provider;
pub mod session;
pub mod store;
pub mod validator;

mod _prelude {
	pub use std::{
		collections::{HashMap, HashSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use gateway::{Gateway, LoginOutcome};
pub use jsonwebtoken;
pub use time;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
