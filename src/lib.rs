//! Quintet: five cooperating agents answering one request at a time.
//!
//! A user proxy seeds the conversation, a planner breaks the request down,
//! an executor answers it (calling web, weather, currency and page tools
//! when needed), a summarizer condenses free-form results and a reviewer
//! approves the outcome. [`chat::GroupChat`] drives the turns;
//! [`session`] wraps it in text or voice I/O.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use quintet::prelude::*;
//!
//! # async fn example() -> quintet::error::Result<()> {
//! let config = QuintetConfig::load(None)?;
//! config.validate()?;
//! let registry = Arc::new(builtin_registry(&config.tools.enabled_tools()?, config.tools.endpoints.clone())?);
//! let chat = GroupChat::new(AgentRoster::from_config(&config, registry)?);
//! let answer = Orchestrator::new(chat).handle("What is the weather in Guangzhou?").await;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod audio;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod session;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
