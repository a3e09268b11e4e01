//! LLM Provider Clients and Abstractions
//!
//! The analyst stage talks to a language model through [`LLMClient`], so the
//! provider can be swapped by configuration and replaced by a mock in tests.
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI API and compatible endpoints
//! - `ollama` - Local Ollama server (default)
//!
//! # Example
//!
//! ```ignore
//! use scholar::llm::{LLMClientFactory, Provider};
//!
//! let factory = LLMClientFactory::from_config(&config.llm)?;
//! let client = factory.create_default().await?;
//!
//! let text = client.generate_with_system("You are terse.", "What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, LLMClientFactory, Provider};
