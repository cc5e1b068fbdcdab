//! Sayonce sends a single prompt to an OpenAI-compatible chat API and
//! prints the assistant's reply to stdout.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns configuration resolution (config file, environment,
//!   flags) and the error taxonomy shared by every layer.
//! - [`api`] defines the chat-completion wire payloads and the HTTP
//!   client that issues the one outbound request.
//! - [`cli`] parses arguments and drives the single invocation.
//!
//! The runtime entrypoint lives in the binary crate (`src/main.rs`) and
//! routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
