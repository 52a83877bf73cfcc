//! Response generation for session input.
//!
//! A [`Responder`] turns the bytes written to a session's `input` into the
//! bytes served from its `output`. The session table calls it while holding
//! the slot lock, so implementations must return promptly and never block on
//! I/O.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};

/// Maps submitted input to output.
pub trait Responder: Send + Sync {
    /// Produce the output for `prompt`.
    fn respond(&self, prompt: &[u8]) -> Vec<u8>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Responder for F
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync,
{
    fn respond(&self, prompt: &[u8]) -> Vec<u8> {
        self(prompt)
    }
}

/// Placeholder responder: `Q: {prompt}A: Yes!\n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubResponder;

impl Responder for StubResponder {
    fn respond(&self, prompt: &[u8]) -> Vec<u8> {
        let mut reply = Vec::with_capacity(prompt.len() + 12);
        reply.extend_from_slice(b"Q: ");
        reply.extend_from_slice(prompt);
        reply.extend_from_slice(b"A: Yes!\n");
        reply
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Returns the prompt unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResponder;

impl Responder for EchoResponder {
    fn respond(&self, prompt: &[u8]) -> Vec<u8> {
        prompt.to_vec()
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Built-in responder selectable from configuration.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponderKind {
    /// [`StubResponder`].
    #[default]
    Stub,
    /// [`EchoResponder`].
    Echo,
}

impl ResponderKind {
    /// Instantiate the responder.
    pub fn build(self) -> Arc<dyn Responder> {
        match self {
            ResponderKind::Stub => Arc::new(StubResponder),
            ResponderKind::Echo => Arc::new(EchoResponder),
        }
    }
}
