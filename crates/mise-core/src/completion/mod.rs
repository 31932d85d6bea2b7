//! The `CompletionService` trait -- the adapter interface for hosted
//! text-generation backends.
//!
//! The engine treats the completion service as a black box: prompt in, text
//! out, or failure. It is invoked exactly once per generation; there is no
//! retry policy here, because the breakdown generator recovers from any
//! failure via its deterministic fallback.

use anyhow::Result;
use async_trait::async_trait;

/// Adapter interface for a hosted text-completion backend.
///
/// Implementors wrap a specific vendor API and translate its I/O into plain
/// strings. The trait is object-safe so callers can hold
/// `Box<dyn CompletionService>` or pass `&dyn CompletionService`.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Human-readable backend name (e.g. "openai", "stub").
    fn name(&self) -> &str;

    /// Run one completion: a fixed system prompt plus a user prompt built
    /// from event context. Returns the raw response text.
    ///
    /// Implementations should make a single attempt; callers own the
    /// fallback behavior.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

// Compile-time assertion: CompletionService must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn CompletionService) {}
};
