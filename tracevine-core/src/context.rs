use std::fmt;
use std::sync::Arc;

use crate::Span;

/// Per-call carrier for the active observation span.
///
/// At most one LLM span is active per call. The carrier is threaded
/// through the call explicitly; an empty context is the legal steady state
/// for unobserved calls and consumers skip observation when extraction
/// yields nothing.
#[derive(Clone, Default)]
pub struct CallContext {
    span: Option<Arc<dyn Span>>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this context carrying `span` as the active span.
    pub fn with_span(&self, span: Arc<dyn Span>) -> Self {
        Self { span: Some(span) }
    }

    /// The active span, if the call is observed.
    pub fn active_span(&self) -> Option<&Arc<dyn Span>> {
        self.span.as_ref()
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("observed", &self.span.is_some())
            .finish()
    }
}
