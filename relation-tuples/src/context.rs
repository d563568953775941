use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-request context passed unchanged to every storage fetch
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            cancellation,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
