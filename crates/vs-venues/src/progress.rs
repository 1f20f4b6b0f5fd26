/// Snapshot of an in-flight request, handed to the progress callback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Body bytes received so far.
    pub received: u64,
    /// Expected body size, when the server announced one.
    pub total: Option<u64>,
}

/// Decision returned by the progress callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Next {
    Continue,
    Abort,
}
