use serde::Serialize;

/// Lifecycle stage of a request.
///
/// `RejectedAlreadyRunning`, `RejectedMemoryFull` and `Completed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RequestStatus {
    Arrived,
    RejectedAlreadyRunning,
    RejectedMemoryFull,
    ColdStart,
    Executing,
    Completed,
}

/// A single invocation request, alive from arrival until rejection or completion.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Request {
    pub id: u64,
    pub func_id: usize,
    pub arrival_time: f64,
}
