use serde::Serialize;

use crate::request::Request;

/// Generator wakes up to produce the next arrival of the aggregate stream.
#[derive(Clone, Serialize)]
pub struct NextArrivalEvent {}

/// Externally scheduled arrival for a given function.
#[derive(Clone, Serialize)]
pub struct ScriptedArrivalEvent {
    pub func_id: usize,
}

#[derive(Clone, Serialize)]
pub struct RequestArrivalEvent {
    pub request: Request,
}

#[derive(Clone, Serialize)]
pub struct ColdStartEndEvent {
    pub request: Request,
}

#[derive(Clone, Serialize)]
pub struct ServiceEndEvent {
    pub request: Request,
}

#[derive(Clone, Serialize)]
pub struct CollectMetricsEvent {}
