//! HTTP gateway to the remote Deployments API

pub mod client;
pub mod deployments;
