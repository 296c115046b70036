//! 远端引擎客户端（HTTP + JSON）。

pub mod error;
pub mod remote;
pub mod transport;

pub use error::ClientError;
pub use remote::{
    ActionKind,
    ActionOutcome,
    AutoMoveOutcome,
    MoveRequest,
    RemoteClient,
    TargetType,
};
pub use transport::{ApiRequest, Method, Transport};
