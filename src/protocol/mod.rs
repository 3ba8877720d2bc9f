//! Control protocol: ioctl encoding and the JSON-RPC control messages

pub mod ioctl;
pub mod jsonrpc;
pub mod notification;
pub mod request;
pub mod response;

pub use {
    ioctl::{ConfigRequest, IoctlCommand, RequestType, SIOCGA80211, SIOCSA80211},
    jsonrpc::{
        ErrorCode, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
        Version,
    },
    notification::{InterfaceDetachedParams, Notification, PowerStateChangedParams},
    request::{
        AttachVirtualParams, DetachVirtualParams, IoctlParams, Request, SetDebugFlagsParams,
        SetPowerStateParams,
    },
    response::{AckResponse, AttachResponse, InterfacesResponse, IoctlResponse, Response},
};
