//! ChirpStack v4 `api.MulticastGroupService` messages and client
//!
//! Only the enqueue call is covered. Field numbers follow
//! `api/multicast_group.proto`.

use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;

/// Fully qualified service name
pub const SERVICE_NAME: &str = "api.MulticastGroupService";

/// Path of the enqueue method
pub const ENQUEUE_PATH: &str = "/api.MulticastGroupService/Enqueue";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MulticastGroupQueueItem {
    /// Multicast group ID (UUID string)
    #[prost(string, tag = "1")]
    pub multicast_group_id: ::prost::alloc::string::String,
    /// Downlink frame-counter; set by the server on enqueue
    #[prost(uint32, tag = "2")]
    pub f_cnt: u32,
    /// FPort (must be > 0)
    #[prost(uint32, tag = "3")]
    pub f_port: u32,
    /// Base64 encoded data in JSON, raw bytes on the wire
    #[prost(bytes = "vec", tag = "4")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnqueueMulticastGroupQueueItemRequest {
    #[prost(message, optional, tag = "1")]
    pub queue_item: ::core::option::Option<MulticastGroupQueueItem>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct EnqueueMulticastGroupQueueItemResponse {
    /// Frame counter assigned to the queued item
    #[prost(uint32, tag = "1")]
    pub f_cnt: u32,
}

/// Unary client for `api.MulticastGroupService`
#[derive(Debug, Clone)]
pub struct MulticastGroupServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl MulticastGroupServiceClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    /// Enqueue a downlink for a multicast group
    pub async fn enqueue(
        &mut self,
        request: tonic::Request<EnqueueMulticastGroupQueueItemRequest>,
    ) -> Result<tonic::Response<EnqueueMulticastGroupQueueItemResponse>, tonic::Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {}", e)))?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static(ENQUEUE_PATH);
        let mut req = request;
        req.extensions_mut()
            .insert(tonic::GrpcMethod::new(SERVICE_NAME, "Enqueue"));
        self.inner.unary(req, path, codec).await
    }
}
