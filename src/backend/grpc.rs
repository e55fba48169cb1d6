//! gRPC implementation of [`MulticastQueue`]

use crate::backend::client_trait::{
    AuthMetadata, EnqueueResponse, MulticastQueue, RemoteError, AUTHORIZATION_HEADER,
};
use crate::backend::proto::MulticastGroupServiceClient;
use crate::config::ServerConfig;
use crate::error::{Result, ResultExt};
use crate::pipeline::QueueRequest;
use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};

/// Enqueue client over a plaintext HTTP/2 channel
///
/// Cloning is cheap and shares the underlying connection.
#[derive(Debug, Clone)]
pub struct GrpcQueueClient {
    endpoint: String,
    client: MulticastGroupServiceClient,
}

impl GrpcQueueClient {
    /// Set up a channel to the configured server
    ///
    /// The connection is established on first use, so this never blocks.
    /// Must be called from within a tokio runtime.
    pub fn connect_lazy(server: &ServerConfig) -> Result<Self> {
        let uri = server.endpoint_uri();
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(crate::error::MulticastError::from)
            .with_context(|| format!("Invalid server address {:?}", server.server))?;
        info!("Created gRPC channel to {}", uri);
        Ok(Self::from_channel(uri, endpoint.connect_lazy()))
    }

    /// Endpoint URI the channel was created for
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Wrap an existing channel
    pub fn from_channel(endpoint: impl Into<String>, channel: Channel) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: MulticastGroupServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl MulticastQueue for GrpcQueueClient {
    async fn enqueue(
        &self,
        request: QueueRequest,
        auth: &AuthMetadata,
    ) -> std::result::Result<EnqueueResponse, RemoteError> {
        let mut req = tonic::Request::new(request.into_proto());
        req.metadata_mut()
            .insert(AUTHORIZATION_HEADER, auth.value().clone());

        debug!("Calling {} on {}", crate::backend::proto::ENQUEUE_PATH, self.endpoint);
        let mut client = self.client.clone();
        let response = client.enqueue(req).await?;
        Ok(EnqueueResponse {
            f_cnt: response.into_inner().f_cnt,
        })
    }
}
