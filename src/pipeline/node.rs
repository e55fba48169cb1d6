//! The multicast enqueue node.
//!
//! One node handles any number of messages; each message goes through
//! resolve → normalize → build → send → report, and comes back out exactly
//! once with its outcome attached.

use crate::backend::{AuthMetadata, ConnectionProvider, MulticastQueue};
use crate::config::NodeConfig;
use crate::error::{MulticastError, Result};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::payload::normalize;
use crate::pipeline::request::QueueRequest;
use crate::pipeline::resolver::resolve;
use crate::pipeline::status::{FailureKind, PipelineStatus, StatusReporter, StatusSurface};
use crate::types::{Delivery, Message, Outcome};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

/// A configured multicast node bound to one server connection
pub struct MulticastNode {
    config: NodeConfig,
    endpoint: String,
    queue: Arc<dyn MulticastQueue>,
    auth: AuthMetadata,
    status: Arc<StatusReporter>,
}

impl MulticastNode {
    /// Create a node. Without a connection provider the node refuses to start;
    /// the error is logged once and nothing is published to the surface.
    pub fn new(
        config: NodeConfig,
        provider: Option<&ConnectionProvider>,
        surface: Arc<dyn StatusSurface>,
    ) -> Result<Self> {
        let provider = provider.ok_or_else(|| {
            let err = MulticastError::Config("server configuration is missing".to_string());
            error!("Cannot create multicast node: {}", err);
            err
        })?;

        let status = StatusReporter::new(surface, config.status_reset_delay());
        info!(
            "Multicast node ready (server {}, group {:?}, fPort {:?})",
            provider.endpoint(),
            config.multicast_group_id,
            config.f_port
        );

        Ok(Self {
            config,
            endpoint: provider.endpoint().to_string(),
            queue: provider.queue(),
            auth: provider.auth().clone(),
            status,
        })
    }

    pub fn status(&self) -> PipelineStatus {
        self.status.current()
    }

    /// Handle one message and return it with its outcome attached.
    ///
    /// Never fails: every error ends up on the returned message.
    pub async fn on_input(&self, mut msg: Message) -> Message {
        let outcome = match self.process(&msg).await {
            Ok(delivery) => Outcome::Success(delivery),
            Err(err) => {
                error!("Multicast enqueue failed: {}", err);
                self.status
                    .set(PipelineStatus::Failed(FailureKind::from(&err)));
                Outcome::Failure(err.to_error_info())
            }
        };
        msg.attach_outcome(&outcome);
        msg
    }

    async fn process(&self, msg: &Message) -> PipelineResult<Delivery> {
        let params = resolve(&self.config, msg)?;
        let data = normalize(&msg.payload)?;

        if self.config.debug {
            info!(
                group_id = %params.multicast_group_id,
                f_port = params.f_port,
                encoding = %data.encoding(),
                hex = %data.to_hex(),
                base64 = %data.to_base64(),
                "Multicast downlink"
            );
        } else {
            debug!(
                "Enqueueing {} byte(s) ({}) for group {} on fPort {}",
                data.len(),
                data.encoding(),
                params.multicast_group_id,
                params.f_port
            );
        }

        let request = QueueRequest::from_params(params, data);
        let multicast_group_id = request.multicast_group_id().to_string();
        let f_port = request.f_port();

        self.status.set(PipelineStatus::Sending);
        let response = self
            .queue
            .enqueue(request, &self.auth)
            .await
            .map_err(PipelineError::from)?;

        self.status
            .set(PipelineStatus::Succeeded { f_cnt: response.f_cnt });
        self.status.schedule_reset();
        debug!(
            "Enqueued for group {} with fCnt {}",
            multicast_group_id, response.f_cnt
        );

        Ok(Delivery {
            f_cnt: response.f_cnt,
            multicast_group_id,
            f_port,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    /// Tear the node down, releasing its channel handle.
    pub fn close(self) {
        info!("Closing multicast node for {}", self.endpoint);
        drop(self.queue);
    }
}

impl std::fmt::Debug for MulticastNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MulticastNode")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .field("status", &self.status)
            .finish()
    }
}
