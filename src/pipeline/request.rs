//! Enqueue request assembly.

use crate::backend::proto::{EnqueueMulticastGroupQueueItemRequest, MulticastGroupQueueItem};
use crate::pipeline::payload::NormalizedPayload;
use crate::pipeline::resolver::ResolvedParams;

/// One downlink to enqueue. Built once per message and consumed by the send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRequest {
    multicast_group_id: String,
    f_port: u32,
    data: NormalizedPayload,
}

impl QueueRequest {
    pub fn new(multicast_group_id: impl Into<String>, f_port: u32, data: NormalizedPayload) -> Self {
        Self {
            multicast_group_id: multicast_group_id.into(),
            f_port,
            data,
        }
    }

    pub fn from_params(params: ResolvedParams, data: NormalizedPayload) -> Self {
        Self::new(params.multicast_group_id, params.f_port, data)
    }

    pub fn multicast_group_id(&self) -> &str {
        &self.multicast_group_id
    }

    pub fn f_port(&self) -> u32 {
        self.f_port
    }

    pub fn data(&self) -> &NormalizedPayload {
        &self.data
    }

    /// Wire message. The frame counter is left for the server to assign.
    pub fn into_proto(self) -> EnqueueMulticastGroupQueueItemRequest {
        EnqueueMulticastGroupQueueItemRequest {
            queue_item: Some(MulticastGroupQueueItem {
                multicast_group_id: self.multicast_group_id,
                f_cnt: 0,
                f_port: self.f_port,
                data: self.data.into_bytes(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::payload::normalize;
    use crate::types::Payload;

    #[test]
    fn test_into_proto() {
        let data = normalize(&Payload::Binary(vec![9, 8, 7])).unwrap();
        let req = QueueRequest::new("grp", 15, data);
        assert_eq!(req.multicast_group_id(), "grp");
        assert_eq!(req.data().len(), 3);

        let item = req.into_proto().queue_item.unwrap();
        assert_eq!(item.multicast_group_id, "grp");
        assert_eq!(item.f_port, 15);
        assert_eq!(item.f_cnt, 0);
        assert_eq!(item.data, vec![9, 8, 7]);
    }

    #[test]
    fn test_from_params() {
        let data = normalize(&Payload::from("ff")).unwrap();
        let params = ResolvedParams {
            multicast_group_id: "g".into(),
            f_port: 4,
        };
        let req = QueueRequest::from_params(params, data);
        assert_eq!(req.f_port(), 4);
        assert_eq!(req.data().as_bytes(), &[0xff]);
    }
}
