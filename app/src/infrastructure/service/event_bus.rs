use domain::{model::vo::JobEvent, service::JobEventPublisher};

/// Hands job events over to the dispatcher running in the background.
pub struct FlumeEventBus {
    sender: flume::Sender<JobEvent>,
}

impl FlumeEventBus {
    pub fn new() -> (Self, flume::Receiver<JobEvent>) {
        let (sender, receiver) = flume::unbounded();
        (Self { sender }, receiver)
    }
}

impl JobEventPublisher for FlumeEventBus {
    fn publish(&self, event: JobEvent) {
        let job_id = event.job_id().to_owned();
        if self.sender.send(event).is_err() {
            tracing::warn!(job_id = %job_id, "Job event dropped, no one is listening");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_delivered_in_order() {
        let (bus, receiver) = FlumeEventBus::new();

        bus.publish(JobEvent::Scheduled {
            job_id: "j1".to_owned(),
            memory: 512,
        });
        bus.publish(JobEvent::Scheduled {
            job_id: "j2".to_owned(),
            memory: 256,
        });

        assert_eq!(receiver.try_recv().unwrap().job_id(), "j1");
        assert_eq!(receiver.try_recv().unwrap().job_id(), "j2");
    }

    #[test]
    fn publishing_without_receiver_does_not_panic() {
        let (bus, receiver) = FlumeEventBus::new();
        drop(receiver);
        bus.publish(JobEvent::Scheduled {
            job_id: "j1".to_owned(),
            memory: 512,
        });
    }
}
