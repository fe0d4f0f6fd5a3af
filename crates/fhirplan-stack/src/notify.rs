//! Notification router — chat-ops routing for alarm transitions.
//!
//! When a chat-ops topic is configured, every alarm in the graph gets the
//! topic attached on both the alarm and the recovery transition. Without
//! one, alarms stay state-only: intentional graceful degradation, not an
//! omission.

use tracing::{debug, info};

use fhirplan_core::EnvConfig;
use fhirplan_graph::PlanGraph;

/// A generic alarm-action sink wrapping the chat-ops topic reference.
#[derive(Debug, Clone)]
pub struct AlarmSink {
    topic: String,
}

impl AlarmSink {
    pub fn new(topic: &str) -> Self {
        Self { topic: topic.to_string() }
    }

    /// Attach this sink to both transitions of every alarm in the graph.
    /// Returns the number of alarms wired.
    pub fn attach(&self, graph: &mut PlanGraph) -> usize {
        let mut wired = 0;
        for (id, alarm) in graph.alarms_mut() {
            alarm.alarm_actions.push(self.topic.clone());
            alarm.ok_actions.push(self.topic.clone());
            debug!(alarm = id, topic = %self.topic, "alarm routed to chat-ops");
            wired += 1;
        }
        wired
    }
}

/// Wire the configured chat-ops target, if any. Returns how many alarms
/// were routed (zero when no target is configured).
pub fn wire(graph: &mut PlanGraph, config: &EnvConfig) -> usize {
    match config.chat_ops_topic() {
        Some(topic) => {
            let wired = AlarmSink::new(topic).attach(graph);
            info!(topic, alarms = wired, "alarm notifications routed");
            wired
        }
        None => {
            debug!("no chat-ops topic configured; alarms stay state-only");
            0
        }
    }
}
