use std::sync::{Arc, Mutex};

use cronner::emit::{Event, MetricsEmitter, NotificationEmitter};
use cronner::errors::Result;

/// One thing an emitter was asked to send, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Event(Event),
    Timing {
        name: String,
        value: f64,
        tags: Vec<String>,
    },
    Gauge {
        name: String,
        value: f64,
        tags: Vec<String>,
    },
}

/// Emitter that records every call instead of sending anything.
///
/// Implements both emitter traits so event/metric ordering can be checked
/// against one timeline.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitter {
    log: Arc<Mutex<Vec<Emission>>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> Vec<Emission> {
        self.log.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.emissions()
            .into_iter()
            .filter_map(|e| match e {
                Emission::Event(ev) => Some(ev),
                _ => None,
            })
            .collect()
    }

    /// Value of the single timing metric named `name`.
    pub fn timing(&self, name: &str) -> Option<f64> {
        self.emissions().into_iter().find_map(|e| match e {
            Emission::Timing { name: n, value, .. } if n == name => Some(value),
            _ => None,
        })
    }

    /// Value of the single gauge named `name`.
    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.emissions().into_iter().find_map(|e| match e {
            Emission::Gauge { name: n, value, .. } if n == name => Some(value),
            _ => None,
        })
    }

    pub fn metric_count(&self) -> usize {
        self.emissions()
            .iter()
            .filter(|e| !matches!(e, Emission::Event(_)))
            .count()
    }

    fn push(&self, e: Emission) {
        self.log.lock().unwrap().push(e);
    }
}

impl NotificationEmitter for RecordingEmitter {
    fn event(&self, event: &Event) -> Result<()> {
        self.push(Emission::Event(event.clone()));
        Ok(())
    }
}

impl MetricsEmitter for RecordingEmitter {
    fn timing(&self, name: &str, value_ms: f64, tags: &[String]) -> Result<()> {
        self.push(Emission::Timing {
            name: name.to_string(),
            value: value_ms,
            tags: tags.to_vec(),
        });
        Ok(())
    }

    fn gauge(&self, name: &str, value: f64, tags: &[String]) -> Result<()> {
        self.push(Emission::Gauge {
            name: name.to_string(),
            value,
            tags: tags.to_vec(),
        });
        Ok(())
    }
}
