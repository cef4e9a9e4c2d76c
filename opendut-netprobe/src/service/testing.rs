use std::fmt;
use std::sync::{Arc, Mutex};

use opendut_types::util::net::NetworkInterfaceName;
use rand::Rng;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::service::network_interface::manager::{NetworkInterfaceManager, NetworkInterfaceManagerRef};

pub trait NetworkInterfaceNameExt {
    fn with_random_suffix(base: &str) -> Self;
}

impl NetworkInterfaceNameExt for NetworkInterfaceName {
    fn with_random_suffix(base: &str) -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(7)
            .map(char::from)
            .collect();
        NetworkInterfaceName::try_from(format!("{}-{}", base, suffix))
            .expect("Should be valid network interface")
    }
}

pub struct Fixture {
    pub network_interface_manager: NetworkInterfaceManagerRef,
}

impl Fixture {
    /// Must be called from within a tokio runtime, which drives the netlink connection.
    pub fn create() -> Self {
        let manager = NetworkInterfaceManager::create().expect("Could not get rtnetlink handle.");
        let network_interface_manager = Arc::new(manager);

        Self {
            network_interface_manager,
        }
    }
}

/// Captures level and message of every event emitted while [`RecordingLayer::record`] runs.
#[derive(Clone, Default)]
pub struct RecordingLayer {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl RecordingLayer {
    pub fn record(&self, f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f);
    }

    pub fn events(&self) -> Vec<(Level, String)> {
        self.events.lock().unwrap().clone()
    }
}

impl<S: Subscriber> Layer<S> for RecordingLayer {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        let mut message = MessageVisitor::default();
        event.record(&mut message);
        self.events.lock().unwrap()
            .push((*event.metadata().level(), message.0));
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
