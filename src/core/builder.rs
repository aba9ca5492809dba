use std::sync::Arc;

use crate::{core::Config, core::table::Table, error::ConfigError, subscribers::Subscribe};

/// Builder for constructing a [`Table`].
pub struct TableBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl TableBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive table events (state changes, busy forks, termination)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates the configuration and sets the table:
    /// - fork ring with the food supply
    /// - one seat (state + pause switch) per philosopher
    /// - event bus
    ///
    /// Subscriber workers are spawned by [`Table::run`], so building needs no runtime.
    pub fn build(self) -> Result<Arc<Table>, ConfigError> {
        Table::new_internal(self.cfg, self.subscribers).map(Arc::new)
    }
}
