//! Registry configuration

use crate::protocol::constants::DEFAULT_QUEUE_CAPACITY;

/// Configuration for the subscriber registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Capacity of each subscriber's delivery queue
    pub queue_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Set the per-subscriber queue capacity (at least 1)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(RegistryConfig::default().queue_capacity, 100);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        assert_eq!(RegistryConfig::default().queue_capacity(0).queue_capacity, 1);
    }
}
