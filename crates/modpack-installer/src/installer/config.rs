//! Configuration for install runs

use std::time::Duration;

/// Configuration for the install engine
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub max_retries: usize,
    pub timeout: Duration,
    pub user_agent: String,
    /// Initial delay between retries (doubles each retry)
    pub retry_delay: Duration,
    /// Maximum retry delay cap (prevents exponential backoff from getting too long)
    pub max_retry_delay: Duration,
    /// Attempt cap when generating a free backup directory name
    pub backup_name_attempts: usize,
}

impl InstallConfig {
    /// Calculate retry delay for the given attempt using exponential backoff
    pub fn get_retry_delay(&self, attempt: usize) -> Duration {
        let delay = self.retry_delay.as_millis() as u64 * 2_u64.pow(attempt.min(16) as u32);
        Duration::from_millis(delay.min(self.max_retry_delay.as_millis() as u64))
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(30),
            user_agent: "modpack-installer/0.1.0".to_string(),
            retry_delay: Duration::from_millis(1000),
            max_retry_delay: Duration::from_secs(60),
            backup_name_attempts: 16,
        }
    }
}
