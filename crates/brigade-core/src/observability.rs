use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryCounts {
    pub active_workers: usize,
    pub capabilities: usize,
}
