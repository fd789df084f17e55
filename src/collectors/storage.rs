//! Storage collector: per-filesystem capacity via sysinfo's disk list.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sysinfo::Disks;

use crate::Domain;
use crate::keys::sanitize_resource;

use super::{Collector, CollectorCycle, fmt2};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub struct StorageCollector {
    disks: Disks,
}

impl StorageCollector {
    pub fn new() -> Self {
        Self {
            disks: Disks::new(),
        }
    }
}

impl Default for StorageCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for StorageCollector {
    fn name(&self) -> &'static str {
        "storage"
    }

    async fn collect(&mut self) -> Result<CollectorCycle> {
        self.disks.refresh(true);

        let mut cycle = CollectorCycle::default();

        for disk in self.disks.list() {
            let mount = disk.mount_point().to_string_lossy().to_string();

            // Pseudo-filesystems and overlay mounts carry no capacity signal
            if !mount.starts_with('/') || disk.total_space() == 0 {
                continue;
            }

            let total = disk.total_space() as f64;
            let available = disk.available_space() as f64;
            let used = total - available;
            let usage = used / total * 100.0;

            let resource = sanitize_resource(&mount);

            cycle.snapshot(
                Domain::Storage,
                &resource,
                HashMap::from([
                    ("mount".to_string(), mount),
                    (
                        "filesystem".to_string(),
                        disk.file_system().to_string_lossy().to_string(),
                    ),
                    ("total_gb".to_string(), fmt2(total / BYTES_PER_GB)),
                    ("used_gb".to_string(), fmt2(used / BYTES_PER_GB)),
                    ("free_gb".to_string(), fmt2(available / BYTES_PER_GB)),
                    ("usage_percent".to_string(), fmt2(usage)),
                ]),
            );
            cycle.point(Domain::Storage, &resource, None, usage);
        }

        Ok(cycle)
    }
}
