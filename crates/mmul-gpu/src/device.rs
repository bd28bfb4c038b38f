//! GPU device and queue initialization via wgpu.

use crate::GpuError;
use std::fmt;

/// Human-readable description of the adapter a device runs on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterSummary {
    pub name: String,
    pub backend: String,
    pub device_type: String,
    pub driver: String,
}

impl fmt::Display for AdapterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.backend, self.device_type)?;
        if !self.driver.is_empty() {
            write!(f, " [{}]", self.driver)?;
        }
        Ok(())
    }
}

impl From<&wgpu::AdapterInfo> for AdapterSummary {
    fn from(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: format!("{:?}", info.backend),
            device_type: format!("{:?}", info.device_type),
            driver: info.driver.clone(),
        }
    }
}

/// GPU device wrapping wgpu `Device` and `Queue`.
pub struct GpuDevice {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    info: AdapterSummary,
}

impl GpuDevice {
    /// Create a new GPU device on the high-performance adapter.
    ///
    /// Storage-binding and buffer-size limits are raised to whatever the
    /// adapter supports so large matrices fit in one binding.
    pub async fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = AdapterSummary::from(&adapter.get_info());
        let supported = adapter.limits();
        let required_limits = wgpu::Limits {
            max_storage_buffer_binding_size: supported.max_storage_buffer_binding_size,
            max_buffer_size: supported.max_buffer_size,
            ..wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("mmul-gpu"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        tracing::info!(adapter = %info, "GPU device ready");
        Ok(Self { device, queue, info })
    }

    /// Create a GPU device synchronously (blocks on async).
    pub fn new_sync() -> Result<Self, GpuError> {
        pollster::block_on(Self::new())
    }

    /// Adapter this device was created on.
    pub fn info(&self) -> &AdapterSummary {
        &self.info
    }

    /// Largest buffer, in bytes, that can be bound as one storage binding.
    pub fn max_binding_bytes(&self) -> u64 {
        let limits = self.device.limits();
        u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size)
    }

    /// Block until all submitted work has completed.
    pub fn wait(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }

    /// Device for unit tests; `None` (with a note on stderr) on hosts
    /// without an adapter.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Option<Self> {
        match Self::new_sync() {
            Ok(device) => Some(device),
            Err(e) => {
                eprintln!("skipping GPU test: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_display() {
        let s = AdapterSummary {
            name: "Test GPU".into(),
            backend: "Vulkan".into(),
            device_type: "DiscreteGpu".into(),
            driver: String::new(),
        };
        assert_eq!(s.to_string(), "Test GPU (Vulkan, DiscreteGpu)");
        let s = AdapterSummary { driver: "mesa".into(), ..s };
        assert_eq!(s.to_string(), "Test GPU (Vulkan, DiscreteGpu) [mesa]");
    }

    #[test]
    fn device_reports_limits() {
        let Some(device) = GpuDevice::for_tests() else {
            return;
        };
        assert!(device.max_binding_bytes() >= 1 << 20);
        assert!(!device.info().backend.is_empty());
    }
}
