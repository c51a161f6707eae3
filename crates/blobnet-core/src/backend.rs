use burn::backend::ndarray::NdArrayDevice;

/// CPU tensor backend used by default and in tests.
pub type CpuBackend = burn::backend::NdArray;

pub fn init_cpu_device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}

#[cfg(feature = "gpu")]
pub type WgpuBackend = burn::backend::Wgpu;

#[cfg(feature = "gpu")]
pub fn init_gpu_device() -> burn::backend::wgpu::WgpuDevice {
    // Burn picks the platform default adapter (Metal on macOS)
    burn::backend::wgpu::WgpuDevice::default()
}
