// ============================================================
// Layer 5 — Compute Device Selection
// ============================================================
// The device is chosen once at startup from the `device`
// configuration key and then passed explicitly to everything
// that creates tensors.
//
//   (absent) / "auto"        → WgpuDevice::DefaultDevice
//   "cpu"                    → WgpuDevice::Cpu
//   "gpu" / "cuda"           → first discrete GPU
//   "gpu:N" / "cuda:N"       → discrete GPU N
//   "integrated[:N]"         → integrated GPU N (default 0)
//   "virtual[:N]"            → virtual GPU N (default 0)
//
// Reference: Burn Book §2 (Backends)

use std::str::FromStr;

use burn::backend::wgpu::WgpuDevice;

use crate::domain::error::TrainError;

/// Parsed `device` setting, independent of any backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceSpec {
    #[default]
    Auto,
    Cpu,
    Discrete(usize),
    Integrated(usize),
    Virtual(usize),
}

impl FromStr for DeviceSpec {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrainError::InvalidDevice(s.to_string());
        let lower   = s.trim().to_ascii_lowercase();

        let (kind, index) = match lower.split_once(':') {
            Some((kind, idx)) => (kind, Some(idx.parse::<usize>().map_err(|_| invalid())?)),
            None              => (lower.as_str(), None),
        };

        match (kind, index) {
            ("auto", None) | ("", None) => Ok(DeviceSpec::Auto),
            ("cpu", None)               => Ok(DeviceSpec::Cpu),
            ("gpu" | "cuda", i)         => Ok(DeviceSpec::Discrete(i.unwrap_or(0))),
            ("integrated", i)           => Ok(DeviceSpec::Integrated(i.unwrap_or(0))),
            ("virtual", i)              => Ok(DeviceSpec::Virtual(i.unwrap_or(0))),
            _                           => Err(invalid()),
        }
    }
}

impl DeviceSpec {
    /// Resolve an optional config value; absence means automatic probing
    pub fn from_setting(setting: Option<&str>) -> Result<Self, TrainError> {
        setting.map_or(Ok(DeviceSpec::Auto), str::parse)
    }

    pub fn to_wgpu(self) -> WgpuDevice {
        match self {
            DeviceSpec::Auto          => WgpuDevice::DefaultDevice,
            DeviceSpec::Cpu           => WgpuDevice::Cpu,
            DeviceSpec::Discrete(i)   => WgpuDevice::DiscreteGpu(i),
            DeviceSpec::Integrated(i) => WgpuDevice::IntegratedGpu(i),
            DeviceSpec::Virtual(i)    => WgpuDevice::VirtualGpu(i),
        }
    }
}
