//! Audio device discovery.

use cpal::traits::{DeviceTrait, HostTrait};

use crate::error::DeviceError;

/// Names of the available input devices.
pub fn input_device_names() -> Result<Vec<String>, DeviceError> {
    let host = cpal::default_host();
    // Collecting first sidesteps CoreAudio iterator crashes on macOS.
    let devices: Vec<_> = host.input_devices()?.collect();
    let mut names = Vec::with_capacity(devices.len());
    for device in devices {
        names.push(device.name()?);
    }
    Ok(names)
}

/// Names of the available output devices.
pub fn output_device_names() -> Result<Vec<String>, DeviceError> {
    let host = cpal::default_host();
    let devices: Vec<_> = host.output_devices()?.collect();
    let mut names = Vec::with_capacity(devices.len());
    for device in devices {
        names.push(device.name()?);
    }
    Ok(names)
}

/// Find an input or output device by name, case-insensitively.
pub(crate) fn find_device(
    host: &cpal::Host,
    name: &str,
    is_input: bool,
) -> Result<cpal::Device, DeviceError> {
    let devices: Vec<_> = if is_input {
        host.input_devices()?.collect()
    } else {
        host.output_devices()?.collect()
    };

    let target = name.to_lowercase();
    for device in devices {
        if let Ok(device_name) = device.name()
            && device_name.to_lowercase() == target
        {
            return Ok(device);
        }
    }

    Err(DeviceError::DeviceNotFound(name.to_string()))
}
