//! Router identity.

use zyxly_core::{Coordinator, DeviceDescriptor, RouterConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(d: &DeviceDescriptor) -> String {
    let or_dash = |v: Option<&str>| v.unwrap_or("-").to_owned();
    output::render_detail(&[
        ("Name", d.name.clone()),
        ("Model", d.model.clone()),
        ("Manufacturer", d.manufacturer.clone()),
        ("Firmware", d.firmware_version.clone()),
        ("Hardware", or_dash(d.hardware_version.as_deref())),
        ("Serial", or_dash(d.serial_number.as_deref())),
        ("Product class", or_dash(d.product_class.as_deref())),
        ("Web UI", d.configuration_url.clone()),
    ])
}

pub async fn handle(config: RouterConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let device = Coordinator::oneshot(config, |c| async move { Ok(c.device()) }).await?;

    let device = device.ok_or_else(|| CliError::InvalidResponse {
        message: "router did not report its device information".into(),
    })?;

    let out = output::render_single(&global.output, device.as_ref(), detail, |d| {
        d.serial_number.clone().unwrap_or_else(|| d.model.clone())
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
