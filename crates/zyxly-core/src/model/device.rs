// ── Device descriptor ──
//
// Identity and version record for the router, derived from the
// `DeviceInfo` object of the device-status query.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::lookup::{LookupError, PathSegment, lookup};

const DEVICE_INFO: &str = "DeviceInfo";

/// Who the router is and what it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Display name (the router's own description, or its model).
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub firmware_version: String,
    pub hardware_version: Option<String>,
    pub serial_number: Option<String>,
    pub product_class: Option<String>,
    /// Web UI address, `{scheme}://{host}`.
    pub configuration_url: String,
}

impl DeviceDescriptor {
    /// Extract the descriptor from a device-status object.
    ///
    /// Model, manufacturer and firmware version are required; the rest
    /// is filled in when present.
    pub fn from_device_status(status: &Value, router: &Url) -> Result<Self, LookupError> {
        let info = lookup(status, &[PathSegment::from(DEVICE_INFO)])?;
        let required = |key: &str| -> Result<String, LookupError> {
            lookup(info, &[PathSegment::from(key)]).map(text)
        };
        let optional = |key: &str| -> Option<String> {
            lookup(info, &[PathSegment::from(key)])
                .ok()
                .map(text)
                .filter(|s| !s.is_empty())
        };

        let model = required("ModelName")?;
        let name = optional("Description").unwrap_or_else(|| model.clone());

        Ok(Self {
            name,
            manufacturer: required("Manufacturer")?,
            firmware_version: required("SoftwareVersion")?,
            hardware_version: optional("HardwareVersion"),
            serial_number: optional("SerialNumber"),
            product_class: optional("ProductClass"),
            configuration_url: configuration_url(router),
            model,
        })
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_owned(),
        other => other.to_string(),
    }
}

fn configuration_url(router: &Url) -> String {
    match router.host_str() {
        Some(host) => format!("{}://{host}", router.scheme()),
        None => router.as_str().trim_end_matches('/').to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn router() -> Url {
        "https://192.168.1.1/".parse().unwrap()
    }

    #[test]
    fn extracts_full_descriptor() {
        let status = json!({
            "DeviceInfo": {
                "ModelName": "NR7101",
                "Manufacturer": "Zyxel",
                "Description": "Odido 5G Router",
                "SoftwareVersion": "V1.00(ABUV.7)C0",
                "HardwareVersion": "1.00",
                "ProductClass": "5G NR Outdoor Router",
                "SerialNumber": "S212Y12345678",
                "UpTime": 86400
            }
        });
        let d = DeviceDescriptor::from_device_status(&status, &router()).unwrap();
        assert_eq!(
            d,
            DeviceDescriptor {
                name: "Odido 5G Router".into(),
                model: "NR7101".into(),
                manufacturer: "Zyxel".into(),
                firmware_version: "V1.00(ABUV.7)C0".into(),
                hardware_version: Some("1.00".into()),
                serial_number: Some("S212Y12345678".into()),
                product_class: Some("5G NR Outdoor Router".into()),
                configuration_url: "https://192.168.1.1".into(),
            }
        );
    }

    #[test]
    fn name_falls_back_to_model() {
        let status = json!({
            "DeviceInfo": {
                "ModelName": "NR5103E",
                "Manufacturer": "Zyxel",
                "SoftwareVersion": "1.0",
                "Description": ""
            }
        });
        let d = DeviceDescriptor::from_device_status(&status, &router()).unwrap();
        assert_eq!(d.name, "NR5103E");
        assert_eq!(d.serial_number, None);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let status = json!({ "DeviceInfo": { "ModelName": "NR7101" } });
        let err = DeviceDescriptor::from_device_status(&status, &router()).unwrap_err();
        assert!(err.to_string().contains("Manufacturer"), "got: {err}");

        let err = DeviceDescriptor::from_device_status(&json!({}), &router()).unwrap_err();
        assert!(err.to_string().contains("DeviceInfo"), "got: {err}");
    }
}
