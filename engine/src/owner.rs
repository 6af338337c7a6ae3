//! Owner identity derived from device metadata.
//!
//! The owner id partitions records by the device that created them. It is
//! derived from the same metadata every time, so it is stable for a device.
//!
//! Segments are joined with `|` in a fixed order. Backslashes and pipes inside
//! a segment are escaped, so values cannot bleed into a neighbouring segment.
//! Values are trimmed first: a missing field, an empty one and a blank one
//! all derive the same empty segment.

use crate::{Error, OwnerId, Result};
use serde::{Deserialize, Serialize};

const SEPARATOR: char = '|';
const ESCAPE: char = '\\';

/// Device metadata supplied by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetadata {
    pub device_name: Option<String>,
    pub year_class: Option<u32>,
    pub os_name: Option<String>,
    pub os_build_id: Option<String>,
}

impl DeviceMetadata {
    fn segments(&self) -> [Option<String>; 4] {
        [
            self.device_name.clone(),
            self.year_class.map(|y| y.to_string()),
            self.os_name.clone(),
            self.os_build_id.clone(),
        ]
    }
}

/// Derive the owner id for a device.
///
/// Fails with [`Error::InvalidArgument`] when no field carries a value.
pub fn derive_owner_id(metadata: &DeviceMetadata) -> Result<OwnerId> {
    let segments = metadata.segments().map(|s| {
        s.map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    });

    if segments.iter().all(Option::is_none) {
        return Err(Error::InvalidArgument(
            "device metadata has no identifying fields".into(),
        ));
    }

    let mut owner = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            owner.push(SEPARATOR);
        }
        if let Some(value) = segment {
            escape_into(&mut owner, value);
        }
    }
    Ok(owner)
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        if c == SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> DeviceMetadata {
        DeviceMetadata {
            device_name: Some("Pixel 7".into()),
            year_class: Some(2022),
            os_name: Some("Android".into()),
            os_build_id: Some("TQ3A.230805".into()),
        }
    }

    #[test]
    fn derives_stable_id() {
        let first = derive_owner_id(&pixel()).unwrap();
        let second = derive_owner_id(&pixel()).unwrap();

        assert_eq!(first, "Pixel 7|2022|Android|TQ3A.230805");
        assert_eq!(first, second);
    }

    #[test]
    fn missing_fields_keep_their_slot() {
        let metadata = DeviceMetadata {
            device_name: Some("iPad".into()),
            os_build_id: Some("21A".into()),
            ..Default::default()
        };

        assert_eq!(derive_owner_id(&metadata).unwrap(), "iPad|||21A");
    }

    #[test]
    fn shifted_segments_do_not_collide() {
        let a = DeviceMetadata {
            device_name: Some("ab".into()),
            os_name: Some("c".into()),
            ..Default::default()
        };
        let b = DeviceMetadata {
            device_name: Some("a".into()),
            os_name: Some("bc".into()),
            ..Default::default()
        };
        let c = DeviceMetadata {
            device_name: Some("x|".into()),
            ..Default::default()
        };
        let d = DeviceMetadata {
            device_name: Some("x".into()),
            year_class: None,
            os_name: Some("".into()),
            os_build_id: None,
        };

        assert_ne!(derive_owner_id(&a).unwrap(), derive_owner_id(&b).unwrap());
        assert_ne!(derive_owner_id(&c).unwrap(), derive_owner_id(&d).unwrap());
        assert_eq!(derive_owner_id(&c).unwrap(), "x\\||||");
    }

    #[test]
    fn empty_metadata_is_rejected() {
        let metadata = DeviceMetadata {
            device_name: Some("   ".into()),
            ..Default::default()
        };

        assert!(matches!(
            derive_owner_id(&metadata),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn blank_and_missing_fields_derive_alike() {
        let base = DeviceMetadata {
            os_build_id: Some("TQ3A".into()),
            ..Default::default()
        };
        let blank = DeviceMetadata {
            device_name: Some("  ".into()),
            ..base.clone()
        };
        let empty = DeviceMetadata {
            device_name: Some(String::new()),
            ..base.clone()
        };

        let expected = derive_owner_id(&base).unwrap();
        assert_eq!(expected, "|||TQ3A");
        assert_eq!(derive_owner_id(&blank).unwrap(), expected);
        assert_eq!(derive_owner_id(&empty).unwrap(), expected);
    }
}
