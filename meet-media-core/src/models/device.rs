use serde::{Deserialize, Serialize};

/// Kind of media device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Camera,
    Microphone,
    Speaker,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 3] = [DeviceKind::Camera, DeviceKind::Microphone, DeviceKind::Speaker];

    /// The platform's native kind string (`videoinput`, `audioinput`, `audiooutput`).
    pub fn platform_kind(&self) -> &'static str {
        match self {
            DeviceKind::Camera => "videoinput",
            DeviceKind::Microphone => "audioinput",
            DeviceKind::Speaker => "audiooutput",
        }
    }

    pub fn from_platform_kind(kind: &str) -> Option<Self> {
        match kind {
            "videoinput" => Some(DeviceKind::Camera),
            "audioinput" => Some(DeviceKind::Microphone),
            "audiooutput" => Some(DeviceKind::Speaker),
            _ => None,
        }
    }
}

/// A camera, microphone, or speaker reported by device enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    #[serde(rename = "deviceId")]
    pub id: String,
    pub kind: DeviceKind,
    /// Empty until the user has granted capture permission on most platforms.
    pub label: String,
    #[serde(default)]
    pub group_id: String,
}

impl DeviceDescriptor {
    pub fn new(id: impl Into<String>, kind: DeviceKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            group_id: String::new(),
        }
    }
}

/// Enumerated devices partitioned by kind, in platform order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    pub cameras: Vec<DeviceDescriptor>,
    pub microphones: Vec<DeviceDescriptor>,
    pub speakers: Vec<DeviceDescriptor>,
}

impl DeviceList {
    /// Partition a flat enumeration result. Order within each kind is preserved.
    pub fn partition(devices: Vec<DeviceDescriptor>) -> Self {
        let mut list = Self::default();
        for device in devices {
            match device.kind {
                DeviceKind::Camera => list.cameras.push(device),
                DeviceKind::Microphone => list.microphones.push(device),
                DeviceKind::Speaker => list.speakers.push(device),
            }
        }
        list
    }

    pub fn of_kind(&self, kind: DeviceKind) -> &[DeviceDescriptor] {
        match kind {
            DeviceKind::Camera => &self.cameras,
            DeviceKind::Microphone => &self.microphones,
            DeviceKind::Speaker => &self.speakers,
        }
    }

    pub fn contains(&self, kind: DeviceKind, id: &str) -> bool {
        self.of_kind(kind).iter().any(|d| d.id == id)
    }

    pub fn find(&self, kind: DeviceKind, id: &str) -> Option<&DeviceDescriptor> {
        self.of_kind(kind).iter().find(|d| d.id == id)
    }

    /// Id of the first device of `kind`, or empty when there is none.
    pub fn first_id(&self, kind: DeviceKind) -> String {
        self.of_kind(kind)
            .first()
            .map(|d| d.id.clone())
            .unwrap_or_default()
    }

    /// Whether `other` differs from `self` in any per-kind size or id set.
    ///
    /// Only ids are compared and order is ignored; label changes do not count.
    pub fn differs_from(&self, other: &DeviceList) -> bool {
        DeviceKind::ALL.iter().any(|&kind| {
            let ours = self.of_kind(kind);
            let theirs = other.of_kind(kind);
            ours.len() != theirs.len()
                || !theirs
                    .iter()
                    .all(|d| ours.iter().any(|prev| prev.id == d.id))
        })
    }
}

/// Selected device id per kind. Empty means no selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedDevices {
    pub camera: String,
    pub microphone: String,
    pub speaker: String,
}

impl SelectedDevices {
    pub fn get(&self, kind: DeviceKind) -> &str {
        match kind {
            DeviceKind::Camera => &self.camera,
            DeviceKind::Microphone => &self.microphone,
            DeviceKind::Speaker => &self.speaker,
        }
    }

    pub fn set(&mut self, kind: DeviceKind, id: impl Into<String>) {
        let id = id.into();
        match kind {
            DeviceKind::Camera => self.camera = id,
            DeviceKind::Microphone => self.microphone = id,
            DeviceKind::Speaker => self.speaker = id,
        }
    }

    /// Re-derive the selection against a freshly enumerated list.
    ///
    /// On the first enumeration, or when a selected id is no longer listed,
    /// the first device of that kind is picked (empty if none). Selections
    /// that are still present are kept.
    pub fn reconcile(&self, devices: &DeviceList, first_enumeration: bool) -> Self {
        let mut next = self.clone();
        for kind in DeviceKind::ALL {
            let current = self.get(kind);
            if first_enumeration || !devices.contains(kind, current) {
                next.set(kind, devices.first_id(kind));
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam(id: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(id, DeviceKind::Camera, format!("Camera {}", id))
    }

    fn mic(id: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(id, DeviceKind::Microphone, "")
    }

    #[test]
    fn partition_keeps_order() {
        let list = DeviceList::partition(vec![
            cam("c2"),
            mic("m1"),
            DeviceDescriptor::new("s1", DeviceKind::Speaker, "Speakers"),
            cam("c1"),
        ]);
        let ids: Vec<_> = list.cameras.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
        assert_eq!(list.microphones.len(), 1);
        assert_eq!(list.speakers.len(), 1);
    }

    #[test]
    fn reorder_is_not_a_change() {
        let a = DeviceList::partition(vec![cam("c1"), cam("c2")]);
        let b = DeviceList::partition(vec![cam("c2"), cam("c1")]);
        assert!(!a.differs_from(&b));
    }

    #[test]
    fn label_change_is_not_a_change() {
        let a = DeviceList::partition(vec![mic("m1")]);
        let mut relabelled = mic("m1");
        relabelled.label = "USB Microphone".into();
        let b = DeviceList::partition(vec![relabelled]);
        assert!(!a.differs_from(&b));
    }

    #[test]
    fn swapped_id_is_a_change() {
        let a = DeviceList::partition(vec![cam("c1")]);
        let b = DeviceList::partition(vec![cam("c9")]);
        assert!(a.differs_from(&b));
    }

    #[test]
    fn reconcile_keeps_present_selection() {
        let devices = DeviceList::partition(vec![cam("c1"), cam("c2")]);
        let selected = SelectedDevices {
            camera: "c2".into(),
            ..Default::default()
        };
        let next = selected.reconcile(&devices, false);
        assert_eq!(next.camera, "c2");
    }

    #[test]
    fn reconcile_falls_back_to_first_or_empty() {
        let devices = DeviceList::partition(vec![cam("c1"), cam("c2")]);
        let selected = SelectedDevices {
            camera: "gone".into(),
            microphone: "also-gone".into(),
            speaker: String::new(),
        };
        let next = selected.reconcile(&devices, false);
        assert_eq!(next.camera, "c1");
        assert_eq!(next.microphone, "");
        assert_eq!(next.speaker, "");
    }

    #[test]
    fn first_enumeration_always_picks_first() {
        let devices = DeviceList::partition(vec![cam("c1"), cam("c2")]);
        let selected = SelectedDevices {
            camera: "c2".into(),
            ..Default::default()
        };
        assert_eq!(selected.reconcile(&devices, true).camera, "c1");
    }
}
