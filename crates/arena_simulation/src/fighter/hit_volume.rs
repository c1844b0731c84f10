//! Hit-detection volumes attached to a fighter while an action runs.
//!
//! Collision itself lives outside the core: the engine reports contacts
//! against a [`HitVolumeId`] and the simulation routes them to the action
//! that spawned the volume.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HitVolumeId(pub u32);

/// Where on the body the volume is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyPart {
    Body,
    Tail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitVolume {
    /// Action slot that owns this volume
    pub slot: usize,
    pub part: BodyPart,
}

#[derive(Debug, Clone, Default)]
pub struct HitVolumeController {
    volumes: BTreeMap<HitVolumeId, HitVolume>,
    /// Smallest id not handed out yet
    mex: u32,
}

impl HitVolumeController {
    /// Spawn a volume for `slot`. Keep the id: it is needed to delete it.
    pub fn generate(&mut self, slot: usize, part: BodyPart) -> HitVolumeId {
        let id = self.next_id();
        self.volumes.insert(id, HitVolume { slot, part });
        id
    }

    pub fn delete(&mut self, id: HitVolumeId) -> bool {
        self.volumes.remove(&id).is_some()
    }

    pub fn get(&self, id: HitVolumeId) -> Option<&HitVolume> {
        self.volumes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HitVolumeId, &HitVolume)> {
        self.volumes.iter().map(|(id, volume)| (*id, volume))
    }

    fn next_id(&mut self) -> HitVolumeId {
        let returning = self.mex;

        self.mex += 1;
        while self.volumes.contains_key(&HitVolumeId(self.mex)) {
            self.mex += 1;
        }

        HitVolumeId(returning)
    }
}
