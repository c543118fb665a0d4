//! Fixed joint set driven by the locomotion curves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kinematic chain a joint belongs to. Used to leave arms or head under the
/// host's control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IkChain {
    Hips,
    Spine,
    Head,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

/// Joints animated by the procedural curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Joint {
    Hips,
    RightUpLeg,
    RightLeg,
    RightFoot,
    RightToeBase,
    LeftUpLeg,
    LeftLeg,
    LeftFoot,
    LeftToeBase,
    Spine,
    Spine1,
    Spine2,
    RightShoulder,
    RightArm,
    RightForeArm,
    RightHand,
    LeftShoulder,
    LeftArm,
    LeftForeArm,
    LeftHand,
    Neck,
    Head,
}

impl Joint {
    /// Number of joints in the set
    pub const COUNT: usize = 22;

    /// All joints in evaluation order
    pub const ALL: [Joint; Self::COUNT] = [
        Joint::Hips,
        Joint::RightUpLeg,
        Joint::RightLeg,
        Joint::RightFoot,
        Joint::RightToeBase,
        Joint::LeftUpLeg,
        Joint::LeftLeg,
        Joint::LeftFoot,
        Joint::LeftToeBase,
        Joint::Spine,
        Joint::Spine1,
        Joint::Spine2,
        Joint::RightShoulder,
        Joint::RightArm,
        Joint::RightForeArm,
        Joint::RightHand,
        Joint::LeftShoulder,
        Joint::LeftArm,
        Joint::LeftForeArm,
        Joint::LeftHand,
        Joint::Neck,
        Joint::Head,
    ];

    /// Position in [`Joint::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn chain(self) -> IkChain {
        match self {
            Joint::Hips => IkChain::Hips,
            Joint::RightUpLeg | Joint::RightLeg | Joint::RightFoot | Joint::RightToeBase => {
                IkChain::RightLeg
            }
            Joint::LeftUpLeg | Joint::LeftLeg | Joint::LeftFoot | Joint::LeftToeBase => {
                IkChain::LeftLeg
            }
            Joint::Spine | Joint::Spine1 | Joint::Spine2 => IkChain::Spine,
            Joint::RightShoulder | Joint::RightArm | Joint::RightForeArm | Joint::RightHand => {
                IkChain::RightArm
            }
            Joint::LeftShoulder | Joint::LeftArm | Joint::LeftForeArm | Joint::LeftHand => {
                IkChain::LeftArm
            }
            Joint::Neck | Joint::Head => IkChain::Head,
        }
    }
}

/// Per-joint storage indexed by [`Joint`], with absent joints as `None`.
///
/// Serialized as a map from joint name to value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Joint, T>",
    into = "BTreeMap<Joint, T>",
    bound(serialize = "T: Clone + Serialize", deserialize = "T: Deserialize<'de>")
)]
pub struct JointTable<T> {
    slots: [Option<T>; Joint::COUNT],
}

impl<T> JointTable<T> {
    /// Table with every joint absent.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    #[inline]
    pub fn get(&self, joint: Joint) -> Option<&T> {
        self.slots[joint.index()].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, joint: Joint) -> Option<&mut T> {
        self.slots[joint.index()].as_mut()
    }

    pub fn insert(&mut self, joint: Joint, value: T) -> Option<T> {
        self.slots[joint.index()].replace(value)
    }

    pub fn contains(&self, joint: Joint) -> bool {
        self.slots[joint.index()].is_some()
    }

    /// Number of joints present.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present joints in [`Joint::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Joint, &T)> {
        Joint::ALL
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(joint, slot)| slot.as_ref().map(|v| (*joint, v)))
    }

    /// Present joints in [`Joint::ALL`] order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Joint, &mut T)> {
        Joint::ALL
            .iter()
            .zip(self.slots.iter_mut())
            .filter_map(|(joint, slot)| slot.as_mut().map(|v| (*joint, v)))
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

impl<T> Default for JointTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<BTreeMap<Joint, T>> for JointTable<T> {
    fn from(map: BTreeMap<Joint, T>) -> Self {
        let mut table = Self::new();
        for (joint, value) in map {
            table.insert(joint, value);
        }
        table
    }
}

impl<T> From<JointTable<T>> for BTreeMap<Joint, T> {
    fn from(table: JointTable<T>) -> Self {
        Joint::ALL
            .into_iter()
            .zip(table.slots)
            .filter_map(|(joint, slot)| slot.map(|v| (joint, v)))
            .collect()
    }
}

impl<T> FromIterator<(Joint, T)> for JointTable<T> {
    fn from_iter<I: IntoIterator<Item = (Joint, T)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (joint, value) in iter {
            table.insert(joint, value);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_index() {
        for (i, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
    }

    #[test]
    fn test_chains() {
        assert_eq!(Joint::Hips.chain(), IkChain::Hips);
        assert_eq!(Joint::LeftForeArm.chain(), IkChain::LeftArm);
        assert_eq!(Joint::RightToeBase.chain(), IkChain::RightLeg);
        assert_eq!(Joint::Neck.chain(), IkChain::Head);
    }

    #[test]
    fn test_table_insert_iter() {
        let mut table = JointTable::new();
        assert!(table.is_empty());
        table.insert(Joint::Head, 2.0_f32);
        table.insert(Joint::Hips, 1.0_f32);

        let joints: Vec<Joint> = table.iter().map(|(j, _)| j).collect();
        assert_eq!(joints, vec![Joint::Hips, Joint::Head]);
        assert_eq!(table.get(Joint::Head), Some(&2.0));
        assert!(table.get(Joint::Spine).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_json_keyed_by_name() {
        let table: JointTable<f32> = [(Joint::LeftFoot, 0.5)].into_iter().collect();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"LeftFoot":0.5}"#);

        let back: JointTable<f32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
