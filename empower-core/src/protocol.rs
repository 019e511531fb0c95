//! EmPOWER agent protocol: version, prologue size and the numeric codes carried on the wire.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Current protocol version. Carried in every master header.
pub const PROTOCOL_VERSION: u8 = 1;

/// Size of the prologue that precedes every message on the stream (big-endian u32).
pub const PROLOGUE_SIZE: usize = 4;

/// Status codes returned over the C ABI.
pub const EP_SUCCESS: i32 = 0;
pub const EP_ERROR: i32 = -1;
pub const EP_WRONG_VERSION: i32 = -2;

/// Most cells copied out of an eNB capabilities reply by the C ABI.
pub const ENB_CAP_MAX_CELLS: usize = 8;
/// Most measurements copied out of a UE measurement reply by the C ABI.
pub const UE_MEASURE_MAX_UES: usize = 64;
/// Wildcards for a UE measurement request.
pub const UE_MEAS_ANY_PCI: u16 = 0xffff;
pub const UE_MEAS_ANY_EARFCN: u16 = 0xffff;

/// First-level message type, stored in the master header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MsgType {
    Invalid = 0,
    /// Fire-and-forget or request/reply pair.
    Single = 1,
    /// Event recurring every fixed interval.
    Schedule = 2,
    /// Event occurring 0..n times, on request.
    Trigger = 3,
    Extended = 0xff,
}

impl MsgType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Invalid),
            1 => Some(Self::Single),
            2 => Some(Self::Schedule),
            3 => Some(Self::Trigger),
            0xff => Some(Self::Extended),
            _ => None,
        }
    }
}

/// Direction of an event message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Request = 0,
    Reply = 1,
}

impl Direction {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Request),
            1 => Some(Self::Reply),
            _ => None,
        }
    }
}

/// Operation carried by an event header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Operation {
    /// Field is not meaningful for this message.
    #[default]
    Unspecified = 0,
    Success = 1,
    Fail = 2,
    NotSupported = 3,
    Add = 4,
    Rem = 5,
}

impl Operation {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Success),
            2 => Some(Self::Fail),
            3 => Some(Self::NotSupported),
            4 => Some(Self::Add),
            5 => Some(Self::Rem),
            _ => None,
        }
    }
}

/// Message family, shared by single, schedule and trigger event headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionType {
    Invalid = 0,
    Hello = 1,
    EnbCap = 2,
    CellCap = 3,
    UeReport = 4,
    UeMeasure = 5,
    MacReport = 6,
    Handover = 7,
    Extended = 0xff,
}

impl ActionType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Invalid),
            1 => Some(Self::Hello),
            2 => Some(Self::EnbCap),
            3 => Some(Self::CellCap),
            4 => Some(Self::UeReport),
            5 => Some(Self::UeMeasure),
            6 => Some(Self::MacReport),
            7 => Some(Self::Handover),
            0xff => Some(Self::Extended),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionType::Invalid => "invalid",
            ActionType::Hello => "hello",
            ActionType::EnbCap => "enb-capabilities",
            ActionType::CellCap => "cell-capabilities",
            ActionType::UeReport => "ue-report",
            ActionType::UeMeasure => "ue-measure",
            ActionType::MacReport => "mac-report",
            ActionType::Handover => "handover",
            ActionType::Extended => "extended",
        };
        f.write_str(name)
    }
}

/// Cause of a hand-over request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandoverCause {
    Critical = 1,
    Optimization = 2,
}

impl HandoverCause {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Critical),
            2 => Some(Self::Optimization),
            _ => None,
        }
    }
}

macro_rules! capability_mask {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $flag:ident = $value:expr,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            $($(#[$fmeta])* pub const $flag: Self = Self($value);)*

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }
        }

        impl crate::codec::FixedSize for $name {
            const SIZE: usize = 4;
        }

        impl BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }
    };
}

capability_mask! {
    /// Operations an eNB can perform on behalf of the controller. Values are powers of two.
    EnbCapabilities {
        /// Can only present itself.
        NOTHING = 0,
        UE_REPORT = 1,
        UE_MEASURE = 2,
        HANDOVER = 4,
    }
}

capability_mask! {
    /// Reports a single cell can produce.
    CellCapabilities {
        NOTHING = 0,
        PHY_REPORT = 1,
        MAC_REPORT = 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_wire_values() {
        assert_eq!(MsgType::Trigger as u8, 3);
        assert_eq!(MsgType::from_u8(0xff), Some(MsgType::Extended));
        assert_eq!(MsgType::from_u8(4), None);
        assert_eq!(Operation::from_u8(5), Some(Operation::Rem));
        assert_eq!(Operation::Add as u8, 4);
        assert_eq!(ActionType::from_u8(7), Some(ActionType::Handover));
        assert_eq!(ActionType::from_u8(8), None);
        assert_eq!(Direction::from_u8(2), None);
    }

    #[test]
    fn capability_masks_combine() {
        let caps = EnbCapabilities::UE_REPORT | EnbCapabilities::HANDOVER;
        assert_eq!(caps.bits(), 5);
        assert!(caps.contains(EnbCapabilities::UE_REPORT));
        assert!(!caps.contains(EnbCapabilities::UE_MEASURE));
        assert!(EnbCapabilities::NOTHING.is_empty());
        let mut cell = CellCapabilities::PHY_REPORT;
        cell |= CellCapabilities::MAC_REPORT;
        assert_eq!(cell.bits(), 3);
    }
}
