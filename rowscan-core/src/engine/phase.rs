//! Phase ring
//!
//! One row of the matrix is scanned by eight short interrupt steps. The
//! dark steps (Blank, SendFinal, CommitRow) are kept short because every
//! tick spent there is lost brightness.

/// One step of the per-row scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Phase {
    /// Apply a pending interval mode, write the config register if contrast changed
    Configure = 0,
    /// Advance the row, sample the button line, send data group 0
    SampleAndSend = 1,
    /// Send data group 1
    SendGroup1 = 2,
    /// Send data group 2
    SendGroup2 = 3,
    /// Switch all driver outputs off
    Blank = 4,
    /// Send the row pattern and the final data group, ending in a global latch
    SendFinal = 5,
    /// Strobe the row-select latch
    CommitRow = 6,
    /// Switch all driver outputs back on
    Unblank = 7,
}

impl Phase {
    /// Number of phases in the ring
    pub const COUNT: usize = 8;

    /// Phases in ring order
    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::Configure,
        Phase::SampleAndSend,
        Phase::SendGroup1,
        Phase::SendGroup2,
        Phase::Blank,
        Phase::SendFinal,
        Phase::CommitRow,
        Phase::Unblank,
    ];

    /// Position in the ring
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Phase at ring position `index`
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Phase::Configure),
            1 => Some(Phase::SampleAndSend),
            2 => Some(Phase::SendGroup1),
            3 => Some(Phase::SendGroup2),
            4 => Some(Phase::Blank),
            5 => Some(Phase::SendFinal),
            6 => Some(Phase::CommitRow),
            7 => Some(Phase::Unblank),
            _ => None,
        }
    }

    /// Following phase, wrapping after [`Phase::Unblank`]
    pub const fn next(self) -> Self {
        match self {
            Phase::Configure => Phase::SampleAndSend,
            Phase::SampleAndSend => Phase::SendGroup1,
            Phase::SendGroup1 => Phase::SendGroup2,
            Phase::SendGroup2 => Phase::Blank,
            Phase::Blank => Phase::SendFinal,
            Phase::SendFinal => Phase::CommitRow,
            Phase::CommitRow => Phase::Unblank,
            Phase::Unblank => Phase::Configure,
        }
    }

    /// Data group carried by this phase
    pub const fn data_group(self) -> Option<usize> {
        match self {
            Phase::SampleAndSend => Some(0),
            Phase::SendGroup1 => Some(1),
            Phase::SendGroup2 => Some(2),
            Phase::SendFinal => Some(3),
            _ => None,
        }
    }

    /// Whether the LEDs are off for the duration of this phase
    pub const fn is_dark(self) -> bool {
        matches!(self, Phase::Blank | Phase::SendFinal | Phase::CommitRow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_order() {
        for (index, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), index);
            assert_eq!(Phase::from_index(index as u8), Some(*phase));
            assert_eq!(phase.next(), Phase::ALL[(index + 1) % Phase::COUNT]);
        }
        assert_eq!(Phase::from_index(8), None);
    }

    #[test]
    fn test_data_groups() {
        let groups: Vec<usize> = Phase::ALL.iter().filter_map(|p| p.data_group()).collect();
        assert_eq!(groups, [0, 1, 2, 3]);
    }
}
