use alloc::vec::Vec;

use crate::{
    config::{ERASED_BYTE, WORD_SIZE},
    domain::ports::UpgradeError,
};

/// Bytes held back from the previous write because they did not fill a
/// whole flash word. Never holds more than `WORD_SIZE - 1` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarryBuffer {
    bytes: heapless::Vec<u8, WORD_SIZE>,
}

impl CarryBuffer {
    pub const fn new() -> Self {
        Self {
            bytes: heapless::Vec::new(),
        }
    }

    fn from_remainder(remainder: &[u8]) -> Self {
        debug_assert!(remainder.len() < WORD_SIZE);
        Self {
            bytes: heapless::Vec::from_slice(remainder).unwrap_or_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Prepend the carried bytes to `data` and split the result at the last
    /// word boundary.
    pub fn split(&self, data: &[u8]) -> Result<AlignedSplit, UpgradeError> {
        let total = self.bytes.len() + data.len();
        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(total)
            .map_err(|_| UpgradeError::AllocationFailure)?;
        scratch.extend_from_slice(&self.bytes);
        scratch.extend_from_slice(data);

        Ok(AlignedSplit {
            scratch,
            aligned_len: total & !(WORD_SIZE - 1),
        })
    }

    /// The carried bytes padded with erased bytes up to one word, or `None`
    /// when nothing is carried.
    pub fn padded_word(&self) -> Option<[u8; WORD_SIZE]> {
        if self.bytes.is_empty() {
            return None;
        }
        let mut word = [ERASED_BYTE; WORD_SIZE];
        word[..self.bytes.len()].copy_from_slice(&self.bytes);
        Some(word)
    }
}

/// Carry plus new data, split into a word aligned prefix and a short tail.
#[derive(Debug)]
pub struct AlignedSplit {
    scratch: Vec<u8>,
    aligned_len: usize,
}

impl AlignedSplit {
    /// The part that can be written to flash now.
    pub fn aligned(&self) -> &[u8] {
        &self.scratch[..self.aligned_len]
    }

    /// The part that has to wait for more data.
    pub fn remainder(&self) -> &[u8] {
        &self.scratch[self.aligned_len..]
    }

    /// The carry buffer for the next write.
    pub fn carry(&self) -> CarryBuffer {
        CarryBuffer::from_remainder(self.remainder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_data_is_fully_carried() {
        let split = CarryBuffer::new().split(&[1, 2, 3]).unwrap();
        assert!(split.aligned().is_empty());
        assert_eq!(split.remainder(), &[1, 2, 3]);
        assert_eq!(split.carry().len(), 3);
    }

    #[test]
    fn carry_is_prepended() {
        let carry = CarryBuffer::new().split(&[1, 2, 3, 4, 5, 6]).unwrap().carry();
        assert_eq!(carry.as_slice(), &[5, 6]);

        let split = carry.split(&[7, 8, 9, 10, 11, 12]).unwrap();
        assert_eq!(split.aligned(), &[5, 6, 7, 8, 9, 10, 11, 12]);
        assert!(split.carry().is_empty());
    }

    #[test]
    fn empty_data_keeps_carry() {
        let carry = CarryBuffer::new().split(&[1, 2]).unwrap().carry();
        let split = carry.split(&[]).unwrap();
        assert!(split.aligned().is_empty());
        assert_eq!(split.carry(), carry);
    }

    #[test]
    fn split_reconstructs_stream() {
        let input: Vec<u8> = (0..=200).collect();
        let mut carry = CarryBuffer::new();
        let mut output = Vec::new();

        for chunk in input.chunks(7) {
            let split = carry.split(chunk).unwrap();
            assert_eq!(split.aligned().len() % WORD_SIZE, 0);
            output.extend_from_slice(split.aligned());
            carry = split.carry();
            assert!(carry.len() < WORD_SIZE);
        }
        output.extend_from_slice(carry.as_slice());

        assert_eq!(output, input);
    }

    #[test]
    fn padded_word_fills_with_erased_bytes() {
        assert_eq!(CarryBuffer::new().padded_word(), None);

        let carry = CarryBuffer::new().split(&[0xAA]).unwrap().carry();
        assert_eq!(carry.padded_word(), Some([0xAA, 0xFF, 0xFF, 0xFF]));
    }
}
