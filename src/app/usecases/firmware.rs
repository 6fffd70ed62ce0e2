use log::{debug, info, warn};

use super::{carry::CarryBuffer, geometry::resolve};
use crate::{
    config::{SECTOR_SIZE, WORD_SIZE},
    domain::{
        entity::SlotLayout,
        ports::{FlashDriver, FlashError, FlashGeometry, UpgradeError},
    },
};

/// State of one in-progress firmware write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCursor {
    write_address: u32,
    layout: SlotLayout,
    erase_cursor: u32,
    carry: CarryBuffer,
}

impl UpgradeCursor {
    pub fn new(layout: SlotLayout) -> Self {
        Self {
            write_address: layout.start_address(),
            layout,
            erase_cursor: u32::from(layout.base_sector),
            carry: CarryBuffer::new(),
        }
    }

    /// Absolute flash address of the next byte to write.
    pub fn write_address(&self) -> u32 {
        self.write_address
    }

    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    /// Next sector to erase. Every sector below it, down to the slot base,
    /// has been erased during this session.
    pub fn erase_cursor(&self) -> u32 {
        self.erase_cursor
    }

    pub fn carry(&self) -> &CarryBuffer {
        &self.carry
    }
}

/// What a chunk submission did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Empty chunk, nothing happened
    Skipped,
    /// Sectors were erased ahead of the write cursor. `complete` is false
    /// when the erase stopped before covering the requested length.
    Erased { sectors: u32, complete: bool },
    /// Word aligned bytes were written to flash
    Written { bytes: usize },
}

enum EraseStop {
    OutOfRange,
    Driver(FlashError),
}

/// OTA firmware writer.
///
/// Owns the flash driver and at most one [`UpgradeCursor`]. The cursor is
/// created by [`init`](Self::init) and dropped by [`recycle`](Self::recycle).
pub struct OtaUpgrader<D, G> {
    driver: D,
    geometry: G,
    cursor: Option<UpgradeCursor>,
}

impl<D, G> OtaUpgrader<D, G> {
    pub fn new(driver: D, geometry: G) -> Self {
        Self {
            driver,
            geometry,
            cursor: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn cursor(&self) -> Option<&UpgradeCursor> {
        self.cursor.as_ref()
    }

    /// Base sector of the slot being written, or `0` when no upgrade is in
    /// progress. Sector 0 holds the boot loader and is never a valid target.
    pub fn current_sector(&self) -> u16 {
        self.cursor
            .as_ref()
            .map_or(0, |cursor| cursor.layout.base_sector)
    }

    /// Drop the upgrade state. Safe to call at any time.
    pub fn recycle(&mut self) {
        if self.cursor.take().is_some() {
            debug!("ota: upgrade state recycled");
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_parts(self) -> (D, G) {
        (self.driver, self.geometry)
    }

    /// Start a session on an explicit slot. No-op while a session is active.
    pub fn init_with_layout(&mut self, layout: SlotLayout) {
        if self.cursor.is_some() {
            return;
        }
        info!(
            "ota: target slot at sector {}, {} sectors",
            layout.base_sector, layout.sector_count
        );
        self.cursor = Some(UpgradeCursor::new(layout));
    }
}

impl<D: FlashDriver, G: FlashGeometry> OtaUpgrader<D, G> {
    /// Start a session on the inactive slot. No-op while a session is
    /// active.
    pub fn init(&mut self) {
        if self.cursor.is_some() {
            return;
        }
        let size_map = self.geometry.flash_size_map();
        let running = self.geometry.running_bin();
        debug!("ota: flash size map {:?}, running {:?}", size_map, running);
        self.init_with_layout(resolve(size_map, running));
    }

    /// Alias of [`write_chunk`](Self::write_chunk), which already starts a
    /// session when none is active.
    pub fn write_chunk_lazy(&mut self, data: &[u8]) -> Result<ChunkOutcome, UpgradeError> {
        self.write_chunk(data)
    }

    /// Submit one chunk of the image, starting a session on the inactive
    /// slot first when none is active.
    ///
    /// A chunk larger than one sector is not written: its length is taken as
    /// the total image size and the matching sectors are erased instead, see
    /// [`erase_ahead`](Self::erase_ahead). Anything else goes through
    /// [`write_data`](Self::write_data).
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<ChunkOutcome, UpgradeError> {
        self.init();
        if data.is_empty() {
            return Ok(ChunkOutcome::Skipped);
        }
        if data.len() > SECTOR_SIZE as usize {
            self.erase_ahead(data.len())
        } else {
            self.write_data(data)
        }
    }

    /// Erase the sectors needed to hold `total_len` bytes from the current
    /// write address, continuing from the last erased sector.
    ///
    /// The erase stops quietly at the end of the slot or on a driver error;
    /// erasing is idempotent, so the caller may simply try again.
    pub fn erase_ahead(&mut self, total_len: usize) -> Result<ChunkOutcome, UpgradeError> {
        let cursor = self.cursor.as_mut().ok_or(UpgradeError::NotInitialized)?;

        let end = u64::from(cursor.write_address) + total_len as u64;
        let target = end.div_ceil(u64::from(SECTOR_SIZE));
        let mut erased = 0;
        let mut complete = true;

        while u64::from(cursor.erase_cursor) < target {
            let sector = cursor.erase_cursor;
            let layout = cursor.layout;
            let driver = &mut self.driver;

            let step = critical_section::with(|_| {
                if !layout.contains_sector(sector) {
                    return Err(EraseStop::OutOfRange);
                }
                let raw = u16::try_from(sector).map_err(|_| EraseStop::OutOfRange)?;
                driver.erase_sector(raw).map_err(EraseStop::Driver)?;
                cursor.erase_cursor += 1;
                Ok(())
            });

            match step {
                Ok(()) => erased += 1,
                Err(EraseStop::OutOfRange) => {
                    warn!("ota: erase sector {} out of range", sector);
                    complete = false;
                    break;
                }
                Err(EraseStop::Driver(err)) => {
                    warn!("ota: erase sector {} failed: {}", sector, err);
                    complete = false;
                    break;
                }
            }
            self.driver.relax();
        }

        info!(
            "ota: flash erase over, {} sectors erased, next sector {}",
            erased, cursor.erase_cursor
        );
        Ok(ChunkOutcome::Erased {
            sectors: erased,
            complete,
        })
    }

    /// Append image data. Only whole words reach flash; up to three trailing
    /// bytes are held back until the next call.
    ///
    /// On error the session is left exactly as it was.
    pub fn write_data(&mut self, data: &[u8]) -> Result<ChunkOutcome, UpgradeError> {
        if data.len() > SECTOR_SIZE as usize {
            return Err(UpgradeError::ChunkTooLarge { len: data.len() });
        }
        if data.is_empty() {
            return Ok(ChunkOutcome::Skipped);
        }
        let cursor = self.cursor.as_mut().ok_or(UpgradeError::NotInitialized)?;

        let split = cursor.carry.split(data)?;
        let aligned = split.aligned();
        let next = checked_advance(cursor, aligned.len())?;

        if !aligned.is_empty() {
            self.driver
                .write_words(cursor.write_address, aligned)
                .inspect_err(|err| {
                    warn!(
                        "ota: write of {} bytes at {:#x} failed: {}",
                        aligned.len(),
                        cursor.write_address,
                        err
                    );
                })?;
        }

        debug!(
            "ota: wrote {} bytes at {:#x}, carrying {}",
            aligned.len(),
            cursor.write_address,
            split.remainder().len()
        );
        cursor.write_address = next;
        cursor.carry = split.carry();

        Ok(ChunkOutcome::Written {
            bytes: aligned.len(),
        })
    }

    /// Write the carried tail, padded with `0xFF` to a whole word.
    pub fn finish(&mut self) -> Result<ChunkOutcome, UpgradeError> {
        let cursor = self.cursor.as_mut().ok_or(UpgradeError::NotInitialized)?;
        let Some(word) = cursor.carry.padded_word() else {
            return Ok(ChunkOutcome::Written { bytes: 0 });
        };
        let next = checked_advance(cursor, WORD_SIZE)?;

        self.driver.write_words(cursor.write_address, &word)?;
        debug!(
            "ota: wrote final tail of {} bytes at {:#x}",
            cursor.carry.len(),
            cursor.write_address
        );
        cursor.write_address = next;
        cursor.carry.clear();

        Ok(ChunkOutcome::Written { bytes: WORD_SIZE })
    }
}

/// Address after writing `len` bytes, if it stays strictly inside the slot.
fn checked_advance(cursor: &UpgradeCursor, len: usize) -> Result<u32, UpgradeError> {
    let end = cursor.layout.end_address();
    u32::try_from(len)
        .ok()
        .and_then(|len| cursor.write_address.checked_add(len))
        .filter(|next| *next < end)
        .ok_or_else(|| {
            warn!(
                "ota: write of {} bytes at {:#x} exceeds slot end {:#x}",
                len, cursor.write_address, end
            );
            UpgradeError::InvalidRange {
                address: cursor.write_address,
                end,
            }
        })
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::domain::entity::{FlashSizeMap, UserBin};

    #[derive(Default)]
    struct RecordingFlash {
        erased: Vec<u16>,
        writes: Vec<(u32, Vec<u8>)>,
        relaxed: usize,
        fail_erase_at: Option<u16>,
        fail_writes: bool,
    }

    impl FlashDriver for RecordingFlash {
        fn erase_sector(&mut self, sector: u16) -> Result<(), FlashError> {
            if self.fail_erase_at == Some(sector) {
                return Err(FlashError::Erase);
            }
            self.erased.push(sector);
            Ok(())
        }

        fn write_words(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
            if self.fail_writes {
                return Err(FlashError::Write);
            }
            assert_eq!(offset % 4, 0);
            assert_eq!(data.len() % 4, 0);
            self.writes.push((offset, data.to_vec()));
            Ok(())
        }

        fn relax(&mut self) {
            self.relaxed += 1;
        }
    }

    struct Geometry(FlashSizeMap, UserBin);

    impl FlashGeometry for Geometry {
        fn flash_size_map(&self) -> FlashSizeMap {
            self.0
        }

        fn running_bin(&self) -> UserBin {
            self.1
        }
    }

    fn upgrader() -> OtaUpgrader<RecordingFlash, Geometry> {
        OtaUpgrader::new(
            RecordingFlash::default(),
            Geometry(FlashSizeMap::Size8mMap512x512, UserBin::Bin1),
        )
    }

    fn session(layout: SlotLayout) -> OtaUpgrader<RecordingFlash, Geometry> {
        let mut ota = upgrader();
        ota.init_with_layout(layout);
        ota
    }

    #[test]
    fn init_resolves_inactive_slot() {
        let mut ota = upgrader();
        assert_eq!(ota.current_sector(), 0);

        ota.init();
        let cursor = ota.cursor().unwrap();
        assert_eq!(ota.current_sector(), 129);
        assert_eq!(cursor.write_address(), 129 * SECTOR_SIZE);
        assert_eq!(cursor.erase_cursor(), 129);
        assert!(cursor.carry().is_empty());
    }

    #[test]
    fn init_twice_is_noop() {
        let mut ota = session(SlotLayout::new(1, 128));
        ota.write_chunk(&[1, 2, 3, 4, 5, 6]).unwrap();
        let before = ota.cursor().cloned();

        ota.init();
        ota.init_with_layout(SlotLayout::new(300, 10));
        assert_eq!(ota.cursor().cloned(), before);
    }

    #[test]
    fn recycle_is_idempotent() {
        let mut ota = session(SlotLayout::new(1, 128));
        ota.recycle();
        ota.recycle();
        assert!(!ota.is_initialized());
        assert_eq!(ota.current_sector(), 0);
    }

    #[test]
    fn write_chunk_starts_session() {
        let mut ota = upgrader();
        assert_eq!(
            ota.write_chunk(&[1, 2, 3, 4]),
            Ok(ChunkOutcome::Written { bytes: 4 })
        );
        assert!(ota.is_initialized());
        assert_eq!(ota.current_sector(), 129);
        assert_eq!(ota.driver().writes, [(129 * SECTOR_SIZE, alloc::vec![1, 2, 3, 4])]);
    }

    #[test]
    fn erase_hint_starts_session() {
        let mut ota = upgrader();
        assert_eq!(
            ota.write_chunk(&alloc::vec![0u8; 3 * SECTOR_SIZE as usize]),
            Ok(ChunkOutcome::Erased {
                sectors: 3,
                complete: true,
            })
        );
        assert_eq!(ota.cursor().unwrap().erase_cursor(), 132);
        assert_eq!(ota.driver().erased, [129, 130, 131]);
    }

    #[test]
    fn empty_chunk_starts_session() {
        let mut ota = upgrader();
        assert_eq!(ota.write_chunk(&[]), Ok(ChunkOutcome::Skipped));
        assert_eq!(ota.current_sector(), 129);
        assert_eq!(ota.cursor().unwrap().write_address(), 129 * SECTOR_SIZE);
    }

    #[test]
    fn explicit_steps_require_session() {
        let mut ota = upgrader();
        assert_eq!(ota.write_data(&[1, 2, 3, 4]), Err(UpgradeError::NotInitialized));
        assert_eq!(ota.erase_ahead(1), Err(UpgradeError::NotInitialized));
        assert_eq!(ota.finish(), Err(UpgradeError::NotInitialized));
        assert!(!ota.is_initialized());
    }

    #[test]
    fn lazy_write_starts_session() {
        let mut ota = upgrader();
        assert_eq!(
            ota.write_chunk_lazy(&[1, 2, 3, 4]),
            Ok(ChunkOutcome::Written { bytes: 4 })
        );
        assert_eq!(ota.current_sector(), 129);
        assert_eq!(ota.driver().writes, [(129 * SECTOR_SIZE, alloc::vec![1, 2, 3, 4])]);
    }

    #[test]
    fn empty_chunk_changes_nothing() {
        let mut ota = session(SlotLayout::new(1, 128));
        ota.write_chunk(&[9, 9]).unwrap();
        let before = ota.cursor().cloned();

        assert_eq!(ota.write_chunk(&[]), Ok(ChunkOutcome::Skipped));
        assert_eq!(ota.cursor().cloned(), before);
        assert!(ota.driver().writes.is_empty());
    }

    #[test]
    fn carry_crosses_chunks() {
        let mut ota = session(SlotLayout::new(1, 128));
        let base = SECTOR_SIZE;

        assert_eq!(
            ota.write_chunk(&[0, 1, 2, 3, 4, 5]),
            Ok(ChunkOutcome::Written { bytes: 4 })
        );
        assert_eq!(ota.cursor().unwrap().write_address(), base + 4);
        assert_eq!(ota.cursor().unwrap().carry().as_slice(), &[4, 5]);

        assert_eq!(
            ota.write_chunk(&[6, 7, 8, 9, 10, 11]),
            Ok(ChunkOutcome::Written { bytes: 8 })
        );
        assert_eq!(ota.cursor().unwrap().write_address(), base + 12);
        assert!(ota.cursor().unwrap().carry().is_empty());

        let writes = &ota.driver().writes;
        assert_eq!(writes[0], (base, alloc::vec![0, 1, 2, 3]));
        assert_eq!(writes[1], (base + 4, alloc::vec![4, 5, 6, 7, 8, 9, 10, 11]));
    }

    #[test]
    fn sub_word_chunk_is_only_carried() {
        let mut ota = session(SlotLayout::new(1, 128));
        assert_eq!(
            ota.write_chunk(&[1, 2, 3]),
            Ok(ChunkOutcome::Written { bytes: 0 })
        );
        assert!(ota.driver().writes.is_empty());
        assert_eq!(ota.cursor().unwrap().write_address(), SECTOR_SIZE);
    }

    #[test]
    fn write_past_slot_end_is_rejected() {
        let mut ota = session(SlotLayout::new(1, 1));
        let full = [0u8; SECTOR_SIZE as usize];
        let before = ota.cursor().cloned();

        assert_eq!(
            ota.write_chunk(&full),
            Err(UpgradeError::InvalidRange {
                address: SECTOR_SIZE,
                end: 2 * SECTOR_SIZE,
            })
        );
        assert_eq!(ota.cursor().cloned(), before);
        assert!(ota.driver().writes.is_empty());
    }

    #[test]
    fn driver_failure_leaves_cursor_untouched() {
        let mut ota = session(SlotLayout::new(1, 128));
        ota.write_chunk(&[1, 2]).unwrap();
        let before = ota.cursor().cloned();

        ota.driver_mut().fail_writes = true;
        assert_eq!(
            ota.write_chunk(&[3, 4, 5, 6]),
            Err(UpgradeError::Driver(FlashError::Write))
        );
        assert_eq!(ota.cursor().cloned(), before);
    }

    #[test]
    fn erase_ahead_covers_image() {
        let mut ota = session(SlotLayout::new(1, 128));
        let image_len = 10 * SECTOR_SIZE as usize + 1;

        assert_eq!(
            ota.write_chunk(&alloc::vec![0u8; image_len]),
            Ok(ChunkOutcome::Erased {
                sectors: 11,
                complete: true,
            })
        );
        let cursor = ota.cursor().unwrap();
        assert_eq!(cursor.erase_cursor(), 12);
        assert_eq!(cursor.write_address(), SECTOR_SIZE);
        assert_eq!(ota.driver().erased, (1..12).collect::<Vec<u16>>());
        assert_eq!(ota.driver().relaxed, 11);
        assert!(ota.driver().writes.is_empty());
    }

    #[test]
    fn erase_ahead_resumes_from_erase_cursor() {
        let mut ota = session(SlotLayout::new(1, 128));
        ota.erase_ahead(2 * SECTOR_SIZE as usize).unwrap();
        assert_eq!(ota.cursor().unwrap().erase_cursor(), 3);

        assert_eq!(
            ota.erase_ahead(4 * SECTOR_SIZE as usize),
            Ok(ChunkOutcome::Erased {
                sectors: 2,
                complete: true,
            })
        );
        assert_eq!(ota.driver().erased, [1, 2, 3, 4]);
    }

    #[test]
    fn erase_ahead_stops_at_slot_end() {
        let mut ota = session(SlotLayout::new(10, 4));
        assert_eq!(
            ota.erase_ahead(100 * SECTOR_SIZE as usize),
            Ok(ChunkOutcome::Erased {
                sectors: 4,
                complete: false,
            })
        );
        assert_eq!(ota.cursor().unwrap().erase_cursor(), 14);
        assert_eq!(ota.driver().erased, [10, 11, 12, 13]);
    }

    #[test]
    fn erase_ahead_stops_on_driver_failure() {
        let mut ota = session(SlotLayout::new(1, 128));
        ota.driver_mut().fail_erase_at = Some(3);

        assert_eq!(
            ota.erase_ahead(5 * SECTOR_SIZE as usize),
            Ok(ChunkOutcome::Erased {
                sectors: 2,
                complete: false,
            })
        );
        assert_eq!(ota.cursor().unwrap().erase_cursor(), 3);
    }

    #[test]
    fn write_data_rejects_oversized_chunk() {
        let mut ota = session(SlotLayout::new(1, 128));
        let len = SECTOR_SIZE as usize + 1;
        assert_eq!(
            ota.write_data(&alloc::vec![0u8; len]),
            Err(UpgradeError::ChunkTooLarge { len })
        );
    }

    #[test]
    fn finish_flushes_padded_tail() {
        let mut ota = session(SlotLayout::new(1, 128));
        ota.write_chunk(&[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(ota.finish(), Ok(ChunkOutcome::Written { bytes: 4 }));
        assert_eq!(
            ota.driver().writes[1],
            (SECTOR_SIZE + 4, alloc::vec![5, 0xFF, 0xFF, 0xFF])
        );
        assert!(ota.cursor().unwrap().carry().is_empty());
        assert_eq!(ota.finish(), Ok(ChunkOutcome::Written { bytes: 0 }));
    }

    #[test]
    fn erase_ahead_counts_from_write_address() {
        let mut ota = session(SlotLayout::new(1, 128));
        ota.erase_ahead(SECTOR_SIZE as usize).unwrap();
        ota.write_chunk(&alloc::vec![0u8; 3000]).unwrap();
        ota.write_chunk(&alloc::vec![0u8; 2000]).unwrap();
        assert_eq!(ota.cursor().unwrap().write_address(), SECTOR_SIZE + 5000);
        assert_eq!(ota.cursor().unwrap().erase_cursor(), 2);

        // ceil((4096 + 5000 + 8000) / 4096) = 5
        assert_eq!(
            ota.erase_ahead(8000),
            Ok(ChunkOutcome::Erased {
                sectors: 3,
                complete: true,
            })
        );
        assert_eq!(ota.cursor().unwrap().erase_cursor(), 5);
        assert_eq!(ota.driver().erased, [1, 2, 3, 4]);

        // 4096 + 5000 + 11384 ends exactly on sector 5, already erased
        assert_eq!(
            ota.erase_ahead(11_384),
            Ok(ChunkOutcome::Erased {
                sectors: 0,
                complete: true,
            })
        );
        // one byte more crosses into sector 5
        assert_eq!(
            ota.erase_ahead(11_385),
            Ok(ChunkOutcome::Erased {
                sectors: 1,
                complete: true,
            })
        );
        assert_eq!(ota.cursor().unwrap().erase_cursor(), 6);
    }
}
