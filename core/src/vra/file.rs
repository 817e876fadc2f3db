//! vra/file.rs
//! VRA file container: 20-byte header followed by complete packets.
//!
//! Design notes:
//! - The header is read once on open and rewritten by `flush` whenever a
//!   tracked field changes.
//! - Untracked fields are pinned to their sentinels (length 0, CRC all
//!   ones) as soon as the file is opened for writing, so flushes never
//!   recompute them.
//! - `flush` updates the length before the CRC: the CRC covers the length
//!   field.
//! - The scan end is the recorded length, or the storage length when no
//!   length is recorded. The CRC covers the same span.

use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::BytesMut;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{CRC_CHUNK_SIZE, MIN_HEADER_LEN, VRA_CRC_SENTINEL, VRA_FAW, VRA_HEADER_LEN, VRA_LENGTH_UNSET};
use crate::container::{frame_at, PacketContainer, PacketIterator, ReadMode};
use crate::header::Vita49Version;
use crate::packet::{check_packet, InvalidReason, Packet};
use crate::telemetry::ScanCounters;
use crate::types::VrtError;
use crate::utils::{hex_preview, is_word_aligned};
use crate::vra::crc::crc_of_reader;
use crate::vra::header::VraHeader;
use crate::vra::options::VraOptions;

/// Byte storage behind a VRA file.
pub trait Storage: Read + Write + Seek {
    fn storage_len(&mut self) -> io::Result<u64>;
    fn set_storage_len(&mut self, len: u64) -> io::Result<()>;
}

impl Storage for File {
    fn storage_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn set_storage_len(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl Storage for Cursor<Vec<u8>> {
    fn storage_len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn set_storage_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length overflows usize"))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

/// Why a file failed its validity check. First failure wins.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileInvalidReason {
    #[error("file is {0} bytes, shorter than the header")]
    TooShort(u64),
    #[error("bad alignment word {0:02x?}")]
    BadFaw([u8; 4]),
    #[error("CRC mismatch: recorded 0x{recorded:08x}, computed 0x{computed:08x}")]
    CrcMismatch { recorded: u32, computed: u32 },
    #[error("recorded length {recorded} exceeds the {storage} bytes stored")]
    LengthExceedsStorage { recorded: u64, storage: u64 },
    #[error("undeclared length {0} is not a multiple of 4")]
    UnalignedLength(u64),
    #[error("packet at offset {offset}: {reason}")]
    Packet { offset: u64, reason: InvalidReason },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileCheck {
    Valid,
    Invalid(FileInvalidReason),
}

impl FileCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, FileCheck::Valid)
    }
}

pub struct VraFile<S: Storage> {
    storage: S,
    header: VraHeader,
    options: VraOptions,
    counters: ScanCounters,
}

impl VraFile<File> {
    /// Creates (or truncates) the file at `path`.
    pub fn create_path(path: impl AsRef<Path>, options: VraOptions) -> Result<Self, VrtError> {
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
        Self::create(file, options)
    }

    pub fn open_path(path: impl AsRef<Path>, options: VraOptions) -> Result<Self, VrtError> {
        let file = OpenOptions::new().read(true).write(!options.read_only).open(path)?;
        Self::open(file, options)
    }
}

impl VraFile<Cursor<Vec<u8>>> {
    /// Empty in-memory file.
    pub fn in_memory(options: VraOptions) -> Result<Self, VrtError> {
        Self::create(Cursor::new(Vec::new()), options)
    }
}

impl<S: Storage> VraFile<S> {
    /// Writes a fresh header over `storage` and drops anything after it.
    pub fn create(mut storage: S, options: VraOptions) -> Result<Self, VrtError> {
        if options.read_only {
            return Err(VrtError::ReadOnly);
        }
        storage.set_storage_len(0)?;
        let mut file = Self { storage, header: VraHeader::default(), options, counters: ScanCounters::default() };
        file.write_header()?;
        file.flush()?;
        Ok(file)
    }

    /// Reads and checks the header of an existing file.
    pub fn open(mut storage: S, options: VraOptions) -> Result<Self, VrtError> {
        let mut buf = [0u8; VRA_HEADER_LEN];
        storage.seek(SeekFrom::Start(0))?;
        read_up_to(&mut storage, &mut buf).and_then(|n| {
            if n < VRA_HEADER_LEN {
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "file shorter than the VRA header"))
            } else {
                Ok(())
            }
        })?;
        let header = VraHeader::decode(&buf)?;
        header.validate()?;

        let mut file = Self { storage, header, options, counters: ScanCounters::default() };
        if !options.read_only && file.pin_sentinels() {
            file.write_header()?;
        }
        debug!(length = header.file_length, crc = header.crc, "opened VRA file");
        Ok(file)
    }

    /// Checks arbitrary storage without requiring a well-formed header
    /// first: short files and bad alignment words come back as
    /// `FileCheck::Invalid` instead of an open error.
    pub fn check_storage(mut storage: S, options: VraOptions) -> Result<FileCheck, VrtError> {
        let len = storage.storage_len()?;
        if len < VRA_HEADER_LEN as u64 {
            warn!(len, "VRA file shorter than its header");
            return Ok(FileCheck::Invalid(FileInvalidReason::TooShort(len)));
        }
        let mut faw = [0u8; 4];
        storage.seek(SeekFrom::Start(0))?;
        storage.read_exact(&mut faw)?;
        if faw != VRA_FAW {
            warn!(?faw, "bad VRA alignment word");
            return Ok(FileCheck::Invalid(FileInvalidReason::BadFaw(faw)));
        }
        Self::open(storage, VraOptions { read_only: true, ..options })?.check()
    }

    /// Pins untracked fields to their sentinels. True when anything changed.
    fn pin_sentinels(&mut self) -> bool {
        let before = self.header;
        if !self.options.track_length {
            self.header.file_length = VRA_LENGTH_UNSET;
        }
        if !self.options.track_crc {
            self.header.crc = VRA_CRC_SENTINEL;
        }
        before != self.header
    }

    fn ensure_writable(&self) -> Result<(), VrtError> {
        if self.options.read_only {
            return Err(VrtError::ReadOnly);
        }
        Ok(())
    }

    fn write_header(&mut self) -> Result<(), VrtError> {
        self.storage.seek(SeekFrom::Start(0))?;
        self.storage.write_all(&self.header.encode())?;
        Ok(())
    }

    // --- accessors ---

    pub fn header(&self) -> &VraHeader {
        &self.header
    }

    pub fn options(&self) -> &VraOptions {
        &self.options
    }

    pub fn counters(&self) -> &ScanCounters {
        &self.counters
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    pub fn storage_len(&mut self) -> Result<u64, VrtError> {
        Ok(self.storage.storage_len()?)
    }

    /// Recorded length, or the storage length when none is recorded.
    pub fn file_length(&mut self) -> Result<u64, VrtError> {
        if self.header.has_length() {
            return Ok(self.header.file_length);
        }
        self.storage_len()
    }

    // --- write path ---

    /// Rewrites the header: length first (if tracked), then CRC (if
    /// tracked).
    pub fn flush(&mut self) -> Result<(), VrtError> {
        self.ensure_writable()?;
        self.pin_sentinels();
        if self.options.track_length {
            self.header.file_length = self.storage_len()?;
        }
        if self.options.track_crc {
            // The CRC reads header bytes 0..16 back from storage.
            self.write_header()?;
            self.header.crc = self.compute_crc()?;
        }
        self.write_header()?;
        self.storage.flush()?;
        debug!(length = self.header.file_length, crc = self.header.crc, "VRA header rewritten");
        Ok(())
    }

    /// Appends a packet at the end of the file and returns its offset.
    pub fn append_packet(&mut self, packet: &Packet<'_>) -> Result<u64, VrtError> {
        self.ensure_writable()?;
        packet.check(self.options.check_mode, None).map_err(|reason| {
            warn!(%reason, "refusing to append invalid packet");
            VrtError::Packet(reason.into())
        })?;
        let at = self.file_length()?.max(VRA_HEADER_LEN as u64);
        let bytes = packet.to_bytes();
        self.storage.seek(SeekFrom::Start(at))?;
        self.storage.write_all(&bytes)?;
        self.storage.set_storage_len(at + bytes.len() as u64)?;
        self.flush()?;
        Ok(at)
    }

    /// CRC over the current contents, up to `file_length()`.
    pub fn compute_crc(&mut self) -> Result<u32, VrtError> {
        let end = self.file_length()?.min(self.storage_len()?);
        let (crc, covered) = crc_of_reader(&mut self.storage, end)?;
        self.counters.add_crc(covered as usize);
        Ok(crc)
    }

    // --- validity ---

    /// Full structural check of the stored file.
    pub fn check(&mut self) -> Result<FileCheck, VrtError> {
        let storage = self.storage_len()?;
        if storage < VRA_HEADER_LEN as u64 {
            return Ok(self.invalid(FileInvalidReason::TooShort(storage)));
        }

        let mut buf = [0u8; VRA_HEADER_LEN];
        self.storage.seek(SeekFrom::Start(0))?;
        self.storage.read_exact(&mut buf)?;
        let header = VraHeader::decode(&buf)?;
        if header.faw != VRA_FAW {
            return Ok(self.invalid(FileInvalidReason::BadFaw(header.faw)));
        }
        self.header = header;

        if header.has_crc() {
            let computed = self.compute_crc()?;
            if computed != header.crc {
                return Ok(self.invalid(FileInvalidReason::CrcMismatch { recorded: header.crc, computed }));
            }
        }
        if header.has_length() && header.file_length > storage {
            return Ok(self.invalid(FileInvalidReason::LengthExceedsStorage { recorded: header.file_length, storage }));
        }
        if !header.has_length() && !is_word_aligned(storage) {
            return Ok(self.invalid(FileInvalidReason::UnalignedLength(storage)));
        }

        let end = self.file_length()?;
        let mode = self.options.check_mode;
        let version = self.options.version;
        let mut it = PacketIterator::new(self);
        loop {
            let at = match it.skip_packet() {
                Ok(Some(at)) => at,
                Ok(None) => break,
                Err(VrtError::Corrupt { offset, reason }) => {
                    let counters = it.into_counters();
                    self.counters.merge(&counters);
                    return Ok(self.invalid(FileInvalidReason::Packet { offset, reason }));
                }
                Err(e) => return Err(e),
            };
            let header_bytes = it.last_bytes();
            let declared = u16::from_be_bytes([header_bytes[2], header_bytes[3]]) as usize * 4;
            if let Err(reason) = check_packet(header_bytes, declared, mode, version, None) {
                warn!(offset = at, header = %hex_preview(header_bytes, 28), "invalid packet header");
                let counters = it.into_counters();
                self.counters.merge(&counters);
                return Ok(self.invalid(FileInvalidReason::Packet { offset: at, reason }));
            }
        }
        let stop = it.offset();
        let counters = it.into_counters();
        self.counters.merge(&counters);

        if stop < end {
            let available = (end - stop) as usize;
            let reason = InvalidReason::BufferTooShort { declared: MIN_HEADER_LEN, available };
            return Ok(self.invalid(FileInvalidReason::Packet { offset: stop, reason }));
        }
        Ok(FileCheck::Valid)
    }

    fn invalid(&mut self, reason: FileInvalidReason) -> FileCheck {
        warn!(%reason, "invalid VRA file");
        self.counters.add_invalid();
        FileCheck::Invalid(reason)
    }

    pub fn is_file_valid(&mut self) -> bool {
        self.check().map(|c| c.is_valid()).unwrap_or(false)
    }

    pub fn packets(&mut self) -> PacketIterator<'_, Self> {
        PacketIterator::new(self)
    }

    fn end(&mut self) -> Result<u64, VrtError> {
        Ok(self.file_length()?.min(self.storage_len()?))
    }
}

impl<S: Storage> PacketContainer for VraFile<S> {
    fn first_offset(&self) -> u64 {
        VRA_HEADER_LEN as u64
    }

    fn has_next_at(&mut self, offset: u64) -> Result<bool, VrtError> {
        Ok(offset + MIN_HEADER_LEN as u64 <= self.end()?)
    }

    fn read_packet_at(&mut self, offset: u64, scratch: &mut BytesMut, mode: ReadMode) -> Result<u64, VrtError> {
        let end = self.end()?;
        let mut prologue = [0u8; MIN_HEADER_LEN];
        self.storage.seek(SeekFrom::Start(offset))?;
        self.storage.read_exact(&mut prologue)?;
        let (len, header_len) = frame_at(&prologue, offset, end.saturating_sub(offset))?;

        let take = match mode {
            ReadMode::Full => len,
            ReadMode::HeaderOnly => header_len.min(len),
        };
        scratch.clear();
        scratch.resize(take, 0);
        scratch[..MIN_HEADER_LEN].copy_from_slice(&prologue);
        self.storage.read_exact(&mut scratch[MIN_HEADER_LEN..])?;
        Ok(len as u64)
    }

    fn remove_packet_at(&mut self, offset: u64) -> Result<(), VrtError> {
        self.ensure_writable()?;
        let end = self.end()?;
        let mut prologue = [0u8; MIN_HEADER_LEN];
        self.storage.seek(SeekFrom::Start(offset))?;
        self.storage.read_exact(&mut prologue)?;
        let (len, _) = frame_at(&prologue, offset, end.saturating_sub(offset))?;
        let len = len as u64;

        let mut buf = vec![0u8; CRC_CHUNK_SIZE];
        let (mut src, mut dst) = (offset + len, offset);
        while src < end {
            let n = ((end - src) as usize).min(CRC_CHUNK_SIZE);
            self.storage.seek(SeekFrom::Start(src))?;
            self.storage.read_exact(&mut buf[..n])?;
            self.storage.seek(SeekFrom::Start(dst))?;
            self.storage.write_all(&buf[..n])?;
            src += n as u64;
            dst += n as u64;
        }
        self.storage.set_storage_len(end - len)?;
        if self.header.has_length() {
            self.header.file_length = end - len;
        }
        self.counters.add_removed();
        debug!(offset, len, "packet removed");
        self.flush()
    }

    fn version(&self) -> Vita49Version {
        self.options.version
    }
}

/// Reads until `buf` is full or the reader is exhausted.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
