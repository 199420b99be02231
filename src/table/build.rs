use std::cmp::Ordering;

use crate::block::BlockBuilder;
use crate::comparator::{MetaindexComparator, TableComparator};
use crate::compressors::{CompressorList, NO_COMPRESSION, SNAPPY_COMPRESSION, ZSTD_COMPRESSION};
use crate::error::{Status, StatusResult};
use crate::filter_block::FilterBuilder;
use crate::filters::TableFilterPolicy;
use crate::sink::WritableFile;

use super::format::{mask_checksum, BlockHandle, TableFooter, BLOCK_TRAILER_LEN, FILTER_META_PREFIX};
use super::options::{CompressionKind, WriteTableOptions};

/// Builds a single immutable sorted table, streaming entries straight to `File` as it goes.
///
/// A builder is constructed over one already-open append sink and is good for exactly one
/// table: after either [`finish`](Self::finish) or [`abandon`](Self::abandon) it is consumed,
/// so there's no reuse-across-files lifecycle to track.
#[derive(Debug)]
pub struct TableBuilder<File, TableCmp, Policy> {
    file: File,
    compressor_list: CompressorList,
    compression: CompressionKind,
    comparator: TableCmp,
    data_block: BlockBuilder<TableCmp>,
    index_block: BlockBuilder<TableCmp>,
    filter_builder: Option<FilterBuilder<Policy>>,
    block_size: usize,
    offset: u64,
    num_entries: usize,
    last_key: Vec<u8>,
    pending_index_entry: bool,
    pending_handle: BlockHandle,
    status: StatusResult<()>,
    closed: bool,
}

impl<File, TableCmp, Policy> TableBuilder<File, TableCmp, Policy>
where
    File: WritableFile,
    TableCmp: TableComparator,
    Policy: TableFilterPolicy,
{
    pub fn new(file: File, options: WriteTableOptions<TableCmp, Policy>) -> Self {
        let filter_builder = options.filter_policy.map(FilterBuilder::new);
        Self {
            file,
            compressor_list: CompressorList::with_default_compressors(),
            compression: options.compression,
            comparator: options.comparator,
            data_block: BlockBuilder::new(options.block_restart_interval),
            index_block: BlockBuilder::new(1),
            filter_builder,
            block_size: options.block_size,
            offset: 0,
            num_entries: 0,
            last_key: Vec::new(),
            pending_index_entry: false,
            pending_handle: BlockHandle::default(),
            status: Ok(()),
            closed: false,
        }
    }

    #[must_use]
    pub fn num_entries(&self) -> usize {
        self.num_entries
    }

    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.offset
    }

    pub fn status(&self) -> StatusResult<()> {
        self.status.clone()
    }

    /// Reject an incompatible comparator swap; otherwise replace the compression and block-size
    /// settings for subsequent blocks. Restart intervals, once chosen, are not changed mid-table,
    /// since doing so would require discarding whatever is already buffered in `data_block`.
    pub fn change_options(&mut self, new_options: WriteTableOptions<TableCmp, Policy>) -> StatusResult<()> {
        if new_options.comparator.id() != self.comparator.id() {
            return Err(Status::invalid_argument("change_options: comparator id mismatch"));
        }
        self.comparator = new_options.comparator;
        self.compression = new_options.compression;
        self.block_size = new_options.block_size;
        Ok(())
    }

    /// Add a new entry. `key` must compare strictly greater than every previously added key.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> StatusResult<()> {
        assert!(!self.closed, "add() called on a closed table builder");
        self.status.clone()?;

        assert!(
            self.num_entries == 0 || self.comparator.cmp(key, &self.last_key) == Ordering::Greater,
            "keys must be added to a table builder in strictly increasing order",
        );

        if self.pending_index_entry {
            assert!(self.data_block.empty(), "pending index entry implies an empty data block");
            self.comparator.find_short_separator(&mut self.last_key, key);

            let mut handle_bytes = Vec::new();
            self.pending_handle.encode_to(&mut handle_bytes);
            let separator = self.last_key.clone();
            self.index_block.add_entry(&self.comparator, &separator, &handle_bytes);
            self.pending_index_entry = false;
        }

        if let Some(filter_builder) = &mut self.filter_builder {
            filter_builder.add_key(key);
        }

        self.last_key.clear();
        self.last_key.extend_from_slice(key);
        self.num_entries += 1;
        self.data_block.add_entry(&self.comparator, key, value);

        if self.data_block.current_size_estimate() >= self.block_size {
            self.flush()?;
        }

        Ok(())
    }

    /// Flush the current data block, if non-empty, recording it as a pending index entry.
    pub fn flush(&mut self) -> StatusResult<()> {
        assert!(!self.closed, "flush() called on a closed table builder");
        if self.data_block.empty() || self.status.is_err() {
            return self.status.clone();
        }
        assert!(!self.pending_index_entry, "flush() called while an index entry is already pending");

        let raw = self.data_block.finish().to_vec();
        match self.write_block(&raw) {
            Ok(handle) => self.pending_handle = handle,
            Err(e) => {
                self.status = Err(e.clone());
                return Err(e);
            }
        }
        self.data_block.reset();
        self.pending_index_entry = true;

        if let Err(e) = self.file.flush() {
            let status = Status::from(e);
            self.status = Err(status.clone());
            return Err(status);
        }

        if let Some(filter_builder) = &mut self.filter_builder {
            let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
            filter_builder.start_block(offset);
        }

        Ok(())
    }

    /// Flush any pending data, then write the filter, metaindex, and index blocks plus the
    /// footer, and return the total number of bytes written.
    #[expect(clippy::missing_panics_doc, reason = "Vec<u8> encoding never panics")]
    pub fn finish(mut self) -> StatusResult<u64> {
        let _ = self.flush();

        let mut filter_handle = None;
        if self.status.is_ok() {
            if let Some(filter_builder) = &mut self.filter_builder {
                let raw = filter_builder.finish().to_vec();
                let mut handle = BlockHandle::default();
                match self.write_raw_block(&raw, NO_COMPRESSION, &mut handle) {
                    Ok(()) => filter_handle = Some(handle),
                    Err(e) => self.status = Err(e),
                }
            }
        }

        let mut metaindex_handle = BlockHandle::default();
        if self.status.is_ok() {
            let meta_cmp = MetaindexComparator;
            let mut metaindex_block: BlockBuilder<MetaindexComparator> = BlockBuilder::new(1);
            if let (Some(handle), Some(filter_builder)) = (filter_handle, &self.filter_builder) {
                let mut key = FILTER_META_PREFIX.to_vec();
                key.extend_from_slice(filter_builder.policy().name());
                let mut handle_bytes = Vec::new();
                handle.encode_to(&mut handle_bytes);
                metaindex_block.add_entry(&meta_cmp, &key, &handle_bytes);
            }
            let raw = metaindex_block.finish().to_vec();
            match self.write_block(&raw) {
                Ok(handle) => metaindex_handle = handle,
                Err(e) => self.status = Err(e),
            }
        }

        let mut index_handle = BlockHandle::default();
        if self.status.is_ok() {
            if self.pending_index_entry {
                self.comparator.find_short_successor(&mut self.last_key);
                let mut handle_bytes = Vec::new();
                self.pending_handle.encode_to(&mut handle_bytes);
                let successor = self.last_key.clone();
                self.index_block.add_entry(&self.comparator, &successor, &handle_bytes);
                self.pending_index_entry = false;
            }
            let raw = self.index_block.finish().to_vec();
            match self.write_block(&raw) {
                Ok(handle) => index_handle = handle,
                Err(e) => self.status = Err(e),
            }
        }

        self.closed = true;
        self.status.clone()?;

        let footer = TableFooter { metaindex_handle, index_handle };
        let mut footer_bytes = Vec::new();
        footer.encode_to(&mut footer_bytes);
        self.file.write_all(&footer_bytes).map_err(Status::from)?;
        #[expect(clippy::as_conversions, reason = "footer length is a small fixed constant")]
        {
            self.offset += footer_bytes.len() as u64;
        }
        self.file.sync_data().map_err(Status::from)?;

        Ok(self.offset)
    }

    /// Abandon the table, leaving whatever was already written in place for the caller to
    /// discard. No further bytes are written.
    pub fn abandon(mut self) {
        self.closed = true;
    }

    /// Compress `raw` per the configured codec, falling back to storing it uncompressed when
    /// the codec saves less than 12.5%, is unavailable, or fails outright, then append it.
    fn write_block(&mut self, raw: &[u8]) -> StatusResult<BlockHandle> {
        let (compressor_id, payload) = self.compress(raw);
        let mut handle = BlockHandle::default();
        self.write_raw_block(&payload, compressor_id, &mut handle)?;
        Ok(handle)
    }

    fn compress(&self, raw: &[u8]) -> (u8, Vec<u8>) {
        let compressor_id = match self.compression {
            CompressionKind::None => return (NO_COMPRESSION, raw.to_vec()),
            CompressionKind::Snappy => SNAPPY_COMPRESSION,
            CompressionKind::Zstd => ZSTD_COMPRESSION,
        };

        let Some(compressor) = self.compressor_list.get(compressor_id) else {
            return (NO_COMPRESSION, raw.to_vec());
        };

        let mut compressed = Vec::new();
        if compressor.encode_into(raw, &mut compressed).is_err() {
            return (NO_COMPRESSION, raw.to_vec());
        }

        if compressed.len() < raw.len() - raw.len() / 8 {
            (compressor_id, compressed)
        } else {
            (NO_COMPRESSION, raw.to_vec())
        }
    }

    fn write_raw_block(&mut self, payload: &[u8], compressor_id: u8, handle: &mut BlockHandle) -> StatusResult<()> {
        handle.offset = self.offset;
        #[expect(clippy::as_conversions, reason = "payload length fits comfortably in u64")]
        {
            handle.size = payload.len() as u64;
        }

        self.file.write_all(payload).map_err(Status::from)?;

        let crc = crc32c::crc32c_append(crc32c::crc32c(payload), &[compressor_id]);
        let masked = mask_checksum(crc);
        let mut trailer = [0u8; BLOCK_TRAILER_LEN];
        #[expect(clippy::indexing_slicing, reason = "trailer is a fixed-size array of BLOCK_TRAILER_LEN bytes")]
        {
            trailer[0] = compressor_id;
            trailer[1..].copy_from_slice(&masked.to_le_bytes());
        }
        self.file.write_all(&trailer).map_err(Status::from)?;

        #[expect(clippy::as_conversions, reason = "payload length plus trailer fits comfortably in u64")]
        {
            self.offset += payload.len() as u64 + BLOCK_TRAILER_LEN as u64;
        }
        Ok(())
    }
}

impl<File, TableCmp, Policy> Drop for TableBuilder<File, TableCmp, Policy> {
    fn drop(&mut self) {
        // Skip the check while unwinding: `add`/`flush` enforce their ordering contracts via
        // `assert!`, and a builder caught up in that unwind hasn't been closed either way.
        // Without this guard, panicking here during an unwind would abort the process instead
        // of letting the original panic (e.g. from an out-of-order key) propagate normally.
        debug_assert!(
            self.closed || std::thread::panicking(),
            "TableBuilder dropped without calling finish() or abandon()",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::LexicographicComparator;
    use crate::filters::{BloomPolicy, NoFilterPolicy};

    fn no_filter_options() -> WriteTableOptions<LexicographicComparator, NoFilterPolicy> {
        WriteTableOptions::new(LexicographicComparator)
    }

    #[test]
    fn empty_table_has_valid_footer() {
        let builder = TableBuilder::new(Vec::<u8>::new(), no_filter_options());
        let size = builder.finish().unwrap();
        assert!(size >= TableFooter::ENCODED_LENGTH as u64);
    }

    #[test]
    fn single_entry_table_round_trip_offsets() {
        let mut builder = TableBuilder::new(Vec::<u8>::new(), no_filter_options());
        builder.add(b"key", b"value").unwrap();
        assert_eq!(builder.num_entries(), 1);
        let size = builder.finish().unwrap();
        assert!(size > 0);
    }

    #[test]
    fn many_entries_flush_multiple_data_blocks() {
        let options = no_filter_options().with_block_size(256);
        let mut builder = TableBuilder::new(Vec::<u8>::new(), options);
        for i in 0..200 {
            let key = format!("key{i:06}");
            builder.add(key.as_bytes(), b"some-value-payload").unwrap();
        }
        assert_eq!(builder.num_entries(), 200);
        assert!(builder.finish().unwrap() > 0);
    }

    #[test]
    #[should_panic(expected = "strictly increasing order")]
    fn out_of_order_keys_panic() {
        let mut builder = TableBuilder::new(Vec::<u8>::new(), no_filter_options());
        builder.add(b"b", b"1").unwrap();
        let _ = builder.add(b"a", b"2");
    }

    #[test]
    fn change_options_accepts_matching_comparator_id() {
        let mut builder = TableBuilder::new(Vec::<u8>::new(), no_filter_options());
        let new_options = no_filter_options().with_block_size(8192);
        assert!(builder.change_options(new_options).is_ok());
        builder.abandon();
    }

    #[test]
    fn filter_block_is_written_when_policy_present() {
        let options = WriteTableOptions::new(LexicographicComparator).with_filter_policy(BloomPolicy::default());
        let mut builder = TableBuilder::new(Vec::<u8>::new(), options);
        for i in 0..50 {
            let key = format!("k{i:04}");
            builder.add(key.as_bytes(), b"v").unwrap();
        }
        assert!(builder.finish().unwrap() > 0);
    }

    #[test]
    fn abandon_consumes_builder_without_panicking() {
        let mut builder = TableBuilder::new(Vec::<u8>::new(), no_filter_options());
        builder.add(b"a", b"1").unwrap();
        builder.abandon();
    }

    #[test]
    fn random_sorted_key_sets_build_successfully() {
        use rand::Rng;

        let mut rng = rand::rng();
        for _ in 0..20 {
            let num_keys = rng.random_range(0..300);
            let mut keys: Vec<u32> = (0..num_keys).map(|_| rng.random()).collect();
            keys.sort_unstable();
            keys.dedup();

            let options = no_filter_options().with_block_size(rng.random_range(64..2048));
            let mut builder = TableBuilder::new(Vec::<u8>::new(), options);
            for key in &keys {
                let key_bytes = key.to_be_bytes();
                let value_len = rng.random_range(0..64);
                let value: Vec<u8> = (0..value_len).map(|_| rng.random()).collect();
                builder.add(&key_bytes, &value).unwrap();
            }
            assert_eq!(builder.num_entries(), keys.len());
            assert!(builder.finish().unwrap() > 0);
        }
    }
}
