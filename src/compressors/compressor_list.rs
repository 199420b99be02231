use sorted_vector_map::SortedVectorMap;

use super::{Compressor, CompressorID, NoneCompressor};

/// A registry of compressors keyed by their trailer ID byte.
///
/// `TableBuilder` consults this to turn a configured compression selection into an actual
/// codec; it is never itself persisted.
#[derive(Debug)]
pub struct CompressorList(SortedVectorMap<u8, Box<dyn Compressor>>);

impl Default for CompressorList {
    fn default() -> Self {
        Self::with_default_compressors()
    }
}

impl CompressorList {
    #[must_use]
    pub fn new_without_compressors() -> Self {
        let mut list = Self(SortedVectorMap::new());
        list.add(NoneCompressor);
        list
    }

    /// A list containing [`NoneCompressor`] plus whichever optional codecs are enabled via
    /// Cargo features.
    #[must_use]
    pub fn with_default_compressors() -> Self {
        let mut list = Self::new_without_compressors();
        #[cfg(feature = "snappy-compressor")]
        list.add_snappy_compressor();
        #[cfg(feature = "zstd-compressor")]
        list.add_zstd_compressor();
        list
    }

    #[cfg(feature = "snappy-compressor")]
    pub fn add_snappy_compressor(&mut self) {
        self.add(super::SnappyCompressor);
    }

    #[cfg(feature = "zstd-compressor")]
    pub fn add_zstd_compressor(&mut self) {
        self.add(super::ZstdCompressor::default());
    }

    /// Set the provided `compressor`'s ID to refer to that compressor. Returns `true` unless
    /// this overwrote a previously-set compressor with the same ID.
    pub fn add<C: Compressor + CompressorID + 'static>(&mut self, compressor: C) -> bool {
        self.set_with_id(C::ID, compressor)
    }

    /// Set the given `id` to refer to the provided `compressor`. Returns `true` unless this
    /// overwrote a previously-set compressor with the same ID.
    pub fn set_with_id<C: Compressor + 'static>(&mut self, id: u8, compressor: C) -> bool {
        self.0.insert(id, Box::new(compressor)).is_none()
    }

    #[must_use]
    pub fn is_set(&self, id: u8) -> bool {
        self.0.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: u8) -> Option<&dyn Compressor> {
        self.0.get(&id).map(|compressor| &**compressor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_list_always_has_none_compressor() {
        let list = CompressorList::with_default_compressors();
        assert!(list.is_set(super::super::NO_COMPRESSION));
    }

    #[test]
    fn missing_id_returns_none() {
        let list = CompressorList::new_without_compressors();
        assert!(list.get(200).is_none());
    }
}
