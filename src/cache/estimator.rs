//! Size Estimator Module
//!
//! Estimates the byte footprint of values for memory accounting, with
//! presets for image and video resource URIs.

use std::sync::Arc;

/// Estimates how many bytes a value accounts for.
///
/// Estimators are expected to be pure. An error aborts the `set` that asked
/// for the estimate.
pub trait SizeEstimator<V>: Send + Sync {
    fn estimate(&self, value: &V) -> anyhow::Result<usize>;
}

impl<V, F> SizeEstimator<V> for F
where
    F: Fn(&V) -> anyhow::Result<usize> + Send + Sync,
{
    fn estimate(&self, value: &V) -> anyhow::Result<usize> {
        self(value)
    }
}

// == Byte Length ==
/// Values whose footprint is their byte length.
pub trait ByteSize {
    fn byte_len(&self) -> usize;
}

impl ByteSize for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for str {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for Box<[u8]> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl<T: ByteSize + ?Sized> ByteSize for Arc<T> {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}

/// Default estimator: byte length of the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteLenEstimator;

impl<V: ByteSize> SizeEstimator<V> for ByteLenEstimator {
    fn estimate(&self, value: &V) -> anyhow::Result<usize> {
        Ok(value.byte_len())
    }
}

// == Media Presets ==
const KIB: usize = 1024;
const MIB: usize = 1024 * KIB;

/// Estimator for resource URIs that charges the presumed payload class
/// named in the URI rather than the URI string itself.
///
/// Rules are matched in order against the lowercased URI; the first rule
/// whose marker appears wins, otherwise `fallback` is charged. The URI's own
/// length is always added on top.
#[derive(Debug, Clone)]
pub struct MediaEstimator {
    rules: Vec<(&'static str, usize)>,
    fallback: usize,
}

impl MediaEstimator {
    pub fn new(rules: Vec<(&'static str, usize)>, fallback: usize) -> Self {
        Self { rules, fallback }
    }

    /// Preset for image URIs (thumbnails up to full-size renditions).
    pub fn image() -> Self {
        Self::new(
            vec![
                ("thumb", 20 * KIB),
                ("small", 20 * KIB),
                ("medium", 100 * KIB),
                ("large", 500 * KIB),
                ("full", 500 * KIB),
                ("original", MIB),
            ],
            200 * KIB,
        )
    }

    /// Preset for video URIs keyed by resolution class.
    pub fn video() -> Self {
        Self::new(
            vec![
                ("2160p", 25 * MIB),
                ("4k", 25 * MIB),
                ("1080p", 10 * MIB),
                ("hd", 10 * MIB),
                ("720p", 5 * MIB),
                ("480p", 2 * MIB),
                ("low", 2 * MIB),
                ("preview", MIB),
            ],
            5 * MIB,
        )
    }

    pub fn estimate_uri(&self, uri: &str) -> usize {
        let lowered = uri.to_ascii_lowercase();
        let payload = self
            .rules
            .iter()
            .find(|(marker, _)| lowered.contains(marker))
            .map(|(_, bytes)| *bytes)
            .unwrap_or(self.fallback);
        payload + uri.len()
    }
}

impl<V: AsRef<str>> SizeEstimator<V> for MediaEstimator {
    fn estimate(&self, value: &V) -> anyhow::Result<usize> {
        Ok(self.estimate_uri(value.as_ref()))
    }
}
