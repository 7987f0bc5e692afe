use crate::clipboard::ClipboardContent;

/// Number of leading image bytes fed into the bulk-pass hash.
pub const IMAGE_HASH_PREFIX_LEN: usize = 1024;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Hash-set key for history-wide duplicate lookup.
///
/// Image keys only cover the first [`IMAGE_HASH_PREFIX_LEN`] bytes, so two
/// images sharing a key are candidates, not proven duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKey {
    Text(String),
    Image { len: usize, prefix_hash: u32 },
    FilePaths(Vec<String>),
}

impl ContentKey {
    pub fn of(content: &ClipboardContent) -> Self {
        match content {
            ClipboardContent::Text(text) => ContentKey::Text(text.clone()),
            ClipboardContent::Image(bytes) => {
                let prefix = &bytes[..bytes.len().min(IMAGE_HASH_PREFIX_LEN)];
                ContentKey::Image {
                    len: bytes.len(),
                    prefix_hash: fnv1a_32(prefix),
                }
            }
            ClipboardContent::FilePaths(paths) => {
                let mut sorted = paths.clone();
                sorted.sort_unstable();
                ContentKey::FilePaths(sorted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn image_key_ignores_bytes_past_prefix() {
        let mut a = vec![1u8; 2048];
        let mut b = vec![1u8; 2048];
        a[2000] = 9;
        b[2000] = 10;
        assert_eq!(
            ContentKey::of(&ClipboardContent::Image(Bytes::from(a))),
            ContentKey::of(&ClipboardContent::Image(Bytes::from(b)))
        );
    }

    #[test]
    fn file_path_key_is_sorted() {
        let a = ContentKey::of(&ClipboardContent::FilePaths(vec!["b".into(), "a".into()]));
        let b = ContentKey::of(&ClipboardContent::FilePaths(vec!["a".into(), "b".into()]));
        assert_eq!(a, b);
    }
}
