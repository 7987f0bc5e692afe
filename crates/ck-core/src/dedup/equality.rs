use crate::clipboard::{ClipboardContent, ClipboardEntry};

/// Content equality used by every duplicate check.
///
/// Text compares exactly, images compare length then bytes, file path lists
/// compare as multisets.
pub fn content_equals(a: &ClipboardContent, b: &ClipboardContent) -> bool {
    match (a, b) {
        (ClipboardContent::Text(a), ClipboardContent::Text(b)) => a == b,
        (ClipboardContent::Image(a), ClipboardContent::Image(b)) => {
            a.len() == b.len() && a.as_ref() == b.as_ref()
        }
        (ClipboardContent::FilePaths(a), ClipboardContent::FilePaths(b)) => file_paths_equal(a, b),
        _ => false,
    }
}

pub fn entries_equal(a: &ClipboardEntry, b: &ClipboardEntry) -> bool {
    content_equals(&a.content, &b.content)
}

/// Order independent comparison of two path lists.
pub fn file_paths_equal(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn paths(items: &[&str]) -> ClipboardContent {
        ClipboardContent::FilePaths(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn file_paths_are_order_independent() {
        assert!(content_equals(&paths(&["a", "b"]), &paths(&["b", "a"])));
        assert!(!content_equals(&paths(&["a", "b"]), &paths(&["a", "c"])));
    }

    #[test]
    fn file_paths_compare_as_multisets() {
        assert!(!content_equals(&paths(&["a", "a", "b"]), &paths(&["a", "b", "b"])));
        assert!(!content_equals(&paths(&["a"]), &paths(&["a", "a"])));
    }

    #[test]
    fn text_is_exact() {
        let a = ClipboardContent::Text("Hello".into());
        assert!(content_equals(&a, &ClipboardContent::Text("Hello".into())));
        assert!(!content_equals(&a, &ClipboardContent::Text("hello".into())));
        assert!(!content_equals(&a, &ClipboardContent::Text("Hello ".into())));
    }

    #[test]
    fn images_compare_every_byte() {
        let a = ClipboardContent::Image(Bytes::from(vec![7u8; 4096]));
        let mut tail = vec![7u8; 4096];
        tail[4095] = 8;
        assert!(content_equals(&a, &ClipboardContent::Image(Bytes::from(vec![7u8; 4096]))));
        assert!(!content_equals(&a, &ClipboardContent::Image(Bytes::from(tail))));
    }

    #[test]
    fn different_types_never_match() {
        assert!(!content_equals(
            &ClipboardContent::Text("a".into()),
            &paths(&["a"])
        ));
    }
}
