//! ipscan6-banner — C5: per-port probe payloads and banner post-processing.
//!
//! The core treats this module as opaque: banners never affect the
//! open/closed classification (spec §4.5). `service_type` only exists to
//! enrich an already-open `ScanResult` for the output sink.

mod service;

pub use service::service_type;

/// Caps imposed on a captured banner before it is handed to an output sink.
pub const MAX_BANNER_LEN: usize = 4096;

/// Bytes to send after a SYN/ACK to elicit a banner from a well-known
/// service port, or `None` for ports where only a passive read makes sense
/// (SSH, FTP, SMTP and friends announce themselves unprompted).
#[must_use]
pub fn get_query(port: u16) -> Option<&'static [u8]> {
    match port {
        80 | 8080 | 8000 | 8888 | 3000 | 5000 | 9000 => Some(b"GET / HTTP/1.0\r\n\r\n"),
        443 | 8443 => None,
        _ => None,
    }
}

/// Trims a captured banner in place: caps length at `MAX_BANNER_LEN`, strips
/// trailing CR/LF, and redacts embedded NULs so the bytes are safe to hand a
/// text-oriented output sink.
pub fn postprocess(buf: &mut Vec<u8>) {
    buf.truncate(MAX_BANNER_LEN);
    while matches!(buf.last(), Some(b'\r' | b'\n')) {
        buf.pop();
    }
    for b in buf.iter_mut() {
        if *b == 0 {
            *b = b'.';
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_known_http_ports() {
        assert!(get_query(80).is_some());
        assert!(get_query(8080).is_some());
    }

    #[test]
    fn query_none_for_passive_ports() {
        assert_eq!(get_query(22), None);
        assert_eq!(get_query(443), None);
    }

    #[test]
    fn postprocess_strips_trailing_newlines() {
        let mut buf = b"hello world\r\n".to_vec();
        postprocess(&mut buf);
        assert_eq!(buf, b"hello world");
    }

    #[test]
    fn postprocess_caps_length() {
        let mut buf = vec![b'a'; MAX_BANNER_LEN + 500];
        postprocess(&mut buf);
        assert_eq!(buf.len(), MAX_BANNER_LEN);
    }

    #[test]
    fn postprocess_redacts_nuls() {
        let mut buf = vec![b'a', 0, b'b'];
        postprocess(&mut buf);
        assert_eq!(buf, vec![b'a', b'.', b'b']);
    }
}
