//! Unit tests for the engine line codec.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use simdeck::engine::codec::{EngineCodec, MAX_LINE_BYTES};

#[test]
fn complete_line_is_decoded_without_terminator() {
    let mut codec = EngineCodec::new();
    let mut buf = BytesMut::from("cycle 1\n");

    assert_eq!(codec.decode(&mut buf).expect("decode"), Some("cycle 1".to_owned()));
    assert!(buf.is_empty());
}

#[test]
fn partial_line_is_buffered_until_newline() {
    let mut codec = EngineCodec::new();
    let mut buf = BytesMut::from("{\"registers\":");

    assert_eq!(codec.decode(&mut buf).expect("decode"), None);

    buf.extend_from_slice(b"[]}\n");
    assert_eq!(
        codec.decode(&mut buf).expect("decode"),
        Some("{\"registers\":[]}".to_owned())
    );
}

#[test]
fn batched_lines_decode_one_at_a_time() {
    let mut codec = EngineCodec::new();
    let mut buf = BytesMut::from("a\nb\n");

    assert_eq!(codec.decode(&mut buf).expect("first"), Some("a".to_owned()));
    assert_eq!(codec.decode(&mut buf).expect("second"), Some("b".to_owned()));
    assert_eq!(codec.decode(&mut buf).expect("drained"), None);
}

#[test]
fn crlf_terminator_is_stripped() {
    let mut codec = EngineCodec::new();
    let mut buf = BytesMut::from("done\r\n");

    assert_eq!(codec.decode(&mut buf).expect("decode"), Some("done".to_owned()));
}

#[test]
fn over_long_line_is_discarded_and_next_line_survives() {
    let mut codec = EngineCodec::with_max_length(16);
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&[b'x'; 64]);
    buf.extend_from_slice(b"\nshort\n");

    assert_eq!(codec.decode(&mut buf).expect("decode"), Some("short".to_owned()));
    assert_eq!(codec.discarded(), 1);
}

#[test]
fn default_limit_accepts_lines_at_the_limit() {
    let mut codec = EngineCodec::new();
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&vec![b'y'; MAX_LINE_BYTES]);
    buf.extend_from_slice(b"\n");

    let line = codec.decode(&mut buf).expect("decode").expect("line");
    assert_eq!(line.len(), MAX_LINE_BYTES);
    assert_eq!(codec.discarded(), 0);
}

#[test]
fn invalid_utf8_is_replaced_lossily() {
    let mut codec = EngineCodec::new();
    let mut buf = BytesMut::from(&b"pc=\xff\n"[..]);

    assert_eq!(
        codec.decode(&mut buf).expect("decode"),
        Some("pc=\u{fffd}".to_owned())
    );
}

#[test]
fn trailing_unterminated_line_is_emitted_at_eof() {
    let mut codec = EngineCodec::new();
    let mut buf = BytesMut::from("last words");

    assert_eq!(codec.decode(&mut buf).expect("decode"), None);
    assert_eq!(
        codec.decode_eof(&mut buf).expect("decode_eof"),
        Some("last words".to_owned())
    );
}

#[test]
fn encode_appends_newline() {
    let mut codec = EngineCodec::new();
    let mut dst = BytesMut::new();

    codec.encode("N", &mut dst).expect("encode");
    assert_eq!(&dst[..], b"N\n");
}
