//! Codec Tests
//!
//! Tests for request encoding, response decoding and the code tables.

use std::io::{Cursor, Read};

use bytes::Bytes;
use memsiege::protocol::{
    decode_response, encode_request, encode_response, length_prefix, ByteSource, Code, Command,
    Opcode, ReaderSource, Response, Status, READ_CHUNK_SIZE,
};
use memsiege::SiegeError;

// =============================================================================
// Helper Functions
// =============================================================================

fn source(bytes: &[u8]) -> ReaderSource<Cursor<Vec<u8>>> {
    ReaderSource::new(Cursor::new(bytes.to_vec()))
}

fn decode(bytes: &[u8]) -> memsiege::Result<Response> {
    decode_response(&mut source(bytes))
}

/// A reader that hands out at most `chunk` bytes per read call
struct Trickle {
    data: Cursor<Vec<u8>>,
    chunk: usize,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.chunk);
        self.data.read(&mut buf[..n])
    }
}

/// Wraps a source and remembers the largest buffer a decoder asked for
struct Recording<S> {
    inner: S,
    largest: usize,
}

impl<S: ByteSource> ByteSource for Recording<S> {
    fn receive_exact(&mut self, buf: &mut [u8]) -> memsiege::Result<()> {
        self.largest = self.largest.max(buf.len());
        self.inner.receive_exact(buf)
    }

    fn receive_optional(&mut self, buf: &mut [u8]) -> memsiege::Result<bool> {
        self.largest = self.largest.max(buf.len());
        self.inner.receive_optional(buf)
    }
}

fn recording(bytes: &[u8]) -> Recording<ReaderSource<Cursor<Vec<u8>>>> {
    Recording {
        inner: source(bytes),
        largest: 0,
    }
}

fn ok_frame_header(len: u32) -> Vec<u8> {
    let mut frame = vec![101];
    frame.extend_from_slice(&len.to_be_bytes());
    frame
}

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_wire_format_put() {
    let encoded = encode_request(Opcode::Put, &[b"key".as_slice(), b"value".as_slice()]).unwrap();

    // Expected: [11][0 0 0 3][k e y][0 0 0 5][v a l u e]
    assert_eq!(encoded[0], 11);
    assert_eq!(&encoded[1..5], &[0x00, 0x00, 0x00, 0x03]);
    assert_eq!(&encoded[5..8], b"key");
    assert_eq!(&encoded[8..12], &[0x00, 0x00, 0x00, 0x05]);
    assert_eq!(&encoded[12..17], b"value");
    assert_eq!(encoded.len(), 17);
}

#[test]
fn test_wire_format_keyed_commands() {
    for (opcode, byte) in [(Opcode::Get, 13u8), (Opcode::Del, 12), (Opcode::Take, 14)] {
        let encoded = encode_request(opcode, &[b"test".as_slice()]).unwrap();
        assert_eq!(
            &encoded[..],
            &[byte, 0x00, 0x00, 0x00, 0x04, b't', b'e', b's', b't'],
            "{} frame mismatch",
            opcode
        );
    }
}

#[test]
fn test_wire_format_stats() {
    let encoded = encode_request::<&[u8]>(Opcode::Stats, &[]).unwrap();
    assert_eq!(&encoded[..], &[21]);
}

#[test]
fn test_length_prefix_is_big_endian() {
    let value = vec![b'x'; 0x0102_03];
    let encoded = encode_request(Opcode::Put, &[b"k".as_slice(), value.as_slice()]).unwrap();

    // key frame: opcode + 4 + 1, then value length
    assert_eq!(&encoded[6..10], &[0x00, 0x01, 0x02, 0x03]);
    assert_eq!(encoded.len(), 1 + 4 + 1 + 4 + value.len());
}

#[test]
fn test_encode_binary_arguments() {
    // Arguments may contain protocol bytes and NULs
    let key: Vec<u8> = vec![0x00, 101, 0xFF, 11];
    let value: Vec<u8> = (0..=255).collect();
    let encoded = encode_request(Opcode::Put, &[key.as_slice(), value.as_slice()]).unwrap();

    assert_eq!(&encoded[5..9], key.as_slice());
    assert_eq!(&encoded[9..13], &256u32.to_be_bytes());
    assert_eq!(&encoded[13..], value.as_slice());
}

#[test]
fn test_encode_empty_arguments() {
    let encoded = encode_request(Opcode::Put, &[b"".as_slice(), b"".as_slice()]).unwrap();
    assert_eq!(&encoded[..], &[11, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_encoding_is_deterministic() {
    let a = encode_request(Opcode::Get, &[b"same"]).unwrap();
    let b = encode_request(Opcode::Get, &[b"same"]).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_command_encode_matches_encode_request() {
    let command = Command::put(Bytes::from_static(b"k"), Bytes::from_static(b"v"));
    let direct = encode_request(Opcode::Put, &[b"k", b"v"]).unwrap();
    assert_eq!(command.encode().unwrap(), direct);
    assert_eq!(command.payload_len(), 2);
}

// =============================================================================
// Arity Tests
// =============================================================================

#[test]
fn test_put_with_one_argument_fails() {
    let result = encode_request(Opcode::Put, &[b"a"]);
    match result {
        Err(SiegeError::ArgumentCount { command, expected, got }) => {
            assert_eq!(command, "PUT");
            assert_eq!(expected, 2);
            assert_eq!(got, 1);
        }
        other => panic!("Expected ArgumentCount, got {:?}", other),
    }
}

#[test]
fn test_get_without_arguments_fails() {
    let result = encode_request::<&[u8]>(Opcode::Get, &[]);
    assert!(matches!(result, Err(SiegeError::ArgumentCount { expected: 1, got: 0, .. })));
}

#[test]
fn test_stats_with_argument_fails() {
    let result = encode_request(Opcode::Stats, &[b"extra"]);
    assert!(matches!(result, Err(SiegeError::ArgumentCount { expected: 0, got: 1, .. })));
}

#[test]
fn test_put_with_two_arguments_succeeds() {
    assert!(encode_request(Opcode::Put, &[b"a", b"b"]).is_ok());
}

#[test]
fn test_command_new_checks_arity() {
    assert!(Command::new(Opcode::Take, vec![]).is_err());
    assert!(Command::new(Opcode::Del, vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")]).is_err());

    let command = Command::new(Opcode::Take, vec![Bytes::from_static(b"k")]).unwrap();
    assert_eq!(command.opcode(), Opcode::Take);
    assert_eq!(command.args(), &[Bytes::from_static(b"k")]);
}

#[test]
fn test_arity_error_is_local() {
    let err = encode_request(Opcode::Put, &[b"a"]).unwrap_err();
    assert!(err.is_local());
    assert!(!err.is_fatal_transport());
}

// =============================================================================
// Code Table Tests
// =============================================================================

#[test]
fn test_every_defined_code_maps_to_its_tag() {
    let expected = [
        (11u8, "PUT"),
        (12, "DEL"),
        (13, "GET"),
        (14, "TAKE"),
        (21, "STATS"),
        (101, "OK"),
        (111, "EINVAL"),
        (112, "ENOTFOUND"),
        (113, "EBINARY"),
        (114, "EBIG"),
        (115, "EUNK"),
    ];

    for (byte, name) in expected {
        let code = Code::from_byte(byte).unwrap_or_else(|| panic!("{} should be defined", byte));
        assert_eq!(code.name(), name);
        assert_eq!(code.as_byte(), byte);
    }
    assert_eq!(Code::ALL.len(), expected.len());
}

#[test]
fn test_undefined_bytes_have_no_code() {
    let defined: Vec<u8> = Code::ALL.iter().map(|c| c.as_byte()).collect();
    for byte in 0..=u8::MAX {
        if !defined.contains(&byte) {
            assert!(Code::from_byte(byte).is_none(), "byte {} should be undefined", byte);
        }
    }
}

#[test]
fn test_request_and_response_spaces_are_disjoint() {
    for op in Opcode::ALL {
        assert!(Status::from_byte(op as u8).is_none());
    }
    for status in Status::ALL {
        assert!(Opcode::from_byte(status as u8).is_none());
    }
}

#[test]
fn test_opcode_parse_is_case_insensitive() {
    assert_eq!("put".parse::<Opcode>().unwrap(), Opcode::Put);
    assert_eq!("Take".parse::<Opcode>().unwrap(), Opcode::Take);
    assert_eq!("STATS".parse::<Opcode>().unwrap(), Opcode::Stats);

    match "incr".parse::<Opcode>() {
        Err(SiegeError::UnknownCommand(name)) => assert_eq!(name, "INCR"),
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
}

// =============================================================================
// Response Decoding Tests
// =============================================================================

#[test]
fn test_decode_bare_ok() {
    assert_eq!(decode(&[101]).unwrap(), Response::Ok(None));
}

#[test]
fn test_decode_ok_with_content() {
    let bytes = [101, 0x00, 0x00, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o'];
    let response = decode(&bytes).unwrap();

    assert_eq!(response, Response::Ok(Some(Bytes::from_static(b"hello"))));
    assert_eq!(&response.content().unwrap()[..], b"hello");
}

#[test]
fn test_decode_ok_with_empty_content_differs_from_bare_ok() {
    let response = decode(&[101, 0, 0, 0, 0]).unwrap();
    assert_eq!(response, Response::Ok(Some(Bytes::new())));
    assert_ne!(response, Response::Ok(None));
}

#[test]
fn test_decode_error_statuses() {
    let expected = [
        (111u8, Response::Einval),
        (112, Response::Enotfound),
        (113, Response::Ebinary),
        (114, Response::Ebig),
        (115, Response::Eunk),
    ];
    for (byte, response) in expected {
        assert_eq!(decode(&[byte]).unwrap(), response);
    }
}

#[test]
fn test_error_status_reads_single_byte() {
    // Bytes after an error status belong to the next response
    let mut src = source(&[112, 101, 0, 0, 0, 1, b'x']);

    assert_eq!(decode_response(&mut src).unwrap(), Response::Enotfound);
    assert_eq!(
        decode_response(&mut src).unwrap(),
        Response::Ok(Some(Bytes::from_static(b"x")))
    );
}

#[test]
fn test_unknown_status_fails() {
    for byte in [0u8, 1, 100, 102, 116, 255] {
        match decode(&[byte]) {
            Err(SiegeError::UnknownStatus(b)) => assert_eq!(b, byte),
            other => panic!("Expected UnknownStatus for {}, got {:?}", byte, other),
        }
    }
}

#[test]
fn test_request_opcode_is_not_a_response_status() {
    for op in Opcode::ALL {
        assert!(matches!(decode(&[op as u8]), Err(SiegeError::UnknownStatus(_))));
    }
}

#[test]
fn test_truncated_content() {
    let bytes = [101, 0x00, 0x00, 0x00, 0x05, b'h', b'e', b'l'];
    match decode(&bytes) {
        Err(SiegeError::TruncatedResponse { expected, received }) => {
            assert_eq!(expected, 5);
            assert_eq!(received, 3);
        }
        other => panic!("Expected TruncatedResponse, got {:?}", other),
    }
}

#[test]
fn test_truncated_length_prefix() {
    let result = decode(&[101, 0x00, 0x00]);
    assert!(matches!(
        result,
        Err(SiegeError::TruncatedResponse { expected: 4, received: 2 })
    ));
}

#[test]
fn test_huge_length_prefix_reads_in_bounded_chunks() {
    // Five bytes claiming 4 GiB of content, then end of stream
    let mut src = recording(&ok_frame_header(u32::MAX));

    let result = decode_response(&mut src);

    assert!(matches!(
        result,
        Err(SiegeError::TruncatedResponse { expected, received: 0 }) if expected == u32::MAX as usize
    ));
    assert!(src.largest <= READ_CHUNK_SIZE, "asked for {} bytes at once", src.largest);
}

#[test]
fn test_content_larger_than_read_chunk() {
    let content: Vec<u8> = (0..3 * READ_CHUNK_SIZE + 17).map(|i| (i % 253) as u8).collect();
    let mut frame = ok_frame_header(content.len() as u32);
    frame.extend_from_slice(&content);
    let mut src = recording(&frame);

    let response = decode_response(&mut src).unwrap();

    assert_eq!(&response.content().unwrap()[..], content.as_slice());
    assert_eq!(src.largest, READ_CHUNK_SIZE);
}

#[test]
fn test_truncated_content_across_chunks() {
    let claimed = 2 * READ_CHUNK_SIZE;
    let mut frame = ok_frame_header(claimed as u32);
    frame.extend(std::iter::repeat(b'c').take(READ_CHUNK_SIZE + 10));

    match decode(&frame) {
        Err(SiegeError::TruncatedResponse { expected, received }) => {
            assert_eq!(expected, claimed);
            assert_eq!(received, READ_CHUNK_SIZE + 10);
        }
        other => panic!("Expected TruncatedResponse, got {:?}", other),
    }
}

#[test]
fn test_empty_source_is_closed_connection() {
    let result = decode(&[]);
    assert!(matches!(
        result,
        Err(SiegeError::ConnectionClosed { expected: 1, received: 0 })
    ));
}

#[test]
fn test_decode_leaves_trailing_bytes() {
    let mut bytes = vec![101, 0, 0, 0, 2, b'h', b'i'];
    bytes.extend_from_slice(b"rest");
    let mut src = source(&bytes);

    decode_response(&mut src).unwrap();

    let mut rest = [0u8; 4];
    src.receive_exact(&mut rest).unwrap();
    assert_eq!(&rest, b"rest");
}

#[test]
fn test_decode_frame_spanning_many_reads() {
    let content: Vec<u8> = (0..1000).map(|i| (i % 251) as u8).collect();
    let frame = encode_response(&Response::Ok(Some(Bytes::from(content.clone())))).unwrap();

    let mut src = ReaderSource::new(Trickle {
        data: Cursor::new(frame.to_vec()),
        chunk: 3,
    });
    let response = decode_response(&mut src).unwrap();
    assert_eq!(&response.content().unwrap()[..], content.as_slice());
}

#[test]
fn test_decode_back_to_back_responses() {
    let responses = vec![
        Response::Ok(Some(Bytes::from_static(b"data"))),
        Response::Enotfound,
        Response::Ebig,
        Response::Ok(Some(Bytes::new())),
        Response::Einval,
    ];

    let mut buffer = Vec::new();
    for resp in &responses {
        buffer.extend_from_slice(&encode_response(resp).unwrap());
    }

    let mut src = source(&buffer);
    for expected in &responses {
        assert_eq!(&decode_response(&mut src).unwrap(), expected);
    }
}

// =============================================================================
// Response Encoding Tests
// =============================================================================

#[test]
fn test_wire_format_response_ok() {
    let encoded = encode_response(&Response::Ok(Some(Bytes::from_static(b"hi")))).unwrap();
    assert_eq!(&encoded[..], &[101, 0x00, 0x00, 0x00, 0x02, b'h', b'i']);
}

#[test]
fn test_non_ok_responses_are_one_byte() {
    for status in Status::ALL {
        let encoded = encode_response(&Response::from_status(status)).unwrap();
        assert_eq!(&encoded[..], &[status as u8]);
    }
}

#[test]
fn test_length_prefix_bounds() {
    assert_eq!(length_prefix(0).unwrap(), 0);
    assert_eq!(length_prefix(u32::MAX as usize).unwrap(), u32::MAX);

    #[cfg(target_pointer_width = "64")]
    {
        let len = u32::MAX as usize + 1;
        let err = length_prefix(len).unwrap_err();
        assert!(matches!(err, SiegeError::ArgumentTooLarge { len: l } if l == len));
        assert!(err.is_local());
    }
}
