//! Framer behavior over whole byte streams

use podwatch_core::protocol::{encode_frame, FrameResult, Framer, Packet};

fn feed_all(framer: &mut Framer, bytes: &[u8]) -> (Vec<Packet>, Vec<u8>) {
    let mut frames = Vec::new();
    let mut discarded = Vec::new();
    for &b in bytes {
        match framer.feed(b) {
            FrameResult::Incomplete => {}
            FrameResult::Frame(p) => frames.push(p),
            FrameResult::Discarded(d) => discarded.push(d),
        }
    }
    (frames, discarded)
}

#[test]
fn valid_stream_produces_one_frame_per_packet_and_no_discards() {
    let mut bytes = Vec::new();
    let spans = [
        encode_frame(0x00, (0x01, 0x04), &[]),
        encode_frame(0x04, (0x00, 0x14), &[]),
        encode_frame(0x04, (0x00, 0x15), b"MYPOD\x00"),
        encode_frame(0x04, (0x00, 0x1D), &[0, 0, 0x27, 0x10, 0, 0, 0x09, 0xC4, 0x01]),
    ];
    for span in &spans {
        bytes.extend_from_slice(span);
    }

    let mut framer = Framer::new();
    let (frames, discarded) = feed_all(&mut framer, &bytes);

    assert_eq!(frames.len(), spans.len());
    assert!(discarded.is_empty());
    assert_eq!(framer.buffered(), 0);

    // Each frame consumed exactly its declared length + 4 bytes of overhead
    for (frame, span) in frames.iter().zip(spans.iter()) {
        assert_eq!(frame.wire_len(), span[2] as usize + 4);
        assert_eq!(frame.wire_len(), span.len());
    }
}

#[test]
fn mid_stream_start_recovers_at_next_marker() {
    // Joining the conversation partway through a frame: the tail of one
    // packet looks like noise until the next marker lines up.
    let first = encode_frame(0x04, (0x00, 0x1B), &[0, 0, 0, 1, b'S', b'o', b'n', b'g']);
    let second = encode_frame(0x04, (0x00, 0x1C), &[]);

    let mut bytes = first[5..].to_vec();
    bytes.extend_from_slice(&second);

    let mut framer = Framer::new();
    let (frames, discarded) = feed_all(&mut framer, &bytes);

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].command, (0x00, 0x1C));
    // The drain runs one eviction per incoming byte, and the second frame
    // supplies enough of them to flush every orphaned byte.
    assert_eq!(discarded.len(), first.len() - 5);
    assert_eq!(framer.buffered(), 0);
}

#[test]
fn corrupted_payload_costs_one_byte_per_attempt() {
    let mut corrupted = encode_frame(0x04, (0x00, 0x21), b"Abbey Road");
    corrupted[8] ^= 0x20;
    let valid = encode_frame(0x04, (0x00, 0x21), b"Abbey Road");

    let mut bytes = corrupted.clone();
    bytes.extend_from_slice(&valid);

    let mut framer = Framer::new();
    let (frames, discarded) = feed_all(&mut framer, &bytes);

    assert!(!discarded.is_empty());
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].parameters, b"Abbey Road".to_vec());

    // Recovery drained at most the corrupted span, never the valid frame
    assert!(discarded.len() <= corrupted.len());
}

#[test]
fn marker_bytes_inside_payload_do_not_split_frames() {
    // A payload containing FF 55 must not be mistaken for a new frame start.
    let tricky = encode_frame(0x04, (0x00, 0x13), &[0xFF, 0x55, 0xFF, 0x55]);
    let mut framer = Framer::new();
    let (frames, discarded) = feed_all(&mut framer, &tricky);

    assert_eq!(frames.len(), 1);
    assert!(discarded.is_empty());
    assert_eq!(frames[0].parameters, vec![0xFF, 0x55, 0xFF, 0x55]);
}

#[test]
fn maximum_length_payload_frames() {
    // Length byte covers mode + command + params, so params cap at 252.
    let params: Vec<u8> = (0..252u32).map(|i| (i % 251) as u8).collect();
    let span = encode_frame(0x04, (0x00, 0x32), &params);
    assert_eq!(span[2], 0xFF);

    let mut framer = Framer::new();
    let (frames, discarded) = feed_all(&mut framer, &span);

    assert_eq!(frames.len(), 1);
    assert!(discarded.is_empty());
    assert_eq!(frames[0].parameters.len(), 252);
}

#[test]
fn two_sessions_over_identical_bytes_agree() {
    let mut bytes = vec![0xAA, 0xBB];
    bytes.extend_from_slice(&encode_frame(0x04, (0x00, 0x19), &[0, 0, 0, 9]));
    bytes.extend_from_slice(&encode_frame(0x04, (0x00, 0x1F), &[0, 0, 0, 3]));
    bytes.extend_from_slice(&[0u8; 8]);

    let mut first_session = Framer::new();
    let (frames_a, discarded_a) = feed_all(&mut first_session, &bytes);
    let mut second_session = Framer::new();
    let (frames_b, discarded_b) = feed_all(&mut second_session, &bytes);

    assert_eq!(discarded_a, discarded_b);
    assert_eq!(frames_a.len(), frames_b.len());
    for (a, b) in frames_a.iter().zip(frames_b.iter()) {
        assert_eq!(a.mode, b.mode);
        assert_eq!(a.command, b.command);
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.raw, b.raw);
    }
}
