//! Tests for DataCutter::scan

use h2_data_cutter::{
    build_data_frame, frame_type, CutterConfig, CutterError, DataCutter, H2FrameHeader, ScanResult,
    ScanState, SourceId, Status, WrapState,
};
use rstest::rstest;

use crate::support::{chunked, client_cutter, new_flow, scan_segments};

#[test]
fn test_unpadded_frame_single_segment() {
    let mut flow = new_flow();
    let frame = build_data_frame(1, b"hello", None, true);
    let mut cutter = client_cutter(&frame);

    let result = cutter.scan(&mut flow, &frame);

    assert_eq!(result, ScanResult::flush(14));
    let downstream = &flow.direction(SourceId::Client).splitter;
    assert_eq!(downstream.scanned, chunked(b"hello"));
    // chunk header, payload, terminator
    assert_eq!(downstream.scan_calls, 3);
    assert_eq!(cutter.context().scan_state(), ScanState::FullFrame);
    assert_eq!(cutter.context().bytes_sent_downstream(), 13);
}

#[rstest]
#[case::header_then_rest(&[9])]
#[case::pad_length_alone(&[9, 10])]
#[case::inside_header(&[3, 7, 20])]
#[case::every_byte(&[
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
    27, 28, 29,
])]
#[case::inside_padding(&[27])]
fn test_padded_frame_flushes_on_last_segment(#[case] cuts: &[usize]) {
    let mut flow = new_flow();
    let frame = build_data_frame(1, b"abcdefghijklmno", Some(5), false);
    assert_eq!(frame.len(), 30);
    let mut cutter = client_cutter(&frame);

    let results = scan_segments(&mut cutter, &mut flow, &frame, cuts);

    let (last, rest) = results.split_last().unwrap();
    assert!(rest.iter().all(|r| *r == ScanResult::need_more()), "{results:?}");
    assert_eq!(last.status, Status::Flush);
    let last_start = cuts.iter().copied().max().unwrap_or(0);
    assert_eq!(last.flush_offset as usize, frame.len() - last_start);

    let downstream = &flow.direction(SourceId::Client).splitter;
    assert_eq!(downstream.scanned, chunked(b"abcdefghijklmno"));
    assert_eq!(cutter.context().data_len(), 15);
    assert_eq!(cutter.context().padding_len(), 5);
}

#[rstest]
#[case::whole(&[])]
#[case::pad_length_alone(&[9, 10])]
#[case::every_byte(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12])]
fn test_padded_frame_with_zero_padding(#[case] cuts: &[usize]) {
    let mut flow = new_flow();
    let frame = build_data_frame(1, b"abc", Some(0), false);
    assert_eq!(frame.len(), 13);
    let mut cutter = client_cutter(&frame);

    let results = scan_segments(&mut cutter, &mut flow, &frame, cuts);

    let last = results.last().unwrap();
    assert_eq!(last.status, Status::Flush);
    assert_eq!(flow.direction(SourceId::Client).splitter.scanned, chunked(b"abc"));
    assert!(cutter.context().is_padded());
    assert_eq!(cutter.context().padding_len(), 0);
    assert_eq!(cutter.context().data_len(), 3);
    assert_eq!(cutter.context().scan_state(), ScanState::FullFrame);
}

#[test]
fn test_header_only_segment_sends_nothing() {
    let mut flow = new_flow();
    let frame = build_data_frame(1, b"hello", None, false);
    let mut cutter = client_cutter(&frame);

    let result = cutter.scan(&mut flow, &frame[..9]);

    assert_eq!(result, ScanResult::need_more());
    assert_eq!(flow.direction(SourceId::Client).splitter.scan_calls, 0);
    assert_eq!(cutter.context().wrap_state(), WrapState::NoneSent);
}

#[test]
fn test_chunk_header_sent_once() {
    let mut flow = new_flow();
    let data = vec![b'z'; 255];
    let frame = build_data_frame(5, &data, None, false);
    let mut cutter = client_cutter(&frame);

    scan_segments(&mut cutter, &mut flow, &frame, &[20, 100, 200]);

    let scanned = &flow.direction(SourceId::Client).splitter.scanned;
    assert!(scanned.starts_with(b"ff\r\nzzz"));
    assert_eq!(scanned.windows(4).filter(|w| *w == b"ff\r\n").count(), 1);
    assert_eq!(cutter.context().wrap_state(), WrapState::HeaderSent);
}

#[test]
fn test_remaining_octets_bookkeeping() {
    let mut flow = new_flow();
    let frame = build_data_frame(1, &[7; 20], Some(3), false);
    let mut cutter = client_cutter(&frame);
    flow.direction_mut(SourceId::Client).scan_octets_seen = 12;

    cutter.scan(&mut flow, &frame[..12]);
    assert_eq!(
        flow.direction(SourceId::Client).scan_remaining_frame_octets,
        frame.len() as u32 - 12
    );
    assert_eq!(cutter.context().remaining_frame_octets(), frame.len() as u32 - 12);

    let result = cutter.scan(&mut flow, &frame[12..]);
    assert_eq!(result.status, Status::Flush);
    let client = flow.direction(SourceId::Client);
    assert_eq!(client.scan_remaining_frame_octets, 0);
    assert_eq!(client.scan_octets_seen, 0);
}

#[test]
fn test_directions_are_independent() {
    let mut flow = new_flow();
    let frame = build_data_frame(1, b"pong", None, true);
    let header = H2FrameHeader::parse(&frame).unwrap();
    let mut cutter =
        DataCutter::from_header(&header, SourceId::Server, &CutterConfig::default()).unwrap();

    assert_eq!(cutter.scan(&mut flow, &frame).status, Status::Flush);

    assert_eq!(flow.direction(SourceId::Server).splitter.scanned, chunked(b"pong"));
    assert!(flow.direction(SourceId::Client).splitter.scanned.is_empty());
}

#[test]
fn test_downstream_abort_propagates() {
    let mut flow = new_flow();
    flow.direction_mut(SourceId::Client).splitter.abort_after = Some(6);
    let frame = build_data_frame(1, b"hello", None, false);
    let mut cutter = client_cutter(&frame);

    assert_eq!(cutter.scan(&mut flow, &frame[..11]), ScanResult::need_more());
    assert_eq!(cutter.scan(&mut flow, &frame[11..]), ScanResult::abort());
    assert_eq!(
        cutter.last_error(),
        Some(&CutterError::UnexpectedStatus {
            expected: Status::NeedMore,
            actual: Status::Abort,
        })
    );
}

#[test]
fn test_flush_on_chunk_header_aborts() {
    let mut flow = new_flow();
    flow.direction_mut(SourceId::Client).splitter.flush_early = true;
    let frame = build_data_frame(1, b"hello", None, false);
    let mut cutter = client_cutter(&frame);

    assert_eq!(cutter.scan(&mut flow, &frame), ScanResult::abort());
    assert_eq!(
        cutter.last_error(),
        Some(&CutterError::UnexpectedStatus {
            expected: Status::NeedMore,
            actual: Status::Flush,
        })
    );
}

#[test]
fn test_from_header_rejects_other_frame_types() {
    let header = H2FrameHeader::parse(&[0, 0, 4, frame_type::HEADERS, 4, 0, 0, 0, 1]).unwrap();
    let result = DataCutter::from_header(&header, SourceId::Client, &CutterConfig::default());
    assert_eq!(result.unwrap_err(), CutterError::NotDataFrame(frame_type::HEADERS));
}

#[test]
fn test_from_header_enforces_max_frame_size() {
    let header = H2FrameHeader::parse(&[0, 0x40, 0x01, 0, 0, 0, 0, 0, 1]).unwrap();
    assert_eq!(header.length, 16_385);

    let result = DataCutter::from_header(&header, SourceId::Client, &CutterConfig::default());
    assert_eq!(
        result.unwrap_err(),
        CutterError::FrameTooLarge { length: 16_385, max: 16_384 }
    );

    let config = CutterConfig::with_max_frame_size(65_536).unwrap();
    assert!(DataCutter::from_header(&header, SourceId::Client, &config).is_ok());
}
