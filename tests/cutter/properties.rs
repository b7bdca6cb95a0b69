//! Property tests: segmentation never changes the transcoded output.

use h2_data_cutter::{build_data_frame, FrameContext, SourceId, Status};
use proptest::prelude::*;
use proptest::sample::Index;

use crate::support::{
    chunked, client_cutter, new_flow, reassemble_segments, scan_segments, segments,
};

fn cut_points(len: usize, picks: &[Index]) -> Vec<usize> {
    picks.iter().map(|p| p.index(len)).collect()
}

proptest! {
    #[test]
    fn transcoding_is_independent_of_segmentation(
        data in prop::collection::vec(any::<u8>(), 1..300),
        padding in prop::option::of(0u8..64),
        scan_picks in prop::collection::vec(any::<Index>(), 0..8),
        reassemble_picks in prop::collection::vec(any::<Index>(), 0..8),
    ) {
        let frame = build_data_frame(1, &data, padding, false);

        let mut whole_flow = new_flow();
        let mut whole = client_cutter(&frame);
        prop_assert_eq!(whole.scan(&mut whole_flow, &frame).status, Status::Flush);
        let expected = reassemble_segments(&mut whole, &mut whole_flow, &frame, &[]);

        let mut flow = new_flow();
        let mut cutter = client_cutter(&frame);
        let scan_cuts = cut_points(frame.len(), &scan_picks);
        let results = scan_segments(&mut cutter, &mut flow, &frame, &scan_cuts);
        let (last, rest) = results.split_last().unwrap();
        prop_assert_eq!(last.status, Status::Flush);
        prop_assert!(rest.iter().all(|r| r.status == Status::NeedMore));

        let reassemble_cuts = cut_points(frame.len(), &reassemble_picks);
        let actual = reassemble_segments(&mut cutter, &mut flow, &frame, &reassemble_cuts);

        prop_assert_eq!(&actual, &expected);
        prop_assert_eq!(actual, Some(chunked(&data)));
        prop_assert_eq!(&flow.direction(SourceId::Client).splitter.scanned, &chunked(&data));
    }

    #[test]
    fn classification_counts_every_byte_once(
        data_len in 1usize..200,
        padding in prop::option::of(0u8..=255),
        picks in prop::collection::vec(any::<Index>(), 0..10),
    ) {
        let frame = build_data_frame(1, &vec![0xAB; data_len], padding, false);
        let payload_len = frame.len() as u32 - 9;
        let mut ctx = FrameContext::new(SourceId::Client, payload_len, padding.is_some());

        let (mut flushed, mut data, mut pad) = (0u32, 0u32, 0u32);
        for range in segments(frame.len(), &cut_points(frame.len(), &picks)) {
            let segment = &frame[range];
            let c = ctx.classify(segment).unwrap();
            prop_assert!(c.payload(segment).iter().all(|&b| b == 0xAB));
            flushed += c.flush_offset;
            data += c.data;
            pad += c.padding;
        }

        prop_assert_eq!(flushed, frame.len() as u32);
        prop_assert_eq!(data, data_len as u32);
        prop_assert_eq!(data, ctx.data_len());
        prop_assert_eq!(pad, u32::from(padding.unwrap_or(0)));
        prop_assert_eq!(ctx.remaining_frame_octets(), 0);
    }
}
