//! Per-flow state shared between the HTTP/2 inspector and the DATA cutter.
//!
//! A [`FlowData`] holds one [`Direction`] per [`SourceId`]. The cutter only
//! borrows it for the length of a call; everything it allocates along the
//! way (the raw frame header, the finished HTTP/1.x buffer) is moved into
//! the matching direction and released from here.

use crate::frame::FRAME_HEADER_LENGTH;
use crate::splitter::StreamSplitter;

/// Direction of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Client,
    Server,
}

impl SourceId {
    fn index(self) -> usize {
        match self {
            SourceId::Client => 0,
            SourceId::Server => 1,
        }
    }
}

/// Protocol expectation violations recorded against a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Infraction {
    /// Padding length does not fit inside the DATA payload.
    PaddingLength = 0,
}

/// Named events raised for downstream alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    PaddingLength,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::PaddingLength => "http2_padding_length",
        }
    }
}

/// Diagnostic sink for one direction.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    infractions: u64,
    events: Vec<Event>,
}

impl Diagnostics {
    /// Register an infraction. Registering the same one twice is a no-op.
    pub fn register_infraction(&mut self, infraction: Infraction) {
        self.infractions |= 1 << infraction as u8;
    }

    pub fn has_infraction(&self, infraction: Infraction) -> bool {
        self.infractions & (1 << infraction as u8) != 0
    }

    pub fn infraction_count(&self) -> u32 {
        self.infractions.count_ones()
    }

    pub fn create_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drain raised events (e.g. after handing them to the alerting layer)
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

/// State kept for one direction of a flow.
#[derive(Debug)]
pub struct Direction<S> {
    /// Downstream HTTP/1.x inspector for this direction.
    pub splitter: S,
    pub diagnostics: Diagnostics,
    /// Octets of the current frame not yet scanned. Read by frame dispatch.
    pub scan_remaining_frame_octets: u32,
    /// Octets of the current frame already scanned. Read by frame dispatch.
    pub scan_octets_seen: u32,
    frame_header: Option<Vec<u8>>,
    frame_data: Option<Vec<u8>>,
}

impl<S> Direction<S> {
    fn new(splitter: S) -> Self {
        Self {
            splitter,
            diagnostics: Diagnostics::default(),
            scan_remaining_frame_octets: 0,
            scan_octets_seen: 0,
            frame_header: None,
            frame_data: None,
        }
    }

    /// Raw header of the last reassembled frame.
    pub fn frame_header(&self) -> Option<&[u8]> {
        self.frame_header.as_deref()
    }

    pub fn take_frame_header(&mut self) -> Option<Vec<u8>> {
        self.frame_header.take()
    }

    /// Transcoded HTTP/1.x body of the last completed frame.
    pub fn frame_data(&self) -> Option<&[u8]> {
        self.frame_data.as_deref()
    }

    pub fn take_frame_data(&mut self) -> Option<Vec<u8>> {
        self.frame_data.take()
    }

    /// Header scratch buffer. `fresh` drops the previous frame's header and
    /// allocates a new one owned by this direction.
    pub(crate) fn frame_header_slot(&mut self, fresh: bool) -> &mut Vec<u8> {
        if fresh {
            self.frame_header = None;
        }
        self.frame_header
            .get_or_insert_with(|| Vec::with_capacity(FRAME_HEADER_LENGTH as usize))
    }

    pub(crate) fn adopt_frame_data(&mut self, data: Vec<u8>) -> &[u8] {
        self.frame_data.insert(data)
    }
}

/// Per-flow HTTP/2 state, one [`Direction`] per [`SourceId`].
#[derive(Debug)]
pub struct FlowData<S> {
    directions: [Direction<S>; 2],
}

impl<S: StreamSplitter> FlowData<S> {
    pub fn new(client: S, server: S) -> Self {
        Self {
            directions: [Direction::new(client), Direction::new(server)],
        }
    }
}

impl<S> FlowData<S> {
    pub fn direction(&self, source_id: SourceId) -> &Direction<S> {
        &self.directions[source_id.index()]
    }

    pub fn direction_mut(&mut self, source_id: SourceId) -> &mut Direction<S> {
        &mut self.directions[source_id.index()]
    }
}
