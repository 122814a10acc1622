use midly::{MidiMessage, TrackEvent, TrackEventKind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawEventKind {
    NoteOn { key: u8, vel: u8 },
    NoteOff { key: u8 },
    /// Tempo, program change, controllers, meta and sysex events.
    Other,
}

/// A track event reduced to what note matching needs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RawEvent {
    pub delta: u32,
    pub channel: u8,
    pub kind: RawEventKind,
}

impl RawEvent {
    pub fn new(delta: u32, channel: u8, kind: RawEventKind) -> Self {
        RawEvent {
            delta,
            channel,
            kind,
        }
    }

    pub fn note_on(delta: u32, key: u8, vel: u8) -> Self {
        Self::new(delta, 0, RawEventKind::NoteOn { key, vel })
    }

    pub fn note_off(delta: u32, key: u8) -> Self {
        Self::new(delta, 0, RawEventKind::NoteOff { key })
    }

    pub fn other(delta: u32) -> Self {
        Self::new(delta, 0, RawEventKind::Other)
    }

    /// Key released by this event, if it releases one. NoteOn with velocity 0 counts.
    pub fn released_key(&self) -> Option<u8> {
        match self.kind {
            RawEventKind::NoteOff { key } => Some(key),
            RawEventKind::NoteOn { key, vel: 0 } => Some(key),
            _ => None,
        }
    }
}

impl From<&TrackEvent<'_>> for RawEvent {
    fn from(event: &TrackEvent<'_>) -> Self {
        let delta = event.delta.as_int();
        match event.kind {
            TrackEventKind::Midi { channel, message } => {
                let kind = match message {
                    MidiMessage::NoteOn { key, vel } => RawEventKind::NoteOn {
                        key: key.as_int(),
                        vel: vel.as_int(),
                    },
                    MidiMessage::NoteOff { key, .. } => RawEventKind::NoteOff { key: key.as_int() },
                    _ => RawEventKind::Other,
                };
                RawEvent::new(delta, channel.as_int(), kind)
            }
            _ => RawEvent::other(delta),
        }
    }
}
