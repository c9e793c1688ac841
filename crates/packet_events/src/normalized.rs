use crate::CapturedRaw;

/// Format of the stream a packet was read from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PacketSource {
    /// Backend records: live push stream or persisted history.
    Backend,
    /// Raw OpenCode `run --format json` events.
    OpenCode,
}

impl PacketSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PacketSource::Backend => "backend",
            PacketSource::OpenCode => "opencode",
        }
    }
}

/// A parsed packet tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPacket<T> {
    pub line_number: usize,
    pub source: PacketSource,
    pub packet: T,
    /// Only set on the first packet of a line; later packets from the same line share it.
    pub captured_raw: Option<CapturedRaw>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPackets<T>(pub Vec<NormalizedPacket<T>>);

impl<T> Default for NormalizedPackets<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> NormalizedPackets<T> {
    /// Tags every packet produced by one input line.
    pub fn from_line(
        line_number: usize,
        source: PacketSource,
        mut captured_raw: Option<CapturedRaw>,
        packets: impl IntoIterator<Item = T>,
    ) -> Self {
        Self(
            packets
                .into_iter()
                .map(|packet| NormalizedPacket {
                    line_number,
                    source,
                    packet,
                    captured_raw: captured_raw.take(),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> IntoIterator for NormalizedPackets<T> {
    type Item = NormalizedPacket<T>;
    type IntoIter = std::vec::IntoIter<NormalizedPacket<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
