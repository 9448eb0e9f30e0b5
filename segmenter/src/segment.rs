use tokio_util::bytes::Bytes;

pub fn segment_filename(index: u32) -> String {
    format!("segment_{}.ts", index)
}

/// A finalized segment: the byte buffer is owned here exactly until the
/// file is written, after which only the bookkeeping survives in the
/// window.
#[derive(Debug)]
pub struct Segment {
    pub index: u32,
    pub duration_ms: u64,
    pub filename: String,
    pub data: Bytes,
}

impl Segment {
    pub fn info(&self) -> SegmentInfo {
        SegmentInfo {
            index: self.index,
            duration_ms: self.duration_ms,
            filename: self.filename.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SegmentInfo {
    pub index: u32,
    pub duration_ms: u64,
    pub filename: String,
}
