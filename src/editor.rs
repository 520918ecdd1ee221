use crate::error::GpxError;
use crate::gpx_types::*;

type Result<T> = std::result::Result<T, GpxError>;

fn check_index(kind: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(GpxError::IndexOutOfRange { kind, index, len })
    }
}

impl Segment {
    /// Split after `index`: the first half keeps points `[0, index]`,
    /// the second gets the rest (possibly nothing).
    pub fn split(mut self, index: usize) -> Result<(Segment, Segment)> {
        check_index("point", index, self.points.len())?;
        let tail = self.points.split_off(index + 1);
        Ok((self, Segment::new(tail)))
    }

    /// Append all of `other`'s points.
    pub fn join(&mut self, other: Segment) {
        self.points.extend(other.points);
    }
}

impl Track {
    /// Replace segment `segment` by its two halves, in place.
    pub fn split(&mut self, segment: usize, point: usize) -> Result<()> {
        check_index("segment", segment, self.segments.len())?;
        check_index("point", point, self.segments[segment].points.len())?;

        let original = std::mem::take(&mut self.segments[segment]);
        let (first, second) = original.split(point)?;
        self.segments[segment] = first;
        self.segments.insert(segment + 1, second);

        tracing::debug!(segment, point, segments = self.segments.len(), "split segment");
        Ok(())
    }

    /// Move segment `b`'s points onto the end of segment `a` and drop `b`.
    /// The remaining segments keep their relative order.
    pub fn join(&mut self, a: usize, b: usize) -> Result<()> {
        check_index("segment", a, self.segments.len())?;
        check_index("segment", b, self.segments.len())?;
        if a == b {
            return Err(GpxError::SelfJoin(a));
        }

        let removed = self.segments.remove(b);
        let target = if b < a { a - 1 } else { a };
        self.segments[target].join(removed);

        tracing::debug!(a, b, segments = self.segments.len(), "joined segments");
        Ok(())
    }
}

impl Gpx {
    pub fn split(&mut self, track: usize, segment: usize, point: usize) -> Result<()> {
        check_index("track", track, self.tracks.len())?;
        self.tracks[track].split(segment, point)
    }

    pub fn join(&mut self, track: usize, a: usize, b: usize) -> Result<()> {
        check_index("track", track, self.tracks.len())?;
        self.tracks[track].join(a, b)
    }
}
