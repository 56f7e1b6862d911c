//! Rule-based phenology transition scans.
//!
//! Six independent searches over the third derivative of the fitted curve.
//! SOS/EOS look for sign changes bracketing the spring growth pulse, MOS
//! for the most negative curvature change, and the autumn events for local
//! extrema, because the third derivative does not cleanly cross zero in
//! the senescence region. The default window boundaries are heuristics for a
//! single-hemisphere annual cycle with one growth/senescence pair; the
//! comparison operators and ascending search order are load-bearing and
//! must not be relaxed.
//!
//! A scan that finds no qualifying point yields `None` — never an error —
//! and no ordering between events is enforced.

/// Day-index search windows for the six transition scans.
///
/// Spring windows are absolute inclusive-exclusive `(start, end)` ranges;
/// autumn scans share a configurable start day while their ends are stored
/// as offsets back from the series length. Each offset is clamped below by
/// the rule's own lookahead, so a too-small value can never read past the
/// end of the series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWindows {
    /// Start-of-season scan range.
    pub sos: (usize, usize),
    /// Middle-of-season scan range.
    pub mos: (usize, usize),
    /// End-of-season scan range.
    pub eos: (usize, usize),
    /// First day considered for start-of-fall.
    pub sof_start: usize,
    /// Days excluded at the series end for start-of-fall.
    pub sof_end_offset: usize,
    /// First day considered for middle-of-fall.
    pub mof_start: usize,
    /// Days excluded at the series end for middle-of-fall.
    pub mof_end_offset: usize,
    /// First day considered for end-of-fall.
    pub eof_start: usize,
    /// Days excluded at the series end for end-of-fall.
    pub eof_end_offset: usize,
}

impl Default for SearchWindows {
    fn default() -> Self {
        Self {
            sos: (50, 176),
            mos: (0, 240),
            eos: (120, 241),
            sof_start: 240,
            sof_end_offset: 5,
            mof_start: 240,
            mof_end_offset: 2,
            eof_start: 240,
            eof_end_offset: 2,
        }
    }
}

impl SearchWindows {
    /// Override the start-of-season range.
    pub fn with_sos(mut self, start: usize, end: usize) -> Self {
        self.sos = (start, end);
        self
    }

    /// Override the middle-of-season range.
    pub fn with_mos(mut self, start: usize, end: usize) -> Self {
        self.mos = (start, end);
        self
    }

    /// Override the end-of-season range.
    pub fn with_eos(mut self, start: usize, end: usize) -> Self {
        self.eos = (start, end);
        self
    }

    /// Override the shared autumn start day for SOF, MOF and EOF.
    pub fn with_autumn_start(mut self, start: usize) -> Self {
        self.sof_start = start;
        self.mof_start = start;
        self.eof_start = start;
        self
    }

    /// Override the autumn end offsets for SOF, MOF and EOF.
    pub fn with_autumn_end_offsets(mut self, sof: usize, mof: usize, eof: usize) -> Self {
        self.sof_end_offset = sof;
        self.mof_end_offset = mof;
        self.eof_end_offset = eof;
        self
    }
}

/// Day-indices of the six detected transitions, each possibly absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionIndices {
    pub sos: Option<usize>,
    pub mos: Option<usize>,
    pub eos: Option<usize>,
    pub sof: Option<usize>,
    pub mof: Option<usize>,
    pub eof: Option<usize>,
}

/// Run all six scans over the third-derivative series.
pub fn detect_transitions(d3: &[f64], windows: &SearchWindows) -> TransitionIndices {
    TransitionIndices {
        sos: start_of_season(d3, windows.sos),
        mos: middle_of_season(d3, windows.mos),
        eos: end_of_season(d3, windows.eos),
        sof: start_of_fall(d3, windows.sof_start, windows.sof_end_offset),
        mof: middle_of_fall(d3, windows.mof_start, windows.mof_end_offset),
        eof: end_of_fall(d3, windows.eof_start, windows.eof_end_offset),
    }
}

/// First index in the window where the third derivative turns negative.
pub fn start_of_season(d3: &[f64], window: (usize, usize)) -> Option<usize> {
    let (start, end) = clamp_window(window, d3.len());
    (start..end).find(|&i| d3[i] < 0.0)
}

/// Index of the window's global minimum (first index on ties).
pub fn middle_of_season(d3: &[f64], window: (usize, usize)) -> Option<usize> {
    let (start, end) = clamp_window(window, d3.len());
    let mut best: Option<usize> = None;
    for i in start..end {
        match best {
            Some(b) if d3[i] >= d3[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// First index in the window where the third derivative turns positive.
pub fn end_of_season(d3: &[f64], window: (usize, usize)) -> Option<usize> {
    let (start, end) = clamp_window(window, d3.len());
    (start..end).find(|&i| d3[i] > 0.0)
}

/// First 5-point window starting at `i >= start` whose second point is a
/// local minimum: below the first point and below every later point of
/// the window. Returns the window start index. The scan stops
/// `end_offset` days (at least the 4-day lookahead) before the series end.
pub fn start_of_fall(d3: &[f64], start: usize, end_offset: usize) -> Option<usize> {
    let end = d3.len().saturating_sub(end_offset.max(4));
    (start..end).find(|&i| {
        let w = &d3[i..i + 5];
        w[1] < w[0] && w[1] < w[2] && w[1] < w[3] && w[1] < w[4]
    })
}

/// First local maximum of the third derivative at or after `start`. The
/// scan stops `end_offset` days (at least one) before the series end.
pub fn middle_of_fall(d3: &[f64], start: usize, end_offset: usize) -> Option<usize> {
    let end = d3.len().saturating_sub(end_offset.max(1));
    (start.max(1)..end).find(|&i| d3[i - 1] < d3[i] && d3[i] > d3[i + 1])
}

/// Second local minimum of the third derivative at or after `start` —
/// the first one belongs to the senescence onset already claimed by the
/// start-of-fall rule. The scan stops `end_offset` days (at least one)
/// before the series end.
pub fn end_of_fall(d3: &[f64], start: usize, end_offset: usize) -> Option<usize> {
    let end = d3.len().saturating_sub(end_offset.max(1));
    let mut seen_first = false;
    for i in start.max(1)..end {
        if d3[i - 1] > d3[i] && d3[i] < d3[i + 1] {
            if seen_first {
                return Some(i);
            }
            seen_first = true;
        }
    }
    None
}

fn clamp_window(window: (usize, usize), len: usize) -> (usize, usize) {
    let start = window.0.min(len);
    let end = window.1.min(len);
    (start, end.max(start))
}
