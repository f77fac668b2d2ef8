// src/cli.rs
// Command line: `multipendulum [COUNT] [DAMPING]`.
// Each positional argument is parsed on its own; anything missing or unparseable silently keeps its default.
// No flags, no usage text, no error exit.

pub const DEFAULT_SEGMENT_COUNT: usize = 3;
pub const DEFAULT_DAMPING: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchOptions {
    pub segment_count: usize,
    pub damping: f64,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            segment_count: DEFAULT_SEGMENT_COUNT,
            damping: DEFAULT_DAMPING,
        }
    }
}

/// Parses the arguments after the program name.
pub fn parse_args<I, S>(args: I) -> LaunchOptions
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    let segment_count = args
        .next()
        .and_then(|s| s.as_ref().trim().parse().ok())
        .unwrap_or(DEFAULT_SEGMENT_COUNT);
    let damping = args
        .next()
        .and_then(|s| s.as_ref().trim().parse().ok())
        .unwrap_or(DEFAULT_DAMPING);
    LaunchOptions {
        segment_count,
        damping,
    }
}
