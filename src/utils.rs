use std::{fs, io};
use std::path::Path;
use std::time::{Duration, Instant};

/// Reads a text file into one entry per line.
///
/// `\r\n`, `\n` and a lone `\r` all end a line. A leading UTF-8 byte order mark is dropped,
/// a trailing line break does not add an empty entry.
pub(crate) fn file_to_vec(filename: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(filename)?;
    let mut rest = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut lines = Vec::new();
    while !rest.is_empty() {
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                lines.push(rest[..end].to_string());
                let skip = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }
    Ok(lines)
}

pub(crate) fn trace(l_type: &str, l_step: &str, detect: Instant, _detect_elapsed: Duration) -> Duration {
    log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, detect.elapsed(), l_step, detect.elapsed() - _detect_elapsed);
    detect.elapsed()
}
