//! Startup text written to the serial console before the first sample.
use core::fmt::Write as _;

use embedded_io_async::Write;
use heapless::String;

use crate::config::BANNER;
use crate::sched::{CoreId, Priority};

const CRLF: &str = "\r\n";

/// Blank line, banner, then the core/priority diagnostic, each CRLF
/// terminated. Written once, before the poll loop starts.
pub async fn write_banner<W: Write>(
    serial: &mut W,
    core: CoreId,
    priority: Priority,
) -> Result<(), W::Error> {
    serial.write_all(CRLF.as_bytes()).await?;
    serial.write_all(BANNER.as_bytes()).await?;
    serial.write_all(CRLF.as_bytes()).await?;

    let diag = diagnostic_line(core, priority);
    serial.write_all(diag.as_bytes()).await
}

fn diagnostic_line(core: CoreId, priority: Priority) -> String<64> {
    let mut line = String::new();
    // Worst case is well under 64 bytes.
    let _ = write!(
        line,
        "Setup and loop task running on core{} with priority {}{}",
        core.0, priority.0, CRLF
    );
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_names_core_and_priority() {
        assert_eq!(
            diagnostic_line(CoreId(0), Priority(1)).as_str(),
            "Setup and loop task running on core0 with priority 1\r\n"
        );
    }

    #[test]
    fn diagnostic_fits_largest_values() {
        let line = diagnostic_line(CoreId(u8::MAX), Priority(u8::MAX));
        assert!(line.ends_with(CRLF));
    }
}
