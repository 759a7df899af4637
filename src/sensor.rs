use core::fmt::Write as _;

use heapless::String;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Most recent gyroscope (°/s) and accelerometer (g) sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct SensorReading {
    pub gyro: Vector3,
    pub accel: Vector3,
}

/// Six `f32::MAX`-sized fields, separators and the newline still fit.
pub const LINE_CAPACITY: usize = 288;

pub type Line = String<LINE_CAPACITY>;

impl SensorReading {
    /// `gx gy gz ax ay az\n`, gyroscope to 2 decimals, accelerometer to 5.
    pub fn to_line(&self) -> Line {
        let mut line = Line::new();
        // Cannot overflow, see LINE_CAPACITY.
        let _ = writeln!(
            line,
            "{:.2} {:.2} {:.2} {:.5} {:.5} {:.5}",
            self.gyro.x, self.gyro.y, self.gyro.z, self.accel.x, self.accel.y, self.accel.z
        );
        line
    }

    /// Inverse of [`to_line`](Self::to_line): exactly six space-separated
    /// numbers, gyroscope first.
    pub fn parse_line(line: &str) -> Option<Self> {
        let [gx, gy, gz, ax, ay, az] = parse_fields::<6>(strip_newline(line))?;
        Some(Self {
            gyro: Vector3::new(gx, gy, gz),
            accel: Vector3::new(ax, ay, az),
        })
    }

    /// Accelerometer triple only. The gyroscope fields are skipped
    /// unparsed.
    pub fn parse_accel(line: &str) -> Option<Vector3> {
        let accel = strip_newline(line).splitn(4, ' ').nth(3)?;
        let [x, y, z] = parse_fields::<3>(accel)?;
        Some(Vector3::new(x, y, z))
    }
}

fn strip_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

fn parse_fields<const N: usize>(fields: &str) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    let mut parts = fields.split(' ');
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(out),
    }
}

/// Rebuilds sensor lines from serial chunks split at arbitrary points.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Line,
    // Dropping an over-long line until its newline arrives.
    overflowed: bool,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text received since the last newline.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Feed one chunk. Returns the last line it completed, without the
    /// newline; earlier lines in the same chunk are superseded.
    pub fn push(&mut self, chunk: &str) -> Option<Line> {
        let mut last = None;
        for c in chunk.chars() {
            if c == '\n' {
                if !self.overflowed {
                    last = Some(core::mem::take(&mut self.pending));
                }
                self.pending.clear();
                self.overflowed = false;
            } else if !self.overflowed && self.pending.push(c).is_err() {
                warn!("Dropping serial line longer than {} bytes", LINE_CAPACITY);
                self.pending.clear();
                self.overflowed = true;
            }
        }
        last
    }

    /// Like [`push`](Self::push) for raw bytes. Chunks that are not UTF-8
    /// are discarded whole.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Option<Line> {
        match core::str::from_utf8(chunk) {
            Ok(s) => self.push(s),
            Err(_) => None,
        }
    }
}

/// A six-axis IMU as seen by the poll loop.
#[allow(async_fn_in_trait)]
pub trait MotionSensor {
    type Error;

    /// Angular velocity in °/s.
    async fn gyro(&mut self) -> Result<Vector3, Self::Error>;

    /// Linear acceleration in g.
    async fn accel(&mut self) -> Result<Vector3, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(gyro: (f32, f32, f32), accel: (f32, f32, f32)) -> SensorReading {
        SensorReading {
            gyro: Vector3::new(gyro.0, gyro.1, gyro.2),
            accel: Vector3::new(accel.0, accel.1, accel.2),
        }
    }

    #[test]
    fn resting_board_line() {
        let r = reading((0.0, 0.0, 0.0), (0.0, 1.0, 0.0));
        assert_eq!(r.to_line().as_str(), "0.00 0.00 0.00 0.00000 1.00000 0.00000\n");
    }

    #[test]
    fn mixed_signs_and_rounding() {
        let r = reading((-12.5, 250.0, 3.25), (0.123456, -0.5, 2.0));
        assert_eq!(
            r.to_line().as_str(),
            "-12.50 250.00 3.25 0.12346 -0.50000 2.00000\n"
        );
    }

    #[test]
    fn field_count_and_precision() {
        let r = reading((1999.9, -1999.9, 0.01), (-7.99, 7.99, 0.00001));
        let line = r.to_line();
        assert!(line.ends_with('\n'));
        let fields: heapless::Vec<&str, 8> = line.trim_end().split(' ').collect();
        assert_eq!(fields.len(), 6);
        for (i, f) in fields.iter().enumerate() {
            let decimals = f.split('.').nth(1).unwrap().len();
            assert_eq!(decimals, if i < 3 { 2 } else { 5 }, "field {}", i);
        }
    }

    #[test]
    fn extreme_values_fit() {
        let r = reading((f32::MIN, f32::MIN, f32::MIN), (f32::MIN, f32::MIN, f32::MIN));
        let line = r.to_line();
        assert!(line.ends_with('\n'));
        assert_eq!(line.trim_end().split(' ').count(), 6);
    }

    #[test]
    fn formatted_line_parses_back() {
        let r = reading((1.0, -2.5, 250.25), (0.12345, -0.98765, 1.0));
        let line = r.to_line();
        assert_eq!(SensorReading::parse_line(&line), Some(r));
        assert_eq!(
            SensorReading::parse_accel(&line),
            Some(Vector3::new(0.12345, -0.98765, 1.0))
        );
    }

    #[test]
    fn accel_ignores_gyro_fields() {
        let accel = SensorReading::parse_accel("x y z 0.50000 -1.00000 0.25000");
        assert_eq!(accel, Some(Vector3::new(0.5, -1.0, 0.25)));
        assert_eq!(SensorReading::parse_line("x y z 0.50000 -1.00000 0.25000"), None);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        for bad in [
            "",
            "0.00 0.00 0.00",
            "0.00 0.00 0.00 0.00000 1.00000",
            "0.00 0.00 0.00 0.00000 1.00000 0.00000 7",
            "0.00 0.00 0.00 0.00000 one 0.00000",
            "0.00  0.00 0.00 0.00000 1.00000 0.00000",
        ] {
            assert_eq!(SensorReading::parse_line(bad), None, "{:?}", bad);
        }
        assert_eq!(SensorReading::parse_accel("0.00 0.00 0.00 0.00000 1.00000"), None);
        assert_eq!(SensorReading::parse_accel("0.00 0.00 0.00 0.0 1.0 0.0 0.0"), None);
        assert_eq!(SensorReading::parse_accel("0.00 0.00 0.00 0.0 1.0 nan?"), None);
    }

    #[test]
    fn assembler_joins_split_chunks() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.push("1.00 2.00 3.00 0.1"), None);
        assert_eq!(asm.pending(), "1.00 2.00 3.00 0.1");

        let line = asm.push("0000 0.20000 0.30000\n4.0").unwrap();
        assert_eq!(line.as_str(), "1.00 2.00 3.00 0.10000 0.20000 0.30000");
        assert_eq!(asm.pending(), "4.0");
        assert_eq!(
            SensorReading::parse_accel(&line),
            Some(Vector3::new(0.1, 0.2, 0.3))
        );
    }

    #[test]
    fn assembler_keeps_only_last_line_of_chunk() {
        let mut asm = LineAssembler::new();
        let line = asm.push("a\nb\nc\npartial").unwrap();
        assert_eq!(line.as_str(), "c");
        assert_eq!(asm.pending(), "partial");
        assert_eq!(asm.push("\n").unwrap().as_str(), "partial");
        assert_eq!(asm.pending(), "");
    }

    #[test]
    fn assembler_drops_overlong_and_invalid_input() {
        let mut asm = LineAssembler::new();
        for _ in 0..LINE_CAPACITY + 10 {
            assert_eq!(asm.push("9"), None);
        }
        // The rest of the over-long line is discarded, the next one survives.
        assert_eq!(asm.push("9\nok"), None);
        assert_eq!(asm.push("\n").unwrap().as_str(), "ok");

        assert_eq!(asm.push_bytes(&[0xFF, b'\n']), None);
        assert_eq!(asm.pending(), "");
        assert_eq!(asm.push_bytes(b"x\n").unwrap().as_str(), "x");
    }
}
