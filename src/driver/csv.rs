//! CSV report formatting.
//!
//! Ported from the final `printf` block of `original_source/src/driver.c`'s
//! `main`: one optional header row, then exactly one data row, written to
//! stdout. Column order is codec registration order, then one column per
//! layout's synthetic pseudo-codecs in layout-registration order.

use std::io::Write;

use crate::model::RunConfig;

/// One finished measurement: the region measured plus every codec's and
/// every layout pseudo-codec's accumulated bit total.
pub struct Report {
    pub file_name: String,
    pub size: u64,
    pub is_elf: bool,
    pub zero_pages: u64,
    /// `(name, total_bits)` in CSV column order.
    pub columns: Vec<(String, u64)>,
}

impl Report {
    fn actual_size_bits(&self, config: &RunConfig) -> f64 {
        let zero_bytes = if config.zero_page_detect {
            self.zero_pages * crate::config::PAGE_SIZE as u64
        } else {
            0
        };
        ((self.size - zero_bytes) * 8) as f64
    }

    pub fn write<W: Write>(&self, out: &mut W, config: &RunConfig) -> std::io::Result<()> {
        if config.header {
            write!(out, "file name,file size,elf,")?;
            if config.zero_page_detect {
                write!(out, "zero pages,")?;
            }
            for (name, _) in &self.columns {
                write!(out, "{name},")?;
            }
            writeln!(out)?;
        }

        write!(out, "{},{},{},", self.file_name, self.size, if self.is_elf { 'e' } else { 'p' })?;
        if config.zero_page_detect {
            write!(out, "{},", self.zero_pages)?;
        }

        let actual_bits = self.actual_size_bits(config);
        for (_, total_bits) in &self.columns {
            if config.ratios {
                write!(out, "{:.6},", actual_bits / *total_bits as f64)?;
            } else {
                write!(out, "{total_bits},")?;
            }
        }
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        Report {
            file_name: "dump.img".to_string(),
            size: 2 * crate::config::PAGE_SIZE as u64,
            is_elf: false,
            zero_pages: 1,
            columns: vec![("bdi".to_string(), 512), ("best-of".to_string(), 256)],
        }
    }

    #[test]
    fn raw_bits_mode_prints_totals_verbatim() {
        let report = sample();
        let config = RunConfig { ratios: false, ..Default::default() };
        let mut buf = Vec::new();
        report.write(&mut buf, &config).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("bdi,best-of,\n"));
        assert!(text.contains("dump.img,8192,p,1,512,256,\n"));
    }

    #[test]
    fn ratio_mode_divides_by_actual_non_zero_bits() {
        let report = sample();
        let config = RunConfig { ratios: true, ..Default::default() };
        let mut buf = Vec::new();
        report.write(&mut buf, &config).unwrap();
        let text = String::from_utf8(buf).unwrap();
        // actual bits = (8192 - 4096) * 8 = 32768
        assert!(text.contains("64.000000,"));
        assert!(text.contains("128.000000,"));
    }

    #[test]
    fn header_suppressed_when_configured() {
        let report = sample();
        let config = RunConfig { header: false, ..Default::default() };
        let mut buf = Vec::new();
        report.write(&mut buf, &config).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
