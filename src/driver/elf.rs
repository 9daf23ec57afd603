//! ELF auto-detection, locating the page-aligned memory region to measure.
//!
//! Ported from `original_source/src/driver.c::auto_elf_parse`, which reads
//! an `Elf64_Ehdr`/`Elf64_Phdr` by hand rather than linking an ELF crate
//! (there is no ELF parsing library in the teacher's or the pack's
//! dependency stacks, so this stays a direct byte-layout read, the way the
//! C source does it with `elf.h`'s structs).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::config::PAGE_SIZE;
use crate::error::{MeasurementError, Result};

const EHDR_SIZE: usize = 64;
const PHDR_SIZE: usize = 56;
const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// The measured region within the input file: byte offset `start`
/// (inclusive) through `end` (exclusive), both page-aligned, plus whether
/// the file was recognized as an ELF image.
pub struct Region {
    pub start: u64,
    pub end: u64,
    pub is_elf: bool,
}

fn u16_at(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes(b[off..off + 2].try_into().unwrap())
}

fn u64_at(b: &[u8], off: usize) -> u64 {
    u64::from_le_bytes(b[off..off + 8].try_into().unwrap())
}

/// `auto_elf_parse` — reads the ELF header, and if the magic matches,
/// walks the program header table for the first segment whose `p_memsz`
/// is nonzero and 4 KiB-aligned; its file offset becomes `start`, and the
/// section header table offset becomes `end`. A non-ELF file is treated
/// as a raw page dump: `start = 0`, `end = file_size`. Either way `end` is
/// clamped to the file's actual size and `end - start` is rounded down to
/// a whole number of pages.
pub fn auto_elf_parse(path: &Path) -> Result<Region> {
    let parse_err = |reason: &str| MeasurementError::Parse {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };

    let mut file = File::open(path).map_err(|e| parse_err(&e.to_string()))?;
    let file_len = file.metadata().map_err(|e| parse_err(&e.to_string()))?.len();
    if file_len < PAGE_SIZE as u64 {
        return Err(parse_err("file shorter than one page"));
    }

    let mut ehdr = [0u8; EHDR_SIZE];
    file.read_exact(&mut ehdr).map_err(|_| parse_err("failed to read ELF header"))?;

    let is_elf = ehdr[0..4] == ELF_MAGIC;
    let (mut start, mut end) = if is_elf {
        let e_phoff = u64_at(&ehdr, 32);
        let e_shoff = u64_at(&ehdr, 40);
        let e_phnum = u16_at(&ehdr, 56) as u64;

        let mut start = 0u64;
        file.seek(SeekFrom::Start(e_phoff)).map_err(|_| parse_err("failed to seek to program headers"))?;
        for _ in 0..e_phnum {
            let mut phdr = [0u8; PHDR_SIZE];
            file.read_exact(&mut phdr).map_err(|_| parse_err("failed to read program header"))?;
            let p_offset = u64_at(&phdr, 8);
            let p_memsz = u64_at(&phdr, 40);
            if p_memsz != 0 && p_memsz & 0xfff == 0 {
                start = p_offset;
                break;
            }
        }
        (start, e_shoff)
    } else {
        (0, file_len)
    };

    if end > file_len {
        end = file_len;
    }
    if start > end {
        start = end;
    }
    end = start + ((end - start) & !0xfff);

    Ok(Region { start, end, is_elf })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_raw_pages(n: usize) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&vec![0u8; n * PAGE_SIZE]).unwrap();
        f
    }

    #[test]
    fn raw_file_spans_whole_page_aligned_length() {
        let f = write_raw_pages(3);
        let region = auto_elf_parse(f.path()).unwrap();
        assert!(!region.is_elf);
        assert_eq!(region.start, 0);
        assert_eq!(region.end, 3 * PAGE_SIZE as u64);
    }

    #[test]
    fn raw_file_with_trailing_partial_page_is_rounded_down() {
        let mut f = write_raw_pages(2);
        f.write_all(&[1u8; 10]).unwrap();
        let region = auto_elf_parse(f.path()).unwrap();
        assert_eq!(region.end - region.start, 2 * PAGE_SIZE as u64);
    }

    #[test]
    fn file_shorter_than_a_page_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0u8; 100]).unwrap();
        assert!(auto_elf_parse(f.path()).is_err());
    }
}
