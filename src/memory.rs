use crate::constants::{FONT_SET, FONT_START, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START};
use crate::error::{Fault, LoadError};
use crate::opcode::Opcode;

/// # Memory
/// A flat 4096 byte address space.
///
/// ```text
/// 0x000-0x04F  font set
/// 0x050-0x1FF  reserved for the interpreter
/// 0x200-0xFFF  program and work RAM
/// ```
///
/// Every access is bounds checked; an address past 0xFFF is a fault rather than a wrap.
#[derive(Clone)]
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Zeroed memory with the font set installed
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        let font = FONT_START as usize;
        bytes[font..font + FONT_SET.len()].copy_from_slice(&FONT_SET);
        Memory { bytes }
    }

    /// Copies a program image into memory at `PROGRAM_START`.
    ///
    /// Images that don't fit are rejected before anything is written.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::TooLarge {
                size: program.len(),
            });
        }
        let start = PROGRAM_START as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    pub fn read(&self, address: u16) -> Result<u8, Fault> {
        self.bytes
            .get(address as usize)
            .copied()
            .ok_or(Fault::MemoryOutOfBounds { address })
    }

    pub fn write(&mut self, address: u16, value: u8) -> Result<(), Fault> {
        let byte = self
            .bytes
            .get_mut(address as usize)
            .ok_or(Fault::MemoryOutOfBounds { address })?;
        *byte = value;
        Ok(())
    }

    /// `len` bytes starting at `address`
    pub fn slice(&self, address: u16, len: usize) -> Result<&[u8], Fault> {
        let start = address as usize;
        self.bytes
            .get(start..start + len)
            .ok_or_else(|| Fault::MemoryOutOfBounds {
                address: Self::first_bad_address(start, len),
            })
    }

    /// Writes all of `data` starting at `address`, or nothing at all.
    pub fn write_slice(&mut self, address: u16, data: &[u8]) -> Result<(), Fault> {
        let start = address as usize;
        let target = self
            .bytes
            .get_mut(start..start + data.len())
            .ok_or_else(|| Fault::MemoryOutOfBounds {
                address: Self::first_bad_address(start, data.len()),
            })?;
        target.copy_from_slice(data);
        Ok(())
    }

    /// Gets the opcode at `address`.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn fetch(&self, address: u16) -> Result<Opcode, Fault> {
        let high = self.read(address)?;
        let low = self.read(address.wrapping_add(1))?;
        Ok(Opcode::from_bytes(high, low))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    // The first address of a range that falls outside of memory
    fn first_bad_address(start: usize, len: usize) -> u16 {
        start.max(MEMORY_SIZE).min(start + len.saturating_sub(1)) as u16
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_installed_and_program_space_zeroed() {
        let memory = Memory::new();
        assert_eq!(memory.as_bytes()[0..80], FONT_SET);
        assert!(memory.as_bytes()[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_load_program_at_0x200() {
        let mut memory = Memory::new();
        memory.load_program(&[0x00, 0xE0]).unwrap();
        assert_eq!(memory.slice(0x200, 2).unwrap(), &[0x00, 0xE0]);
    }

    #[test]
    fn test_load_program_fills_memory_exactly() {
        let mut memory = Memory::new();
        memory.load_program(&[0xAB; MAX_PROGRAM_SIZE]).unwrap();
        assert_eq!(memory.read(0xFFF).unwrap(), 0xAB);
    }

    #[test]
    fn test_load_program_too_large_writes_nothing() {
        let mut memory = Memory::new();
        let result = memory.load_program(&[0xAB; MAX_PROGRAM_SIZE + 1]);
        assert!(matches!(result, Err(LoadError::TooLarge { size: 3585 })));
        assert!(memory.as_bytes()[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_out_of_bounds() {
        let memory = Memory::new();
        assert_eq!(
            memory.read(0x1000),
            Err(Fault::MemoryOutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_write_slice_out_of_bounds_writes_nothing() {
        let mut memory = Memory::new();
        let result = memory.write_slice(0xFFE, &[1, 2, 3]);
        assert_eq!(result, Err(Fault::MemoryOutOfBounds { address: 0x1000 }));
        assert_eq!(memory.slice(0xFFE, 2).unwrap(), &[0, 0]);
    }

    #[test]
    fn test_slice_out_of_bounds_reports_first_bad_address() {
        let memory = Memory::new();
        assert_eq!(
            memory.slice(0xFFD, 5),
            Err(Fault::MemoryOutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_fetch_combines_bytes() {
        let mut memory = Memory::new();
        memory.write_slice(0x200, &[0xAA, 0xBB]).unwrap();
        assert_eq!(memory.fetch(0x200).unwrap(), Opcode(0xAABB));
    }

    #[test]
    fn test_fetch_at_last_address_faults() {
        let memory = Memory::new();
        assert_eq!(
            memory.fetch(0xFFF),
            Err(Fault::MemoryOutOfBounds { address: 0x1000 })
        );
    }
}
